// Shared helpers for the integration suites.

/// Assert that input parses completely, returning the tree.
#[macro_export]
macro_rules! assert_parses {
    ($input:expr) => {{
        let result = promql_builder::parse($input);
        assert!(
            result.is_ok(),
            "expected '{}' to parse, got error: {:?}",
            $input,
            result.err()
        );
        result.unwrap()
    }};
}

/// Assert that input fails to parse; optionally check the error text.
#[macro_export]
macro_rules! assert_parse_error {
    ($input:expr) => {{
        let result = promql_builder::parse($input);
        assert!(
            result.is_err(),
            "expected '{}' to fail parsing, but got: {:?}",
            $input,
            result.ok()
        );
        result.unwrap_err()
    }};
    ($input:expr, $error_contains:expr) => {{
        let err = assert_parse_error!($input);
        let text = err.to_string();
        assert!(
            text.contains($error_contains),
            "expected error for '{}' to contain '{}', got: {}",
            $input,
            $error_contains,
            text
        );
        err
    }};
}

/// Assert that rendering a parsed tree re-parses to the identical tree.
#[macro_export]
macro_rules! assert_roundtrip {
    ($input:expr) => {{
        let tree = assert_parses!($input);
        let printed = tree.to_string();
        let reparsed = promql_builder::parse(&printed);
        assert!(
            reparsed.is_ok(),
            "roundtrip failed: '{}' rendered as '{}', which does not parse: {:?}",
            $input,
            printed,
            reparsed.err()
        );
        assert_eq!(
            reparsed.unwrap(),
            tree,
            "roundtrip of '{}' via '{}' changed the tree",
            $input,
            printed
        );
    }};
}
