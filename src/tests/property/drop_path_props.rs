//! Property-based tests for dropped-path parsing
//!
//! Tests invariants:
//! - Plain paths survive any mix of space/newline separators
//! - Quoted paths keep their embedded spaces
//! - Percent-encoded `file:` URIs decode to the same paths
//! - Upload file names are the final path component
//! - Parsing never panics on arbitrary text

use std::path::PathBuf;

use proptest::prelude::*;

use crate::core::intake::parse_dropped_paths;
use crate::core::models::FileSource;

// ============================================================================
// Strategies
// ============================================================================

/// An absolute path without whitespace, quotes or backslashes.
fn arb_plain_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z0-9_-]{1,8}(\\.[a-z]{1,4})?", 1..5)
        .prop_map(|parts| format!("/{}", parts.join("/")))
}

/// An absolute path whose segments may contain spaces.
fn arb_spaced_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z0-9_-]{1,6}( [a-zA-Z0-9_-]{1,6})?", 1..4)
        .prop_map(|parts| format!("/{}", parts.join("/")))
}

fn arb_separator() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(" "), Just("\n"), Just("  "), Just(" \n ")]
}

fn source_paths(text: &str) -> Vec<PathBuf> {
    parse_dropped_paths(text)
        .into_iter()
        .map(|f| match f.source {
            FileSource::Path(p) => p,
            FileSource::Bytes(_) => PathBuf::new(),
        })
        .collect()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_plain_paths_roundtrip(
        paths in prop::collection::vec(arb_plain_path(), 1..6),
        sep in arb_separator(),
    ) {
        let text = paths.join(sep);
        let expected: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
        prop_assert_eq!(source_paths(&text), expected);
    }

    #[test]
    fn prop_quoted_paths_keep_spaces(
        paths in prop::collection::vec(arb_spaced_path(), 1..5),
        double in any::<bool>(),
    ) {
        let q = if double { '"' } else { '\'' };
        let text = paths
            .iter()
            .map(|p| format!("{q}{p}{q}"))
            .collect::<Vec<_>>()
            .join(" ");
        let expected: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
        prop_assert_eq!(source_paths(&text), expected);
    }

    #[test]
    fn prop_file_uris_decode_spaces(
        paths in prop::collection::vec(arb_spaced_path(), 1..5),
        sep in arb_separator(),
    ) {
        let text = paths
            .iter()
            .map(|p| format!("file://{}", p.replace(' ', "%20")))
            .collect::<Vec<_>>()
            .join(sep);
        let expected: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
        prop_assert_eq!(source_paths(&text), expected);
    }

    #[test]
    fn prop_file_name_is_last_component(path in arb_plain_path()) {
        let files = parse_dropped_paths(&path);
        prop_assert_eq!(files.len(), 1);
        let last = path.rsplit('/').next().unwrap_or_default();
        prop_assert_eq!(files[0].file_name.as_str(), last);
    }

    #[test]
    fn prop_never_panics(text in "\\PC{0,200}") {
        let _ = parse_dropped_paths(&text);
    }
}
