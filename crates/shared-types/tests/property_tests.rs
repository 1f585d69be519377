//! Property-based tests for the text normalizer

use proptest::prelude::*;
use shared_types::text::{collapse_whitespace, truncate_chars};
use shared_types::normalize_for_rules;

/// Text that looks like extracted form content: words, breaks, hyphens
fn form_like_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[A-Za-z]{1,12}",
            Just("-\n".to_string()),
            Just("\n\n".to_string()),
            Just("\t".to_string()),
            Just("  ".to_string()),
            Just("____".to_string()),
            "[0-9]{1,4}",
        ],
        0..40,
    )
    .prop_map(|parts| parts.join(" "))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn normalized_text_is_lowercase(raw in "\\PC{0,200}") {
        let normalized = normalize_for_rules(&raw);
        prop_assert_eq!(normalized.to_lowercase(), normalized);
    }

    #[test]
    fn normalized_text_has_no_whitespace_runs(raw in "\\PC{0,200}") {
        let normalized = normalize_for_rules(&raw);
        let chars: Vec<char> = normalized.chars().collect();
        for pair in chars.windows(2) {
            prop_assert!(!(pair[0].is_whitespace() && pair[1].is_whitespace()));
        }
        prop_assert_eq!(normalized.trim(), normalized.as_str());
    }

    #[test]
    fn form_text_normalizes_without_newlines(raw in form_like_text()) {
        let normalized = normalize_for_rules(&raw);
        prop_assert!(!normalized.contains('\n'));
        prop_assert!(!normalized.contains('\t'));
    }

    #[test]
    fn collapse_never_grows_text(raw in form_like_text()) {
        prop_assert!(collapse_whitespace(&raw).len() <= raw.len());
    }

    #[test]
    fn truncate_is_bounded(raw in "\\PC{0,80}", max in 0usize..100) {
        prop_assert!(truncate_chars(&raw, max).chars().count() <= max);
    }
}
