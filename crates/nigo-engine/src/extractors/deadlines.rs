use std::collections::BTreeSet;

use shared_types::text::collapse_whitespace;

use crate::patterns::DEADLINES;

/// Submission timing phrases, sorted and unique.
///
/// Runs on the raw text so date tokens keep their casing. Spans that cross
/// a line break are collapsed to single spaces.
pub fn extract_deadlines(raw_text: &str) -> Vec<String> {
    if raw_text.trim().is_empty() {
        return Vec::new();
    }
    let hits: BTreeSet<String> = DEADLINES
        .iter()
        .flat_map(|pattern| pattern.find_iter(raw_text))
        .map(|m| collapse_whitespace(m.as_str()))
        .filter(|span| !span.is_empty())
        .collect();
    hits.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_calendar_date_keeps_case() {
        let hits = extract_deadlines("Return this form by March 15, 2026 to avoid delays.");
        assert_eq!(hits, vec!["by March 15, 2026".to_string()]);
    }

    #[test]
    fn test_overlapping_patterns_are_all_reported() {
        let hits = extract_deadlines("Claims must be submitted within 30 days.");
        assert_eq!(
            hits,
            vec![
                "must be submitted within 30 days".to_string(),
                "within 30 days".to_string(),
            ]
        );
    }

    #[test]
    fn test_span_across_line_break() {
        let hits = extract_deadlines("Send it no later\nthan 10 business days after closing");
        assert_eq!(hits, vec!["no later than 10 business days".to_string()]);
    }

    #[test]
    fn test_numeric_date() {
        let hits = extract_deadlines("Postmarked by 04/15/2026");
        assert_eq!(hits, vec!["Postmarked by".to_string(), "by 04/15/2026".to_string()]);
    }

    #[test]
    fn test_no_deadlines() {
        assert!(extract_deadlines("").is_empty());
        assert!(extract_deadlines("Owner name").is_empty());
    }
}
