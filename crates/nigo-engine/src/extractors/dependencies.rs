use std::collections::BTreeSet;

use shared_types::text::truncate_chars;
use shared_types::{Dependency, DependencyRelation};

use crate::patterns::{DEPENDENCIES, FORM_TOKEN};

/// Longest hint kept from a matched span
const MAX_HINT_CHARS: usize = 180;

/// Other forms this one must travel with, precede, follow or refer to.
///
/// Rules run in table order over normalized text. Results are unique per
/// relation and form id, or per relation and hint when no id was found.
pub fn extract_dependencies(normalized_text: &str) -> Vec<Dependency> {
    let mut seen: BTreeSet<(DependencyRelation, String)> = BTreeSet::new();
    let mut dependencies = Vec::new();
    if normalized_text.is_empty() {
        return dependencies;
    }
    for (relation, pattern) in DEPENDENCIES.iter() {
        for m in pattern.find_iter(normalized_text) {
            let hint = truncate_chars(m.as_str(), MAX_HINT_CHARS).trim().to_string();
            let form_id = FORM_TOKEN
                .captures(&hint)
                .and_then(|caps| caps.get(1))
                .map(|id| id.as_str().to_uppercase().replace("  ", " "));
            let key = (*relation, form_id.clone().unwrap_or_else(|| hint.clone()));
            if seen.insert(key) {
                dependencies.push(Dependency {
                    relation: *relation,
                    hint,
                    form_id,
                });
            }
        }
    }
    dependencies
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_submit_with_form() {
        let deps = extract_dependencies("please submit this form with form w-9 to your advisor");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].relation, DependencyRelation::With);
        assert_eq!(deps[0].form_id.as_deref(), Some("W-9"));
        assert!(deps[0].hint.starts_with("submit this form with"));
    }

    #[test]
    fn test_see_reference_without_known_prefix() {
        let deps = extract_dependencies("for details see document schedule-a.");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].relation, DependencyRelation::See);
        assert_eq!(deps[0].form_id, None);
    }

    #[test]
    fn test_duplicates_collapse_by_form_id() {
        let text = "see form ssa-827. you must also see form ssa-827 again.";
        let deps = extract_dependencies(text);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].form_id.as_deref(), Some("SSA-827"));
    }

    #[test]
    fn test_after_approval() {
        let deps = extract_dependencies("after approval of form i-130 the petitioner is notified");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].relation, DependencyRelation::After);
        assert_eq!(deps[0].form_id.as_deref(), Some("I-130"));
    }

    #[test]
    fn test_no_dependencies() {
        assert!(extract_dependencies("").is_empty());
        assert!(extract_dependencies("owner name and address").is_empty());
    }
}
