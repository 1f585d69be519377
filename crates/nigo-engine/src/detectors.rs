//! Document-level detectors feeding the complexity score
//!
//! Each detector degrades to an empty or zero result when a fact is
//! unavailable from the backend.

use std::collections::{BTreeMap, BTreeSet};

use shared_types::{AccessError, DocumentAccess, GraphicsStats, PiiKind, WidgetInfo, WidgetKind};
use tracing::debug;

use crate::patterns::{ATTACHMENT_HINTS, PII};

const XFA_HINTS: &[&str] = &["xfa", "dynamic xdp", "xfa form", "livecycle"];

/// Kinds of personal data the form asks for
pub fn detect_pii(normalized_text: &str) -> BTreeSet<PiiKind> {
    PII.iter()
        .filter(|(_, pattern)| pattern.is_match(normalized_text))
        .map(|(kind, _)| *kind)
        .collect()
}

/// Labels of attachment hints present in the text, sorted
pub fn detect_attachment_requirements(normalized_text: &str) -> Vec<String> {
    let labels: BTreeSet<&str> = ATTACHMENT_HINTS
        .iter()
        .filter(|(pattern, _)| pattern.is_match(normalized_text))
        .map(|(_, label)| *label)
        .collect();
    labels.into_iter().map(str::to_string).collect()
}

/// Distinct radio groups, keyed by the field name before the first `.`
pub fn count_radio_groups(widgets: &[WidgetInfo]) -> usize {
    widgets
        .iter()
        .filter(|w| w.kind == WidgetKind::Radio)
        .filter_map(|w| w.name.split('.').next())
        .filter(|group| !group.is_empty())
        .collect::<BTreeSet<_>>()
        .len()
}

fn fact_or_false(fact: Result<bool, AccessError>, what: &str) -> bool {
    fact.unwrap_or_else(|e| {
        debug!(fact = what, error = %e, "Action fact unavailable");
        false
    })
}

/// Document, page or widget actions; two or more radio buttons imply branching
pub fn detect_interactive_logic(
    access: &dyn DocumentAccess,
    widgets: &[WidgetInfo],
    page_count: usize,
) -> bool {
    if fact_or_false(access.document_has_actions(), "document actions") {
        return true;
    }
    if (1..=page_count).any(|page| fact_or_false(access.page_has_actions(page), "page actions")) {
        return true;
    }
    if widgets.iter().any(|w| w.actions_present) {
        return true;
    }
    widgets.iter().filter(|w| w.kind == WidgetKind::Radio).count() >= 2
}

fn per_page(total: usize, pages: usize) -> f64 {
    let value = total as f64 / pages.max(1) as f64;
    (value * 100.0).round() / 100.0
}

/// Images, drawing operations and glyphs averaged per page
pub fn graphics_stats(access: &dyn DocumentAccess, page_count: usize) -> GraphicsStats {
    let (mut images, mut drawings, mut glyphs) = (0, 0, 0);
    for page in 1..=page_count {
        match access.page_graphics(page) {
            Ok(g) => {
                images += g.image_count;
                drawings += g.vector_drawing_ops;
                glyphs += g.rendered_glyph_count;
            }
            Err(e) => debug!(page, error = %e, "Graphics unavailable for page"),
        }
    }
    GraphicsStats {
        images_per_page: per_page(images, page_count),
        drawings_per_page: per_page(drawings, page_count),
        text_density: per_page(glyphs, page_count),
    }
}

/// Metadata or text mentions dynamic XML form technology
pub fn detect_xfa_hint(normalized_text: &str, metadata: &BTreeMap<String, String>) -> bool {
    let in_meta = metadata.iter().any(|(key, value)| {
        let joined = format!("{key} {value}").to_lowercase();
        XFA_HINTS.iter().any(|hint| joined.contains(hint))
    });
    in_meta || XFA_HINTS.iter().any(|hint| normalized_text.contains(hint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::BoundingBox;

    fn radio(name: &str) -> WidgetInfo {
        WidgetInfo {
            name: name.to_string(),
            tooltip: String::new(),
            is_required: false,
            kind: WidgetKind::Radio,
            bounding_box: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            page_index: 1,
            actions_present: false,
        }
    }

    #[test]
    fn test_pii_kinds() {
        let pii = detect_pii("social security number, date of birth and email");
        assert!(pii.contains(&PiiKind::Ssn));
        assert!(pii.contains(&PiiKind::Dob));
        assert!(pii.contains(&PiiKind::Email));
        assert!(!pii.contains(&PiiKind::Phone));
        assert!(detect_pii("").is_empty());
    }

    #[test]
    fn test_attachment_labels_sorted() {
        let labels = detect_attachment_requirements(
            "attach a voided check and include a copy of your photo id",
        );
        assert_eq!(
            labels,
            vec!["attachment", "copy_or_proof", "photo_id", "voided_check"]
        );
    }

    #[test]
    fn test_radio_groups_by_prefix() {
        let widgets = vec![
            radio("marital.single"),
            radio("marital.married"),
            radio("payout.lump"),
            radio(""),
        ];
        assert_eq!(count_radio_groups(&widgets), 2);
    }

    #[test]
    fn test_xfa_hint_from_metadata() {
        let mut meta = BTreeMap::new();
        meta.insert("producer".to_string(), "Adobe LiveCycle Designer ES".to_string());
        assert!(detect_xfa_hint("", &meta));
        assert!(detect_xfa_hint("this xfa form requires reader", &BTreeMap::new()));
        assert!(!detect_xfa_hint("plain form", &BTreeMap::new()));
    }

    #[test]
    fn test_per_page_rounding() {
        assert_eq!(per_page(10, 3), 3.33);
        assert_eq!(per_page(5, 0), 5.0);
    }
}
