//! Field taxonomy and spatial label search

use std::cmp::Ordering;

use shared_types::{
    BoundingBox, DocumentAccess, Field, FieldClass, FieldCounts, TextBlock, WidgetInfo, WidgetKind,
};
use tracing::debug;

use crate::patterns::FIELD_CLASSES;

/// How far left of a widget its label may sit
const LABEL_LEFT: f64 = 200.0;
/// How far above a widget's top edge its label may sit
const LABEL_ABOVE: f64 = 60.0;
const LABEL_BELOW: f64 = 5.0;
const LABEL_RIGHT: f64 = 10.0;

/// Classify a field from its name, tooltip and nearby label.
///
/// The first matching rule of [`FIELD_CLASSES`] wins.
pub fn classify(name: &str, alt_label: &str, label: &str) -> FieldClass {
    let haystack = [name, alt_label, label]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    FIELD_CLASSES
        .iter()
        .find(|(_, pattern)| pattern.is_match(&haystack))
        .map(|(class, _)| *class)
        .unwrap_or(FieldClass::Text)
}

/// Rectangle searched for a widget's label
pub fn label_search_area(widget: &BoundingBox) -> BoundingBox {
    BoundingBox::new(
        widget.x0 - LABEL_LEFT,
        widget.y0 - LABEL_ABOVE,
        widget.x1 + LABEL_RIGHT,
        widget.y0 + LABEL_BELOW,
    )
}

fn reading_order(a: &TextBlock, b: &TextBlock) -> Ordering {
    a.bbox
        .y0
        .total_cmp(&b.bbox.y0)
        .then(a.bbox.x0.total_cmp(&b.bbox.x0))
}

/// Text of blocks intersecting the search area, in reading order
pub fn label_from_blocks(blocks: &[TextBlock], area: &BoundingBox) -> String {
    let mut hits: Vec<&TextBlock> = blocks.iter().filter(|b| b.bbox.intersects(area)).collect();
    hits.sort_by(|a, b| reading_order(a, b));
    hits.iter()
        .map(|b| b.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Label text near a widget; any extraction failure yields an empty label
pub fn label_near_widget(access: &dyn DocumentAccess, widget: &WidgetInfo) -> String {
    match access.page_text_blocks(widget.page_index) {
        Ok(blocks) => label_from_blocks(&blocks, &label_search_area(&widget.bounding_box)),
        Err(e) => {
            debug!(field = %widget.name, error = %e, "Label search fell back to empty");
            String::new()
        }
    }
}

/// Build the classified field list, one entry per widget in document order
pub fn build_fields(access: &dyn DocumentAccess, widgets: &[WidgetInfo]) -> Vec<Field> {
    widgets
        .iter()
        .map(|widget| {
            let label = label_near_widget(access, widget);
            let inferred_class = classify(&widget.name, &widget.tooltip, &label);
            Field {
                name: widget.name.clone(),
                alt_label: widget.tooltip.clone(),
                nearby_label_text: label,
                inferred_class,
                kind: widget.kind,
                is_required: widget.is_required,
                has_validation_actions: widget.actions_present,
                page_index: widget.page_index,
            }
        })
        .collect()
}

pub fn count_fields(widgets: &[WidgetInfo]) -> FieldCounts {
    let mut counts = FieldCounts {
        total: widgets.len(),
        ..FieldCounts::default()
    };
    for widget in widgets {
        match widget.kind {
            WidgetKind::Text => counts.text_fields += 1,
            WidgetKind::Checkbox => counts.checkboxes += 1,
            WidgetKind::ComboBox | WidgetKind::ListBox => counts.dropdowns += 1,
            WidgetKind::Signature => counts.signatures += 1,
            _ => {}
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(x0: f64, y0: f64, x1: f64, y1: f64, text: &str) -> TextBlock {
        TextBlock {
            bbox: BoundingBox::new(x0, y0, x1, y1),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_narrow_classes_win_over_generic_date() {
        assert_eq!(classify("", "", "Date of Birth"), FieldClass::Dob);
        assert_eq!(classify("sign_date", "", "Date"), FieldClass::Date);
        assert_eq!(classify("owner_ssn", "", ""), FieldClass::Text);
        assert_eq!(classify("owner ssn", "", ""), FieldClass::Ssn);
        assert_eq!(classify("", "Taxpayer ID", ""), FieldClass::Tin);
    }

    #[test]
    fn test_email_and_amount() {
        assert_eq!(classify("E-mail", "", ""), FieldClass::Email);
        assert_eq!(classify("", "", "Amount (USD)"), FieldClass::Amount);
        assert_eq!(classify("Full Name", "", ""), FieldClass::Text);
    }

    #[test]
    fn test_signature_and_witness() {
        assert_eq!(classify("Signature1", "", "Owner Signature"), FieldClass::Signature);
        assert_eq!(classify("", "", "Witness"), FieldClass::Witness);
    }

    #[test]
    fn test_label_search_area() {
        let area = label_search_area(&BoundingBox::new(300.0, 100.0, 400.0, 120.0));
        assert_eq!(area, BoundingBox::new(100.0, 40.0, 410.0, 105.0));
    }

    #[test]
    fn test_label_joins_blocks_in_reading_order() {
        let widget = BoundingBox::new(300.0, 100.0, 400.0, 120.0);
        let blocks = vec![
            block(250.0, 80.0, 290.0, 92.0, "Number"),
            block(120.0, 80.0, 240.0, 92.0, "Social Security"),
            block(120.0, 300.0, 240.0, 312.0, "Unrelated"),
        ];
        let label = label_from_blocks(&blocks, &label_search_area(&widget));
        assert_eq!(label, "Social Security Number");
    }

    #[test]
    fn test_count_fields_by_kind() {
        let widget = |kind| WidgetInfo {
            name: String::new(),
            tooltip: String::new(),
            is_required: false,
            kind,
            bounding_box: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            page_index: 1,
            actions_present: false,
        };
        let widgets = vec![
            widget(WidgetKind::Text),
            widget(WidgetKind::Text),
            widget(WidgetKind::ComboBox),
            widget(WidgetKind::ListBox),
            widget(WidgetKind::Signature),
            widget(WidgetKind::Radio),
        ];
        let counts = count_fields(&widgets);
        assert_eq!(counts.total, 6);
        assert_eq!(counts.text_fields, 2);
        assert_eq!(counts.dropdowns, 2);
        assert_eq!(counts.signatures, 1);
        assert_eq!(counts.checkboxes, 0);
    }
}
