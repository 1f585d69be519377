//! Per-field design checks

use shared_types::text::truncate_chars;
use shared_types::{Field, FieldClass, RiskFinding, Severity};

use crate::patterns::{BENEFICIARY_WORD, DATE_WORD};

pub const REQUIRED_RULE: &str = "REQ-001";
pub const FORMAT_RULE: &str = "FMT-001";
pub const SIGNATURE_DATE_RULE: &str = "SIG-002";
pub const CONDITIONAL_RULE: &str = "COND-003";

const EVIDENCE_LABEL_CHARS: usize = 120;

/// Classes a well-designed form marks as required
pub fn should_be_required(class: FieldClass) -> bool {
    matches!(
        class,
        FieldClass::Signature
            | FieldClass::Dob
            | FieldClass::Ssn
            | FieldClass::Email
            | FieldClass::Phone
            | FieldClass::Zip
            | FieldClass::State
            | FieldClass::Routing
            | FieldClass::Account
            | FieldClass::Amount
    )
}

/// Classes whose input should be masked or validated
pub fn should_be_validated(class: FieldClass) -> bool {
    matches!(
        class,
        FieldClass::Ssn
            | FieldClass::Tin
            | FieldClass::Ein
            | FieldClass::Dob
            | FieldClass::Date
            | FieldClass::Phone
            | FieldClass::Email
            | FieldClass::Zip
            | FieldClass::State
            | FieldClass::Routing
            | FieldClass::Account
            | FieldClass::Amount
    )
}

fn finding(field: &Field, rule_id: &str, severity: Severity, message: &str, evidence: String) -> RiskFinding {
    RiskFinding {
        rule_id: rule_id.to_string(),
        severity,
        page: Some(field.page_index),
        field_name: field.display_name().to_string(),
        field_class: field.inferred_class.as_str().to_string(),
        message: message.to_string(),
        evidence_text: evidence,
    }
}

fn short_label(field: &Field) -> &str {
    truncate_chars(&field.nearby_label_text, EVIDENCE_LABEL_CHARS)
}

/// `REQ-001`
pub fn check_required(field: &Field) -> Option<RiskFinding> {
    if !should_be_required(field.inferred_class) || field.is_required {
        return None;
    }
    Some(finding(
        field,
        REQUIRED_RULE,
        Severity::High,
        "Field likely should be required but is not.",
        format!("Label='{}' name='{}'", short_label(field), field.name),
    ))
}

/// `SIG-002`
pub fn check_signature_date(field: &Field) -> Option<RiskFinding> {
    if field.inferred_class != FieldClass::Signature || DATE_WORD.is_match(&field.nearby_label_text) {
        return None;
    }
    Some(finding(
        field,
        SIGNATURE_DATE_RULE,
        Severity::Low,
        "Signature likely needs an adjacent date field.",
        format!("Nearby label='{}'", short_label(field)),
    ))
}

/// `FMT-001`; `has_logic` covers field and page actions
pub fn check_validation(field: &Field, has_logic: bool) -> Option<RiskFinding> {
    if !should_be_validated(field.inferred_class) || has_logic {
        return None;
    }
    Some(finding(
        field,
        FORMAT_RULE,
        Severity::Medium,
        "No input mask or validation detected for a high-risk field.",
        format!(
            "Class={}; no field or page actions found.",
            field.inferred_class.as_str()
        ),
    ))
}

/// `COND-003`
pub fn check_conditional_area(field: &Field, has_logic: bool) -> Option<RiskFinding> {
    if has_logic {
        return None;
    }
    let mentions = [&field.nearby_label_text, &field.alt_label, &field.name]
        .iter()
        .any(|text| BENEFICIARY_WORD.is_match(text));
    if !mentions {
        return None;
    }
    Some(finding(
        field,
        CONDITIONAL_RULE,
        Severity::Medium,
        "Conditional area lacks visible logic; consider masks for SSN and DOB.",
        format!("Label='{}'", short_label(field)),
    ))
}
