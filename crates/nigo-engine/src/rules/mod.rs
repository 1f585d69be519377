//! NIGO design checks
//!
//! Field checks run once per classified field in document order. Every
//! check runs for every field; a decode failure seen along the way is
//! reported once as a trailing `SYS-ERR` finding.

pub mod fields;

use std::collections::BTreeMap;

use shared_types::{AccessError, DocumentAccess, Field, FieldClass, RiskFinding, Severity};
use tracing::warn;

use crate::error::RuleError;

pub const SYSTEM_ERROR_RULE: &str = "SYS-ERR";
pub const MISSING_ROLE_RULE: &str = "ROLE-001";
pub const THIRD_PARTY_RULE: &str = "THRD-001";

pub struct RiskRuleEngine;

impl RiskRuleEngine {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate every field rule over `fields`
    pub fn evaluate(&self, access: &dyn DocumentAccess, fields: &[Field]) -> Vec<RiskFinding> {
        let mut findings = Vec::new();
        let mut page_actions = BTreeMap::new();
        let mut failure = None;
        for field in fields {
            let has_logic = field.has_validation_actions
                || page_has_logic(access, field.page_index, &mut page_actions).unwrap_or_else(|e| {
                    warn!(field = %field.display_name(), error = %e, "Rule evaluation failed");
                    failure.get_or_insert(e);
                    false
                });
            check_field(field, has_logic, &mut findings);
        }
        if let Some(e) = failure {
            findings.push(system_error(&e));
        }
        findings
    }
}

impl Default for RiskRuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `page` carries actions. Only a decode failure is an error;
/// a missing page or an unreadable page fact reads as no actions.
fn page_has_logic(
    access: &dyn DocumentAccess,
    page: usize,
    cache: &mut BTreeMap<usize, bool>,
) -> Result<bool, RuleError> {
    if page == 0 {
        return Ok(false);
    }
    if let Some(&known) = cache.get(&page) {
        return Ok(known);
    }
    let has_logic = match access.page_has_actions(page) {
        Ok(value) => value,
        Err(AccessError::Decode(msg)) => return Err(AccessError::Decode(msg).into()),
        Err(AccessError::Unsupported(_)) => false,
        Err(e) => {
            warn!(page, error = %e, "Page actions unavailable, assuming none");
            false
        }
    };
    cache.insert(page, has_logic);
    Ok(has_logic)
}

fn check_field(field: &Field, has_logic: bool, findings: &mut Vec<RiskFinding>) {
    findings.extend(fields::check_required(field));
    findings.extend(fields::check_validation(field, has_logic));
    findings.extend(fields::check_signature_date(field));
    findings.extend(fields::check_conditional_area(field, has_logic));
}

fn system_error(err: &RuleError) -> RiskFinding {
    RiskFinding {
        rule_id: SYSTEM_ERROR_RULE.to_string(),
        severity: Severity::Info,
        page: None,
        field_name: String::new(),
        field_class: String::new(),
        message: "Analyzer error during NIGO checks.".to_string(),
        evidence_text: err.to_string(),
    }
}

/// `ROLE-001`: signatures without any attributed signer role
pub fn missing_role_finding(signature_count: usize) -> RiskFinding {
    RiskFinding {
        rule_id: MISSING_ROLE_RULE.to_string(),
        severity: Severity::Medium,
        page: None,
        field_name: String::new(),
        field_class: FieldClass::Signature.as_str().to_string(),
        message: "Signature line(s) without role attribution (e.g. Applicant, Co-owner, Notary)."
            .to_string(),
        evidence_text: format!("Detected {signature_count} signature(s) with no labeled role."),
    }
}

/// `THRD-001`: participants outside the signing parties
pub fn third_party_finding(roles: &[String]) -> RiskFinding {
    RiskFinding {
        rule_id: THIRD_PARTY_RULE.to_string(),
        severity: Severity::Medium,
        page: None,
        field_name: String::new(),
        field_class: "third_party".to_string(),
        message: "Third-party involvement requires coordination (scheduling, credential checks)."
            .to_string(),
        evidence_text: format!("Detected third-party role(s): {}", roles.join(", ")),
    }
}
