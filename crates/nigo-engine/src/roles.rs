//! Signer roles and third-party participants

use shared_types::text::char_window;
use shared_types::ThirdPartyReport;
use tracing::debug;

use crate::patterns::{SIGNER_ROLES, THIRD_PARTIES};

pub const UNSPECIFIED_SIGNER: &str = "Unspecified Signer";

/// Parties that sign as principals and never count as third parties
const CORE_SIGNERS: &[&str] = &[
    "Applicant",
    "Borrower",
    "Member",
    "Customer",
    "Account Holder",
    "Co-owner",
    "Co-applicant",
    "Spouse",
];

/// Characters of context kept on each side of a third-party mention
const EVIDENCE_RADIUS: usize = 40;
const MAX_EVIDENCE: usize = 6;

/// Signer roles named in the text, table order
pub fn detect_roles(normalized_text: &str) -> Vec<String> {
    SIGNER_ROLES
        .iter()
        .filter(|(_, pattern)| pattern.is_match(normalized_text))
        .map(|(role, _)| role.to_string())
        .collect()
}

/// Roles to report, given how many signatures were found.
///
/// Returns `true` alongside the roles when signatures exist but none of
/// them could be attributed.
pub fn resolve_roles(normalized_text: &str, signature_count: usize) -> (Vec<String>, bool) {
    let roles = detect_roles(normalized_text);
    if signature_count > 0 && roles.is_empty() {
        return (vec![UNSPECIFIED_SIGNER.to_string()], true);
    }
    (roles, false)
}

/// Non-signer participants with a context snippet for each
pub fn detect_third_parties(normalized_text: &str) -> ThirdPartyReport {
    let mut report = ThirdPartyReport::default();
    if normalized_text.is_empty() {
        return report;
    }
    for (role, pattern) in THIRD_PARTIES.iter() {
        if CORE_SIGNERS.iter().any(|core| core.eq_ignore_ascii_case(role)) {
            continue;
        }
        let Some(m) = pattern.find(normalized_text) else {
            continue;
        };
        if report.roles.iter().any(|r| r == role) {
            continue;
        }
        report.roles.push(role.to_string());
        if report.evidence.len() < MAX_EVIDENCE {
            let snippet = char_window(normalized_text, m.start(), m.end(), EVIDENCE_RADIUS);
            report.evidence.push(snippet.trim().to_string());
        }
    }
    if !report.roles.is_empty() {
        debug!(roles = ?report.roles, "Third parties detected");
    }
    report
}

/// Third parties whose involvement means scheduling outside the firm
pub fn needs_coordination(role: &str) -> bool {
    matches!(role, "Physician" | "Attorney" | "Financial Advisor")
}
