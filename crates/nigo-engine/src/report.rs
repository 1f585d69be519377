//! Final assembly of a form report

use std::collections::{BTreeMap, BTreeSet};

use shared_types::text::truncate_chars;
use shared_types::FormReport;

use crate::scoring::{complexity_score, nigo_score, ComplexityInputs};
use crate::weights::ScoringWeights;

const UNKNOWN_TITLE: &str = "Unknown Form";
const MIN_TITLE_LINE_CHARS: usize = 5;
const MAX_TITLE_CHARS: usize = 120;
const LONG_FORM_PAGES: usize = 8;
const BRANCHING_RADIO_GROUPS: usize = 2;

/// Last path segment of a URL or file path, without query or fragment
fn source_file_name(source: &str) -> Option<&str> {
    let path = source.split(['?', '#']).next()?;
    path.rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

/// Metadata title, then the first substantial text line, then the source file name
pub fn form_title(metadata: &BTreeMap<String, String>, raw_text: &str, source: &str) -> String {
    if let Some(title) = metadata.get("title").map(|t| t.trim()).filter(|t| !t.is_empty()) {
        return title.to_string();
    }
    let first_line = raw_text
        .lines()
        .map(str::trim)
        .find(|line| line.chars().count() > MIN_TITLE_LINE_CHARS);
    if let Some(line) = first_line {
        return truncate_chars(line, MAX_TITLE_CHARS).to_string();
    }
    source_file_name(source)
        .unwrap_or(UNKNOWN_TITLE)
        .to_string()
}

/// Bullet list of what makes the form demanding, one bullet per trait
pub fn special_requirements(report: &FormReport) -> Vec<String> {
    let mut bullets = Vec::new();
    let sig = &report.signatures;
    if sig.notarized {
        bullets.push("Requires notarization".to_string());
    }
    if sig.witness_count > 0 {
        bullets.push("Requires witness signature".to_string());
    }
    let signatures = report.field_counts.signatures.max(sig.signature_count());
    if signatures > 0 {
        bullets.push(format!("{signatures} signature field(s)"));
    }
    if report.attachment_count > 0 || !report.attachment_requirements.is_empty() {
        bullets.push("Requires supporting attachments".to_string());
    }
    if report.interactive_logic || report.multistep_logic_hint {
        bullets.push("Conditional/JavaScript logic present".to_string());
    }
    if !report.pii_fields.is_empty() {
        bullets.push("Collects sensitive PII".to_string());
    }
    if report.radio_groups >= BRANCHING_RADIO_GROUPS {
        bullets.push("Multiple radio groups (branching choices)".to_string());
    }
    if report.document.page_count >= LONG_FORM_PAGES {
        bullets.push("Long form (8+ pages)".to_string());
    }
    if !report.deadlines.is_empty() {
        bullets.push("Mentions submission timing/deadlines".to_string());
    }
    if !report.dependencies.is_empty() {
        bullets.push("References other required forms".to_string());
    }
    if report.domain_trust.mismatch {
        bullets.push("Hosted on domain different from issuer".to_string());
    }
    if !report.third_party.roles.is_empty() {
        bullets.push(format!(
            "Involves third party: {}",
            report.third_party.roles.join(", ")
        ));
    }

    let mut seen = BTreeSet::new();
    bullets.retain(|b| seen.insert(b.clone()));
    bullets
}

pub fn summary_line(report: &FormReport) -> String {
    let doc = &report.document;
    let mut line = format!(
        "{} ({}): {} page(s), {} field(s), {} signature(s); NIGO {}/100, complexity {}/100, {} finding(s)",
        doc.form_title,
        doc.entity_name,
        doc.page_count,
        report.field_counts.total,
        report.signatures.signature_count(),
        report.nigo_score,
        report.complexity_score,
        report.findings.len(),
    );
    if let Some(first) = report.special_requirements.first() {
        line.push_str("; ");
        line.push_str(first);
    }
    line
}

/// Score a fully populated report and derive its human-facing fields
pub fn assemble(mut report: FormReport, weights: &ScoringWeights) -> FormReport {
    report.nigo_score = nigo_score(&report.findings, &report.pii_fields, weights);
    report.complexity_score = complexity_score(&ComplexityInputs::from(&report), weights);
    report.weights_version = weights.version.clone();
    report.special_requirements = special_requirements(&report);
    report.summary = summary_line(&report);
    report
}
