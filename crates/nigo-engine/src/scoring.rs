//! NIGO and complexity scores
//!
//! Both scores are pure functions of detector outputs already stored in a
//! [`FormReport`], so a stored report can be rescored against another
//! weight table without touching the document again.

use std::collections::BTreeSet;

use shared_types::{FieldClass, FormReport, PiiKind, RiskFinding};

use crate::roles::needs_coordination;
use crate::rules::fields::{FORMAT_RULE, REQUIRED_RULE};
use crate::weights::{tier_points, ScoringWeights};

const MAX_SCORE: f64 = 100.0;
const BRANCHING_RADIO_GROUPS: usize = 2;

fn on_high_risk_field(finding: &RiskFinding) -> bool {
    FieldClass::parse(&finding.field_class).is_some_and(|class| class.is_high_risk())
}

/// Likelihood that a submission comes back Not In Good Order, 0-100
pub fn nigo_score(findings: &[RiskFinding], pii: &BTreeSet<PiiKind>, weights: &ScoringWeights) -> u8 {
    let w = &weights.nigo;
    let mut total = findings.iter().fold(0u32, |acc, f| {
        let bonus = if on_high_risk_field(f) { w.high_risk_field } else { 0 };
        acc.saturating_add(w.severity.weight(f.severity))
            .saturating_add(w.rule_weight(&f.rule_id))
            .saturating_add(bonus)
    });

    let exposed = findings.iter().any(|f| {
        (f.rule_id == REQUIRED_RULE || f.rule_id == FORMAT_RULE) && on_high_risk_field(f)
    });
    if !pii.is_empty() && exposed {
        total = total.saturating_add(w.pii_exposure);
    }
    total.min(MAX_SCORE as u32) as u8
}

/// Structural facts the complexity score reads
#[derive(Debug, Clone, Copy)]
pub struct ComplexityInputs<'a> {
    pub page_count: usize,
    pub field_total: usize,
    pub signature_count: usize,
    pub witness_count: usize,
    pub notarized: bool,
    pub attachment_mentioned: bool,
    pub attachment_requirements: &'a [String],
    pub interactive_logic: bool,
    pub radio_groups: usize,
    pub roles_required: &'a [String],
    pub third_parties: &'a [String],
    pub pii: &'a BTreeSet<PiiKind>,
    pub images_per_page: f64,
    pub drawings_per_page: f64,
    pub xfa_like: bool,
    pub deadline_count: usize,
    pub dependency_count: usize,
    pub domain_mismatch: bool,
}

impl<'a> From<&'a FormReport> for ComplexityInputs<'a> {
    fn from(report: &'a FormReport) -> Self {
        Self {
            page_count: report.document.page_count,
            field_total: report.field_counts.total,
            signature_count: report.signatures.signature_count(),
            witness_count: report.signatures.witness_count,
            notarized: report.signatures.notarized,
            attachment_mentioned: report.attachment_mentioned,
            attachment_requirements: &report.attachment_requirements,
            interactive_logic: report.interactive_logic,
            radio_groups: report.radio_groups,
            roles_required: &report.roles_required,
            third_parties: &report.third_party.roles,
            pii: &report.pii_fields,
            images_per_page: report.graphics.images_per_page,
            drawings_per_page: report.graphics.drawings_per_page,
            xfa_like: report.xfa_like,
            deadline_count: report.deadlines.len(),
            dependency_count: report.dependencies.len(),
            domain_mismatch: report.domain_trust.mismatch,
        }
    }
}

fn flag(condition: bool, points: f64) -> f64 {
    if condition {
        points
    } else {
        0.0
    }
}

/// Effort to complete the form correctly, 0-100
pub fn complexity_score(inputs: &ComplexityInputs<'_>, weights: &ScoringWeights) -> u8 {
    let w = &weights.complexity;
    let mut score = 0.0;

    score += (inputs.page_count as f64 * w.points_per_page).min(w.page_cap);
    score += (inputs.field_total as f64 * w.points_per_field).min(w.field_cap);

    score += flag(inputs.signature_count > 0, w.signature);
    score += flag(inputs.witness_count > 0, w.witness);
    score += flag(inputs.notarized, w.notarized);

    score += flag(inputs.attachment_mentioned, w.attachment_mention);
    if !inputs.attachment_requirements.is_empty() {
        let n = inputs.attachment_requirements.len() as f64;
        score += (w.attachment_base + w.attachment_per_pattern * n).min(w.attachment_cap);
    }

    if inputs.interactive_logic {
        score += w.interactive_logic;
        score += flag(inputs.radio_groups >= BRANCHING_RADIO_GROUPS, w.branching_logic);
    }

    let roles: BTreeSet<&String> = inputs.roles_required.iter().collect();
    score += (roles.len() as f64 * w.points_per_role).min(w.role_cap);

    score += tier_points(&w.third_party_tiers, inputs.third_parties.len() as f64);
    score += flag(
        inputs.third_parties.iter().any(|r| needs_coordination(r)),
        w.coordination,
    );

    score += inputs.pii.iter().map(|kind| w.pii.weight(*kind)).sum::<f64>();

    if inputs.radio_groups > 0 {
        let groups = inputs.radio_groups as f64;
        score += (w.radio_base + w.points_per_radio_group * groups).min(w.radio_cap);
    }

    score += tier_points(&w.drawing_tiers, inputs.drawings_per_page);
    score += tier_points(&w.image_tiers, inputs.images_per_page);
    score += flag(inputs.xfa_like, w.dynamic_form);
    score += flag(inputs.deadline_count > 0, w.deadlines);
    score += tier_points(&w.dependency_tiers, inputs.dependency_count as f64);
    score += flag(inputs.domain_mismatch, w.domain_mismatch);

    score.trunc().clamp(0.0, MAX_SCORE) as u8
}

/// Recompute both scores of a stored report, returning `(nigo, complexity)`
pub fn rescore(report: &FormReport, weights: &ScoringWeights) -> (u8, u8) {
    (
        nigo_score(&report.findings, &report.pii_fields, weights),
        complexity_score(&ComplexityInputs::from(report), weights),
    )
}
