//! NIGO and complexity analysis for fillable PDF forms
//!
//! [`NigoEngine::analyze`] runs every detector over one document and
//! returns a scored [`AnalysisResult`]. Only a document that cannot be
//! decoded at all produces an error result; every other missing fact
//! degrades to its fallback.

pub mod detectors;
pub mod domain;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod fields;
pub mod industry;
pub mod patterns;
pub mod report;
pub mod roles;
pub mod rules;
pub mod scoring;
pub mod signatures;
pub mod weights;

use std::collections::BTreeSet;

use chrono::Utc;
use shared_types::{
    normalize_for_rules, AccessError, AnalysisResult, DocumentAccess, DocumentSummary,
    FormReport, Issuer,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub use entity::{Brand, BrandRegistry};
pub use error::{EngineError, RuleError};
pub use weights::ScoringWeights;

/// Analyzer entry point; holds the weight table scores are computed with
pub struct NigoEngine {
    weights: ScoringWeights,
}

impl NigoEngine {
    pub fn new() -> Self {
        Self::with_weights(ScoringWeights::default())
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Analyze one document against `registry`
    pub fn analyze(&self, access: &dyn DocumentAccess, registry: &BrandRegistry) -> AnalysisResult {
        let analysis_id = Uuid::new_v4().to_string();
        let source = access.source_locator().to_string();
        let timestamp = Utc::now().to_rfc3339();

        match self.build_report(access, registry) {
            Ok(report) => {
                info!(
                    source = %source,
                    backend = access.backend_name(),
                    nigo = report.nigo_score,
                    complexity = report.complexity_score,
                    findings = report.findings.len(),
                    "Analysis complete"
                );
                AnalysisResult::success(analysis_id, source, timestamp, report)
            }
            Err(e) => {
                warn!(source = %source, error = %e, "Analysis failed");
                AnalysisResult::failed(analysis_id, source, timestamp, e.to_string())
            }
        }
    }

    fn build_report(
        &self,
        access: &dyn DocumentAccess,
        registry: &BrandRegistry,
    ) -> Result<FormReport, EngineError> {
        let source = access.source_locator();
        let page_count = access.page_count()?;

        let raw_text = match access.raw_text() {
            Ok(text) => text,
            Err(AccessError::Decode(msg)) => return Err(EngineError::Decode(msg)),
            Err(e) => {
                warn!(source = %source, error = %e, "Text unavailable, continuing without it");
                String::new()
            }
        };
        let normalized = access
            .normalized_raw_text()
            .unwrap_or_else(|_| normalize_for_rules(&raw_text));
        let metadata = access.metadata().unwrap_or_else(|e| {
            warn!(source = %source, error = %e, "Metadata unavailable");
            Default::default()
        });
        let widgets = access.widgets().unwrap_or_else(|e| {
            debug!(source = %source, error = %e, "Widgets unavailable");
            Vec::new()
        });

        let fields = fields::build_fields(access, &widgets);
        let field_counts = fields::count_fields(&widgets);
        let signatures =
            signatures::SignatureAnalyzer::new().analyze(access, &widgets, page_count, &normalized);

        let entity_name = entity::resolve_issuer(source, &normalized, registry);
        let domain_trust =
            domain::evaluate_domain_trust(source, &entity_name, &normalized, &metadata, registry);
        let issuer = Issuer {
            name: domain_trust.issuer_guess.clone(),
            domains: registry
                .get(&domain_trust.issuer_guess)
                .map(|b| b.domains.iter().cloned().collect())
                .unwrap_or_else(BTreeSet::new),
        };

        let (roles_required, roles_missing) =
            roles::resolve_roles(&normalized, signatures.signature_count());
        let third_party = roles::detect_third_parties(&normalized);
        let dependencies = extractors::extract_dependencies(&normalized);
        let deadlines = extractors::extract_deadlines(&raw_text);

        let radio_groups = detectors::count_radio_groups(&widgets);
        let interactive_logic = detectors::detect_interactive_logic(access, &widgets, page_count);
        let attachment_count = access.embedded_file_count().unwrap_or_else(|e| {
            debug!(source = %source, error = %e, "Embedded files unavailable");
            0
        });

        let mut findings = rules::RiskRuleEngine::new().evaluate(access, &fields);
        if roles_missing {
            findings.push(rules::missing_role_finding(signatures.signature_count()));
        }
        if !third_party.roles.is_empty() {
            findings.push(rules::third_party_finding(&third_party.roles));
        }

        let document = DocumentSummary {
            form_title: report::form_title(&metadata, &raw_text, source),
            entity_name,
            page_count,
            industry: industry::classify_industry(&domain_trust.host, &normalized),
            backend: access.backend_name().to_string(),
            metadata,
        };

        let report = FormReport {
            field_counts,
            fields,
            radio_groups,
            attachment_count,
            attachment_requirements: detectors::detect_attachment_requirements(&normalized),
            attachment_mentioned: normalized.contains("attach"),
            interactive_logic,
            multistep_logic_hint: interactive_logic && radio_groups >= 2,
            signatures,
            roles_required,
            third_party,
            pii_fields: detectors::detect_pii(&normalized),
            graphics: detectors::graphics_stats(access, page_count),
            xfa_like: detectors::detect_xfa_hint(&normalized, &document.metadata),
            dependencies,
            deadlines,
            issuer,
            domain_trust,
            findings,
            nigo_score: 0,
            complexity_score: 0,
            weights_version: String::new(),
            special_requirements: Vec::new(),
            summary: String::new(),
            document,
        };
        Ok(report::assemble(report, &self.weights))
    }
}

impl Default for NigoEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal error result for a document that never reached the analyzer
pub fn failed_result(source: &str, message: impl Into<String>) -> AnalysisResult {
    AnalysisResult::failed(
        Uuid::new_v4().to_string(),
        source.to_string(),
        Utc::now().to_rfc3339(),
        message.into(),
    )
}

/// Analyze one document with the shipped weight table
pub fn analyze(access: &dyn DocumentAccess, registry: &BrandRegistry) -> AnalysisResult {
    NigoEngine::new().analyze(access, registry)
}
