use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::access::WidgetKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }
}

/// Semantic class of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldClass {
    Ssn,
    Tin,
    Ein,
    Dob,
    Date,
    Phone,
    Email,
    Zip,
    State,
    Routing,
    Account,
    Amount,
    Signature,
    Notary,
    Witness,
    Text,
}

impl FieldClass {
    pub const ALL: [FieldClass; 16] = [
        FieldClass::Ssn,
        FieldClass::Tin,
        FieldClass::Ein,
        FieldClass::Dob,
        FieldClass::Date,
        FieldClass::Phone,
        FieldClass::Email,
        FieldClass::Zip,
        FieldClass::State,
        FieldClass::Routing,
        FieldClass::Account,
        FieldClass::Amount,
        FieldClass::Signature,
        FieldClass::Notary,
        FieldClass::Witness,
        FieldClass::Text,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldClass::Ssn => "ssn",
            FieldClass::Tin => "tin",
            FieldClass::Ein => "ein",
            FieldClass::Dob => "dob",
            FieldClass::Date => "date",
            FieldClass::Phone => "phone",
            FieldClass::Email => "email",
            FieldClass::Zip => "zip",
            FieldClass::State => "state",
            FieldClass::Routing => "routing",
            FieldClass::Account => "account",
            FieldClass::Amount => "amount",
            FieldClass::Signature => "signature",
            FieldClass::Notary => "notary",
            FieldClass::Witness => "witness",
            FieldClass::Text => "text",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }

    /// Classes whose errors most often cause a rejected submission
    pub fn is_high_risk(&self) -> bool {
        matches!(
            self,
            FieldClass::Ssn
                | FieldClass::Dob
                | FieldClass::Routing
                | FieldClass::Account
                | FieldClass::Email
                | FieldClass::Phone
                | FieldClass::Zip
                | FieldClass::State
                | FieldClass::Tin
                | FieldClass::Ein
        )
    }
}

/// A classified interactive field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub alt_label: String,
    pub nearby_label_text: String,
    pub inferred_class: FieldClass,
    pub kind: WidgetKind,
    pub is_required: bool,
    pub has_validation_actions: bool,
    /// 1-indexed page number
    pub page_index: usize,
}

impl Field {
    /// Name shown in findings
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.alt_label.is_empty() {
            &self.alt_label
        } else {
            "(unnamed)"
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCounts {
    pub total: usize,
    pub text_fields: usize,
    pub checkboxes: usize,
    pub dropdowns: usize,
    pub signatures: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureProfile {
    pub widget_signature_count: usize,
    pub digital_signature_count: usize,
    pub layout_estimated_count: usize,
    pub witness_count: usize,
    pub notarized: bool,
    pub conditional_signature_count: usize,
}

impl SignatureProfile {
    /// Signatures from all evidence channels
    pub fn signature_count(&self) -> usize {
        self.widget_signature_count + self.digital_signature_count + self.layout_estimated_count
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuer {
    pub name: String,
    pub domains: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainTrust {
    pub host: String,
    pub host_root: String,
    pub issuer_guess: String,
    pub matched_domains: Vec<String>,
    pub brand_text_hits: Vec<String>,
    pub brand_meta_hits: Vec<String>,
    pub confidence: u8,
    pub mismatch: bool,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFinding {
    pub rule_id: String,
    pub severity: Severity,
    pub page: Option<usize>,
    pub field_name: String,
    pub field_class: String,
    pub message: String,
    pub evidence_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyRelation {
    With,
    Before,
    After,
    See,
}

impl DependencyRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyRelation::With => "with",
            DependencyRelation::Before => "before",
            DependencyRelation::After => "after",
            DependencyRelation::See => "see",
        }
    }
}

/// A reference from this form to another required form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub relation: DependencyRelation,
    pub hint: String,
    pub form_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiKind {
    Ssn,
    Dob,
    Tin,
    Ein,
    DriversLicense,
    Account,
    Address,
    Phone,
    Email,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThirdPartyReport {
    pub roles: Vec<String>,
    pub evidence: Vec<String>,
}

/// Per-page averages over the whole document
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphicsStats {
    pub images_per_page: f64,
    pub drawings_per_page: f64,
    pub text_density: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryClass {
    pub industry: String,
    pub subvertical: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub form_title: String,
    pub entity_name: String,
    pub page_count: usize,
    pub metadata: BTreeMap<String, String>,
    pub backend: String,
    pub industry: Option<IndustryClass>,
}

/// Everything the pipeline derives from one successfully decoded document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormReport {
    pub document: DocumentSummary,
    pub field_counts: FieldCounts,
    pub fields: Vec<Field>,
    pub radio_groups: usize,
    pub attachment_count: usize,
    pub attachment_requirements: Vec<String>,
    pub attachment_mentioned: bool,
    pub interactive_logic: bool,
    pub multistep_logic_hint: bool,
    pub signatures: SignatureProfile,
    pub roles_required: Vec<String>,
    pub third_party: ThirdPartyReport,
    pub pii_fields: BTreeSet<PiiKind>,
    pub graphics: GraphicsStats,
    pub xfa_like: bool,
    pub dependencies: Vec<Dependency>,
    pub deadlines: Vec<String>,
    pub issuer: Issuer,
    pub domain_trust: DomainTrust,
    pub findings: Vec<RiskFinding>,
    pub nigo_score: u8,
    pub complexity_score: u8,
    /// Version of the weight table the scores were computed with
    pub weights_version: String,
    pub special_requirements: Vec<String>,
    /// One-line human summary
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Success,
    Error,
}

/// Result of one analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_id: String,
    pub source: String,
    /// Informational only, never part of scoring
    pub timestamp: String,
    pub status: AnalysisStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<FormReport>,
}

impl AnalysisResult {
    pub fn success(
        analysis_id: String,
        source: String,
        timestamp: String,
        report: FormReport,
    ) -> Self {
        Self {
            analysis_id,
            source,
            timestamp,
            status: AnalysisStatus::Success,
            error: None,
            report: Some(report),
        }
    }

    /// Terminal result for a document that could not be decoded
    pub fn failed(analysis_id: String, source: String, timestamp: String, message: String) -> Self {
        Self {
            analysis_id,
            source,
            timestamp,
            status: AnalysisStatus::Error,
            error: Some(message),
            report: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AnalysisStatus::Success
    }

    pub fn nigo_score(&self) -> Option<u8> {
        self.report.as_ref().map(|r| r.nigo_score)
    }

    pub fn complexity_score(&self) -> Option<u8> {
        self.report.as_ref().map(|r| r.complexity_score)
    }
}
