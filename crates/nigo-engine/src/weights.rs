//! Versioned weight table for both composite scores
//!
//! The defaults are the shipped calibration. A TOML file may override any
//! subset of values; everything it leaves out keeps its default.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shared_types::{PiiKind, Severity};
use tracing::{debug, warn};

use crate::error::EngineError;

pub const DEFAULT_WEIGHTS_VERSION: &str = "2025.09";

/// Points awarded once a measured value reaches `at_least`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub at_least: f64,
    pub points: f64,
}

impl Tier {
    const fn new(at_least: f64, points: f64) -> Self {
        Self { at_least, points }
    }
}

/// Points of the highest tier reached by `value`, or zero
pub fn tier_points(tiers: &[Tier], value: f64) -> f64 {
    tiers
        .iter()
        .filter(|t| value >= t.at_least)
        .map(|t| t.points)
        .fold(0.0, f64::max)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityWeights {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub info: u32,
}

impl SeverityWeights {
    pub fn weight(&self, severity: Severity) -> u32 {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
        }
    }
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            high: 20,
            medium: 12,
            low: 6,
            info: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NigoWeights {
    pub severity: SeverityWeights,
    /// Extra points per rule id; unknown ids add nothing
    pub rules: BTreeMap<String, u32>,
    /// Added per finding on a high-risk field class
    pub high_risk_field: u32,
    /// Added once when PII is collected and a REQ/FMT finding hits a high-risk field
    pub pii_exposure: u32,
}

impl NigoWeights {
    pub fn rule_weight(&self, rule_id: &str) -> u32 {
        self.rules.get(rule_id).copied().unwrap_or(0)
    }
}

impl Default for NigoWeights {
    fn default() -> Self {
        let rules = [
            ("REQ-001", 5),
            ("FMT-001", 8),
            ("SIG-002", 4),
            ("COND-003", 6),
            ("ROLE-001", 6),
            ("THRD-001", 6),
        ]
        .into_iter()
        .map(|(id, w)| (id.to_string(), w))
        .collect();
        Self {
            severity: SeverityWeights::default(),
            rules,
            high_risk_field: 5,
            pii_exposure: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PiiWeights {
    pub ssn: f64,
    pub dob: f64,
    pub tin: f64,
    pub ein: f64,
    pub drivers_license: f64,
    pub account: f64,
    pub address: f64,
    pub phone: f64,
    pub email: f64,
}

impl PiiWeights {
    pub fn weight(&self, kind: PiiKind) -> f64 {
        match kind {
            PiiKind::Ssn => self.ssn,
            PiiKind::Dob => self.dob,
            PiiKind::Tin => self.tin,
            PiiKind::Ein => self.ein,
            PiiKind::DriversLicense => self.drivers_license,
            PiiKind::Account => self.account,
            PiiKind::Address => self.address,
            PiiKind::Phone => self.phone,
            PiiKind::Email => self.email,
        }
    }
}

impl Default for PiiWeights {
    fn default() -> Self {
        Self {
            ssn: 3.0,
            dob: 2.0,
            tin: 2.0,
            ein: 2.0,
            drivers_license: 0.0,
            account: 3.0,
            address: 1.0,
            phone: 1.0,
            email: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityWeights {
    pub points_per_page: f64,
    pub page_cap: f64,
    pub points_per_field: f64,
    pub field_cap: f64,
    pub signature: f64,
    pub witness: f64,
    pub notarized: f64,
    /// Text mentions attaching anything at all
    pub attachment_mention: f64,
    pub attachment_base: f64,
    pub attachment_per_pattern: f64,
    pub attachment_cap: f64,
    pub interactive_logic: f64,
    /// Added to interactive logic when there are at least two radio groups
    pub branching_logic: f64,
    pub points_per_role: f64,
    pub role_cap: f64,
    pub third_party_tiers: Vec<Tier>,
    /// Physician, attorney or financial advisor involved
    pub coordination: f64,
    pub pii: PiiWeights,
    pub radio_base: f64,
    pub points_per_radio_group: f64,
    pub radio_cap: f64,
    pub drawing_tiers: Vec<Tier>,
    pub image_tiers: Vec<Tier>,
    pub dynamic_form: f64,
    pub deadlines: f64,
    pub dependency_tiers: Vec<Tier>,
    pub domain_mismatch: f64,
}

impl Default for ComplexityWeights {
    fn default() -> Self {
        Self {
            points_per_page: 2.0,
            page_cap: 10.0,
            points_per_field: 0.3,
            field_cap: 15.0,
            signature: 4.0,
            witness: 10.0,
            notarized: 12.0,
            attachment_mention: 3.0,
            attachment_base: 2.0,
            attachment_per_pattern: 2.0,
            attachment_cap: 8.0,
            interactive_logic: 4.0,
            branching_logic: 3.0,
            points_per_role: 3.0,
            role_cap: 18.0,
            third_party_tiers: vec![Tier::new(1.0, 4.0), Tier::new(2.0, 8.0), Tier::new(3.0, 12.0)],
            coordination: 4.0,
            pii: PiiWeights::default(),
            radio_base: 2.0,
            points_per_radio_group: 1.0,
            radio_cap: 6.0,
            drawing_tiers: vec![Tier::new(5.0, 1.0), Tier::new(15.0, 3.0), Tier::new(30.0, 4.0)],
            image_tiers: vec![Tier::new(1.0, 1.0), Tier::new(2.0, 3.0)],
            dynamic_form: 4.0,
            deadlines: 2.0,
            dependency_tiers: vec![Tier::new(1.0, 1.0), Tier::new(2.0, 3.0)],
            domain_mismatch: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Echoed into every report so stored scores trace back to their table
    pub version: String,
    pub nigo: NigoWeights,
    pub complexity: ComplexityWeights,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            version: DEFAULT_WEIGHTS_VERSION.to_string(),
            nigo: NigoWeights::default(),
            complexity: ComplexityWeights::default(),
        }
    }
}

impl ScoringWeights {
    pub fn from_toml_str(s: &str) -> Result<Self, EngineError> {
        let weights: ScoringWeights = toml::from_str(s)?;
        if weights.version.trim().is_empty() {
            return Err(EngineError::Config("weights version is empty".to_string()));
        }
        Ok(weights)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load `path`, or the shipped table if it is absent or invalid
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::from_file(path) {
            Ok(weights) => {
                debug!(path = %path.display(), version = %weights.version, "Loaded scoring weights");
                weights
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Scoring weights load failed, using defaults");
                Self::default()
            }
        }
    }
}
