//! Brand registry and issuing-entity resolution

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::host_of;
use crate::error::EngineError;

pub const UNKNOWN_ENTITY: &str = "Unknown Entity";

/// One issuing organization and the domains it publishes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub name: String,
    pub domains: Vec<String>,
    /// Short names that identify the brand in hosts and text
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub government: bool,
}

impl Brand {
    fn new(name: &str, domains: &[&str], aliases: &[&str], government: bool) -> Self {
        Self {
            name: name.to_string(),
            domains: domains.iter().map(|d| d.to_string()).collect(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            government,
        }
    }

    /// Lowercased terms searched for in body text and metadata
    pub fn text_terms(&self) -> Vec<String> {
        let mut terms = vec![self.name.to_lowercase()];
        terms.extend(self.aliases.iter().map(|a| a.to_lowercase()));
        terms
    }

    /// Terms searched for inside a URL host
    fn host_terms(&self) -> impl Iterator<Item = String> + '_ {
        self.domains
            .iter()
            .chain(self.aliases.iter())
            .map(|t| t.to_lowercase())
    }

    pub fn owns_domain(&self, domain: &str) -> bool {
        self.domains.iter().any(|d| d.eq_ignore_ascii_case(domain))
    }
}

/// Ordered brand table; earlier brands win ties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandRegistry {
    pub brands: Vec<Brand>,
}

impl BrandRegistry {
    pub fn new(brands: Vec<Brand>) -> Self {
        let brands = brands
            .into_iter()
            .map(|mut b| {
                b.domains = b.domains.iter().map(|d| d.trim().to_lowercase()).collect();
                b
            })
            .collect();
        Self { brands }
    }

    /// Parse a `[[brands]]` TOML document
    pub fn from_toml_str(s: &str) -> Result<Self, EngineError> {
        let parsed: BrandRegistry = toml::from_str(s)?;
        if parsed.brands.is_empty() {
            return Err(EngineError::Config("brand registry has no brands".to_string()));
        }
        Ok(Self::new(parsed.brands))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load `path`, or the built-in table if it is absent or unreadable
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::from_file(path) {
            Ok(registry) => {
                debug!(path = %path.display(), brands = registry.brands.len(), "Loaded brand registry");
                registry
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Brand registry load failed, using built-in table");
                Self::default()
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Brand> {
        self.brands.iter().find(|b| b.name == name)
    }

    /// Reverse index: brand owning `domain`
    pub fn brand_for_domain(&self, domain: &str) -> Option<&Brand> {
        self.brands.iter().find(|b| b.owns_domain(domain))
    }

    /// First brand whose domains or aliases occur in `host`
    pub fn brand_in_host(&self, host: &str) -> Option<&Brand> {
        if host.is_empty() {
            return None;
        }
        let host = host.to_lowercase();
        self.brands
            .iter()
            .find(|b| b.host_terms().any(|t| !t.is_empty() && host.contains(&t)))
    }

    /// Brands mentioned as whole words in lowercased text, registry order
    pub fn brands_in_text<'a>(&'a self, text: &str) -> Vec<&'a Brand> {
        let text = text.to_lowercase();
        self.brands
            .iter()
            .filter(|b| b.text_terms().iter().any(|t| contains_word(&text, t)))
            .collect()
    }
}

impl Default for BrandRegistry {
    fn default() -> Self {
        Self::new(vec![
            Brand::new("Fidelity Investments", &["fidelity.com", "fmr.com"], &["fidelity"], false),
            Brand::new("Charles Schwab", &["schwab.com", "schwabcdn.com"], &["schwab"], false),
            Brand::new("Vanguard", &["vanguard.com"], &["vanguard"], false),
            Brand::new(
                "JPMorgan Chase",
                &["chase.com", "jpmorganchase.com", "jpmorgan.com"],
                &["chase", "jpmorgan"],
                false,
            ),
            Brand::new("TD Ameritrade", &["tdameritrade.com"], &["tdameritrade"], false),
            Brand::new("Morgan Stanley", &["morganstanley.com"], &["morganstanley"], false),
            Brand::new(
                "Bank of America",
                &["bankofamerica.com", "bofa.com"],
                &["bofa", "bankofamerica"],
                false,
            ),
            Brand::new("Wells Fargo", &["wellsfargo.com"], &["wellsfargo"], false),
            Brand::new("U.S. Bank", &["usbank.com"], &["usbank"], false),
            Brand::new("PNC", &["pnc.com"], &["pnc"], false),
            Brand::new("Cigna", &["cigna.com"], &["cigna"], false),
            Brand::new("Aetna", &["aetna.com"], &["aetna"], false),
            Brand::new("UnitedHealthcare", &["uhc.com", "optum.com"], &["uhc"], false),
            Brand::new("GSA", &["gsa.gov"], &["gsa.gov"], true),
            Brand::new("USCIS", &["uscis.gov"], &["uscis.gov"], true),
            Brand::new("IRS", &["irs.gov", "treasury.gov"], &["irs.gov"], true),
            Brand::new("SSA", &["ssa.gov"], &["ssa.gov"], true),
        ])
    }
}

/// `needle` occurs in `haystack` bounded by non-alphanumeric characters
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let bounded = |c: Option<char>| c.map_or(true, |c| !c.is_alphanumeric());
    haystack.match_indices(needle).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        bounded(before) && bounded(after)
    })
}

/// Resolve the issuing entity: URL host first, then brand mentions in text
pub fn resolve_issuer(source: &str, normalized_text: &str, registry: &BrandRegistry) -> String {
    let host = host_of(source);
    if let Some(brand) = registry.brand_in_host(&host) {
        debug!(issuer = %brand.name, host = %host, "Issuer resolved from host");
        return brand.name.clone();
    }
    if let Some(brand) = registry.brands_in_text(normalized_text).first() {
        debug!(issuer = %brand.name, "Issuer resolved from text");
        return brand.name.clone();
    }
    UNKNOWN_ENTITY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_word_respects_boundaries() {
        assert!(contains_word("mail to chase bank", "chase"));
        assert!(!contains_word("proof of purchase", "chase"));
        assert!(contains_word("see irs.gov for details", "irs.gov"));
        assert!(!contains_word("anything", ""));
    }

    #[test]
    fn test_resolve_from_host_then_text() {
        let registry = BrandRegistry::default();
        assert_eq!(
            resolve_issuer("https://www.fidelity.com/forms/ira.pdf", "", &registry),
            "Fidelity Investments"
        );
        assert_eq!(
            resolve_issuer("local/form.pdf", "return this form to vanguard", &registry),
            "Vanguard"
        );
        assert_eq!(
            resolve_issuer("local/form.pdf", "proof of purchase", &registry),
            UNKNOWN_ENTITY
        );
    }

    #[test]
    fn test_registry_from_toml() {
        let toml = r#"
            [[brands]]
            name = "Acme Credit Union"
            domains = ["AcmeCU.org"]
            aliases = ["acme cu"]

            [[brands]]
            name = "State Revenue Department"
            domains = ["revenue.example.gov"]
            government = true
        "#;
        let registry = BrandRegistry::from_toml_str(toml).unwrap();
        assert_eq!(registry.brands.len(), 2);
        assert_eq!(registry.brands[0].domains, vec!["acmecu.org".to_string()]);
        assert!(registry.brands[1].government);
        assert_eq!(
            registry.brand_for_domain("acmecu.org").map(|b| b.name.as_str()),
            Some("Acme Credit Union")
        );
    }

    #[test]
    fn test_empty_registry_is_rejected() {
        assert!(BrandRegistry::from_toml_str("brands = []").is_err());
        assert!(BrandRegistry::from_toml_str("not toml [").is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_builtin() {
        let registry = BrandRegistry::load_or_default(Some(Path::new("/nonexistent/brands.toml")));
        assert_eq!(registry, BrandRegistry::default());
    }
}
