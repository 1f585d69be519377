//! Hosting-domain trust against the resolved issuer

use std::collections::BTreeMap;

use shared_types::DomainTrust;
use tracing::debug;

use crate::entity::{BrandRegistry, UNKNOWN_ENTITY};

/// Public suffixes with more than one label that the naive root would split
const MULTI_LABEL_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "com.au", "net.au", "org.au", "gov.au", "co.jp",
    "co.nz", "com.br", "co.in",
];

/// Edge and blob hosts that serve files for arbitrary tenants
const CDN_PATTERNS: &[&str] = &[
    "blob.core.windows.net",
    "azureedge.net",
    "cloudfront.net",
    "akamai",
    "fastly",
    "cdn.",
];

const EXACT_HOST_POINTS: i32 = 60;
const ROOT_MATCH_POINTS: i32 = 25;
const BRAND_TEXT_POINTS: i32 = 15;
const BRAND_META_POINTS: i32 = 10;
const CDN_PENALTY: i32 = 15;
const GOVERNMENT_BASE: i32 = 55;
const GOVERNMENT_OFF_TLD_POINTS: i32 = 10;
const MISMATCH_THRESHOLD: i32 = 55;
const REGISTERED_ROOT_FLOOR: u8 = 75;

/// Lowercased host of a URL; empty for local paths
pub fn host_of(locator: &str) -> String {
    let Some((scheme, rest)) = locator.split_once("://") else {
        return String::new();
    };
    if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+') {
        return String::new();
    }
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host_port = authority.rsplit('@').next().unwrap_or("");
    let host = match host_port.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => host_port,
    };
    host.trim_end_matches('.').to_lowercase()
}

/// Registrable root (eTLD+1) of a host
pub fn registrable_root(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() < 2 {
        return host.to_string();
    }
    let last_two = labels[labels.len() - 2..].join(".");
    if labels.len() >= 3 && MULTI_LABEL_SUFFIXES.contains(&last_two.as_str()) {
        return labels[labels.len() - 3..].join(".");
    }
    last_two
}

/// `host` is `domain` itself or one of its subdomains
fn host_within(host: &str, domain: &str) -> bool {
    !host.is_empty()
        && (host == domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.')))
}

fn is_government_host(host: &str) -> bool {
    host.split('.').any(|label| label == "gov" || label == "mil")
}

fn is_cdn_host(host: &str) -> bool {
    CDN_PATTERNS.iter().any(|p| host.contains(p))
}

/// Score how well the hosting domain fits the issuer.
///
/// An unresolved `issuer_guess` is retried against body text, metadata
/// values and finally the reverse domain index.
pub fn evaluate_domain_trust(
    source: &str,
    issuer_guess: &str,
    normalized_text: &str,
    metadata: &BTreeMap<String, String>,
    registry: &BrandRegistry,
) -> DomainTrust {
    let host = host_of(source);
    let host_root = registrable_root(&host);

    let guess = issuer_guess.trim();
    let mut issuer = (!guess.is_empty() && guess != UNKNOWN_ENTITY)
        .then(|| guess.to_string());

    let mut brand_text_hits = Vec::new();
    if issuer.is_none() {
        if let Some(brand) = registry.brands_in_text(normalized_text).first() {
            brand_text_hits.push(brand.name.clone());
            issuer = Some(brand.name.clone());
        }
    }

    let mut brand_meta_hits = Vec::new();
    for (key, value) in metadata {
        for brand in registry.brands_in_text(value) {
            brand_meta_hits.push(format!("{}@{}", brand.name, key));
            if issuer.is_none() {
                issuer = Some(brand.name.clone());
            }
        }
    }

    let reverse = registry.brand_for_domain(&host_root);
    if issuer.is_none() {
        issuer = reverse.map(|b| b.name.clone());
    }

    let brand = issuer.as_deref().and_then(|name| registry.get(name));
    let issuer_domains: Vec<&str> = brand
        .map(|b| b.domains.iter().map(String::as_str).collect())
        .unwrap_or_default();
    let government = brand.is_some_and(|b| b.government);

    let exact: Vec<&str> = issuer_domains
        .iter()
        .copied()
        .filter(|d| host_within(&host, d))
        .collect();
    let root_match = !host_root.is_empty() && issuer_domains.contains(&host_root.as_str());

    let mut matched_domains: Vec<String> = exact.iter().map(|d| d.to_string()).collect();
    if root_match && !matched_domains.contains(&host_root) {
        matched_domains.push(host_root.clone());
    }

    let mut confidence: i32 = 0;
    if !exact.is_empty() {
        confidence += EXACT_HOST_POINTS;
    }
    if root_match && exact.is_empty() {
        confidence += ROOT_MATCH_POINTS;
    }
    if !brand_text_hits.is_empty() {
        confidence += BRAND_TEXT_POINTS;
    }
    if !brand_meta_hits.is_empty() {
        confidence += BRAND_META_POINTS;
    }
    if is_cdn_host(&host) {
        confidence -= CDN_PENALTY;
    }
    let government_off_tld = government && !host.is_empty() && !is_government_host(&host);
    if government_off_tld {
        confidence = confidence.max(GOVERNMENT_BASE) + GOVERNMENT_OFF_TLD_POINTS;
    }
    let mut confidence = confidence.clamp(0, 100) as u8;

    let mut mismatch = false;
    let mut reason = "OK";
    if i32::from(confidence) >= MISMATCH_THRESHOLD {
        if matched_domains.is_empty() {
            mismatch = true;
            reason = "Host does not match issuer domains.";
        }
        if government_off_tld {
            mismatch = true;
            reason = "Government issuer on non-government host.";
        }
    }

    let issuer_name = issuer.unwrap_or_else(|| UNKNOWN_ENTITY.to_string());
    if reverse.is_some_and(|b| b.name == issuer_name) {
        mismatch = false;
        reason = "Host root aligns with issuer.";
        confidence = confidence.max(REGISTERED_ROOT_FLOOR);
    }

    debug!(
        host = %host,
        issuer = %issuer_name,
        confidence,
        mismatch,
        "Domain trust evaluated"
    );

    DomainTrust {
        host,
        host_root,
        issuer_guess: issuer_name,
        matched_domains,
        brand_text_hits,
        brand_meta_hits,
        confidence,
        mismatch,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_meta() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[test]
    fn test_host_parsing() {
        assert_eq!(host_of("https://User@Forms.Fidelity.com:8443/a.pdf"), "forms.fidelity.com");
        assert_eq!(host_of("http://example.com?x=1"), "example.com");
        assert_eq!(host_of("/tmp/forms/a.pdf"), "");
        assert_eq!(host_of("file.pdf"), "");
    }

    #[test]
    fn test_registrable_root() {
        assert_eq!(registrable_root("forms.fidelity.com"), "fidelity.com");
        assert_eq!(registrable_root("secure.bank.co.uk"), "bank.co.uk");
        assert_eq!(registrable_root("co.uk"), "co.uk");
        assert_eq!(registrable_root("localhost"), "localhost");
        assert_eq!(registrable_root(""), "");
    }

    #[test]
    fn test_government_issuer_off_tld() {
        let trust = evaluate_domain_trust(
            "https://formsportal.example.com/ss-5.pdf",
            "SSA",
            "",
            &no_meta(),
            &BrandRegistry::default(),
        );
        assert!(trust.mismatch);
        assert!(trust.confidence >= 65);
        assert_eq!(trust.reason, "Government issuer on non-government host.");
    }

    #[test]
    fn test_exact_host_match() {
        let trust = evaluate_domain_trust(
            "https://www.schwab.com/forms/transfer.pdf",
            "Charles Schwab",
            "",
            &no_meta(),
            &BrandRegistry::default(),
        );
        assert!(!trust.mismatch);
        assert_eq!(trust.matched_domains, vec!["schwab.com".to_string()]);
        assert_eq!(trust.reason, "Host root aligns with issuer.");
        assert_eq!(trust.confidence, 75);
    }

    #[test]
    fn test_subdomain_matching_is_label_aligned() {
        assert!(host_within("forms.fidelity.com", "fidelity.com"));
        assert!(host_within("fidelity.com", "fidelity.com"));
        assert!(!host_within("notfidelity.com", "fidelity.com"));
        assert!(!host_within("", "fidelity.com"));
    }

    #[test]
    fn test_registered_root_overrides_cdn_penalty() {
        let trust = evaluate_domain_trust(
            "https://cdn.vanguard.com/docs/form.pdf",
            "Unknown Entity",
            "",
            &no_meta(),
            &BrandRegistry::default(),
        );
        assert_eq!(trust.issuer_guess, "Vanguard");
        assert!(!trust.mismatch);
        assert!(trust.confidence >= 75);
    }

    #[test]
    fn test_text_and_metadata_hits_on_foreign_host() {
        let mut meta = BTreeMap::new();
        meta.insert("author".to_string(), "Fidelity Investments".to_string());
        meta.insert("producer".to_string(), "Acrobat".to_string());
        let trust = evaluate_domain_trust(
            "https://files.example.net/ira.pdf",
            UNKNOWN_ENTITY,
            "fidelity investments ira application",
            &meta,
            &BrandRegistry::default(),
        );
        assert_eq!(trust.issuer_guess, "Fidelity Investments");
        assert_eq!(trust.brand_text_hits, vec!["Fidelity Investments".to_string()]);
        assert_eq!(trust.brand_meta_hits, vec!["Fidelity Investments@author".to_string()]);
        assert_eq!(trust.confidence, 25);
        assert!(!trust.mismatch);
    }

    #[test]
    fn test_local_path_is_neutral() {
        let trust = evaluate_domain_trust(
            "forms/w9.pdf",
            "IRS",
            "",
            &no_meta(),
            &BrandRegistry::default(),
        );
        assert_eq!(trust.host, "");
        assert_eq!(trust.confidence, 0);
        assert!(!trust.mismatch);
        assert_eq!(trust.reason, "OK");
    }
}
