//! Industry and subvertical classification by keyword families

use shared_types::IndustryClass;

/// A subvertical and the text keywords that select it
struct Subvertical {
    name: &'static str,
    text_keywords: &'static [&'static str],
    host_keywords: &'static [&'static str],
}

/// An industry family; subverticals are tried in order, the last is the default
struct Family {
    industry: &'static str,
    keywords: &'static [&'static str],
    subverticals: &'static [Subvertical],
    default_subvertical: &'static str,
}

const FAMILIES: &[Family] = &[
    Family {
        industry: "Financial Services",
        keywords: &[
            "fidelity", "vanguard", "schwab", "ameritrade", "morgan stanley", "us bank",
            "wells fargo", "chase", "pnc", "account", "beneficiary", "ira", "401k", "brokerage",
        ],
        subverticals: &[
            Subvertical {
                name: "Wealth Management",
                text_keywords: &[
                    "custodian", "advisor", "wealth", "brokerage", "beneficiary", "ira", "roth",
                    "acat", "transfer of assets",
                ],
                host_keywords: &[],
            },
            Subvertical {
                name: "P&C Insurance",
                text_keywords: &[
                    "policy", "claim", "loss", "insured", "adjuster", "premium", "p&c",
                    "auto policy",
                ],
                host_keywords: &[],
            },
            Subvertical {
                name: "Banking",
                text_keywords: &[
                    "ach", "routing number", "wire", "checking", "savings", "loan", "mortgage",
                    "account number",
                ],
                host_keywords: &[],
            },
        ],
        default_subvertical: "Wealth Management",
    },
    Family {
        industry: "Healthcare",
        keywords: &[
            "cigna", "aetna", "unitedhealth", "uhc", "hipaa", "prior authorization", "member id",
        ],
        subverticals: &[
            Subvertical {
                name: "Payer",
                text_keywords: &[
                    "claim", "prior authorization", "eligibility", "member id", "edi 837", "payer",
                ],
                host_keywords: &[],
            },
            Subvertical {
                name: "Provider",
                text_keywords: &["provider", "npi", "superbill", "encounter", "progress note"],
                host_keywords: &[],
            },
            Subvertical {
                name: "Life Sciences",
                text_keywords: &[
                    "informed consent", "clinical trial", "irb", "sponsor", "investigational",
                ],
                host_keywords: &[],
            },
        ],
        default_subvertical: "Payer",
    },
    Family {
        industry: "Public Sector",
        keywords: &[
            ".gov", "gsa", "uscis", "irs", "ssa", "state of", "city of", "county of",
            "school district",
        ],
        subverticals: &[
            Subvertical {
                name: "Federal Government",
                text_keywords: &["federal", "gsa", ".gov", "irs", "ssa", "uscis", "va.gov", "dot.gov"],
                host_keywords: &["gsa", ".gov", "irs", "ssa", "uscis", "va.gov", "dot.gov"],
            },
            Subvertical {
                name: "Education",
                text_keywords: &["school", "university", "college", "district", "k-12", "education"],
                host_keywords: &[],
            },
            Subvertical {
                name: "State & Local",
                text_keywords: &[
                    "state of", "county", "city of", "municipal", "township", "dmv", "permit",
                    "licensure",
                ],
                host_keywords: &["wa.gov", "ca.gov", "az.gov", "ny.gov"],
            },
            Subvertical {
                name: "Not-for-Profit",
                text_keywords: &["501(c)", "nonprofit", "not-for-profit", "charitable"],
                host_keywords: &[],
            },
        ],
        default_subvertical: "State & Local",
    },
];

fn mentions(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

/// First family whose keywords appear in the host or text, with its subvertical
pub fn classify_industry(host: &str, normalized_text: &str) -> Option<IndustryClass> {
    let host = host.to_lowercase();
    let combined = format!("{host} {normalized_text}");
    let family = FAMILIES.iter().find(|f| mentions(&combined, f.keywords))?;
    let subvertical = family
        .subverticals
        .iter()
        .find(|s| mentions(normalized_text, s.text_keywords) || mentions(&host, s.host_keywords))
        .map(|s| s.name)
        .unwrap_or(family.default_subvertical);
    Some(IndustryClass {
        industry: family.industry.to_string(),
        subvertical: subvertical.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(host: &str, text: &str) -> Option<(String, String)> {
        classify_industry(host, text).map(|c| (c.industry, c.subvertical))
    }

    #[test]
    fn test_wealth_management() {
        assert_eq!(
            classify("www.fidelity.com", "roth conversion request"),
            Some(("Financial Services".into(), "Wealth Management".into()))
        );
    }

    #[test]
    fn test_banking_subvertical() {
        assert_eq!(
            classify("", "direct deposit: account number and routing number"),
            Some(("Financial Services".into(), "Banking".into()))
        );
    }

    #[test]
    fn test_healthcare_provider() {
        assert_eq!(
            classify("www.aetna.com", "provider npi and superbill"),
            Some(("Healthcare".into(), "Provider".into()))
        );
    }

    #[test]
    fn test_public_sector_from_host() {
        assert_eq!(
            classify("www.uscis.gov", "petition for relative"),
            Some(("Public Sector".into(), "Federal Government".into()))
        );
        assert_eq!(
            classify("", "city of springfield building permit"),
            Some(("Public Sector".into(), "State & Local".into()))
        );
    }

    #[test]
    fn test_unclassified() {
        assert_eq!(classify("example.org", "name and signature"), None);
    }
}
