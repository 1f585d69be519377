//! Regex tables shared by the detectors
//!
//! Every table is ordered. Detectors that pick a single result take the
//! first matching entry, so narrower patterns sit above broader ones.

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{DependencyRelation, FieldClass, PiiKind};

lazy_static! {
    pub static ref SIGNATURE_WORD: Regex = Regex::new(r"(?i)\bsignature\b").unwrap();

    pub static ref WITNESS_WORD: Regex = Regex::new(r"(?i)\bwitness\b").unwrap();

    /// Underscore run drawn as a fill-in line
    pub static ref UNDERSCORE_RUN: Regex = Regex::new(r"_{5,}").unwrap();

    pub static ref NOTARY: Regex = Regex::new(
        r"(?i)\bnotary\b|\bnotariz(ed|ation)\b|\backnowledged\b|\bsworn\b|\baffirmed\b"
    )
    .unwrap();

    /// Heuristic conditional-signature phrasing; overcounts on purpose
    pub static ref CONDITIONAL_SIGNATURE: Vec<Regex> = vec![
        Regex::new(r"if.*sign").unwrap(),
        Regex::new(r"when.*sign").unwrap(),
        Regex::new(r"unless.*sign").unwrap(),
    ];

    pub static ref DATE_WORD: Regex = Regex::new(r"(?i)\bdate\b").unwrap();

    pub static ref BENEFICIARY_WORD: Regex = Regex::new(r"(?i)\b(beneficiary|dependent)\b").unwrap();

    pub static ref FIELD_CLASSES: Vec<(FieldClass, Regex)> = vec![
        (FieldClass::Ssn, Regex::new(r"\b(ssn|social security)\b").unwrap()),
        (FieldClass::Tin, Regex::new(r"\b(tin|taxpayer)\b").unwrap()),
        (FieldClass::Ein, Regex::new(r"\b(ein|employer id(entification)?)\b").unwrap()),
        (FieldClass::Dob, Regex::new(r"\b(date of birth|dob)\b").unwrap()),
        (FieldClass::Date, Regex::new(r"\b(date)\b").unwrap()),
        (FieldClass::Phone, Regex::new(r"\b(phone|telephone|cell)\b").unwrap()),
        (FieldClass::Email, Regex::new(r"\b(e[- ]?mail)\b").unwrap()),
        (FieldClass::Zip, Regex::new(r"\b(zip|postal)\b").unwrap()),
        (FieldClass::State, Regex::new(r"\b(state|prov(ince)?)\b").unwrap()),
        (FieldClass::Routing, Regex::new(r"\b(routing|aba)\b").unwrap()),
        (FieldClass::Account, Regex::new(r"\b(account|acct)\b").unwrap()),
        (FieldClass::Amount, Regex::new(r"\b(amount|usd|\$)\b").unwrap()),
        (FieldClass::Signature, Regex::new(r"\b(signature)\b").unwrap()),
        (FieldClass::Notary, Regex::new(r"\b(notary)\b").unwrap()),
        (FieldClass::Witness, Regex::new(r"\b(witness)\b").unwrap()),
    ];

    pub static ref PII: Vec<(PiiKind, Regex)> = vec![
        (PiiKind::Ssn, Regex::new(r"(?i)\b(ssn|social security number)\b").unwrap()),
        (PiiKind::Dob, Regex::new(r"(?i)\b(date of birth|dob)\b").unwrap()),
        (PiiKind::Tin, Regex::new(r"(?i)\b(tin|taxpayer identification)\b").unwrap()),
        (PiiKind::Ein, Regex::new(r"(?i)\b(employer identification number|ein)\b").unwrap()),
        (PiiKind::DriversLicense, Regex::new(r"(?i)\b(driver'?s license|state id)\b").unwrap()),
        (PiiKind::Account, Regex::new(r"(?i)\b(account number|routing number|iban)\b").unwrap()),
        (PiiKind::Address, Regex::new(r"(?i)\b(address|street|city|state|zip)\b").unwrap()),
        (PiiKind::Phone, Regex::new(r"(?i)\b(phone|telephone|cell)\b").unwrap()),
        (PiiKind::Email, Regex::new(r"(?i)\b(email)\b").unwrap()),
    ];

    pub static ref ATTACHMENT_HINTS: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"(?i)\battach(ed)?\b").unwrap(), "attachment"),
        (
            Regex::new(r"(?i)\b(include|provide)\s+(a|an|the)?\s*(copy|document|proof)\b").unwrap(),
            "copy_or_proof",
        ),
        (Regex::new(r"(?i)\bvoided check\b").unwrap(), "voided_check"),
        (Regex::new(r"(?i)\bphoto id\b").unwrap(), "photo_id"),
        (Regex::new(r"(?i)\b(driver'?s license|passport)\b").unwrap(), "identity_document"),
        (Regex::new(r"(?i)\b(account statement|bank statement)\b").unwrap(), "account_statement"),
        (
            Regex::new(r"(?i)\bsupporting (documents|documentation)\b").unwrap(),
            "supporting_documents",
        ),
    ];

    pub static ref SIGNER_ROLES: Vec<(&'static str, Regex)> = vec![
        ("applicant", Regex::new(r"(?i)\b(applicant|borrower|member)\s+signature\b").unwrap()),
        ("co_owner", Regex::new(r"(?i)\b(co[-\s]?owner|co[-\s]?applicant)\s+signature\b").unwrap()),
        ("guardian", Regex::new(r"(?i)\b(parent|guardian)\s+signature\b").unwrap()),
        ("spouse", Regex::new(r"(?i)\b(spouse)\s+signature\b").unwrap()),
        ("officer", Regex::new(r"(?i)\b(officer|authorized signer)\s+signature\b").unwrap()),
        ("witness", Regex::new(r"(?i)\bwitness\s+signature\b").unwrap()),
        ("notary", Regex::new(r"(?i)\bnotary\s+(public|signature)\b").unwrap()),
    ];

    pub static ref THIRD_PARTIES: Vec<(&'static str, Regex)> = vec![
        ("Witness", Regex::new(r"(?i)\bwitness\b").unwrap()),
        ("Physician", Regex::new(r"(?i)\b(physician|doctor|md)\b").unwrap()),
        (
            "Financial Advisor",
            Regex::new(r"(?i)\b(financial advisor|advisor|adviser|ria|broker-dealer|broker)\b").unwrap(),
        ),
        ("Attorney", Regex::new(r"(?i)\b(attorney|lawyer|counsel|esq\.?)\b").unwrap()),
        (
            "Guardian/POA",
            Regex::new(r"(?i)\b(guardian|conservator|power of attorney|poa|agent under poa)\b").unwrap(),
        ),
        (
            "Employer/HR",
            Regex::new(r"(?i)\b(employer|human resources|hr department|hr rep|supervisor)\b").unwrap(),
        ),
        ("Court/Clerk", Regex::new(r"(?i)\b(court clerk|clerk of court|court)\b").unwrap()),
    ];

    pub static ref DEPENDENCIES: Vec<(DependencyRelation, Regex)> = vec![
        (
            DependencyRelation::With,
            Regex::new(r"(?is)\b(submit|send|file|include)\s+(this\s+)?form\s+(with|along with)\s+(form\s+)?([a-z0-9\-_/\.]+)").unwrap(),
        ),
        (
            DependencyRelation::With,
            Regex::new(r"(?is)\b(accompany|in conjunction with|together with|in addition to)\s+(form\s+)?([a-z0-9\-_/\.]+)").unwrap(),
        ),
        (
            DependencyRelation::Before,
            Regex::new(r"(?is)\b(before|prior to)\s+(submitting|sending)\s+(this\s+)?form.*?\b(form\s+)?([a-z0-9\-_/\.]+)").unwrap(),
        ),
        (
            DependencyRelation::After,
            Regex::new(r"(?is)\b(after|following)\s+(approval|submission|receipt)\s+of\s+(form\s+)?([a-z0-9\-_/\.]+)").unwrap(),
        ),
        (
            DependencyRelation::See,
            Regex::new(r"(?is)\b(see|refer to)\s+(form|document)\s+([a-z0-9\-_/\.]+)").unwrap(),
        ),
    ];

    /// Agency-style form identifier inside a dependency span
    pub static ref FORM_TOKEN: Regex = Regex::new(
        r"(?i)\b((SF|GSA|SSA|IRS|USCIS|I|DS|W|POA|DPOA|DOA|F|FRM|APP|ACCT|CHG)[\-\s]?\d+[a-z0-9\-]*)"
    )
    .unwrap();

    pub static ref DEADLINES: Vec<Regex> = vec![
        Regex::new(r"(?i)\b(within\s+\d{1,3}\s+(calendar|business)\s+days)\b").unwrap(),
        Regex::new(r"(?i)\b(within\s+\d{1,2}\s+months?)\b").unwrap(),
        Regex::new(r"(?i)\b(no\s+later\s+than\s+\d{1,3}\s+(days|business days))\b").unwrap(),
        Regex::new(r"(?i)\b(by\s+(?:the\s+)?\d{1,2}/\d{1,2}/\d{2,4})\b").unwrap(),
        Regex::new(r"(?i)\b(by\s+(?:the\s+)?[a-z]{3,9}\s+\d{1,2},\s+\d{4})\b").unwrap(),
        Regex::new(r"(?i)\b(postmarked\s+within\s+\d{1,3}\s+days)\b").unwrap(),
        Regex::new(r"(?i)\b(\d{1,3}\s+(calendar|business)\s+days\s+of\s+(?:receipt|effective\s+date|notification))\b").unwrap(),
        Regex::new(r"(?i)\bon or before\s+\d{1,2}/\d{1,2}/\d{2,4}\b").unwrap(),
        Regex::new(r"(?i)\bon or before\s+[a-z]{3,9}\s+\d{1,2},\s+\d{4}\b").unwrap(),
        Regex::new(r"(?i)\bmust be (?:received|submitted|returned)\s+within\s+\d{1,3}\s+(?:days|business days|weeks|months)\b").unwrap(),
        Regex::new(r"(?i)\bno later than\b").unwrap(),
        Regex::new(r"(?i)\bon or before\b").unwrap(),
        Regex::new(r"(?i)\bwithin\s+\d{1,3}\s+(?:days|business days|weeks|months)\b").unwrap(),
        Regex::new(r"(?i)\bpostmarked by\b").unwrap(),
        Regex::new(r"(?i)\beffective date\b.*?\bwithin\s+\d{1,3}\s+(?:days|business days)\b").unwrap(),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_compile() {
        assert_eq!(FIELD_CLASSES.len(), 15);
        assert_eq!(PII.len(), 9);
        assert_eq!(ATTACHMENT_HINTS.len(), 7);
        assert_eq!(SIGNER_ROLES.len(), 7);
        assert_eq!(THIRD_PARTIES.len(), 7);
        assert_eq!(DEPENDENCIES.len(), 5);
        assert_eq!(DEADLINES.len(), 15);
        assert!(FORM_TOKEN.is_match("w-9"));
    }

    #[test]
    fn test_notary_pattern() {
        assert!(NOTARY.is_match("subscribed and sworn before me"));
        assert!(NOTARY.is_match("must be notarized"));
        assert!(!NOTARY.is_match("no stamp required"));
    }

    #[test]
    fn test_underscore_run_needs_five() {
        assert!(UNDERSCORE_RUN.is_match("Signature ________"));
        assert!(!UNDERSCORE_RUN.is_match("Initials ___"));
    }
}
