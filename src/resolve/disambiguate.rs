// src/resolve/disambiguate.rs

use once_cell::sync::Lazy;
use regex::Regex;

use crate::resolve::registry::CompanyRegistry;

// Two letters followed by six digits, anywhere in the name, reads as a
// company registration number. Alongside the LIMITED/LTD substring check
// this is a deliberate heuristic: an individual whose printed name happens
// to satisfy either pattern is misread as corporate, matching the upstream
// register's observed behaviour.
static COMPANY_NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z]{2}\d{6}").expect("pattern compiles"));
static COMPANY_WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)LIMITED|LTD").expect("pattern compiles"));

/// What a printed name denotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameClass {
    /// Registry hit; the name is rewritten to this canonical company number.
    CorporateLinked(String),
    /// Pattern hit only; corporate, name kept as printed.
    Corporate,
    Individual,
}

/// Decide corporate vs. individual for one printed name, in fixed order:
/// registry exact match, then the company-number pattern, then the
/// LIMITED/LTD substring, else individual.
pub fn classify_name(registry: &CompanyRegistry, name: &str) -> NameClass {
    if let Some(number) = registry.lookup(name) {
        return NameClass::CorporateLinked(number.to_string());
    }
    if COMPANY_NUMBER_PATTERN.is_match(name) || COMPANY_WORD_PATTERN.is_match(name) {
        return NameClass::Corporate;
    }
    NameClass::Individual
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_match_links_to_canonical_number() {
        let mut registry = CompanyRegistry::empty();
        registry.insert("ACME WIDGETS LIMITED", "00345678");
        assert_eq!(
            classify_name(&registry, "ACME WIDGETS LIMITED"),
            NameClass::CorporateLinked("00345678".into())
        );
    }

    #[test]
    fn pattern_matches_are_corporate_unlinked() {
        let registry = CompanyRegistry::empty();
        // No registry entry: the LIMITED substring still marks it corporate.
        assert_eq!(
            classify_name(&registry, "ACME LIMITED"),
            NameClass::Corporate
        );
        assert_eq!(classify_name(&registry, "Acme Ltd"), NameClass::Corporate);
        assert_eq!(classify_name(&registry, "SC123456"), NameClass::Corporate);
        assert_eq!(
            classify_name(&registry, "NOMINEES AB123456 TRUST"),
            NameClass::Corporate
        );
    }

    #[test]
    fn plain_names_are_individual() {
        let registry = CompanyRegistry::empty();
        assert_eq!(
            classify_name(&registry, "SMITH, JOHN"),
            NameClass::Individual
        );
        // Two letters + five digits does not satisfy the number pattern.
        assert_eq!(classify_name(&registry, "AB12345"), NameClass::Individual);
    }

    #[test]
    fn registry_wins_over_pattern() {
        let mut registry = CompanyRegistry::empty();
        registry.insert("ACME LIMITED", "00345678");
        assert_eq!(
            classify_name(&registry, "ACME LIMITED"),
            NameClass::CorporateLinked("00345678".into())
        );
    }
}
