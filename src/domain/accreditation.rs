//! University domain accreditation.
//!
//! An institution may only issue credentials once its web domain is on the
//! accredited list. A domain matches if it equals an accredited entry or is a
//! subdomain of one (`cs.mit.edu` matches `mit.edu`; `notmit.edu` does not).

use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_ACCREDITED_DOMAINS: &[&str] = &[
    "mit.edu",
    "stanford.edu",
    "harvard.edu",
    "berkeley.edu",
    "caltech.edu",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccreditedDomains {
    domains: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AccreditationCheck {
    /// Normalized form of the submitted domain.
    pub domain: String,
    pub accredited: bool,
    /// The accredited entry that matched, if any.
    pub matched: Option<String>,
}

impl AccreditedDomains {
    /// Builds the list, normalizing entries and skipping ones that do not parse.
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut domains: Vec<String> = domains
            .into_iter()
            .filter_map(|d| normalize_domain(d.as_ref()))
            .collect();
        domains.sort();
        domains.dedup();
        Self { domains }
    }

    pub fn defaults() -> Self {
        Self::new(DEFAULT_ACCREDITED_DOMAINS.iter().copied())
    }

    pub fn list(&self) -> &[String] {
        &self.domains
    }

    /// Returns `None` when the input does not look like a domain at all.
    pub fn check(&self, input: &str) -> Option<AccreditationCheck> {
        let domain = normalize_domain(input)?;
        let matched = self
            .domains
            .iter()
            .find(|accredited| {
                domain == **accredited
                    || domain
                        .strip_suffix(accredited.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            })
            .cloned();
        Some(AccreditationCheck {
            accredited: matched.is_some(),
            domain,
            matched,
        })
    }
}

impl Default for AccreditedDomains {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Lower-cases and strips scheme, credentials, port, path, trailing dot and a
/// leading `www.`.
pub fn normalize_domain(input: &str) -> Option<String> {
    let mut s = input.trim().to_ascii_lowercase();
    if let Some(idx) = s.find("://") {
        s = s[idx + 3..].to_string();
    }
    if let Some(idx) = s.find(|c: char| matches!(c, '/' | '?' | '#')) {
        s.truncate(idx);
    }
    if let Some(idx) = s.rfind('@') {
        s = s[idx + 1..].to_string();
    }
    if let Some(idx) = s.find(':') {
        s.truncate(idx);
    }
    let s = s.trim_end_matches('.');
    let s = s.strip_prefix("www.").unwrap_or(s);

    let valid = !s.is_empty()
        && s.contains('.')
        && s.split('.').all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
    valid.then(|| s.to_string())
}
