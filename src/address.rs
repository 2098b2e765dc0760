//! Domain extraction for candidate addresses.
//!
//! Only the part after the last `@` matters for an MX sweep; the local part is
//! carried through untouched. Anything that does not yield a plausible domain
//! is reported as an [`AddressError`] so the caller can classify it as dead
//! without touching the network.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("address has no '@'")]
    MissingAt,
    #[error("domain is empty")]
    EmptyDomain,
    #[error("domain IDNA conversion failed")]
    IdnaConversion {
        #[source]
        source: idna::Errors,
    },
    #[error("invalid domain: {}", reasons.join("; "))]
    InvalidDomain { reasons: Vec<String> },
}

impl AddressError {
    pub(crate) fn idna(source: idna::Errors) -> Self {
        Self::IdnaConversion { source }
    }
}

/// Returns the ASCII (punycode) domain of `address`, ready to be queried.
pub fn extract_domain(address: &str) -> Result<String, AddressError> {
    let (_, domain) = address.trim().rsplit_once('@').ok_or(AddressError::MissingAt)?;
    let domain = domain.trim().trim_end_matches('.');
    if domain.is_empty() {
        return Err(AddressError::EmptyDomain);
    }

    let ascii = idna::domain_to_ascii(domain).map_err(AddressError::idna)?;
    if ascii.is_empty() {
        return Err(AddressError::EmptyDomain);
    }

    let mut reasons = Vec::new();
    check_labels(&ascii, &mut reasons);
    if reasons.is_empty() {
        Ok(ascii)
    } else {
        Err(AddressError::InvalidDomain { reasons })
    }
}

fn check_labels(ascii: &str, reasons: &mut Vec<String>) {
    // au moins un point: un TLD seul n'a pas de MX exploitable
    if !ascii.contains('.') {
        reasons.push("domain must contain at least one dot".to_string());
    }

    for label in ascii.split('.') {
        if label.is_empty() {
            reasons.push("empty domain label".to_string());
            continue;
        }
        if label.len() > 63 {
            reasons.push(format!(
                "domain label '{}' length {} > 63",
                label,
                label.len()
            ));
        }
        if label.starts_with('-') || label.ends_with('-') {
            reasons.push(format!(
                "domain label '{}' cannot start/end with '-'",
                label
            ));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            reasons.push(format!("domain label '{}' has invalid chars", label));
        }
    }
}
