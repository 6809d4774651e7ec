//! Syntactic rules for the public name an environment is published under.
//!
//! Shared by the provisioner and by the upstream checkout flow so both reject
//! the same names before anything reaches DNS.

use thiserror::Error;

/// Longest accepted subdomain label.
pub const MAX_SUBDOMAIN_LEN: usize = 12;

/// Why a requested subdomain was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubdomainError {
    #[error("subdomain must not be empty")]
    Empty,

    #[error("subdomain must be at most {MAX_SUBDOMAIN_LEN} characters (got {0})")]
    TooLong(usize),

    #[error("subdomain may only contain a-z, 0-9 and '-': {0}")]
    InvalidCharacter(String),

    #[error("subdomain must not start or end with '-': {0}")]
    HyphenEdge(String),
}

/// Validates a requested subdomain label.
///
/// Accepts 1..=12 characters from `[a-z0-9-]` that neither start nor end
/// with a hyphen.
///
/// # Errors
///
/// Returns the first rule the name violates, checked in the order length,
/// charset, hyphen placement.
pub fn validate_subdomain(name: &str) -> Result<(), SubdomainError> {
    if name.is_empty() {
        return Err(SubdomainError::Empty);
    }
    let len = name.chars().count();
    if len > MAX_SUBDOMAIN_LEN {
        return Err(SubdomainError::TooLong(len));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(SubdomainError::InvalidCharacter(name.to_string()));
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(SubdomainError::HyphenEdge(name.to_string()));
    }
    Ok(())
}
