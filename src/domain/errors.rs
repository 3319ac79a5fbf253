//! Domain Errors
//!
//! The closed set of failures the lookup/blacklist engine can signal.
//! The HTTP adapter maps these to status codes; the core never deals
//! in transport concerns.

use thiserror::Error;

/// Failures signalled by [`crate::application::IpService`] operations.
#[derive(Debug, Error)]
pub enum IpServiceError {
    /// The input string is not a valid IPv4 or IPv6 literal.
    #[error("Invalid IP address")]
    InvalidAddress,

    /// The address is on the deny list; the lookup was refused.
    #[error("IP is blacklisted")]
    Blacklisted,

    /// Eviction was requested for an address with no cached record.
    #[error("IP not found")]
    NotFound,

    /// Removal was requested for an address that is not blacklisted.
    #[error("IP is not in blacklist")]
    NotBlacklisted,

    /// The upstream provider call failed; carries the upstream message.
    #[error("{0}")]
    Upstream(String),

    /// Unclassified storage failure (connectivity, constraint violation).
    #[error("storage error: {0}")]
    Store(anyhow::Error),
}

impl From<anyhow::Error> for IpServiceError {
    fn from(err: anyhow::Error) -> Self {
        IpServiceError::Store(err)
    }
}
