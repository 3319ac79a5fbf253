//! Address Validation
//!
//! Syntactic validation of IP address literals. Pure; every engine
//! operation runs this before touching the store or the network.

use crate::domain::errors::IpServiceError;
use std::net::IpAddr;

/// Validate that `raw` parses as an IPv4 or IPv6 literal.
///
/// The engine keys storage by the literal exactly as given; validation
/// only rejects malformed input, it never normalizes (no IPv6
/// canonicalization).
pub fn validate(raw: &str) -> Result<(), IpServiceError> {
    raw.parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| IpServiceError::InvalidAddress)
}
