//! Wallet address handling
//!
//! Addresses are opaque strings. Only the network prefix and a minimum length
//! are checked here; checksum verification is left to the network reader,
//! which needs the decoded bytes anyway.

use crate::error::SimError;
use std::fmt;

/// First character of every address on the target network.
pub const ADDRESS_PREFIX: char = 'T';

/// Shortest string accepted as an address.
pub const MIN_ADDRESS_LENGTH: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Validates `raw` and wraps it. The input is not trimmed.
    pub fn parse(raw: &str) -> Result<Self, SimError> {
        validate_address(raw)?;
        Ok(Address(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for narrow table cells.
    pub fn short(&self) -> String {
        let count = self.0.chars().count();
        if count > 20 {
            let head: String = self.0.chars().take(8).collect();
            let tail: String = self.0.chars().skip(count - 8).collect();
            format!("{}...{}", head, tail)
        } else {
            self.0.clone()
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn validate_address(address: &str) -> Result<(), SimError> {
    if address.is_empty() {
        return Err(SimError::InvalidAddress(
            "address cannot be empty".to_string(),
        ));
    }

    if !address.starts_with(ADDRESS_PREFIX) {
        return Err(SimError::InvalidAddress(format!(
            "'{}' must start with '{}'",
            address, ADDRESS_PREFIX
        )));
    }

    if address.chars().count() < MIN_ADDRESS_LENGTH {
        return Err(SimError::InvalidAddress(format!(
            "'{}' is too short (min {} characters)",
            address, MIN_ADDRESS_LENGTH
        )));
    }

    Ok(())
}
