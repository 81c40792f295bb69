//! Simulated transaction identifiers

use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;

/// Number of random bytes behind every identifier.
pub const TXID_BYTES: usize = 32;

/// Length of the hex rendering, without any prefix.
pub const TXID_HEX_LEN: usize = TXID_BYTES * 2;

/// A random identifier for a simulated transfer. It is never broadcast and
/// does not correspond to anything on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxId {
    prefix: String,
    hex: String,
}

impl TxId {
    /// Draws fresh bytes from the OS random number generator.
    pub fn generate(prefix: Option<&str>) -> Self {
        let mut bytes = [0u8; TXID_BYTES];
        OsRng.fill_bytes(&mut bytes);
        TxId {
            prefix: prefix.unwrap_or_default().to_string(),
            hex: hex::encode(bytes),
        }
    }

    /// The lowercase hex digits, without prefix.
    pub fn hex(&self) -> &str {
        &self.hex
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.hex)
    }
}
