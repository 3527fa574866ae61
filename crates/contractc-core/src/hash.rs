//! 160-bit script hashes.
//!
//! A [`Hash160`] stores its bytes in script order (little-endian). The
//! conventional textual form is `0x` followed by the bytes reversed, so the
//! string shown to users and the bytes embedded in bytecode differ in order.

use std::fmt;
use std::str::FromStr;

use ripemd::Ripemd160;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// A 20-byte script hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash160([u8; 20]);

/// Failure to parse a [`Hash160`] from text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseHashError {
    #[error("expected 40 hex digits, found {0}")]
    InvalidLength(usize),
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

impl Hash160 {
    pub const ZERO: Hash160 = Hash160([0; 20]);

    /// Wrap bytes that are already in script (little-endian) order.
    pub const fn from_le_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Build from bytes in display (big-endian) order.
    pub fn from_be_bytes(mut bytes: [u8; 20]) -> Self {
        bytes.reverse();
        Self(bytes)
    }

    /// Hash a script: RIPEMD160(SHA256(script)).
    pub fn from_script(script: &[u8]) -> Self {
        let sha = Sha256::digest(script);
        let ripe = Ripemd160::digest(sha);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&ripe);
        Self(bytes)
    }

    /// Bytes in script order, as embedded in bytecode.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Bytes in display order.
    pub fn to_be_bytes(&self) -> [u8; 20] {
        let mut bytes = self.0;
        bytes.reverse();
        bytes
    }

    /// Hex of the script-order bytes, without prefix.
    pub fn to_le_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Hash160 {
    type Err = ParseHashError;

    /// Parse the display form; the `0x` prefix is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != 40 {
            return Err(ParseHashError::InvalidLength(digits.len()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)?;
        Ok(Self::from_be_bytes(bytes))
    }
}

impl fmt::Display for Hash160 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_be_bytes()))
    }
}

impl fmt::Debug for Hash160 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash160({})", self)
    }
}

impl Serialize for Hash160 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hash160 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
