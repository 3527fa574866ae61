//! Method-token table for calls into other contracts.
//!
//! `CALLT` refers to external methods by a 16-bit index into this table.
//! The table is shared by every function of a contract, append-only, and
//! deduplicated on `(hash, method)`.

use contractc_core::Hash160;
use rustc_hash::FxHashMap;
use serde::Serialize;

use super::CallFlags;

/// A reference to a method of another contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodToken {
    pub hash: Hash160,
    pub method: String,
    pub param_count: u16,
    pub has_return_value: bool,
    pub call_flags: CallFlags,
}

/// Deduplicated, index-addressed method tokens.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    tokens: Vec<MethodToken>,
    index: FxHashMap<(Hash160, String), u16>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or get an existing token, returns its index.
    ///
    /// Returns `None` once the table holds `u16::MAX + 1` distinct tokens.
    pub fn add(&mut self, token: MethodToken) -> Option<u16> {
        let key = (token.hash, token.method.clone());
        if let Some(&idx) = self.index.get(&key) {
            return Some(idx);
        }

        let idx = u16::try_from(self.tokens.len()).ok()?;
        self.tokens.push(token);
        self.index.insert(key, idx);
        Some(idx)
    }

    /// Get a token by index.
    pub fn get(&self, index: u16) -> Option<&MethodToken> {
        self.tokens.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// All tokens in first-use order.
    pub fn tokens(&self) -> &[MethodToken] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<MethodToken> {
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(hash: Hash160, method: &str) -> MethodToken {
        MethodToken {
            hash,
            method: method.to_string(),
            param_count: 1,
            has_return_value: true,
            call_flags: CallFlags::ALL,
        }
    }

    #[test]
    fn dedup_on_hash_and_method() {
        let neo = Hash160::from_le_bytes([1; 20]);
        let gas = Hash160::from_le_bytes([2; 20]);
        let mut table = TokenTable::new();

        assert_eq!(table.add(token(neo, "balanceOf")), Some(0));
        assert_eq!(table.add(token(gas, "balanceOf")), Some(1));
        assert_eq!(table.add(token(neo, "balanceOf")), Some(0));
        assert_eq!(table.add(token(neo, "symbol")), Some(2));

        assert_eq!(table.len(), 3);
        assert_eq!(table.get(1).map(|t| t.hash), Some(gas));
        assert_eq!(table.get(3), None);
    }

    #[test]
    fn first_use_order() {
        let mut table = TokenTable::new();
        let hash = Hash160::ZERO;
        table.add(token(hash, "b"));
        table.add(token(hash, "a"));
        let names: Vec<_> = table.tokens().iter().map(|t| t.method.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
