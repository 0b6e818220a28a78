//! Blocks and the consensus-critical block digest.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::canon;
use crate::error::Result;
use crate::tx::Transaction;
use crate::{Address, GENESIS_VALIDATOR};

/// An immutable link in the chain.
///
/// The digest covers `{index, timestamp, transactions, previous_hash,
/// validator}` — with transactions pre-sorted into canonical order — encoded
/// as canonical JSON (see [`crate::canon`]). The stored `hash` field is *not*
/// part of the hashed material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub previous_hash: String,
    pub validator: Address,
    pub hash: String,
}

impl Block {
    /// Constructs a block, sorting `transactions` into canonical order and
    /// computing the digest.
    pub fn new(
        index: u64,
        timestamp: f64,
        mut transactions: Vec<Transaction>,
        previous_hash: impl Into<String>,
        validator: impl Into<Address>,
    ) -> Result<Self> {
        transactions.sort_by(Transaction::canonical_cmp);
        let mut block = Self {
            index,
            timestamp,
            transactions,
            previous_hash: previous_hash.into(),
            validator: validator.into(),
            hash: String::new(),
        };
        block.hash = block.calculate_hash()?;
        Ok(block)
    }

    /// The canonical genesis block: fixed timestamp 0, no transactions,
    /// previous hash `"0"`. Byte-identical on every node.
    pub fn genesis() -> Self {
        Block::new(0, 0.0, Vec::new(), "0", GENESIS_VALIDATOR)
            .unwrap_or_else(|_| unreachable!("genesis tuple always encodes"))
    }

    /// Recomputes the SHA-256 digest of the block.
    pub fn calculate_hash(&self) -> Result<String> {
        let mut txs = self.transactions.clone();
        txs.sort_by(Transaction::canonical_cmp);
        let material = json!({
            "index": self.index,
            "timestamp": self.timestamp,
            "transactions": txs,
            "previous_hash": self.previous_hash,
            "validator": self.validator,
        });
        Ok(canon::sha256_hex(canon::to_canonical_json(&material)?.as_bytes()))
    }

    /// True when the stored hash matches a fresh recomputation.
    pub fn verify_hash(&self) -> bool {
        self.calculate_hash()
            .map(|h| h == self.hash)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn tx(ts: f64) -> Transaction {
        let mut t = Transaction::new("a", "b", 1, TokenType::Main);
        t.timestamp = ts;
        t
    }

    #[test]
    fn genesis_is_deterministic() {
        let a = Block::genesis();
        let b = Block::genesis();
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.index, 0);
        assert_eq!(a.previous_hash, "0");
        assert_eq!(a.validator, GENESIS_VALIDATOR);
        assert!(a.transactions.is_empty());
    }

    #[test]
    fn hash_ignores_input_transaction_order() {
        let (t1, t2) = (tx(1.0), tx(2.0));
        let a = Block::new(1, 5.0, vec![t1.clone(), t2.clone()], "p", "v").unwrap();
        let b = Block::new(1, 5.0, vec![t2, t1], "p", "v").unwrap();
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn hash_is_sensitive_to_every_header_field() {
        let base = Block::new(1, 5.0, vec![tx(1.0)], "p", "v").unwrap();

        let mut changed = base.clone();
        changed.index = 2;
        assert_ne!(changed.calculate_hash().unwrap(), base.hash);

        let mut changed = base.clone();
        changed.timestamp = 6.0;
        assert_ne!(changed.calculate_hash().unwrap(), base.hash);

        let mut changed = base.clone();
        changed.previous_hash = "q".into();
        assert_ne!(changed.calculate_hash().unwrap(), base.hash);

        let mut changed = base.clone();
        changed.validator = "w".into();
        assert_ne!(changed.calculate_hash().unwrap(), base.hash);

        let mut changed = base.clone();
        changed.transactions[0].token_type = TokenType::Second;
        assert_ne!(changed.calculate_hash().unwrap(), base.hash);
    }

    #[test]
    fn verify_hash_detects_tampering() {
        let mut block = Block::new(1, 5.0, vec![tx(1.0)], "p", "v").unwrap();
        assert!(block.verify_hash());
        block.hash = "tampered".into();
        assert!(!block.verify_hash());
    }
}
