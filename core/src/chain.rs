//! The replicated chain: an append-only, hash-linked list of blocks.
//!
//! The chain is the single source of truth for balances. Validation enforces,
//! for every i ≥ 1: `chain[i].index == i`, `chain[i].previous_hash ==
//! chain[i-1].hash`, the stored hash recomputes, and every contained
//! transaction carries a positive amount. A candidate chain failing any check
//! is rejected wholesale.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::block::Block;
use crate::token::TokenType;

/// Per-address holdings of the two tokens.
///
/// Computed balances are signed: a malformed history could drive an address
/// negative, and the fold must not panic on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    #[serde(rename = "MAIN")]
    pub main: i64,
    #[serde(rename = "SECOND")]
    pub second: i64,
}

impl Balances {
    pub fn get(&self, token: TokenType) -> i64 {
        match token {
            TokenType::Main => self.main,
            TokenType::Second => self.second,
        }
    }

    fn entry(&mut self, token: TokenType) -> &mut i64 {
        match token {
            TokenType::Main => &mut self.main,
            TokenType::Second => &mut self.second,
        }
    }
}

/// Non-empty ordered list of blocks, starting at genesis.
#[derive(Debug, Clone)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// A fresh chain holding only the canonical genesis block.
    pub fn genesis() -> Self {
        Self {
            blocks: vec![Block::genesis()],
        }
    }

    /// Wraps an already-validated list of blocks (snapshot load, chain
    /// adoption). Callers must have run [`Chain::is_valid`] first.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        debug_assert!(!blocks.is_empty());
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The most recent block.
    pub fn last(&self) -> &Block {
        self.blocks
            .last()
            .unwrap_or_else(|| unreachable!("chain is never empty"))
    }

    /// Appends a block the caller has already linked and verified.
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Folds the committed chain into the balances of `addr`.
    ///
    /// The mempool is not consulted. Zero-amount transactions should have
    /// been rejected by validation; the fold skips them with a warning
    /// rather than trusting that.
    pub fn balance(&self, addr: &str) -> Balances {
        let mut balances = Balances::default();
        for block in &self.blocks {
            for tx in &block.transactions {
                if tx.amount == 0 {
                    warn!(block = block.index, tx = %tx.transaction_id, "skipping zero-amount transaction in balance fold");
                    continue;
                }
                if tx.recipient == addr {
                    *balances.entry(tx.token_type) += tx.amount as i64;
                }
                if tx.sender == addr {
                    *balances.entry(tx.token_type) -= tx.amount as i64;
                }
            }
        }
        balances
    }

    /// Full structural validation of a candidate chain.
    pub fn is_valid(blocks: &[Block]) -> bool {
        let genesis = match blocks.first() {
            Some(b) => b,
            None => {
                warn!("chain validation failed: chain is empty");
                return false;
            }
        };
        if genesis.index != 0 || genesis.previous_hash != "0" {
            warn!("chain validation failed: malformed genesis block");
            return false;
        }
        if !genesis.verify_hash() {
            warn!("chain validation failed: genesis hash does not recompute");
            return false;
        }

        for (i, window) in blocks.windows(2).enumerate() {
            let (prev, current) = (&window[0], &window[1]);
            let expected_index = (i + 1) as u64;
            if current.index != expected_index {
                warn!(
                    expected = expected_index,
                    got = current.index,
                    "chain validation failed: block index mismatch"
                );
                return false;
            }
            if current.previous_hash != prev.hash {
                warn!(block = current.index, "chain validation failed: previous hash mismatch");
                return false;
            }
            if !current.verify_hash() {
                warn!(block = current.index, "chain validation failed: block hash does not recompute");
                return false;
            }
            if current.transactions.iter().any(|tx| tx.amount == 0) {
                warn!(block = current.index, "chain validation failed: zero-amount transaction");
                return false;
            }
        }
        true
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::genesis()
    }
}
