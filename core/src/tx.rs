//! Two-token transfer transactions.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::canon;
use crate::error::Result;
use crate::token::TokenType;
use crate::{now_ts, Address};

/// A transfer of `amount` units of one token from `sender` to `recipient`.
///
/// Fields
/// -------
/// * `sender` / `recipient` – Opaque addresses; the sender `"0"` is the
///   faucet and mints without a balance check.
/// * `amount` – Strictly positive integer number of token units.
/// * `token_type` – Which of the two tokens is moved.
/// * `timestamp` – Fractional seconds since the UNIX epoch, stamped at
///   admission time.
/// * `transaction_id` – Globally unique id stamped at admission time; the
///   primary key for mempool eviction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: Address,
    pub recipient: Address,
    pub amount: u64,
    pub token_type: TokenType,
    pub timestamp: f64,
    pub transaction_id: Uuid,
}

impl Transaction {
    /// Builds a transaction stamped with a fresh id and the current wall clock.
    pub fn new(
        sender: impl Into<Address>,
        recipient: impl Into<Address>,
        amount: u64,
        token_type: TokenType,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
            token_type,
            timestamp: now_ts(),
            transaction_id: Uuid::new_v4(),
        }
    }

    /// SHA-256 (hex) of the canonical encoding; used to evict pending
    /// duplicates whose id does not match a committed transaction.
    pub fn content_hash(&self) -> Result<String> {
        canon::canonical_digest(self)
    }

    /// The canonical total order for transactions inside a block: ascending
    /// timestamp, ties broken by id, sender, recipient, amount, token.
    ///
    /// Block hashing sorts with this comparator, so it must be identical on
    /// every node.
    pub fn canonical_cmp(a: &Self, b: &Self) -> Ordering {
        a.timestamp
            .total_cmp(&b.timestamp)
            .then_with(|| a.transaction_id.cmp(&b.transaction_id))
            .then_with(|| a.sender.cmp(&b.sender))
            .then_with(|| a.recipient.cmp(&b.recipient))
            .then_with(|| a.amount.cmp(&b.amount))
            .then_with(|| a.token_type.cmp(&b.token_type))
    }
}
