//! Error types for the agora core crate.
//!
//! High-level operations return [`crate::Result`], an alias for
//! `core::result::Result<T, Error>`. The variants follow the caller-facing
//! taxonomy: validation and policy failures are distinct from consensus
//! rejections so the transport layer can map them to status codes without
//! string matching.

use thiserror::Error;

use crate::token::TokenType;

/// Core crate error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Transfer amount was zero (amounts are strictly positive integers).
    #[error("invalid amount: must be a positive integer")]
    InvalidAmount,

    /// Sender or recipient address was empty.
    #[error("sender and recipient addresses cannot be empty")]
    EmptyAddress,

    /// Sender's committed balance does not cover the transfer.
    #[error("insufficient balance: {available} {token} available, {required} {token} required")]
    InsufficientBalance {
        token: TokenType,
        required: u64,
        available: i64,
    },

    /// Incoming block's index is at or behind the local tip.
    #[error("block rejected: index is not sequential (old block)")]
    StaleBlock,

    /// Incoming block's index is more than one ahead of the local tip;
    /// the caller should schedule a reconciliation.
    #[error("block rejected: index out of order (too far ahead), resolve conflicts needed")]
    BlockAhead,

    /// Incoming block does not link to the local tip.
    #[error("block rejected: previous hash mismatch")]
    PrevHashMismatch,

    /// Incoming block's stored hash does not recompute.
    #[error("block rejected: hash verification failed")]
    HashMismatch,

    /// Peer address could not be parsed into `host:port` form.
    #[error("invalid node address: {0}")]
    InvalidPeer(String),

    /// Snapshot file could not be read or written.
    #[error("snapshot i/o error: {0}")]
    SnapshotIo(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenient result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
