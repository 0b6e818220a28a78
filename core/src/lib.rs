//! Agora Core Library
//!
//! Data structures and state machine for a proof-of-stake ledger with a
//! two-token account model.
//!
//! Glossary
//! --------
//! * **Faucet** – The reserved sender address `"0"`, allowed to mint tokens
//!   without a balance check.
//! * **Forging** – Block production by the stake-elected validator.
//! * **Mempool** – Transactions admitted but not yet included in a block.
//! * **Snapshot** – The JSON-persisted representation of a node's full state.
//!
//! The [`Node`] type owns all mutable state; callers wrap it in a
//! `RwLock`/`Mutex` (see [`SharedNode`]) when it is shared across request
//! handlers and background tasks.

use std::time::{SystemTime, UNIX_EPOCH};

pub mod block;
pub mod canon;
pub mod chain;
pub mod config;
pub mod error;
pub mod mempool;
pub mod node;
pub mod peers;
pub mod snapshot;
pub mod stake;
pub mod token;
pub mod tx;

pub use block::Block;
pub use chain::{Balances, Chain};
pub use config::Config;
pub use error::{Error, Result};
pub use mempool::Mempool;
pub use node::{Node, SharedNode};
pub use peers::PeerSet;
pub use snapshot::{JsonFileStore, NullStore, Snapshot, SnapshotStore};
pub use stake::StakeRegistry;
pub use token::TokenType;
pub use tx::Transaction;

/// Opaque account identifier. No structural constraint beyond non-emptiness.
pub type Address = String;

/// Reserved sender address that mints tokens without a balance check.
pub const FAUCET_ADDRESS: &str = "0";

/// Validator label carried by the genesis block.
pub const GENESIS_VALIDATOR: &str = "Genesis";

/// Returns the UNIX timestamp as fractional seconds.
pub fn now_ts() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
