//! Agora network layer: outbound HTTP between nodes.
//!
//! Covers the three ways bytes leave a node: best-effort block broadcast,
//! the longest-valid-chain reconciliation survey, and the typed node API
//! client used by tools and by the exchange's remote settlement path. All
//! failures here are per-peer: logged, skipped, never fatal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use agora_core::Block;

pub mod client;
pub mod forger;
pub mod gossip;

pub use client::NodeClient;
pub use forger::run_forging_loop;
pub use gossip::Gossip;

/// Body of `GET /chain`: the full chain and its length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainPayload {
    pub chain: Vec<Block>,
    pub length: usize,
}

/// Network crate error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure: refused connection, timeout, bad body.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node answered with a non-2xx status and a `{message}` body.
    #[error("node returned {status}: {message}")]
    Node { status: u16, message: String },
}

pub type Result<T> = core::result::Result<T, Error>;

/// Prefixes `http://` unless the peer address already carries a scheme.
pub(crate) fn peer_url(peer: &str, path: &str) -> String {
    if peer.starts_with("http://") || peer.starts_with("https://") {
        format!("{peer}{path}")
    } else {
        format!("http://{peer}{path}")
    }
}
