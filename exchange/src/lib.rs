//! Agora Exchange Library
//!
//! A price-time-priority central limit order book that settles through the
//! ledger: escrow on placement, refunds on cancel, and two transfers per
//! fill, all against the reserved market account.

use thiserror::Error;
use uuid::Uuid;

use agora_core::TokenType;

pub mod book;
pub mod market;
pub mod order;

pub use book::OrderBook;
pub use market::{Market, Trade};
pub use order::{Order, Side};

/// Reserved address that escrows funds while orders are resting.
pub const MARKET_ADDR: &str = "MARKET_ADDR";

/// Exchange crate error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Size and price must both be positive.
    #[error("invalid order: size and price must be positive integers")]
    InvalidOrder,

    /// The ledger rejected the escrow transfer.
    #[error("insufficient balance")]
    InsufficientBalance,

    /// No open order with this id.
    #[error("unknown order id: {0}")]
    UnknownOrder(Uuid),

    /// The ledger failed for a non-balance reason (transport, validation).
    #[error("ledger error: {0}")]
    Ledger(String),
}

/// Convenient result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// The seam through which the matching engine moves funds.
///
/// Implementations exist for a co-located node (direct call under the node
/// lock) and for a remote node (HTTP client). The engine holds its own lock
/// while calling this, so implementations must never call back into the
/// engine.
pub trait SettlementLedger: Send {
    /// Transfers `amount` of `token` from `sender` to `recipient`, or fails
    /// without side effects.
    fn transfer(&self, sender: &str, recipient: &str, amount: u64, token: TokenType)
        -> Result<()>;
}
