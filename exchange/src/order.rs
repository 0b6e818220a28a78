//! Limit orders.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agora_core::TokenType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Token the market escrows for this side: buys lock MAIN (price × size),
    /// sells lock SECONDARY (size).
    pub fn escrow_token(&self) -> TokenType {
        match self {
            Side::Buy => TokenType::Main,
            Side::Sell => TokenType::Second,
        }
    }
}

/// A resting or partially filled limit order.
///
/// `escrow_remaining` tracks the ledger balance the market still holds on
/// the order's behalf; it shrinks with each fill and is refunded on cancel
/// (and, for buys, on full fill when the taker got price improvement).
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub addr: String,
    pub side: Side,
    pub size: u64,
    pub price: u64,
    pub escrow_remaining: u64,
}

impl Order {
    pub fn new(addr: impl Into<String>, side: Side, size: u64, price: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            addr: addr.into(),
            side,
            size,
            price,
            escrow_remaining: Self::required_escrow(side, size, price),
        }
    }

    /// Ledger amount that must be escrowed before the order may rest.
    pub fn required_escrow(side: Side, size: u64, price: u64) -> u64 {
        match side {
            Side::Buy => price * size,
            Side::Sell => size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escrow_is_side_dependent() {
        let buy = Order::new("q", Side::Buy, 5, 100);
        assert_eq!(buy.escrow_remaining, 500);
        assert_eq!(buy.side.escrow_token(), TokenType::Main);

        let sell = Order::new("r", Side::Sell, 5, 100);
        assert_eq!(sell.escrow_remaining, 5);
        assert_eq!(sell.side.escrow_token(), TokenType::Second);
    }
}
