//! The matching engine.
//!
//! Orders escrow funds with the market account before they rest; the
//! cross-and-fill loop runs after every placement and emits two settlement
//! transfers per trade. The resting (maker) price always sets the trade
//! price, so an aggressive taker-buy can receive price improvement, refunded
//! out of its escrow when the order fully fills.

use tracing::{error, info};
use uuid::Uuid;

use agora_core::{TokenType, FAUCET_ADDRESS};

use crate::book::OrderBook;
use crate::order::{Order, Side};
use crate::{Error, Result, SettlementLedger, MARKET_ADDR};

/// Funding granted to the market account on construction, per token.
const MARKET_FUNDING: u64 = 10_000_000_000;

/// An executed fill: `(bid_id, ask_id, size, price)` in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trade {
    pub bid_id: Uuid,
    pub ask_id: Uuid,
    pub size: u64,
    pub price: u64,
}

/// One market instrument: its book and the ledger it settles through.
///
/// Not thread-safe by itself; wrap it in a `Mutex` held for the whole of
/// each placement or cancellation so the book and cancel index stay
/// consistent. The ledger seam is called while that lock is held; the lock
/// order is always engine → ledger and never the reverse.
pub struct Market {
    book: OrderBook,
    ledger: Box<dyn SettlementLedger>,
}

impl Market {
    /// Creates a market and pre-funds the escrow account with both tokens.
    pub fn new(ledger: Box<dyn SettlementLedger>) -> Result<Self> {
        ledger.transfer(FAUCET_ADDRESS, MARKET_ADDR, MARKET_FUNDING, TokenType::Main)?;
        ledger.transfer(FAUCET_ADDRESS, MARKET_ADDR, MARKET_FUNDING, TokenType::Second)?;
        Ok(Self {
            book: OrderBook::new(),
            ledger,
        })
    }

    /// Places a limit order: escrow first, rest at the tail of its price
    /// level, then run the matching loop. Returns the order id and the
    /// trades it produced.
    ///
    /// On any error the order does not rest: an escrow rejection leaves the
    /// book untouched, and a settlement failure inside the matching loop
    /// takes the order back out and refunds its remaining escrow before the
    /// error propagates.
    pub fn add_order(
        &mut self,
        addr: &str,
        size: u64,
        price: u64,
        side: Side,
    ) -> Result<(Uuid, Vec<Trade>)> {
        if size == 0 || price == 0 {
            return Err(Error::InvalidOrder);
        }
        let order = Order::new(addr, side, size, price);
        self.ledger.transfer(
            &order.addr,
            MARKET_ADDR,
            order.escrow_remaining,
            side.escrow_token(),
        )?;
        info!(id = %order.id, addr, ?side, size, price, escrow = order.escrow_remaining, "order accepted");

        let id = order.id;
        self.book.insert(order);
        match self.resolve(side) {
            Ok(trades) => Ok((id, trades)),
            Err(e) => {
                self.unwind_order(id, &e);
                Err(e)
            }
        }
    }

    /// Cancels an open order and refunds its remaining escrow.
    ///
    /// The refund runs before the order leaves the book, so a failed
    /// transfer keeps the id valid and the cancel retryable.
    pub fn cancel(&mut self, id: Uuid) -> Result<()> {
        let (addr, refund, token) = {
            let order = self.book.get(id).ok_or(Error::UnknownOrder(id))?;
            (
                order.addr.clone(),
                order.escrow_remaining,
                order.side.escrow_token(),
            )
        };
        if refund > 0 {
            self.ledger.transfer(MARKET_ADDR, &addr, refund, token)?;
        }
        self.book.remove(id);
        info!(%id, refund, "order cancelled");
        Ok(())
    }

    /// Backs a just-placed order out of the book after its matching loop
    /// failed, refunding whatever escrow it still holds. A failed refund is
    /// logged; the funds stay with the market account.
    fn unwind_order(&mut self, id: Uuid, cause: &Error) {
        let Some(order) = self.book.remove(id) else {
            return;
        };
        error!(%id, error = %cause, "matching failed, unwinding order");
        if order.escrow_remaining > 0 {
            if let Err(refund_err) = self.ledger.transfer(
                MARKET_ADDR,
                &order.addr,
                order.escrow_remaining,
                order.side.escrow_token(),
            ) {
                error!(%id, error = %refund_err, escrow = order.escrow_remaining, "escrow refund failed during unwind");
            }
        }
    }

    /// Best bid as `(price, aggregate size)`.
    pub fn best_bid(&mut self) -> Option<(u64, u64)> {
        self.book.best_bid()
    }

    /// Best ask as `(price, aggregate size)`.
    pub fn best_ask(&mut self) -> Option<(u64, u64)> {
        self.book.best_ask()
    }

    pub fn open_orders(&self) -> usize {
        self.book.open_orders()
    }

    pub fn contains_order(&self, id: Uuid) -> bool {
        self.book.contains(id)
    }

    /// Continuous matching until the book uncrosses. `taker` is the side of
    /// the just-placed order and decides which resting price sets the trade
    /// price.
    fn resolve(&mut self, taker: Side) -> Result<Vec<Trade>> {
        let mut trades = Vec::new();

        loop {
            let (bid_id, ask_id) = match (self.book.front(Side::Buy), self.book.front(Side::Sell)) {
                (Some(b), Some(a)) => (b, a),
                _ => break,
            };
            let (bid_price, bid_size) = {
                let bid = self.book.get(bid_id).ok_or(Error::UnknownOrder(bid_id))?;
                (bid.price, bid.size)
            };
            let (ask_price, ask_size) = {
                let ask = self.book.get(ask_id).ok_or(Error::UnknownOrder(ask_id))?;
                (ask.price, ask.size)
            };
            if bid_price < ask_price {
                break;
            }

            let size = bid_size.min(ask_size);
            let price = match taker {
                Side::Buy => ask_price,
                Side::Sell => bid_price,
            };
            let trade = Trade {
                bid_id,
                ask_id,
                size,
                price,
            };
            info!(bid = %bid_id, ask = %ask_id, size, price, "trade executed");

            // Settle: the buyer receives the units, the seller the proceeds.
            let (buyer, seller) = {
                let bid = self.book.get(bid_id).ok_or(Error::UnknownOrder(bid_id))?;
                let ask = self.book.get(ask_id).ok_or(Error::UnknownOrder(ask_id))?;
                (bid.addr.clone(), ask.addr.clone())
            };
            self.ledger
                .transfer(MARKET_ADDR, &buyer, size, TokenType::Second)?;
            self.ledger
                .transfer(MARKET_ADDR, &seller, size * price, TokenType::Main)?;

            if let Some(bid) = self.book.get_mut(bid_id) {
                bid.size -= size;
                bid.escrow_remaining -= size * price;
            }
            if let Some(ask) = self.book.get_mut(ask_id) {
                ask.size -= size;
                ask.escrow_remaining -= size;
            }
            trades.push(trade);

            if self.book.get(bid_id).map(|b| b.size) == Some(0) {
                // Covers any price improvement the bid received: its escrow
                // was locked at bid.price but fills happened at <= bid.price.
                let bid = self
                    .book
                    .pop_front(Side::Buy)
                    .ok_or(Error::UnknownOrder(bid_id))?;
                if bid.escrow_remaining > 0 {
                    self.ledger.transfer(
                        MARKET_ADDR,
                        &bid.addr,
                        bid.escrow_remaining,
                        TokenType::Main,
                    )?;
                }
            }
            if self.book.get(ask_id).map(|a| a.size) == Some(0) {
                self.book
                    .pop_front(Side::Sell)
                    .ok_or(Error::UnknownOrder(ask_id))?;
            }
        }

        Ok(trades)
    }
}
