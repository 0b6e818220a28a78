//! The two-sided book: price-keyed FIFO queues plus an O(1) cancel index.
//!
//! Price levels hold order *ids*; the order records live in a `HashMap`
//! keyed by id, which doubles as the cancel index. Cancelling removes the
//! record in O(1) and leaves the queued id behind as a tombstone; matching
//! and best-price inspection skip tombstones and prune emptied levels as
//! they go, so the queues stay consistent without linked-list surgery.

use std::collections::{BTreeMap, HashMap, VecDeque};

use uuid::Uuid;

use crate::order::{Order, Side};

#[derive(Debug, Default)]
pub struct OrderBook {
    bids: BTreeMap<u64, VecDeque<Uuid>>,
    asks: BTreeMap<u64, VecDeque<Uuid>>,
    orders: HashMap<Uuid, Order>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open (live) orders across both sides.
    pub fn open_orders(&self) -> usize {
        self.orders.len()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.orders.contains_key(&id)
    }

    pub fn get(&self, id: Uuid) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: Uuid) -> Option<&mut Order> {
        self.orders.get_mut(&id)
    }

    /// Appends `order` at the tail of its price level's FIFO queue.
    pub fn insert(&mut self, order: Order) {
        let side = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        side.entry(order.price).or_default().push_back(order.id);
        self.orders.insert(order.id, order);
    }

    /// Removes an order by id in O(1). Its queued id becomes a tombstone.
    pub fn remove(&mut self, id: Uuid) -> Option<Order> {
        self.orders.remove(&id)
    }

    /// Id of the first live order at the best price of `side`, pruning
    /// tombstones and emptied levels on the way.
    pub(crate) fn front(&mut self, side: Side) -> Option<Uuid> {
        let (book, best_is_max) = match side {
            Side::Buy => (&mut self.bids, true),
            Side::Sell => (&mut self.asks, false),
        };
        loop {
            let price = if best_is_max {
                *book.keys().next_back()?
            } else {
                *book.keys().next()?
            };
            let queue = book
                .get_mut(&price)
                .unwrap_or_else(|| unreachable!("key came from the map"));
            while let Some(id) = queue.front() {
                if self.orders.contains_key(id) {
                    return Some(*id);
                }
                queue.pop_front();
            }
            book.remove(&price);
        }
    }

    /// Drops the front live order of `side` from its queue and from the
    /// index, pruning the level when it empties. Used when a fill consumes
    /// the order completely.
    pub(crate) fn pop_front(&mut self, side: Side) -> Option<Order> {
        let id = self.front(side)?;
        let order = self.orders.remove(&id)?;
        let book = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(queue) = book.get_mut(&order.price) {
            queue.pop_front();
            if queue.is_empty() {
                book.remove(&order.price);
            }
        }
        Some(order)
    }

    /// Best bid as `(price, aggregate live size)`.
    pub fn best_bid(&mut self) -> Option<(u64, u64)> {
        self.best_level(Side::Buy)
    }

    /// Best ask as `(price, aggregate live size)`.
    pub fn best_ask(&mut self) -> Option<(u64, u64)> {
        self.best_level(Side::Sell)
    }

    fn best_level(&mut self, side: Side) -> Option<(u64, u64)> {
        let id = self.front(side)?;
        let price = self.orders.get(&id)?.price;
        let book = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        let size = book
            .get(&price)?
            .iter()
            .filter_map(|id| self.orders.get(id))
            .map(|o| o.size)
            .sum();
        Some((price, size))
    }
}
