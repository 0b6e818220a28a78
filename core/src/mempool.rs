//! Pending transactions awaiting inclusion in a block.

use std::collections::HashSet;

use tracing::info;

use crate::block::Block;
use crate::tx::Transaction;

/// Unordered pool of admitted-but-uncommitted transactions.
#[derive(Debug, Clone, Default)]
pub struct Mempool {
    pending: Vec<Transaction>,
}

impl Mempool {
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn push(&mut self, tx: Transaction) {
        self.pending.push(tx);
    }

    /// Drains the pool into canonical order for block production.
    pub fn take_sorted(&mut self) -> Vec<Transaction> {
        let mut txs = std::mem::take(&mut self.pending);
        txs.sort_by(Transaction::canonical_cmp);
        txs
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Replaces the pool wholesale (snapshot load).
    pub fn restore(&mut self, txs: Vec<Transaction>) {
        self.pending = txs;
    }

    /// Drops every pending transaction the committed `block` already covers:
    /// matching `transaction_id`, or matching canonical content hash.
    /// Returns the number of evicted entries.
    pub fn evict_committed(&mut self, block: &Block) -> usize {
        let ids: HashSet<_> = block
            .transactions
            .iter()
            .map(|tx| tx.transaction_id)
            .collect();
        let content_hashes: HashSet<_> = block
            .transactions
            .iter()
            .filter_map(|tx| tx.content_hash().ok())
            .collect();

        let before = self.pending.len();
        self.pending.retain(|tx| {
            let committed = ids.contains(&tx.transaction_id)
                || tx
                    .content_hash()
                    .map(|h| content_hashes.contains(&h))
                    .unwrap_or(false);
            if committed {
                info!(tx = %tx.transaction_id, block = block.index, "evicting committed transaction from mempool");
            }
            !committed
        });
        before - self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;
    use crate::{now_ts, FAUCET_ADDRESS};

    #[test]
    fn take_sorted_orders_by_timestamp() {
        let mut pool = Mempool::default();
        let mut a = Transaction::new("x", "y", 1, TokenType::Main);
        let mut b = Transaction::new("x", "y", 2, TokenType::Main);
        a.timestamp = 2.0;
        b.timestamp = 1.0;
        pool.push(a.clone());
        pool.push(b.clone());

        let drained = pool.take_sorted();
        assert!(pool.is_empty());
        assert_eq!(drained[0].transaction_id, b.transaction_id);
        assert_eq!(drained[1].transaction_id, a.transaction_id);
    }

    #[test]
    fn eviction_matches_by_id() {
        let mut pool = Mempool::default();
        let committed = Transaction::new(FAUCET_ADDRESS, "a", 10, TokenType::Main);
        let unrelated = Transaction::new(FAUCET_ADDRESS, "b", 20, TokenType::Second);
        pool.push(committed.clone());
        pool.push(unrelated.clone());

        let block = Block::new(1, now_ts(), vec![committed], "prev", "v").unwrap();
        assert_eq!(pool.evict_committed(&block), 1);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.transactions()[0].transaction_id, unrelated.transaction_id);
    }

    #[test]
    fn eviction_leaves_unrelated_entries_alone() {
        let mut pool = Mempool::default();
        let pending = Transaction::new(FAUCET_ADDRESS, "a", 10, TokenType::Main);
        pool.push(pending.clone());

        let other = Transaction::new(FAUCET_ADDRESS, "b", 10, TokenType::Main);
        let block = Block::new(1, now_ts(), vec![other], "prev", "v").unwrap();
        assert_eq!(pool.evict_committed(&block), 0);
        assert_eq!(pool.len(), 1);
    }
}
