//! The node state machine.
//!
//! A [`Node`] owns the chain, the mempool, the stake registry, the peer set
//! and the set of wallets it has minted. Every public operation leaves the
//! state pair (chain, mempool) consistent and persists a snapshot before
//! returning; persistence failures are logged and never roll the operation
//! back.
//!
//! The `Node` itself is not thread-safe; share it as a [`SharedNode`]
//! (a coarse readers–writer lock) so that admission, block production, block
//! receipt, reconciliation and balance queries are serialized.

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use tracing::{error, info};
use uuid::Uuid;

use crate::block::Block;
use crate::chain::{Balances, Chain};
use crate::error::{Error, Result};
use crate::mempool::Mempool;
use crate::peers::PeerSet;
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::stake::{StakeRegistry, DEFAULT_PEER_STAKE, INITIAL_SELF_STAKE};
use crate::token::TokenType;
use crate::tx::Transaction;
use crate::{now_ts, Address, FAUCET_ADDRESS};

/// A `Node` behind the coarse lock that serializes all state transitions.
pub type SharedNode = Arc<RwLock<Node>>;

pub struct Node {
    identifier: Address,
    chain: Chain,
    mempool: Mempool,
    stakes: StakeRegistry,
    peers: PeerSet,
    known_wallets: BTreeSet<Address>,
    store: Box<dyn SnapshotStore>,
}

impl Node {
    /// Creates a node, restoring state from `store` when a snapshot exists
    /// and is readable, otherwise starting a fresh chain with the canonical
    /// genesis block and the default self-stake.
    pub fn new(identifier: impl Into<Address>, store: Box<dyn SnapshotStore>) -> Self {
        let identifier = identifier.into();
        let mut node = Self {
            identifier,
            chain: Chain::genesis(),
            mempool: Mempool::default(),
            stakes: StakeRegistry::default(),
            peers: PeerSet::default(),
            known_wallets: BTreeSet::new(),
            store,
        };

        match node.store.load() {
            Ok(Some(snapshot)) => {
                info!(blocks = snapshot.chain.len(), "restored node state from snapshot");
                node.chain = Chain::from_blocks(snapshot.chain);
                node.mempool.restore(snapshot.pending_transactions);
                for peer in snapshot.nodes {
                    node.peers.insert(peer);
                }
                for (addr, weight) in snapshot.stakes {
                    node.stakes.set(addr, weight);
                }
                node.known_wallets = snapshot.known_wallets.into_iter().collect();
            }
            Ok(None) => {
                info!("no snapshot found, starting fresh");
                node.stakes.ensure(&node.identifier, INITIAL_SELF_STAKE);
                node.persist();
            }
            Err(e) => {
                error!(error = %e, "failed to load snapshot, starting fresh");
                node.stakes.ensure(&node.identifier, INITIAL_SELF_STAKE);
                node.persist();
            }
        }
        node
    }

    pub fn into_shared(self) -> SharedNode {
        Arc::new(RwLock::new(self))
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn last_block(&self) -> &Block {
        self.chain.last()
    }

    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    pub fn peers(&self) -> &PeerSet {
        &self.peers
    }

    pub fn stakes(&self) -> &StakeRegistry {
        &self.stakes
    }

    pub fn known_wallets(&self) -> impl Iterator<Item = &Address> {
        self.known_wallets.iter()
    }

    /// Committed-chain balances of `addr`. The mempool is not consulted.
    pub fn balance(&self, addr: &str) -> Balances {
        self.chain.balance(addr)
    }

    /// Admits a transfer into the mempool.
    ///
    /// The faucet sender `"0"` bypasses the balance check (it mints).
    /// Everyone else must cover `amount` out of their committed balance in
    /// the relevant token; pending admissions are not counted, so a sender
    /// can overdraw against its own pending transfers.
    ///
    /// Returns the index of the block the transaction will at earliest be
    /// included in.
    pub fn add_transaction(
        &mut self,
        sender: &str,
        recipient: &str,
        amount: u64,
        token: TokenType,
    ) -> Result<u64> {
        if amount == 0 {
            return Err(Error::InvalidAmount);
        }
        if sender.is_empty() || recipient.is_empty() {
            return Err(Error::EmptyAddress);
        }
        if sender != FAUCET_ADDRESS {
            let available = self.balance(sender).get(token);
            if available < amount as i64 {
                return Err(Error::InsufficientBalance {
                    token,
                    required: amount,
                    available,
                });
            }
        }

        let tx = Transaction::new(sender, recipient, amount, token);
        info!(sender, recipient, amount, token = %token, tx = %tx.transaction_id, "transaction admitted");
        self.mempool.push(tx);
        self.persist();
        Ok(self.last_block().index + 1)
    }

    /// Registers a peer endpoint, granting it the default stake when unseen.
    /// Returns the normalized endpoint.
    pub fn register_node(&mut self, raw: &str) -> Result<String> {
        let endpoint =
            PeerSet::normalize(raw).ok_or_else(|| Error::InvalidPeer(raw.to_string()))?;
        if endpoint == self.identifier {
            // A node never lists itself as its own peer.
            return Ok(endpoint);
        }
        if self.peers.insert(endpoint.clone()) {
            info!(peer = %endpoint, "registered new peer");
        }
        if self.stakes.ensure(&endpoint, DEFAULT_PEER_STAKE) {
            info!(peer = %endpoint, stake = DEFAULT_PEER_STAKE, "assigned default stake");
        }
        self.persist();
        Ok(endpoint)
    }

    /// Registers a batch of peers, skipping unparseable entries.
    /// Returns how many entries were accepted.
    pub fn register_nodes<'a>(&mut self, raw: impl IntoIterator<Item = &'a str>) -> usize {
        raw.into_iter()
            .filter(|addr| self.register_node(addr).is_ok())
            .count()
    }

    /// Stake-weighted random election. `None` when no positive stake exists.
    pub fn select_validator(&self) -> Option<Address> {
        self.stakes
            .select_validator(&mut rand::thread_rng())
            .cloned()
    }

    /// Produces the next block from the current mempool (which may be empty),
    /// appends it, and clears the mempool.
    pub fn create_new_block(&mut self, validator: &str) -> Result<Block> {
        let transactions = self.mempool.take_sorted();
        let last = self.chain.last();
        let block = Block::new(
            last.index + 1,
            now_ts(),
            transactions,
            last.hash.clone(),
            validator,
        )?;
        info!(index = block.index, validator, txs = block.transactions.len(), "forged new block");
        self.chain.push(block.clone());
        self.persist();
        Ok(block)
    }

    /// The receive pipeline for a block gossiped by a peer.
    ///
    /// Rejects stale, out-of-order, unlinked and hash-invalid blocks; on
    /// success appends the block and evicts the covered mempool entries in
    /// the same critical section. [`Error::BlockAhead`] signals the caller
    /// to schedule a reconciliation.
    pub fn receive_block(&mut self, block: Block) -> Result<()> {
        let last = self.chain.last();
        if block.index <= last.index {
            return Err(Error::StaleBlock);
        }
        if block.index > last.index + 1 {
            return Err(Error::BlockAhead);
        }
        if block.previous_hash != last.hash {
            return Err(Error::PrevHashMismatch);
        }
        if !block.verify_hash() {
            return Err(Error::HashMismatch);
        }

        let evicted = self.mempool.evict_committed(&block);
        info!(index = block.index, evicted, "accepted block from peer");
        self.chain.push(block);
        self.persist();
        Ok(())
    }

    /// Replaces the local chain with a longer, already-validated candidate.
    ///
    /// The length is re-checked here so the chain length stays monotone even
    /// when the local chain grew while the candidate was being fetched.
    /// Pending transactions are orphaned wholesale.
    pub fn adopt_chain(&mut self, blocks: Vec<Block>) -> bool {
        if blocks.len() <= self.chain.len() {
            return false;
        }
        info!(from = self.chain.len(), to = blocks.len(), "replacing local chain");
        self.chain = Chain::from_blocks(blocks);
        self.mempool.clear();
        self.persist();
        true
    }

    /// Mints a fresh opaque wallet address and records it.
    pub fn create_wallet(&mut self) -> Address {
        let address = Uuid::new_v4().to_string();
        self.known_wallets.insert(address.clone());
        info!(%address, "created new wallet");
        self.persist();
        address
    }

    /// The full serializable state of this node.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            chain: self.chain.blocks().to_vec(),
            pending_transactions: self.mempool.transactions().to_vec(),
            nodes: self.peers.to_vec(),
            stakes: self.stakes.iter().map(|(a, w)| (a.clone(), w)).collect(),
            known_wallets: self.known_wallets.iter().cloned().collect(),
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.snapshot()) {
            error!(error = %e, "failed to persist snapshot; in-memory state stays authoritative");
        }
    }
}
