//! Settlement adapter for a co-located ledger node.

use agora_core::{Error as CoreError, SharedNode, TokenType};
use agora_exchange::{Error, Result, SettlementLedger};

/// Settles exchange transfers directly against the in-process node.
///
/// Called while the matching-engine lock is held; takes the node lock only
/// for the duration of one admission, and never calls back into the engine,
/// so the engine → node lock order is preserved.
pub struct LocalLedger {
    node: SharedNode,
}

impl LocalLedger {
    pub fn new(node: SharedNode) -> Self {
        Self { node }
    }
}

impl SettlementLedger for LocalLedger {
    fn transfer(
        &self,
        sender: &str,
        recipient: &str,
        amount: u64,
        token: TokenType,
    ) -> Result<()> {
        let mut guard = self.node.write().expect("node state lock poisoned");
        match guard.add_transaction(sender, recipient, amount, token) {
            Ok(_) => Ok(()),
            Err(CoreError::InsufficientBalance { .. }) => Err(Error::InsufficientBalance),
            Err(e) => Err(Error::Ledger(e.to_string())),
        }
    }
}
