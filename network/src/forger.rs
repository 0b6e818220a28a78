//! The periodic forging task.

use std::sync::Arc;

use tracing::{debug, error, info};

use agora_core::{Block, Config, Result, SharedNode};

use crate::gossip::Gossip;

/// Runs forever: every `forging_interval`, elect a validator and, when the
/// local node wins, produce a block and broadcast it. Errors never kill the
/// loop; they stretch the sleep to at least `error_backoff`.
pub async fn run_forging_loop(node: SharedNode, gossip: Arc<Gossip>, config: Config) {
    info!(interval = ?config.forging_interval, "forging loop started");
    loop {
        let mut sleep = config.forging_interval;
        match forge_tick(&node) {
            Ok(Some(block)) => {
                gossip.broadcast_block(&node, &block).await;
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "forging tick failed");
                sleep = sleep.max(config.error_backoff);
            }
        }
        tokio::time::sleep(sleep).await;
    }
}

/// One election round. Returns the forged block when this node won and had
/// work to do.
fn forge_tick(node: &SharedNode) -> Result<Option<Block>> {
    let mut guard = node.write().expect("node state lock poisoned");
    if guard.mempool().is_empty() {
        debug!("mempool empty, skipping forge check");
        return Ok(None);
    }
    match guard.select_validator() {
        Some(validator) if validator == guard.identifier() => {
            info!(%validator, "local node elected, forging");
            let block = guard.create_new_block(&validator)?;
            Ok(Some(block))
        }
        Some(validator) => {
            debug!(%validator, "another validator elected, waiting");
            Ok(None)
        }
        None => {
            debug!("no validator could be elected");
            Ok(None)
        }
    }
}
