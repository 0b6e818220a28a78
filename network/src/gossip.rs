//! Block broadcast and longest-valid-chain reconciliation.

use tracing::{info, warn};

use agora_core::{Block, Chain, Config, SharedNode};

use crate::{peer_url, ChainPayload};

/// Outbound gossip client. Cheap to clone behind an `Arc`; holds one pooled
/// HTTP client and the two per-call timeouts.
pub struct Gossip {
    http: reqwest::Client,
    config: Config,
}

impl Gossip {
    pub fn new(config: Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Best-effort broadcast of a freshly forged block to every known peer.
    /// Delivery failures and rejections are logged only; there is no retry.
    pub async fn broadcast_block(&self, node: &SharedNode, block: &Block) {
        let (peers, identifier) = {
            let guard = node.read().expect("node state lock poisoned");
            (guard.peers().to_vec(), guard.identifier().to_string())
        };
        info!(index = block.index, peers = peers.len(), "broadcasting block");

        let mut delivered = 0usize;
        for peer in &peers {
            if *peer == identifier {
                continue;
            }
            let url = peer_url(peer, "/receive_block");
            let result = self
                .http
                .post(&url)
                .timeout(self.config.broadcast_timeout)
                .json(block)
                .send()
                .await;
            match result {
                Ok(response) if response.status().is_success() => {
                    delivered += 1;
                }
                Ok(response) => {
                    warn!(peer = %peer, status = %response.status(), "peer rejected block");
                }
                Err(e) => {
                    warn!(peer = %peer, error = %e, "failed to deliver block");
                }
            }
        }
        info!(index = block.index, delivered, total = peers.len(), "broadcast finished");
    }

    /// Surveys every known peer for a strictly longer valid chain and adopts
    /// the longest one found. Returns true when the local chain was replaced.
    ///
    /// Per-peer timeouts, malformed bodies and transport failures are logged
    /// and skipped; the survey itself never fails.
    pub async fn resolve_conflicts(&self, node: &SharedNode) -> bool {
        let (peers, identifier, mut max_length) = {
            let guard = node.read().expect("node state lock poisoned");
            (
                guard.peers().to_vec(),
                guard.identifier().to_string(),
                guard.chain().len(),
            )
        };
        info!(peers = peers.len(), local_length = max_length, "starting conflict resolution");

        let mut candidate: Option<Vec<Block>> = None;
        for peer in &peers {
            if *peer == identifier {
                continue;
            }
            let url = peer_url(peer, "/chain");
            let payload = match self
                .http
                .get(&url)
                .timeout(self.config.chain_fetch_timeout)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    match response.json::<ChainPayload>().await {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!(peer = %peer, error = %e, "invalid chain payload");
                            continue;
                        }
                    }
                }
                Ok(response) => {
                    warn!(peer = %peer, status = %response.status(), "chain fetch failed");
                    continue;
                }
                Err(e) => {
                    warn!(peer = %peer, error = %e, "could not reach peer");
                    continue;
                }
            };

            if payload.length <= max_length {
                continue;
            }
            if Chain::is_valid(&payload.chain) {
                info!(peer = %peer, length = payload.length, "found longer valid chain");
                max_length = payload.length;
                candidate = Some(payload.chain);
            } else {
                warn!(peer = %peer, length = payload.length, "longer chain failed validation");
            }
        }

        match candidate {
            Some(blocks) => {
                let mut guard = node.write().expect("node state lock poisoned");
                let replaced = guard.adopt_chain(blocks);
                if replaced {
                    info!(length = guard.chain().len(), "chain replaced by longer valid chain");
                }
                replaced
            }
            None => {
                info!("local chain remains authoritative");
                false
            }
        }
    }
}
