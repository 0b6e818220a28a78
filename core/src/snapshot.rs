//! Node state persistence.
//!
//! A [`Snapshot`] is the full JSON representation of a node's mutable state,
//! rewritten after every mutating operation. Persistence is a pluggable sink
//! behind [`SnapshotStore`]; failures are logged by the caller and never
//! rolled back — the in-memory state stays authoritative.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::error::Result;
use crate::tx::Transaction;
use crate::Address;

/// Serialized node state: `{chain, pending_transactions, nodes, stakes,
/// known_wallets}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub chain: Vec<Block>,
    pub pending_transactions: Vec<Transaction>,
    pub nodes: Vec<String>,
    pub stakes: BTreeMap<Address, u64>,
    #[serde(default)]
    pub known_wallets: Vec<Address>,
}

/// Where snapshots go and come from.
pub trait SnapshotStore: Send + Sync {
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
    fn load(&self) -> Result<Option<Snapshot>>;
}

/// JSON file store. Saves are atomic: the snapshot is written to a sibling
/// temp file and renamed over the target.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl SnapshotStore for JsonFileStore {
    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let encoded = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, encoded)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }
}

/// Store that keeps nothing. Used in tests and ephemeral nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl SnapshotStore for NullStore {
    fn save(&self, _snapshot: &Snapshot) -> Result<()> {
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> Snapshot {
        Snapshot {
            chain: vec![Block::genesis()],
            pending_transactions: Vec::new(),
            nodes: vec!["127.0.0.1:5001".into()],
            stakes: BTreeMap::from([("me".to_string(), 100)]),
            known_wallets: vec!["w1".into()],
        }
    }

    #[test]
    fn round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("node_9999_data.json"));
        store.save(&sample_snapshot()).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.chain.len(), 1);
        assert_eq!(loaded.chain[0].hash, Block::genesis().hash);
        assert_eq!(loaded.nodes, vec!["127.0.0.1:5001".to_string()]);
        assert_eq!(loaded.stakes.get("me"), Some(&100));
        assert_eq!(loaded.known_wallets, vec!["w1".to_string()]);
    }

    #[test]
    fn missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{'chain': [}").unwrap();
        let store = JsonFileStore::new(path);
        assert!(store.load().is_err());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data").join("node.json"));
        store.save(&sample_snapshot()).unwrap();
        assert!(store.path().exists());
    }
}
