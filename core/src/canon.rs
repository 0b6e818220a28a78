//! Canonical JSON encoding and digests.
//!
//! Block and transaction hashes are SHA-256 over a deterministic JSON
//! encoding: object keys ascend lexicographically at every level (serde_json's
//! default `Map` is BTreeMap-backed), numbers use their canonical JSON form,
//! and no whitespace is emitted. Every peer must produce this encoding
//! byte-for-byte; it is the consensus-critical invariant of the system.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Serializes `value` into its canonical JSON byte string.
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let v = serde_json::to_value(value)?;
    Ok(serde_json::to_string(&v)?)
}

/// SHA-256 of `data`, hex-encoded.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// SHA-256 (hex) of the canonical JSON encoding of `value`.
pub fn canonical_digest<T: Serialize>(value: &T) -> Result<String> {
    Ok(sha256_hex(to_canonical_json(value)?.as_bytes()))
}
