//! Known peer endpoints.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Set of peer endpoints in `host:port` form, scheme stripped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerSet {
    peers: BTreeSet<String>,
}

impl PeerSet {
    /// Normalizes a raw peer address: accepts `host:port` and
    /// `http(s)://host:port[/...]`, returns the bare authority, or `None`
    /// when the input cannot name an endpoint.
    pub fn normalize(raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let authority = match trimmed
            .strip_prefix("http://")
            .or_else(|| trimmed.strip_prefix("https://"))
        {
            Some(rest) => rest.split('/').next().unwrap_or(""),
            // Without a scheme, require host:port to avoid swallowing junk.
            None => {
                let bare = trimmed.trim_end_matches('/');
                if bare.contains(':') {
                    bare
                } else {
                    return None;
                }
            }
        };
        if authority.is_empty() {
            None
        } else {
            Some(authority.to_string())
        }
    }

    /// Inserts an already-normalized endpoint. Returns true if it was new.
    pub fn insert(&mut self, endpoint: String) -> bool {
        self.peers.insert(endpoint)
    }

    pub fn contains(&self, endpoint: &str) -> bool {
        self.peers.contains(endpoint)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.peers.iter()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.peers.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scheme_and_path() {
        assert_eq!(
            PeerSet::normalize("http://127.0.0.1:5001"),
            Some("127.0.0.1:5001".into())
        );
        assert_eq!(
            PeerSet::normalize("https://node.example:8443/chain"),
            Some("node.example:8443".into())
        );
    }

    #[test]
    fn accepts_bare_host_port() {
        assert_eq!(
            PeerSet::normalize(" 192.168.1.10:5000 "),
            Some("192.168.1.10:5000".into())
        );
    }

    #[test]
    fn rejects_unparseable_addresses() {
        assert_eq!(PeerSet::normalize(""), None);
        assert_eq!(PeerSet::normalize("not-an-endpoint"), None);
        assert_eq!(PeerSet::normalize("http://"), None);
    }
}
