//! The closed two-token enumeration used by every transfer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two tokens tracked by the ledger.
///
/// The wire names (`"MAIN"` / `"SECOND"`) are part of the consensus-critical
/// block encoding and of every HTTP payload; they must never drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TokenType {
    #[default]
    #[serde(rename = "MAIN")]
    Main,
    #[serde(rename = "SECOND")]
    Second,
}

impl TokenType {
    /// Wire name of the token.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Main => "MAIN",
            TokenType::Second => "SECOND",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
