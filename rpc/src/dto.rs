//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agora_core::{Balances, TokenType};

#[derive(Debug, Deserialize)]
pub struct NewTransactionRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
    /// Defaults to MAIN when the field is absent.
    #[serde(default)]
    pub token_type: TokenType,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `nodes` accepts either a JSON list or a comma-separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NodesInput {
    List(Vec<String>),
    Csv(String),
}

impl NodesInput {
    pub fn entries(&self) -> Vec<&str> {
        match self {
            NodesInput::List(items) => items
                .iter()
                .map(String::as_str)
                .filter(|s| !s.trim().is_empty())
                .collect(),
            NodesInput::Csv(csv) => csv
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterNodesRequest {
    pub nodes: NodesInput,
}

#[derive(Debug, Serialize)]
pub struct RegisterNodesResponse {
    pub message: String,
    pub total_nodes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NodesResponse {
    pub nodes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct WalletResponse {
    pub address: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub address: String,
    pub balances: Balances,
    pub token_name: &'static str,
    pub secondary_token_name: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct AddOrderRequest {
    pub addr: String,
    pub size: u64,
    pub price: u64,
    pub buy: bool,
}

#[derive(Debug, Serialize)]
pub struct OrderStatusResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl OrderStatusResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            status: "success",
            msg: Some(msg.into()),
        }
    }

    pub fn success_empty() -> Self {
        Self {
            status: "success",
            msg: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error",
            msg: Some(msg.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CancelOrderRequest {
    pub id: Uuid,
}
