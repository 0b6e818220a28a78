//! Typed client for the node HTTP API.
//!
//! Blocking on purpose: its main consumer is the matching engine, which runs
//! synchronously inside the thread that placed or cancelled an order. Async
//! callers should wrap calls in `spawn_blocking`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use agora_core::{Balances, TokenType};
use agora_exchange::SettlementLedger;

use crate::{ChainPayload, Error, Result};

#[derive(Serialize)]
struct NewTransaction<'a> {
    sender: &'a str,
    recipient: &'a str,
    amount: u64,
    token_type: TokenType,
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Deserialize)]
struct WalletBody {
    address: String,
}

#[derive(Deserialize)]
struct BalanceBody {
    balances: Balances,
}

/// Minimal client for the node API.
pub struct NodeClient {
    base: String,
    http: reqwest::blocking::Client,
}

impl NodeClient {
    pub fn new(host: &str, port: u16) -> Result<Self> {
        Self::with_base(format!("http://{host}:{port}"))
    }

    pub fn with_base(base: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base: base.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// `POST /wallet/new` — mints a fresh address on the node.
    pub fn create_wallet(&self) -> Result<String> {
        let response = self.http.post(format!("{}/wallet/new", self.base)).send()?;
        let body: WalletBody = Self::checked_json(response)?;
        Ok(body.address)
    }

    /// `POST /transactions/new` — admits a transfer into the node's mempool.
    pub fn create_transaction(
        &self,
        sender: &str,
        recipient: &str,
        amount: u64,
        token: TokenType,
    ) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/transactions/new", self.base))
            .json(&NewTransaction {
                sender,
                recipient,
                amount,
                token_type: token,
            })
            .send()?;
        let body: MessageBody = Self::checked_json(response)?;
        Ok(body.message)
    }

    /// `GET /balance/{addr}` — committed balances, both tokens.
    pub fn get_balance(&self, address: &str) -> Result<Balances> {
        let response = self
            .http
            .get(format!("{}/balance/{address}", self.base))
            .send()?;
        let body: BalanceBody = Self::checked_json(response)?;
        Ok(body.balances)
    }

    /// `GET /chain` — the node's full chain.
    pub fn get_chain(&self) -> Result<ChainPayload> {
        let response = self.http.get(format!("{}/chain", self.base)).send()?;
        Self::checked_json(response)
    }

    /// Parses a JSON body, turning non-2xx statuses into [`Error::Node`]
    /// with the `message` field when one is present.
    fn checked_json<T: serde::de::DeserializeOwned>(
        response: reqwest::blocking::Response,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json()?);
        }
        let message = response
            .json::<Value>()
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
            .unwrap_or_else(|| format!("status {status}"));
        Err(Error::Node {
            status: status.as_u16(),
            message,
        })
    }
}

impl SettlementLedger for NodeClient {
    fn transfer(
        &self,
        sender: &str,
        recipient: &str,
        amount: u64,
        token: TokenType,
    ) -> agora_exchange::Result<()> {
        match self.create_transaction(sender, recipient, amount, token) {
            Ok(_) => Ok(()),
            Err(Error::Node { message, .. }) if message.contains("insufficient balance") => {
                Err(agora_exchange::Error::InsufficientBalance)
            }
            Err(e) => Err(agora_exchange::Error::Ledger(e.to_string())),
        }
    }
}
