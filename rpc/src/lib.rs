//! Agora RPC layer: the node's HTTP surface.
//!
//! Translates requests into [`agora_core::Node`] and
//! [`agora_exchange::Market`] operations and maps structured errors to
//! status codes: validation/policy/consensus rejections are 400 with a
//! `{message}` body, internal failures are 500.

use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use agora_core::SharedNode;
use agora_exchange::Market;
use agora_network::Gossip;

pub mod dto;
pub mod exchange_routes;
pub mod routes;
pub mod settle;

pub use settle::LocalLedger;

/// Shared state of the node API handlers.
#[derive(Clone)]
pub struct AppState {
    pub node: SharedNode,
    pub gossip: Arc<Gossip>,
}

/// The matching engine behind its own coarse lock, held for the whole of
/// each placement or cancellation.
pub type SharedMarket = Arc<Mutex<Market>>;

/// Routes of the ledger node.
pub fn node_router(state: AppState) -> Router {
    Router::new()
        .route("/chain", get(routes::full_chain))
        .route("/transactions/new", post(routes::new_transaction))
        .route("/nodes/register", post(routes::register_nodes))
        .route("/nodes/get", get(routes::get_nodes))
        .route("/resolve", get(routes::resolve))
        .route("/receive_block", post(routes::receive_block))
        .route("/wallet/new", post(routes::new_wallet))
        .route("/balance/:address", get(routes::balance))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Routes of the exchange service. Mounted standalone or merged into a node
/// router when the node co-hosts the matching engine.
pub fn exchange_router(market: SharedMarket) -> Router {
    Router::new()
        .route("/add_order", post(exchange_routes::add_order))
        .route("/cancel_order", post(exchange_routes::cancel_order))
        .with_state(market)
        .layer(TraceLayer::new_for_http())
}
