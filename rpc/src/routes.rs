//! Node API handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{info, warn};

use agora_core::{Block, Error as CoreError};
use agora_network::ChainPayload;

use crate::dto::{
    BalanceResponse, MessageResponse, NewTransactionRequest, NodesResponse,
    RegisterNodesRequest, RegisterNodesResponse, WalletResponse,
};
use crate::AppState;

type ApiResult<T> = Result<(StatusCode, Json<T>), (StatusCode, Json<MessageResponse>)>;

fn reject(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<MessageResponse>) {
    (status, Json(MessageResponse::new(message)))
}

fn core_error(err: &CoreError) -> (StatusCode, Json<MessageResponse>) {
    let status = match err {
        CoreError::SnapshotIo(_) | CoreError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::BAD_REQUEST,
    };
    reject(status, err.to_string())
}

fn bad_json(rejection: JsonRejection) -> (StatusCode, Json<MessageResponse>) {
    reject(
        StatusCode::BAD_REQUEST,
        format!("invalid request body: {rejection}"),
    )
}

/// `GET /chain`
pub async fn full_chain(State(state): State<AppState>) -> Json<ChainPayload> {
    let guard = state.node.read().expect("node state lock poisoned");
    Json(ChainPayload {
        chain: guard.chain().blocks().to_vec(),
        length: guard.chain().len(),
    })
}

/// `POST /transactions/new`
pub async fn new_transaction(
    State(state): State<AppState>,
    body: Result<Json<NewTransactionRequest>, JsonRejection>,
) -> ApiResult<MessageResponse> {
    let Json(request) = body.map_err(bad_json)?;
    let mut guard = state.node.write().expect("node state lock poisoned");
    let index = guard
        .add_transaction(
            &request.sender,
            &request.recipient,
            request.amount,
            request.token_type,
        )
        .map_err(|e| core_error(&e))?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!(
            "Transaction ({} {}) added successfully. It will be included in Block #{index}.",
            request.amount, request.token_type
        ))),
    ))
}

/// `POST /nodes/register`
pub async fn register_nodes(
    State(state): State<AppState>,
    body: Result<Json<RegisterNodesRequest>, JsonRejection>,
) -> ApiResult<RegisterNodesResponse> {
    let Json(request) = body.map_err(bad_json)?;
    let entries = request.nodes.entries();
    if entries.is_empty() {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "please supply a valid list or comma-separated string of nodes",
        ));
    }

    let mut guard = state.node.write().expect("node state lock poisoned");
    let registered = guard.register_nodes(entries);
    Ok((
        StatusCode::CREATED,
        Json(RegisterNodesResponse {
            message: format!("{registered} new node(s) registered successfully."),
            total_nodes: guard.peers().to_vec(),
        }),
    ))
}

/// `GET /nodes/get`
pub async fn get_nodes(State(state): State<AppState>) -> Json<NodesResponse> {
    let guard = state.node.read().expect("node state lock poisoned");
    Json(NodesResponse {
        nodes: guard.peers().to_vec(),
    })
}

/// `GET /resolve`
pub async fn resolve(State(state): State<AppState>) -> Json<MessageResponse> {
    let replaced = state.gossip.resolve_conflicts(&state.node).await;
    let message = if replaced {
        "Chain was replaced by a longer valid chain found on the network."
    } else {
        "Our chain is authoritative or no conflicts resolved."
    };
    Json(MessageResponse::new(message))
}

/// `POST /receive_block`
///
/// A block arriving far ahead of the local tip is still rejected, but it
/// also schedules a background reconciliation: someone out there has a
/// longer chain.
pub async fn receive_block(
    State(state): State<AppState>,
    body: Result<Json<Block>, JsonRejection>,
) -> ApiResult<MessageResponse> {
    let Json(block) = body.map_err(bad_json)?;
    let result = {
        let mut guard = state.node.write().expect("node state lock poisoned");
        guard.receive_block(block)
    };
    match result {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(MessageResponse::new("Block added successfully")),
        )),
        Err(e @ CoreError::BlockAhead) => {
            warn!("received block far ahead, scheduling reconciliation");
            let node = state.node.clone();
            let gossip = state.gossip.clone();
            tokio::spawn(async move {
                gossip.resolve_conflicts(&node).await;
            });
            Err(core_error(&e))
        }
        Err(e) => Err(core_error(&e)),
    }
}

/// `POST /wallet/new`
pub async fn new_wallet(State(state): State<AppState>) -> (StatusCode, Json<WalletResponse>) {
    let mut guard = state.node.write().expect("node state lock poisoned");
    let address = guard.create_wallet();
    info!(%address, "wallet created via api");
    (
        StatusCode::CREATED,
        Json(WalletResponse {
            address,
            message: "New wallet created successfully.".into(),
        }),
    )
}

/// `GET /balance/{address}`
pub async fn balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Json<BalanceResponse> {
    let guard = state.node.read().expect("node state lock poisoned");
    Json(BalanceResponse {
        balances: guard.balance(&address),
        address,
        token_name: "MAIN",
        secondary_token_name: "SECOND",
    })
}
