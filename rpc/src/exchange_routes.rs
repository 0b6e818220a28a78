//! Exchange API handlers.
//!
//! The matching engine runs synchronously and may settle over blocking HTTP
//! when the ledger node is remote, so both handlers hop onto the blocking
//! pool before taking the engine lock.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::error;

use agora_exchange::Side;

use crate::dto::{AddOrderRequest, CancelOrderRequest, OrderStatusResponse};
use crate::SharedMarket;

/// `POST /add_order`
pub async fn add_order(
    State(market): State<SharedMarket>,
    body: Result<Json<AddOrderRequest>, JsonRejection>,
) -> Json<OrderStatusResponse> {
    let Json(request) = match body {
        Ok(json) => json,
        Err(rejection) => {
            return Json(OrderStatusResponse::error(format!(
                "invalid request body: {rejection}"
            )))
        }
    };
    let side = if request.buy { Side::Buy } else { Side::Sell };

    let placed = tokio::task::spawn_blocking(move || {
        let mut engine = market.lock().expect("market lock poisoned");
        engine.add_order(&request.addr, request.size, request.price, side)
    })
    .await;

    match placed {
        Ok(Ok((id, _trades))) => Json(OrderStatusResponse::success(id.to_string())),
        Ok(Err(e)) => Json(OrderStatusResponse::error(e.to_string())),
        Err(e) => {
            error!(error = %e, "order placement task panicked");
            Json(OrderStatusResponse::error("internal error"))
        }
    }
}

/// `POST /cancel_order`
pub async fn cancel_order(
    State(market): State<SharedMarket>,
    body: Result<Json<CancelOrderRequest>, JsonRejection>,
) -> Json<OrderStatusResponse> {
    let Json(request) = match body {
        Ok(json) => json,
        Err(rejection) => {
            return Json(OrderStatusResponse::error(format!(
                "invalid request body: {rejection}"
            )))
        }
    };

    let cancelled = tokio::task::spawn_blocking(move || {
        let mut engine = market.lock().expect("market lock poisoned");
        engine.cancel(request.id)
    })
    .await;

    match cancelled {
        Ok(Ok(())) => Json(OrderStatusResponse::success_empty()),
        Ok(Err(e)) => Json(OrderStatusResponse::error(e.to_string())),
        Err(e) => {
            error!(error = %e, "order cancellation task panicked");
            Json(OrderStatusResponse::error("internal error"))
        }
    }
}
