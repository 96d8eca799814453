//! HTTP handlers for the gateway

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::client::KvClient;
use crate::gateway::{Gateway, GatewayError, Reply, Status, StoreRequest};

/// Shared application state
pub type AppState<C> = Arc<Gateway<C>>;

fn status_code(status: Status) -> StatusCode {
    match status {
        Status::Success => StatusCode::OK,
        Status::ClientError => StatusCode::BAD_REQUEST,
        Status::NotFound => StatusCode::NOT_FOUND,
        Status::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond<T: Serialize>(result: Result<Reply<T>, GatewayError>) -> Response {
    match result {
        Ok(reply) => (status_code(reply.status), Json(reply.body)).into_response(),
        Err(e) => {
            debug!("Request failed: {}", e);
            (status_code(e.status()), Json(e.to_response())).into_response()
        }
    }
}

/// POST /kv
pub async fn store_handler<C: KvClient>(
    State(gateway): State<AppState<C>>,
    payload: Result<Json<StoreRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected store body: {}", rejection.body_text());
            return respond::<()>(Err(GatewayError::InvalidRequest(rejection.body_text())));
        }
    };

    respond(gateway.store(request).await)
}

/// GET /kv/:key
pub async fn retrieve_handler<C: KvClient>(
    State(gateway): State<AppState<C>>,
    key: Option<Path<String>>,
) -> Response {
    respond(gateway.retrieve(key.map(|Path(key)| key)).await)
}

/// DELETE /kv/:key
pub async fn remove_handler<C: KvClient>(
    State(gateway): State<AppState<C>>,
    key: Option<Path<String>>,
) -> Response {
    respond(gateway.remove(key.map(|Path(key)| key)).await)
}

/// GET /health
pub async fn health_handler<C: KvClient>(State(gateway): State<AppState<C>>) -> impl IntoResponse {
    match gateway.client().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "storage": "up" })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "storage": "down" })),
            )
        }
    }
}
