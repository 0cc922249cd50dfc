//! API route handlers
//!
//! - `find`: regular-expression search over key names
//! - `health`: liveness and readiness probes

pub mod find;
pub mod health;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Service name and the endpoints it serves (GET /).
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "keyfind",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/kdbFind/{pattern}",
            "/health",
            "/ready"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
