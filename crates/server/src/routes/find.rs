//! `GET /kdbFind/{pattern}`: key names matching a regular expression.
//!
//! The path tail after `/kdbFind/` is the pattern, percent-decoded and
//! otherwise used as is. Searches always start at the root key, so every
//! namespace is covered. The body is a JSON array of names in key database
//! order; an empty tail matches every key.

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use keyfind::ROOT_PATH;
use std::sync::Arc;

/// Search handler for a non-empty pattern. A tail that does not decode to
/// UTF-8 is answered like any other invalid pattern.
pub async fn find_keys(
    State(state): State<Arc<ServerState>>,
    pattern: Result<Path<String>, PathRejection>,
) -> ServerResult<Json<Vec<String>>> {
    let Path(pattern) =
        pattern.map_err(|rejection| ServerError::MalformedPattern(rejection.body_text()))?;
    search(&state, pattern).await
}

/// `/kdbFind/` with nothing after it: the empty pattern.
pub async fn find_all_keys(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<Json<Vec<String>>> {
    search(&state, String::new()).await
}

async fn search(state: &ServerState, pattern: String) -> ServerResult<Json<Vec<String>>> {
    let kdb = state.handle();
    let search = state.search;

    // Backends read files, keep that off the runtime threads
    let matches =
        tokio::task::spawn_blocking(move || search.find(&pattern, ROOT_PATH, &*kdb))
            .await??;

    Ok(Json(matches))
}
