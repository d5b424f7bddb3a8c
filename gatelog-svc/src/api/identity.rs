//! Identity management endpoints
//!
//! Responses are plain status lines: 400 for missing/invalid fields, 500
//! for a storage failure, 200 on success. No authentication by design.

use crate::scanner::normalize_uid;
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use gatelog_common::events::GatelogEvent;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct AddIdentityRequest {
    pub uid: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct IdentityListResponse {
    pub identities: Vec<crate::store::IdentityRecord>,
}

/// POST /api/identity - create or update an identity record
///
/// The uid is trimmed and uppercased before use so a managed identifier
/// always matches the same token read from the scanner.
pub async fn add_identity(
    State(state): State<AppState>,
    Json(req): Json<AddIdentityRequest>,
) -> (StatusCode, &'static str) {
    let uid = normalize_uid(&req.uid);
    let name = req.name.trim();

    if uid.is_empty() || name.is_empty() {
        return (StatusCode::BAD_REQUEST, "uid and name required");
    }
    if !uid.chars().all(|c| c.is_ascii_hexdigit()) {
        return (StatusCode::BAD_REQUEST, "uid must be hexadecimal");
    }

    if let Err(e) = state.store.upsert(&uid, name) {
        error!("Failed to save identity {}: {}", uid, e);
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to save identity");
    }

    state.events.emit_lossy(GatelogEvent::IdentityUpserted {
        uid: uid.clone(),
        name: name.to_string(),
    });
    info!("Added identity: {} -> {}", uid, name);
    (StatusCode::OK, "identity saved")
}

/// GET /api/identities - roster of loaded identity records
pub async fn list_identities(State(state): State<AppState>) -> Json<IdentityListResponse> {
    Json(IdentityListResponse {
        identities: state.store.all(),
    })
}
