//! Axum router and HTTP handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error};

use drop_core::types::Address;
use drop_decay::unix_now;

use crate::AppState;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/entitlement/:address", get(get_entitlement))
        .route("/root", get(get_root))
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({"error": status.as_u16(), "message": message})),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

/// `GET /entitlement/{address}`: decayed balance and proof for one address.
async fn get_entitlement(State(state): State<AppState>, Path(address): Path<String>) -> Response {
    let Ok(address) = Address::from_checksummed(&address) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "The address is not in checksum-case or invalid",
        );
    };

    let snapshot = state.snapshots.current();
    match snapshot.entitlement(&address, unix_now()) {
        Ok(Some(entitlement)) => (StatusCode::OK, Json(entitlement)).into_response(),
        Ok(None) => {
            debug!(%address, "Address not eligible");
            error_response(StatusCode::NOT_FOUND, "Not found")
        }
        Err(e) => {
            error!(error = %e, %address, "Entitlement lookup failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "There was an internal server error",
            )
        }
    }
}

/// `GET /root`: the published root and decay parameters.
async fn get_root(State(state): State<AppState>) -> Response {
    let snapshot = state.snapshots.current();
    let schedule = snapshot.schedule();
    (
        StatusCode::OK,
        Json(json!({
            "root": snapshot.root(),
            "leaves": snapshot.tree().leaf_count(),
            "decayStartTime": schedule.start,
            "decayDurationInSeconds": schedule.duration,
        })),
    )
        .into_response()
}
