//! HTTP API for the draw poker server.
//!
//! # Endpoints
//!
//! ```text
//! GET  /health                          - Health check
//! POST /api/v1/tables                   - Create table
//! GET  /api/v1/tables                   - List tables
//! POST /api/v1/tables/{id}/join         - Seat a player
//! POST /api/v1/tables/{id}/leave        - Remove a player
//! POST /api/v1/tables/{id}/shuffle      - Reset the deck (aborts a live hand)
//! POST /api/v1/tables/{id}/bet          - Open a new hand with a bet
//! POST /api/v1/tables/{id}/action       - Check / call / raise / fold
//! POST /api/v1/tables/{id}/draw         - Exchange cards in the draw phase
//! GET  /api/v1/tables/{id}/state        - Per-player snapshot (?player_id=)
//! POST /chat/send                       - Post a chat message
//! GET  /chat/messages                   - Fetch recent chat (?limit=)
//! ```
//!
//! There is no authentication layer: clients identify themselves by the
//! `player_id` they picked at join time, and each table actor serializes
//! its own mutations, so handlers stay thin request translators.

pub mod chat;
pub mod tables;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::TableDefaultsConfig;
use chat::ChatLog;
use draw_poker::table::TableRegistry;

/// Application state shared across all HTTP handlers. Cloned per
/// request; cheap thanks to the Arc wrappers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<TableRegistry>,
    pub chat: Arc<ChatLog>,
    pub defaults: Arc<TableDefaultsConfig>,
}

/// JSON error body: a human-readable message plus a stable machine code.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub(crate) fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: message.to_string(),
                code: "bad_request".to_string(),
            }),
        )
    }
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route(
            "/tables",
            get(tables::list_tables).post(tables::create_table),
        )
        .route("/tables/{table_id}/join", post(tables::join_table))
        .route("/tables/{table_id}/leave", post(tables::leave_table))
        .route("/tables/{table_id}/shuffle", post(tables::shuffle_table))
        .route("/tables/{table_id}/bet", post(tables::place_bet))
        .route("/tables/{table_id}/action", post(tables::take_action))
        .route("/tables/{table_id}/draw", post(tables::draw_cards))
        .route("/tables/{table_id}/state", get(tables::get_state));

    let chat_routes = Router::new()
        .route("/send", post(chat::send_message))
        .route("/messages", get(chat::get_messages));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .nest("/chat", chat_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let table_count = state.registry.table_count().await;
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "tables": table_count,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
