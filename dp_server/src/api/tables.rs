//! Table management API handlers.
//!
//! HTTP endpoints for table lifecycle and game play: creating and
//! listing tables, seating players, starting hands with an opening bet,
//! betting actions, the draw exchange, and per-player state reads.
//!
//! # Examples
//!
//! List all tables:
//! ```bash
//! curl http://localhost:8000/api/v1/tables
//! ```
//!
//! Join a table:
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/tables/1/join \
//!   -H "Content-Type: application/json" \
//!   -d '{"player_id": "p1", "name": "Alice"}'
//! ```

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use draw_poker::game::{Chips, GameError, PlayerAction, TableSnapshot};
use draw_poker::table::{TableConfig, TableHandle, TableId, TableMetadata};

use super::{AppState, ErrorResponse};

#[derive(Debug, Deserialize)]
pub struct CreateTableRequest {
    pub name: String,
    pub max_players: Option<usize>,
    pub default_buy_in: Option<Chips>,
    pub min_open_bet: Option<Chips>,
    pub turn_timeout_secs: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct CreateTableResponse {
    pub id: TableId,
}

#[derive(Debug, Deserialize)]
pub struct JoinTableRequest {
    pub player_id: String,
    pub name: String,
    pub buy_in: Option<Chips>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerRequest {
    pub player_id: String,
}

#[derive(Debug, Deserialize)]
pub struct OpenBetRequest {
    pub player_id: String,
    pub amount: Chips,
}

#[derive(Debug, Deserialize)]
pub struct TakeActionRequest {
    pub player_id: String,
    #[serde(flatten)]
    pub action: ActionPayload,
}

/// Wire form of a betting action: `{"action": "raise", "amount": 20}`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionPayload {
    Check,
    Call,
    Raise { amount: Chips },
    Fold,
}

impl From<ActionPayload> for PlayerAction {
    fn from(payload: ActionPayload) -> Self {
        match payload {
            ActionPayload::Check => PlayerAction::Check,
            ActionPayload::Call => PlayerAction::Call,
            ActionPayload::Raise { amount } => PlayerAction::Raise(amount),
            ActionPayload::Fold => PlayerAction::Fold,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DrawRequest {
    pub player_id: String,
    /// Indices (0..=4) of the cards to keep.
    pub held: Vec<usize>,
}

#[derive(Debug, Deserialize)]
pub struct StateQuery {
    pub player_id: Option<String>,
}

/// Map an engine error onto an HTTP status and a stable error code.
fn game_error_response(err: &GameError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code) = match err {
        GameError::InvalidAmount => (StatusCode::BAD_REQUEST, "invalid_amount"),
        GameError::InvalidDraw => (StatusCode::BAD_REQUEST, "invalid_draw"),
        GameError::InsufficientBalance => (StatusCode::BAD_REQUEST, "insufficient_balance"),
        GameError::NotYourTurn => (StatusCode::CONFLICT, "not_your_turn"),
        GameError::WrongPhase { .. } => (StatusCode::CONFLICT, "wrong_phase"),
        GameError::AlreadySeated => (StatusCode::CONFLICT, "already_seated"),
        GameError::TableFull => (StatusCode::CONFLICT, "table_full"),
        GameError::NoPlayers => (StatusCode::CONFLICT, "no_players"),
        GameError::UnknownPlayer => (StatusCode::NOT_FOUND, "unknown_player"),
        GameError::TableClosed => (StatusCode::GONE, "table_closed"),
        GameError::DeckExhausted => (StatusCode::INTERNAL_SERVER_ERROR, "deck_exhausted"),
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: code.to_string(),
        }),
    )
}

fn unknown_table() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "unknown table".to_string(),
            code: "unknown_table".to_string(),
        }),
    )
}

async fn lookup(
    state: &AppState,
    table_id: TableId,
) -> Result<TableHandle, (StatusCode, Json<ErrorResponse>)> {
    state.registry.get(table_id).await.ok_or_else(unknown_table)
}

/// Announce the requester's latest action, and any hand result, on the
/// shared chat feed.
fn announce(state: &AppState, snapshot: &TableSnapshot, player_id: &str) {
    if let Some(player) = snapshot.players.iter().find(|p| p.id == player_id)
        && let Some(label) = player.last_action
    {
        state.chat.push("table", format!("{} {label}", player.name));
    }
    if let Some(summary) = &snapshot.last_showdown {
        for award in &summary.winners {
            let name = snapshot
                .players
                .iter()
                .find(|p| p.id == award.player_id)
                .map_or(award.player_id.as_str(), |p| p.name.as_str());
            state
                .chat
                .push("table", format!("{name} wins {} chips", award.amount));
        }
    }
}

/// Create a new table.
///
/// Unspecified fields fall back to the server's table defaults.
///
/// # Errors
///
/// - `400 Bad Request`: invalid table configuration
pub async fn create_table(
    State(state): State<AppState>,
    Json(request): Json<CreateTableRequest>,
) -> Result<(StatusCode, Json<CreateTableResponse>), (StatusCode, Json<ErrorResponse>)> {
    let defaults = &state.defaults;
    let config = TableConfig {
        name: request.name,
        max_players: request.max_players.unwrap_or(defaults.max_players),
        default_buy_in: request.default_buy_in.unwrap_or(defaults.default_buy_in),
        min_open_bet: request.min_open_bet.unwrap_or(defaults.min_open_bet),
        turn_timeout_secs: request
            .turn_timeout_secs
            .unwrap_or(defaults.turn_timeout_secs),
    };
    match state.registry.create(config).await {
        Ok(id) => Ok((StatusCode::CREATED, Json(CreateTableResponse { id }))),
        Err(reason) => Err(ErrorResponse::bad_request(&reason)),
    }
}

/// List all active tables.
pub async fn list_tables(State(state): State<AppState>) -> Json<Vec<TableMetadata>> {
    Json(state.registry.list().await)
}

/// Seat a player at a table.
///
/// # Errors
///
/// - `404 Not Found`: unknown table
/// - `409 Conflict`: duplicate player id, full table, or a hand in progress
pub async fn join_table(
    State(state): State<AppState>,
    Path(table_id): Path<TableId>,
    Json(request): Json<JoinTableRequest>,
) -> Result<Json<TableSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    let handle = lookup(&state, table_id).await?;
    match handle
        .join(request.player_id.clone(), request.name, request.buy_in)
        .await
    {
        Ok(snapshot) => {
            if let Some(player) = snapshot.players.iter().find(|p| p.id == request.player_id) {
                state
                    .chat
                    .push("table", format!("{} joined the table", player.name));
            }
            Ok(Json(snapshot))
        }
        Err(err) => Err(game_error_response(&err)),
    }
}

/// Remove a player from a table, folding them first if a hand is live.
pub async fn leave_table(
    State(state): State<AppState>,
    Path(table_id): Path<TableId>,
    Json(request): Json<PlayerRequest>,
) -> Result<Json<TableSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    let handle = lookup(&state, table_id).await?;
    match handle.leave(request.player_id).await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(err) => Err(game_error_response(&err)),
    }
}

/// Reset the table's deck. A hand in progress is aborted with every
/// committed chip refunded.
pub async fn shuffle_table(
    State(state): State<AppState>,
    Path(table_id): Path<TableId>,
) -> Result<Json<TableSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    let handle = lookup(&state, table_id).await?;
    match handle.shuffle().await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(err) => Err(game_error_response(&err)),
    }
}

/// Start a new hand with an opening bet.
///
/// # Errors
///
/// - `400 Bad Request`: bad amount or insufficient balance
/// - `409 Conflict`: a hand is already in progress
pub async fn place_bet(
    State(state): State<AppState>,
    Path(table_id): Path<TableId>,
    Json(request): Json<OpenBetRequest>,
) -> Result<Json<TableSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    let handle = lookup(&state, table_id).await?;
    match handle
        .open_bet(request.player_id.clone(), request.amount)
        .await
    {
        Ok(snapshot) => {
            announce(&state, &snapshot, &request.player_id);
            Ok(Json(snapshot))
        }
        Err(err) => Err(game_error_response(&err)),
    }
}

/// Apply a betting action for the active player.
///
/// # Errors
///
/// - `400 Bad Request`: bad amount or insufficient balance
/// - `409 Conflict`: out of turn or out of phase
pub async fn take_action(
    State(state): State<AppState>,
    Path(table_id): Path<TableId>,
    Json(request): Json<TakeActionRequest>,
) -> Result<Json<TableSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    let handle = lookup(&state, table_id).await?;
    match handle
        .take_action(request.player_id.clone(), request.action.into())
        .await
    {
        Ok(snapshot) => {
            announce(&state, &snapshot, &request.player_id);
            Ok(Json(snapshot))
        }
        Err(err) => Err(game_error_response(&err)),
    }
}

/// Exchange cards in the draw phase. `held` names the indices to keep.
pub async fn draw_cards(
    State(state): State<AppState>,
    Path(table_id): Path<TableId>,
    Json(request): Json<DrawRequest>,
) -> Result<Json<TableSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    let handle = lookup(&state, table_id).await?;
    match handle.draw(request.player_id.clone(), request.held).await {
        Ok(snapshot) => {
            announce(&state, &snapshot, &request.player_id);
            Ok(Json(snapshot))
        }
        Err(err) => Err(game_error_response(&err)),
    }
}

/// Read the table as seen by `player_id`, or by a spectator when the
/// query parameter is absent.
pub async fn get_state(
    State(state): State<AppState>,
    Path(table_id): Path<TableId>,
    Query(query): Query<StateQuery>,
) -> Result<Json<TableSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    let handle = lookup(&state, table_id).await?;
    match handle.state(query.player_id).await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(err) => Err(game_error_response(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_payloads_deserialize_from_the_wire_shape() {
        let check: ActionPayload = serde_json::from_str(r#"{"action": "check"}"#).unwrap();
        assert!(matches!(PlayerAction::from(check), PlayerAction::Check));

        let raise: ActionPayload =
            serde_json::from_str(r#"{"action": "raise", "amount": 20}"#).unwrap();
        assert!(matches!(
            PlayerAction::from(raise),
            PlayerAction::Raise(20)
        ));

        assert!(serde_json::from_str::<ActionPayload>(r#"{"action": "splash"}"#).is_err());
    }

    #[test]
    fn errors_map_to_documented_statuses() {
        let (status, body) = game_error_response(&GameError::NotYourTurn);
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.code, "not_your_turn");

        let (status, _) = game_error_response(&GameError::InvalidDraw);
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = game_error_response(&GameError::TableClosed);
        assert_eq!(status, StatusCode::GONE);
    }
}
