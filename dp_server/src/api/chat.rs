//! Chat API handlers.
//!
//! The chat log is deliberately independent of game state: it accepts
//! messages in any phase and survives hands, shuffles, and table
//! closures. The server also appends action announcements here so
//! clients get one merged feed.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use uuid::Uuid;

use super::{AppState, ErrorResponse};

/// Messages returned by `GET /chat/messages` when no limit is given.
const DEFAULT_LIMIT: usize = 50;

/// Longest accepted message text, in characters.
const MAX_TEXT_LENGTH: usize = 500;

/// One chat entry. System announcements use `"table"` as the sender id.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub player_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// In-memory chat backlog with a fixed retention cap. The std mutex is
/// fine here: every critical section is a short push or copy.
#[derive(Debug)]
pub struct ChatLog {
    messages: Mutex<VecDeque<ChatMessage>>,
    capacity: usize,
}

impl ChatLog {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: Mutex::new(VecDeque::with_capacity(capacity.min(256))),
            capacity: capacity.max(1),
        }
    }

    /// Append a message, evicting the oldest entries beyond the cap.
    pub fn push(&self, player_id: impl Into<String>, text: impl Into<String>) -> ChatMessage {
        let message = ChatMessage {
            id: Uuid::new_v4(),
            player_id: player_id.into(),
            text: text.into(),
            timestamp: Utc::now(),
        };
        let mut messages = self.messages.lock().unwrap_or_else(|e| e.into_inner());
        messages.push_back(message.clone());
        while messages.len() > self.capacity {
            messages.pop_front();
        }
        message
    }

    /// The newest `limit` messages, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<ChatMessage> {
        let messages = self.messages.lock().unwrap_or_else(|e| e.into_inner());
        let skip = messages.len().saturating_sub(limit);
        messages.iter().skip(skip).cloned().collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub player_id: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub limit: Option<usize>,
}

/// Post a chat message.
///
/// # Errors
///
/// - `400 Bad Request`: empty sender, empty text, or oversized text
pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<ChatMessage>, (StatusCode, Json<ErrorResponse>)> {
    let text = request.text.trim();
    if request.player_id.is_empty() || text.is_empty() {
        return Err(ErrorResponse::bad_request(
            "player_id and text must be non-empty",
        ));
    }
    if text.chars().count() > MAX_TEXT_LENGTH {
        return Err(ErrorResponse::bad_request("message text is too long"));
    }
    Ok(Json(state.chat.push(request.player_id, text)))
}

/// Fetch the newest chat messages, oldest first.
pub async fn get_messages(
    State(state): State<AppState>,
    Query(query): Query<MessagesQuery>,
) -> Json<Vec<ChatMessage>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    Json(state.chat.recent(limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retains_only_the_newest_messages() {
        let log = ChatLog::new(3);
        for i in 0..5 {
            log.push("p1", format!("message {i}"));
        }
        let recent = log.recent(10);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].text, "message 2");
        assert_eq!(recent[2].text, "message 4");
    }

    #[test]
    fn recent_returns_oldest_first_within_the_limit() {
        let log = ChatLog::new(100);
        log.push("p1", "first");
        log.push("p2", "second");
        log.push("p1", "third");
        let recent = log.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].text, "second");
        assert_eq!(recent[1].text, "third");
        assert_ne!(recent[0].id, recent[1].id);
    }
}
