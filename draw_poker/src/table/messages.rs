//! Table actor message types.

use tokio::sync::oneshot;

use crate::game::{Chips, GameError, PlayerAction, PlayerId, TableSnapshot};

/// Result of a table operation: the requester's fresh snapshot on
/// success, the typed engine error otherwise.
pub type TableReply = Result<TableSnapshot, GameError>;

/// Messages a [`super::TableActor`] accepts. Each mutating message
/// carries the acting player's id and a oneshot for the reply; the
/// actor applies them strictly one at a time.
#[derive(Debug)]
pub enum TableMessage {
    /// Seat a player.
    Join {
        player_id: PlayerId,
        name: String,
        buy_in: Option<Chips>,
        reply: oneshot::Sender<TableReply>,
    },

    /// Remove a player (folding them first if a hand is live).
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<TableReply>,
    },

    /// Reset the deck; aborts and refunds a hand in progress.
    Shuffle { reply: oneshot::Sender<TableReply> },

    /// Start a new hand with an opening bet.
    OpenBet {
        player_id: PlayerId,
        amount: Chips,
        reply: oneshot::Sender<TableReply>,
    },

    /// Apply a betting action (check, call, raise, fold).
    TakeAction {
        player_id: PlayerId,
        action: PlayerAction,
        reply: oneshot::Sender<TableReply>,
    },

    /// Apply the draw-phase card replacement.
    Draw {
        player_id: PlayerId,
        held: Vec<usize>,
        reply: oneshot::Sender<TableReply>,
    },

    /// Read-only snapshot for a player (or a spectator when `None`).
    GetState {
        player_id: Option<PlayerId>,
        reply: oneshot::Sender<TableSnapshot>,
    },

    /// Table metadata for registry listings.
    GetMetadata {
        reply: oneshot::Sender<TableMetadata>,
    },

    /// Shut the table down; the inbox closes and pending senders see
    /// the table as closed.
    Close,
}

/// Summary of one table for discovery listings.
#[derive(Clone, Debug, serde::Serialize)]
pub struct TableMetadata {
    pub id: super::TableId,
    pub name: String,
    pub player_count: usize,
    pub max_players: usize,
    pub phase: crate::game::Phase,
    pub pot: Chips,
    pub hand_count: u64,
}
