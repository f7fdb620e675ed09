//! Table actor with async message handling.
//!
//! One actor owns one [`Table`] and drains its inbox a message at a
//! time: that loop is the per-table mutual-exclusion scope the engine
//! relies on. Reads reply with a snapshot copied inside the loop, so
//! every observer sees a consistent state and no client can block
//! another beyond queueing.

use log::{info, warn};
use tokio::{
    sync::{mpsc, oneshot},
    time::{Duration, Instant, interval},
};

use super::{
    TableId,
    config::TableConfig,
    messages::{TableMessage, TableMetadata, TableReply},
};
use crate::game::{
    Chips, GameError, GameSettings, Phase, PlayerAction, PlayerId, Table, TableSnapshot,
};

/// Inbox capacity per table; sends beyond this apply backpressure.
const INBOX_CAPACITY: usize = 100;

/// Turn-timeout granularity.
const TICK: Duration = Duration::from_millis(250);

/// Cloneable handle for talking to a table actor.
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    table_id: TableId,
}

impl TableHandle {
    #[must_use]
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> TableMessage,
    ) -> Result<T, GameError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(make(tx))
            .await
            .map_err(|_| GameError::TableClosed)?;
        rx.await.map_err(|_| GameError::TableClosed)
    }

    pub async fn join(
        &self,
        player_id: PlayerId,
        name: String,
        buy_in: Option<Chips>,
    ) -> TableReply {
        self.request(|reply| TableMessage::Join {
            player_id,
            name,
            buy_in,
            reply,
        })
        .await?
    }

    pub async fn leave(&self, player_id: PlayerId) -> TableReply {
        self.request(|reply| TableMessage::Leave { player_id, reply })
            .await?
    }

    pub async fn shuffle(&self) -> TableReply {
        self.request(|reply| TableMessage::Shuffle { reply }).await?
    }

    pub async fn open_bet(&self, player_id: PlayerId, amount: Chips) -> TableReply {
        self.request(|reply| TableMessage::OpenBet {
            player_id,
            amount,
            reply,
        })
        .await?
    }

    pub async fn take_action(&self, player_id: PlayerId, action: PlayerAction) -> TableReply {
        self.request(|reply| TableMessage::TakeAction {
            player_id,
            action,
            reply,
        })
        .await?
    }

    pub async fn draw(&self, player_id: PlayerId, held: Vec<usize>) -> TableReply {
        self.request(|reply| TableMessage::Draw {
            player_id,
            held,
            reply,
        })
        .await?
    }

    pub async fn state(&self, player_id: Option<PlayerId>) -> Result<TableSnapshot, GameError> {
        self.request(|reply| TableMessage::GetState { player_id, reply })
            .await
    }

    pub async fn metadata(&self) -> Result<TableMetadata, GameError> {
        self.request(|reply| TableMessage::GetMetadata { reply })
            .await
    }

    /// Ask the actor to shut down. Best-effort: a table that is already
    /// gone is fine.
    pub async fn close(&self) {
        let _ = self.sender.send(TableMessage::Close).await;
    }
}

/// Where the turn marker last pointed, for timeout detection.
#[derive(Clone, Debug, PartialEq, Eq)]
struct TurnMarker {
    hand: u64,
    phase: Phase,
    player_id: PlayerId,
}

/// Async actor owning a single table.
pub struct TableActor {
    id: TableId,
    config: TableConfig,
    table: Table,
    inbox: mpsc::Receiver<TableMessage>,
    turn_since: Option<(TurnMarker, Instant)>,
    closed: bool,
}

impl TableActor {
    #[must_use]
    pub fn new(id: TableId, config: TableConfig) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let settings = GameSettings::from(&config);
        let actor = Self {
            id,
            config,
            table: Table::new(settings),
            inbox,
            turn_since: None,
            closed: false,
        };
        let handle = TableHandle {
            sender,
            table_id: id,
        };
        (actor, handle)
    }

    /// Run the actor event loop until closed or all handles drop.
    pub async fn run(mut self) {
        info!("table {} '{}' starting", self.id, self.config.name);
        let mut tick = interval(TICK);
        loop {
            tokio::select! {
                message = self.inbox.recv() => match message {
                    Some(message) => {
                        self.handle_message(message);
                        if self.closed {
                            break;
                        }
                    }
                    None => break,
                },
                _ = tick.tick() => self.check_turn_timeout(),
            }
        }
        info!("table {} '{}' closed", self.id, self.config.name);
    }

    fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::Join {
                player_id,
                name,
                buy_in,
                reply,
            } => {
                let buy_in = buy_in.unwrap_or(self.config.default_buy_in);
                let result = self.table.join(player_id.clone(), &name, buy_in);
                let _ = reply.send(self.reply_for(result, Some(&player_id)));
            }
            TableMessage::Leave { player_id, reply } => {
                let result = self.table.leave(&player_id);
                let _ = reply.send(self.reply_for(result, None));
            }
            TableMessage::Shuffle { reply } => {
                self.table.shuffle();
                let _ = reply.send(Ok(TableSnapshot::project(&self.table, None)));
            }
            TableMessage::OpenBet {
                player_id,
                amount,
                reply,
            } => {
                let result = self.table.open_bet(&player_id, amount);
                let _ = reply.send(self.reply_for(result, Some(&player_id)));
            }
            TableMessage::TakeAction {
                player_id,
                action,
                reply,
            } => {
                let result = self.table.act(&player_id, action);
                let _ = reply.send(self.reply_for(result, Some(&player_id)));
            }
            TableMessage::Draw {
                player_id,
                held,
                reply,
            } => {
                let result = self.table.draw(&player_id, &held);
                let _ = reply.send(self.reply_for(result, Some(&player_id)));
            }
            TableMessage::GetState { player_id, reply } => {
                let _ = reply.send(TableSnapshot::project(&self.table, player_id.as_deref()));
            }
            TableMessage::GetMetadata { reply } => {
                let _ = reply.send(TableMetadata {
                    id: self.id,
                    name: self.config.name.clone(),
                    player_count: self.table.players.len(),
                    max_players: self.table.settings().max_players,
                    phase: self.table.phase(),
                    pot: self.table.pot(),
                    hand_count: self.table.hand_count(),
                });
            }
            TableMessage::Close => {
                self.closed = true;
            }
        }
    }

    fn reply_for(&self, result: Result<(), GameError>, viewer: Option<&str>) -> TableReply {
        result.map(|()| TableSnapshot::project(&self.table, viewer))
    }

    /// Auto-fold the active player once they have sat on the turn for
    /// longer than the configured timeout.
    fn check_turn_timeout(&mut self) {
        if self.config.turn_timeout_secs == 0 {
            return;
        }
        let marker = match (self.table.phase(), self.table.active_player_id()) {
            (Phase::Betting1 | Phase::Drawing | Phase::Betting2, Some(player_id)) => TurnMarker {
                hand: self.table.hand_count(),
                phase: self.table.phase(),
                player_id: player_id.clone(),
            },
            _ => {
                self.turn_since = None;
                return;
            }
        };
        match &self.turn_since {
            Some((current, since)) if *current == marker => {
                if since.elapsed() >= Duration::from_secs(self.config.turn_timeout_secs) {
                    warn!(
                        "table {}: {} timed out, auto-folding",
                        self.id, marker.player_id
                    );
                    let _ = self.table.force_fold(&marker.player_id, true);
                    self.turn_since = None;
                }
            }
            _ => self.turn_since = Some((marker, Instant::now())),
        }
    }
}
