//! # Draw Poker
//!
//! A five-card-draw poker engine for serving one authoritative table to
//! polling clients.
//!
//! The core is a synchronous state machine ([`game::Table`]) that
//! validates every action, advances the hand through
//! waiting → betting_1 → drawing → betting_2 → showdown → waiting, and
//! projects per-player snapshots that hide opponents' hole cards. On top
//! of it sits an async actor layer ([`table`]): each table runs in its
//! own Tokio task and applies exactly one mutation at a time, so
//! concurrent clients are serialized in arrival order.
//!
//! ## Example
//!
//! ```
//! use draw_poker::game::{PlayerAction, Table};
//!
//! let mut table = Table::default();
//! table.join("p1".into(), "alice", 100).unwrap();
//! table.join("p2".into(), "bob", 100).unwrap();
//! table.open_bet("p1", 10).unwrap();
//! table.act("p2", PlayerAction::Call).unwrap();
//! ```

/// Core game logic, entities, and state machine.
pub mod game;

/// Async table actors and the session registry.
pub mod table;

pub use game::{GameError, GameSettings, PlayerAction, TableSnapshot};
pub use table::{TableConfig, TableHandle, TableId, TableMetadata, TableRegistry};
