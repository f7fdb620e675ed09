//! The poker engine: cards, hand evaluation, the table state machine,
//! and per-player snapshot projection.

pub mod constants;
pub mod entities;
pub mod eval;
pub mod state_machine;
pub mod view;

pub use entities::{ActionLabel, Card, Chips, Deck, Phase, Player, PlayerAction, PlayerId, Suit};
pub use eval::{HandCategory, HandRank, best_indices, evaluate};
pub use state_machine::{GameError, GameSettings, PotAward, RevealedHand, ShowdownSummary, Table};
pub use view::{PlayerView, TableSnapshot};
