//! Per-player snapshot projection.
//!
//! Everything a client renders comes from here. A requester always sees
//! their own hand; opponents' hole cards stay hidden until the hand's
//! showdown summary reveals them. Folded hands are never revealed.

use serde::Serialize;

use super::entities::{ActionLabel, Card, Chips, Phase, PlayerId};
use super::eval;
use super::state_machine::{ShowdownSummary, Table};

/// One seat as visible to the requesting player.
#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub balance: Chips,
    pub round_bet: Chips,
    pub folded: bool,
    pub connected: bool,
    pub last_action: Option<ActionLabel>,
    /// `null` whenever this seat's cards are hidden from the requester.
    pub hand: Option<Vec<Card>>,
    /// Rank label, present exactly when `hand` is.
    pub rank: Option<String>,
}

/// The read-only, per-player-filtered table state.
#[derive(Clone, Debug, Serialize)]
pub struct TableSnapshot {
    pub phase: Phase,
    pub pot: Chips,
    pub current_bet: Chips,
    pub active_player_id: Option<PlayerId>,
    pub dealer_id: Option<PlayerId>,
    pub deck_count: usize,
    pub hand_count: u64,
    pub players: Vec<PlayerView>,
    /// The requester's own balance, hand, and rank label, mirrored at
    /// the top level for convenience.
    pub balance: Option<Chips>,
    pub hand: Option<Vec<Card>>,
    pub rank: Option<String>,
    pub last_showdown: Option<ShowdownSummary>,
}

impl TableSnapshot {
    /// Project the table as seen by `viewer` (`None` for a spectator,
    /// who sees no hole cards at all).
    #[must_use]
    pub fn project(table: &Table, viewer: Option<&str>) -> Self {
        let summary = table.last_showdown();
        let players: Vec<PlayerView> = table
            .players
            .iter()
            .map(|player| {
                let own = viewer == Some(player.id.as_str());
                let mut hand = if own {
                    player.hand.map(|cards| cards.to_vec())
                } else {
                    None
                };
                // Between hands the showdown summary re-reveals what the
                // table already showed everyone.
                if hand.is_none() {
                    hand = summary.and_then(|s| {
                        s.revealed
                            .iter()
                            .find(|r| r.player_id == player.id)
                            .map(|r| r.cards.clone())
                    });
                }
                let rank = hand.as_deref().and_then(rank_label);
                PlayerView {
                    id: player.id.clone(),
                    name: player.name.clone(),
                    balance: player.balance,
                    round_bet: player.round_bet,
                    folded: player.folded,
                    connected: player.connected,
                    last_action: player.last_action,
                    hand,
                    rank,
                }
            })
            .collect();

        let me = viewer.and_then(|id| players.iter().find(|p| p.id == id));
        Self {
            phase: table.phase(),
            pot: table.pot(),
            current_bet: table.current_bet(),
            active_player_id: table.active_player_id().cloned(),
            dealer_id: table.dealer_id().cloned(),
            deck_count: table.deck_remaining(),
            hand_count: table.hand_count(),
            balance: me.map(|p| p.balance),
            hand: me.and_then(|p| p.hand.clone()),
            rank: me.and_then(|p| p.rank.clone()),
            players,
            last_showdown: summary.cloned(),
        }
    }
}

fn rank_label(cards: &[Card]) -> Option<String> {
    let cards: &[Card; 5] = cards.try_into().ok()?;
    Some(eval::evaluate(cards).category.label().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::PlayerAction;

    fn two_player_table() -> Table {
        let mut table = Table::default();
        table.join("p1".into(), "alice", 100).unwrap();
        table.join("p2".into(), "bob", 100).unwrap();
        table
    }

    #[test]
    fn opponents_hole_cards_are_hidden_mid_hand() {
        let mut table = two_player_table();
        table.open_bet("p1", 10).unwrap();

        let snapshot = TableSnapshot::project(&table, Some("p1"));
        assert_eq!(snapshot.phase, Phase::Betting1);
        assert_eq!(snapshot.pot, 10);
        assert_eq!(snapshot.balance, Some(90));
        assert_eq!(snapshot.hand.as_ref().unwrap().len(), 5);
        assert!(snapshot.rank.is_some());

        let p1 = &snapshot.players[0];
        let p2 = &snapshot.players[1];
        assert!(p1.hand.is_some());
        assert!(p2.hand.is_none());
        assert!(p2.rank.is_none());
        // Public fields stay visible for everyone.
        assert_eq!(p2.balance, 100);
        assert_eq!(snapshot.active_player_id.as_deref(), Some("p2"));
    }

    #[test]
    fn spectators_see_no_hole_cards() {
        let mut table = two_player_table();
        table.open_bet("p1", 10).unwrap();
        let snapshot = TableSnapshot::project(&table, None);
        assert!(snapshot.players.iter().all(|p| p.hand.is_none()));
        assert!(snapshot.balance.is_none());
        assert!(snapshot.hand.is_none());
    }

    #[test]
    fn showdown_summary_reveals_contenders_to_everyone() {
        let mut table = two_player_table();
        table.open_bet("p1", 10).unwrap();
        table.act("p2", PlayerAction::Call).unwrap();
        table.draw("p1", &[0, 1, 2, 3, 4]).unwrap();
        table.draw("p2", &[0, 1, 2, 3, 4]).unwrap();
        table.act("p1", PlayerAction::Check).unwrap();
        table.act("p2", PlayerAction::Check).unwrap();
        assert_eq!(table.phase(), Phase::Waiting);

        let snapshot = TableSnapshot::project(&table, Some("p2"));
        let summary = snapshot.last_showdown.as_ref().unwrap();
        assert_eq!(summary.revealed.len(), 2);
        // Both hands are visible to p2 once the hand is over.
        assert!(snapshot.players.iter().all(|p| p.hand.is_some()));
        assert!(snapshot.players.iter().all(|p| p.rank.is_some()));
    }

    #[test]
    fn folded_hands_are_never_revealed() {
        let mut table = two_player_table();
        table.open_bet("p1", 10).unwrap();
        table.act("p2", PlayerAction::Fold).unwrap();
        assert_eq!(table.phase(), Phase::Waiting);

        let snapshot = TableSnapshot::project(&table, Some("p1"));
        let summary = snapshot.last_showdown.as_ref().unwrap();
        assert!(summary.revealed.is_empty());
        assert!(snapshot.players.iter().all(|p| p.hand.is_none()));
    }

    #[test]
    fn snapshot_serializes_the_contract_fields() {
        let mut table = two_player_table();
        table.open_bet("p1", 10).unwrap();
        let snapshot = TableSnapshot::project(&table, Some("p1"));
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["phase"], "betting_1");
        assert_eq!(json["pot"], 10);
        assert_eq!(json["current_bet"], 10);
        assert_eq!(json["active_player_id"], "p2");
        assert_eq!(json["balance"], 90);
        assert!(json["hand"][0]["rank"].is_string());
        assert!(json["hand"][0]["suit"].is_string());
        assert!(json["players"][1]["hand"].is_null());
        assert_eq!(json["players"][0]["last_action"], "bets 10");
    }
}
