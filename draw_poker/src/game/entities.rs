//! Core value types: cards, the deck, players, actions, and phases.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use super::constants::{self, ACE, DECK_SIZE, HAND_SIZE, JACK, KING, MIN_RANK, QUEEN};
use super::state_machine::GameError;

/// Type alias for whole chips. All bets and balances are non-negative
/// whole chips; an action that cannot be paid for is rejected rather
/// than driving a balance below zero.
pub type Chips = u32;

/// Player identifier as supplied (or generated) at join time.
pub type PlayerId = String;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    #[serde(rename = "♣")]
    Clubs,
    #[serde(rename = "♦")]
    Diamonds,
    #[serde(rename = "♥")]
    Hearts,
    #[serde(rename = "♠")]
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Clubs => "♣",
            Self::Diamonds => "♦",
            Self::Hearts => "♥",
            Self::Spades => "♠",
        };
        write!(f, "{repr}")
    }
}

/// A playing card. Rank values run 2..=14 with aces high; equality and
/// ordering are by (rank, suit). Serialized as `{"rank": "K", "suit": "♥"}`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "CardWire", into = "CardWire")]
pub struct Card {
    pub rank: u8,
    pub suit: Suit,
}

impl Card {
    #[must_use]
    pub const fn new(rank: u8, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// The wire/display name of this card's rank: `"2".."10"`, `"J"`,
    /// `"Q"`, `"K"`, `"A"`.
    #[must_use]
    pub fn rank_name(&self) -> String {
        match self.rank {
            JACK => "J".to_string(),
            QUEEN => "Q".to_string(),
            KING => "K".to_string(),
            ACE => "A".to_string(),
            v => v.to_string(),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = format!("{}/{}", self.rank_name(), self.suit);
        write!(f, "{repr:>4}")
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct CardWire {
    rank: String,
    suit: Suit,
}

impl From<Card> for CardWire {
    fn from(card: Card) -> Self {
        Self {
            rank: card.rank_name(),
            suit: card.suit,
        }
    }
}

impl TryFrom<CardWire> for Card {
    type Error = String;

    fn try_from(wire: CardWire) -> Result<Self, Self::Error> {
        let rank = match wire.rank.as_str() {
            "J" => JACK,
            "Q" => QUEEN,
            "K" => KING,
            "A" => ACE,
            v => v
                .parse::<u8>()
                .ok()
                .filter(|r| (MIN_RANK..JACK).contains(r))
                .ok_or_else(|| format!("unknown card rank {v:?}"))?,
        };
        Ok(Self {
            rank,
            suit: wire.suit,
        })
    }
}

/// A deck of cards with an undealt stack and a discard pile.
///
/// Invariant: dealt cards, undealt cards, and discards together form
/// exactly the 52-card universe. Dealing past the end of the undealt
/// stack recycles the discard pile rather than failing; only a table
/// holding more than 52 live cards could make `deal` error, and the
/// engine never does that.
#[derive(Clone, Debug)]
pub struct Deck {
    undealt: Vec<Card>,
    discards: Vec<Card>,
}

impl Default for Deck {
    fn default() -> Self {
        let mut undealt = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL {
            for rank in MIN_RANK..=ACE {
                undealt.push(Card::new(rank, suit));
            }
        }
        Self {
            undealt,
            discards: Vec::new(),
        }
    }
}

impl Deck {
    /// Fresh deck in a uniformly random order with an empty discard pile.
    #[must_use]
    pub fn shuffled() -> Self {
        let mut deck = Self::default();
        deck.shuffle();
        deck
    }

    /// Re-randomize the undealt cards and clear the discard pile back
    /// into the deck. Cards currently held by players stay out.
    pub fn shuffle(&mut self) {
        self.undealt.append(&mut self.discards);
        self.undealt.shuffle(&mut rand::rng());
    }

    /// Deal the next `n` cards. When the undealt stack runs short the
    /// discard pile is shuffled back in first; `DeckExhausted` is only
    /// possible if more than 52 cards are simultaneously live.
    pub fn deal(&mut self, n: usize) -> Result<Vec<Card>, GameError> {
        if self.undealt.len() < n && !self.discards.is_empty() {
            let mut recycled = std::mem::take(&mut self.discards);
            recycled.shuffle(&mut rand::rng());
            // Recycled cards go under the remaining undealt cards.
            recycled.append(&mut self.undealt);
            self.undealt = recycled;
        }
        if self.undealt.len() < n {
            return Err(GameError::DeckExhausted);
        }
        Ok(self.undealt.split_off(self.undealt.len() - n))
    }

    /// Deal a full five-card hand.
    pub fn deal_hand(&mut self) -> Result<[Card; HAND_SIZE], GameError> {
        let cards = self.deal(HAND_SIZE)?;
        cards.try_into().map_err(|_| GameError::DeckExhausted)
    }

    /// Move replaced cards to the discard pile.
    pub fn discard<I>(&mut self, cards: I)
    where
        I: IntoIterator<Item = Card>,
    {
        self.discards.extend(cards);
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.undealt.len()
    }

    #[must_use]
    pub fn discard_count(&self) -> usize {
        self.discards.len()
    }
}

/// Current table phase. The serialized names are part of the wire
/// contract and must not change.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Phase {
    #[serde(rename = "waiting")]
    Waiting,
    #[serde(rename = "betting_1")]
    Betting1,
    #[serde(rename = "drawing")]
    Drawing,
    #[serde(rename = "betting_2")]
    Betting2,
    #[serde(rename = "showdown")]
    Showdown,
}

impl Phase {
    #[must_use]
    pub const fn is_betting(self) -> bool {
        matches!(self, Self::Betting1 | Self::Betting2)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Betting1 => "betting_1",
            Self::Drawing => "drawing",
            Self::Betting2 => "betting_2",
            Self::Showdown => "showdown",
        };
        write!(f, "{repr}")
    }
}

/// A betting action as validated by the state machine. `Check` is a
/// zero-chip call; a `Raise` carries the new total bet level for the
/// round, not the increment.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PlayerAction {
    Check,
    Call,
    Raise(Chips),
    Fold,
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Check => "check".to_string(),
            Self::Call => "call".to_string(),
            Self::Raise(amount) => format!("raise to {amount}"),
            Self::Fold => "fold".to_string(),
        };
        write!(f, "{repr}")
    }
}

/// Human-readable label for the last thing a player did, shown to
/// everyone in the snapshot. Serialized as its display string.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ActionLabel {
    Bet(Chips),
    Check,
    Call(Chips),
    Raise(Chips),
    Fold,
    Draw(usize),
    Win(Chips),
    TimedOut,
}

impl fmt::Display for ActionLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Bet(amount) => format!("bets {amount}"),
            Self::Check => "checks".to_string(),
            Self::Call(amount) => format!("calls {amount}"),
            Self::Raise(amount) => format!("raises to {amount}"),
            Self::Fold => "folds".to_string(),
            Self::Draw(n) => match n {
                0 => "stands pat".to_string(),
                1 => "draws 1 card".to_string(),
                n => format!("draws {n} cards"),
            },
            Self::Win(amount) => format!("wins {amount}"),
            Self::TimedOut => "folds (timed out)".to_string(),
        };
        write!(f, "{repr}")
    }
}

impl Serialize for ActionLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// A seated player. Seat order is fixed at join time and entries
/// persist across hands until the player leaves.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub balance: Chips,
    /// Absent outside a hand; exactly five cards during one.
    pub hand: Option<[Card; HAND_SIZE]>,
    /// Chips committed in the current betting round.
    pub round_bet: Chips,
    /// Total chips committed this hand; refunded if the hand is aborted.
    pub hand_bet: Chips,
    pub folded: bool,
    /// Cleared when the player leaves mid-hand; the seat is released
    /// once the hand concludes.
    pub connected: bool,
    pub has_drawn: bool,
    /// True once this player has matched `current_bet` since the last
    /// raise. The betting round closes only when every un-folded player
    /// carries this flag, so a fold never counts toward the close.
    pub has_called: bool,
    pub last_action: Option<ActionLabel>,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: &str, balance: Chips) -> Self {
        let mut name: String = name
            .chars()
            .map(|c| if c.is_whitespace() { ' ' } else { c })
            .collect();
        name.truncate(constants::MAX_NAME_LENGTH);
        Self {
            id,
            name,
            balance,
            hand: None,
            round_bet: 0,
            hand_bet: 0,
            folded: false,
            connected: true,
            has_drawn: false,
            has_called: false,
            last_action: None,
        }
    }

    /// Reset per-hand state ahead of a fresh deal.
    pub fn reset_for_hand(&mut self) {
        self.hand = None;
        self.round_bet = 0;
        self.hand_bet = 0;
        self.folded = false;
        self.has_drawn = false;
        self.has_called = false;
        self.last_action = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn fresh_deck_is_the_52_card_universe() {
        let deck = Deck::default();
        assert_eq!(deck.remaining(), DECK_SIZE);
        let unique: BTreeSet<_> = deck.undealt.iter().copied().collect();
        assert_eq!(unique.len(), DECK_SIZE);
    }

    #[test]
    fn dealing_preserves_the_card_multiset() {
        let mut deck = Deck::shuffled();
        let mut live = Vec::new();
        live.extend(deck.deal(5).unwrap());
        live.extend(deck.deal(3).unwrap());
        assert_eq!(deck.remaining(), DECK_SIZE - 8);

        let mut all: Vec<Card> = live.clone();
        all.extend(deck.undealt.iter().copied());
        let unique: BTreeSet<_> = all.iter().copied().collect();
        assert_eq!(unique.len(), DECK_SIZE);
    }

    #[test]
    fn discards_are_recycled_instead_of_failing() {
        let mut deck = Deck::shuffled();
        let hand = deck.deal(47).unwrap();
        deck.discard(hand);
        assert_eq!(deck.remaining(), 5);
        // 10 > 5 remaining, so the 47 discards must come back in.
        let cards = deck.deal(10).unwrap();
        assert_eq!(cards.len(), 10);
        assert_eq!(deck.discard_count(), 0);
        assert_eq!(deck.remaining(), DECK_SIZE - 10);
    }

    #[test]
    fn deal_errors_only_when_the_universe_is_short() {
        let mut deck = Deck::shuffled();
        let _ = deck.deal(50).unwrap();
        assert_eq!(deck.deal(3), Err(GameError::DeckExhausted));
        // The failed deal must not consume the remaining cards.
        assert_eq!(deck.remaining(), 2);
    }

    #[test]
    fn card_serializes_with_the_wire_vocabulary() {
        let card = Card::new(KING, Suit::Hearts);
        let json = serde_json::to_value(card).unwrap();
        assert_eq!(json, serde_json::json!({"rank": "K", "suit": "♥"}));

        let ten = Card::new(10, Suit::Spades);
        let json = serde_json::to_value(ten).unwrap();
        assert_eq!(json, serde_json::json!({"rank": "10", "suit": "♠"}));
    }

    #[test]
    fn card_deserializes_from_the_wire_vocabulary() {
        let card: Card = serde_json::from_str(r#"{"rank": "A", "suit": "♦"}"#).unwrap();
        assert_eq!(card, Card::new(ACE, Suit::Diamonds));
        let card: Card = serde_json::from_str(r#"{"rank": "7", "suit": "♣"}"#).unwrap();
        assert_eq!(card, Card::new(7, Suit::Clubs));
        assert!(serde_json::from_str::<Card>(r#"{"rank": "15", "suit": "♣"}"#).is_err());
        assert!(serde_json::from_str::<Card>(r#"{"rank": "X", "suit": "♣"}"#).is_err());
    }

    #[test]
    fn phase_names_match_the_wire_contract() {
        for (phase, name) in [
            (Phase::Waiting, "waiting"),
            (Phase::Betting1, "betting_1"),
            (Phase::Drawing, "drawing"),
            (Phase::Betting2, "betting_2"),
            (Phase::Showdown, "showdown"),
        ] {
            assert_eq!(serde_json::to_value(phase).unwrap(), name);
            assert_eq!(phase.to_string(), name);
        }
    }

    #[test]
    fn action_labels_read_like_chat_lines() {
        assert_eq!(ActionLabel::Bet(10).to_string(), "bets 10");
        assert_eq!(ActionLabel::Draw(0).to_string(), "stands pat");
        assert_eq!(ActionLabel::Draw(1).to_string(), "draws 1 card");
        assert_eq!(ActionLabel::Draw(3).to_string(), "draws 3 cards");
        assert_eq!(
            serde_json::to_value(ActionLabel::Raise(20)).unwrap(),
            "raises to 20"
        );
    }

    #[test]
    fn player_names_are_truncated() {
        let player = Player::new("p1".into(), &"x".repeat(100), 100);
        assert_eq!(player.name.len(), constants::MAX_NAME_LENGTH);
    }
}
