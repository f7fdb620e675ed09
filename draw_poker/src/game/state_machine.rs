//! The session state machine.
//!
//! One `Table` is the single unit of mutation: every operation validates
//! first and only touches state on success, so a rejected request leaves
//! the table exactly as it was. Phases advance
//! waiting → betting_1 → drawing → betting_2 → showdown → waiting, with
//! an early exit straight to the pot award whenever only one un-folded
//! player remains.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use super::constants::HAND_SIZE;
use super::entities::{ActionLabel, Card, Chips, Deck, Phase, Player, PlayerAction, PlayerId};
use super::eval::{self, HandRank};

/// Errors a table operation can return. All are local and non-mutating.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("not your turn")]
    NotYourTurn,
    #[error("invalid bet amount")]
    InvalidAmount,
    #[error("invalid draw selection")]
    InvalidDraw,
    #[error("action not allowed while the table is {phase}")]
    WrongPhase { phase: Phase },
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("deck exhausted")]
    DeckExhausted,
    #[error("unknown player")]
    UnknownPlayer,
    #[error("player id already seated")]
    AlreadySeated,
    #[error("table is full")]
    TableFull,
    #[error("no seated players")]
    NoPlayers,
    #[error("table is closed")]
    TableClosed,
}

/// Per-table game settings, fixed at table creation.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameSettings {
    pub max_players: usize,
    pub default_buy_in: Chips,
    pub min_open_bet: Chips,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            max_players: super::constants::MAX_PLAYERS,
            default_buy_in: super::constants::DEFAULT_BUY_IN,
            min_open_bet: 1,
        }
    }
}

/// One player's revealed cards at showdown. Folded hands never appear here.
#[derive(Clone, Debug, Serialize)]
pub struct RevealedHand {
    pub player_id: PlayerId,
    pub name: String,
    pub cards: Vec<Card>,
    pub rank: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct PotAward {
    pub player_id: PlayerId,
    pub amount: Chips,
}

/// Outcome of the most recently concluded hand. Published in snapshots
/// so polling clients see the reveal even though the table itself has
/// already returned to `waiting`.
#[derive(Clone, Debug, Serialize)]
pub struct ShowdownSummary {
    pub hand_id: u64,
    pub pot: Chips,
    pub revealed: Vec<RevealedHand>,
    pub winners: Vec<PotAward>,
}

/// The authoritative table state for one session.
#[derive(Debug)]
pub struct Table {
    pub(crate) settings: GameSettings,
    pub(crate) deck: Deck,
    /// Seat order is fixed at join time.
    pub players: Vec<Player>,
    pub(crate) pot: Chips,
    pub(crate) phase: Phase,
    pub(crate) current_bet: Chips,
    pub(crate) active_idx: Option<usize>,
    pub(crate) dealer_idx: usize,
    pub(crate) hand_count: u64,
    pub(crate) last_showdown: Option<ShowdownSummary>,
}

impl Default for Table {
    fn default() -> Self {
        Self::new(GameSettings::default())
    }
}

impl Table {
    #[must_use]
    pub fn new(settings: GameSettings) -> Self {
        Self {
            settings,
            deck: Deck::shuffled(),
            players: Vec::with_capacity(settings.max_players),
            pot: 0,
            phase: Phase::Waiting,
            current_bet: 0,
            active_idx: None,
            dealer_idx: 0,
            hand_count: 0,
            last_showdown: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn pot(&self) -> Chips {
        self.pot
    }

    #[must_use]
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }

    #[must_use]
    pub fn hand_count(&self) -> u64 {
        self.hand_count
    }

    #[must_use]
    pub fn deck_remaining(&self) -> usize {
        self.deck.remaining()
    }

    #[must_use]
    pub fn active_player_id(&self) -> Option<&PlayerId> {
        self.active_idx.map(|i| &self.players[i].id)
    }

    #[must_use]
    pub fn dealer_id(&self) -> Option<&PlayerId> {
        self.players.get(self.dealer_idx).map(|p| &p.id)
    }

    #[must_use]
    pub fn last_showdown(&self) -> Option<&ShowdownSummary> {
        self.last_showdown.as_ref()
    }

    #[must_use]
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    fn seat_of(&self, player_id: &str) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(GameError::UnknownPlayer)
    }

    /// Seats of players still contending for the pot.
    fn contenders(&self) -> Vec<usize> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.folded)
            .map(|(i, _)| i)
            .collect()
    }

    fn next_unfolded_after(&self, seat: usize) -> usize {
        let n = self.players.len();
        let mut idx = (seat + 1) % n;
        while self.players[idx].folded {
            idx = (idx + 1) % n;
        }
        idx
    }

    /// Seat a new player. Only allowed between hands.
    pub fn join(&mut self, id: PlayerId, name: &str, buy_in: Chips) -> Result<(), GameError> {
        if self.phase != Phase::Waiting {
            return Err(GameError::WrongPhase { phase: self.phase });
        }
        if self.players.iter().any(|p| p.id == id) {
            return Err(GameError::AlreadySeated);
        }
        if self.players.len() >= self.settings.max_players {
            return Err(GameError::TableFull);
        }
        info!("{name} ({id}) joins with {buy_in} chips");
        self.players.push(Player::new(id, name, buy_in));
        Ok(())
    }

    /// Remove a player. Mid-hand the player is folded first and the
    /// seat is released when the hand concludes; chips already in the
    /// pot stay there.
    pub fn leave(&mut self, player_id: &str) -> Result<(), GameError> {
        let seat = self.seat_of(player_id)?;
        if self.phase == Phase::Waiting {
            let player = self.players.remove(seat);
            info!("{} leaves the table", player.name);
            // Removing an earlier seat shifts everyone down one; keep
            // the button on the same player.
            if seat < self.dealer_idx {
                self.dealer_idx -= 1;
            } else if self.dealer_idx >= self.players.len() {
                self.dealer_idx = 0;
            }
            return Ok(());
        }
        self.players[seat].connected = false;
        if !self.players[seat].folded {
            self.fold_seat(seat, ActionLabel::Fold);
        }
        Ok(())
    }

    /// Reset the deck. Between hands this is a plain reshuffle; mid-hand
    /// it is an abort: every commitment is refunded before state is
    /// cleared, so chips are conserved.
    pub fn shuffle(&mut self) {
        if self.phase != Phase::Waiting {
            warn!("shuffle requested mid-hand; aborting hand {}", self.hand_count);
            for player in &mut self.players {
                player.balance += player.hand_bet;
                player.reset_for_hand();
            }
            self.pot = 0;
            self.current_bet = 0;
            self.active_idx = None;
            self.phase = Phase::Waiting;
            self.last_showdown = None;
            self.remove_departed();
        }
        self.deck = Deck::shuffled();
    }

    /// Start a new hand with an opening bet from `player_id`: shuffle a
    /// fresh deck, deal five cards to every seat, and commit the
    /// initiator's bet as the bet-to-call.
    pub fn open_bet(&mut self, player_id: &str, amount: Chips) -> Result<(), GameError> {
        if self.phase != Phase::Waiting {
            return Err(GameError::WrongPhase { phase: self.phase });
        }
        let seat = self.seat_of(player_id)?;
        if amount < self.settings.min_open_bet.max(1) {
            return Err(GameError::InvalidAmount);
        }
        if amount > self.players[seat].balance {
            return Err(GameError::InsufficientBalance);
        }

        self.remove_departed();
        if self.players.is_empty() {
            return Err(GameError::NoPlayers);
        }
        // The seat may have shifted if departed players were dropped.
        let seat = self.seat_of(player_id)?;

        self.deck = Deck::shuffled();
        for player in &mut self.players {
            player.reset_for_hand();
        }
        for i in 0..self.players.len() {
            self.players[i].hand = Some(self.deck.deal_hand()?);
        }

        self.hand_count += 1;
        self.last_showdown = None;
        self.pot = 0;
        self.current_bet = 0;
        // The initiator acts first, i.e. sits left of the dealer button.
        let n = self.players.len();
        self.dealer_idx = (seat + n - 1) % n;
        self.phase = Phase::Betting1;
        self.active_idx = Some(seat);

        info!(
            "hand {} starts: {} opens for {amount}",
            self.hand_count, self.players[seat].name
        );
        self.commit(seat, amount);
        self.current_bet = amount;
        self.players[seat].has_called = true;
        self.players[seat].last_action = Some(ActionLabel::Bet(amount));
        self.after_betting_action(seat);
        Ok(())
    }

    /// Apply a betting action for the active player.
    pub fn act(&mut self, player_id: &str, action: PlayerAction) -> Result<(), GameError> {
        if !self.phase.is_betting() {
            return Err(GameError::WrongPhase { phase: self.phase });
        }
        let seat = self.seat_of(player_id)?;
        if self.active_idx != Some(seat) {
            return Err(GameError::NotYourTurn);
        }

        let to_call = self.current_bet - self.players[seat].round_bet;
        match action {
            PlayerAction::Check => {
                if to_call != 0 {
                    return Err(GameError::InvalidAmount);
                }
                self.players[seat].last_action = Some(ActionLabel::Check);
                self.players[seat].has_called = true;
            }
            PlayerAction::Call => {
                if to_call > self.players[seat].balance {
                    return Err(GameError::InsufficientBalance);
                }
                self.commit(seat, to_call);
                self.players[seat].last_action = Some(if to_call == 0 {
                    ActionLabel::Check
                } else {
                    ActionLabel::Call(to_call)
                });
                self.players[seat].has_called = true;
            }
            PlayerAction::Raise(total) => {
                // A raise names the new bet level for the round and must
                // strictly exceed the previous one. A raise the player
                // cannot cover is rejected outright; there is no all-in
                // side pot.
                if total <= self.current_bet {
                    return Err(GameError::InvalidAmount);
                }
                let delta = total - self.players[seat].round_bet;
                if delta > self.players[seat].balance {
                    return Err(GameError::InvalidAmount);
                }
                self.commit(seat, delta);
                self.current_bet = total;
                // The raise re-opens the round for everyone else.
                for player in &mut self.players {
                    player.has_called = false;
                }
                self.players[seat].has_called = true;
                self.players[seat].last_action = Some(ActionLabel::Raise(total));
            }
            PlayerAction::Fold => {
                self.fold_seat(seat, ActionLabel::Fold);
                return Ok(());
            }
        }

        if let Some(label) = self.players[seat].last_action {
            info!("{} {label}", self.players[seat].name);
        }
        self.after_betting_action(seat);
        Ok(())
    }

    /// Apply the draw-phase replacement for a player: `held` names the
    /// card indices to keep, the rest are discarded and replaced.
    pub fn draw(&mut self, player_id: &str, held: &[usize]) -> Result<(), GameError> {
        if self.phase != Phase::Drawing {
            return Err(GameError::WrongPhase { phase: self.phase });
        }
        let seat = self.seat_of(player_id)?;
        if self.active_idx != Some(seat) {
            return Err(GameError::NotYourTurn);
        }

        let held_set: BTreeSet<usize> = held.iter().copied().collect();
        if held_set.len() != held.len() || held_set.iter().any(|&i| i >= HAND_SIZE) {
            return Err(GameError::InvalidDraw);
        }

        let replaced = HAND_SIZE - held_set.len();
        let fresh = self.deck.deal(replaced)?;
        let hand = self.players[seat]
            .hand
            .as_mut()
            .ok_or(GameError::WrongPhase { phase: self.phase })?;
        let mut fresh = fresh.into_iter();
        let mut discarded = Vec::with_capacity(replaced);
        for (i, card) in hand.iter_mut().enumerate() {
            if !held_set.contains(&i) {
                discarded.push(*card);
                // `fresh` holds exactly one card per discarded index.
                if let Some(replacement) = fresh.next() {
                    *card = replacement;
                }
            }
        }
        self.deck.discard(discarded);

        self.players[seat].has_drawn = true;
        self.players[seat].last_action = Some(ActionLabel::Draw(replaced));
        info!("{} {}", self.players[seat].name, ActionLabel::Draw(replaced));
        self.next_draw_turn_from(seat + 1);
        Ok(())
    }

    /// Fold a player without a turn check. Used for turn timeouts and
    /// mid-hand departures; regular folds route through here too.
    pub fn force_fold(&mut self, player_id: &str, timed_out: bool) -> Result<(), GameError> {
        if self.phase == Phase::Waiting {
            return Err(GameError::WrongPhase { phase: self.phase });
        }
        let seat = self.seat_of(player_id)?;
        if self.players[seat].folded {
            return Ok(());
        }
        let label = if timed_out {
            ActionLabel::TimedOut
        } else {
            ActionLabel::Fold
        };
        self.fold_seat(seat, label);
        Ok(())
    }

    fn fold_seat(&mut self, seat: usize, label: ActionLabel) {
        self.players[seat].folded = true;
        self.players[seat].last_action = Some(label);
        info!("{} {label}", self.players[seat].name);

        let contenders = self.contenders();
        if let [last] = contenders[..] {
            self.award_to_last(last);
            return;
        }
        // A fold by a non-active seat (departure, timeout) must not
        // steal the turn from whoever is actually to act.
        match self.phase {
            Phase::Betting1 | Phase::Betting2 => {
                if self.active_idx == Some(seat) {
                    self.after_betting_action(seat);
                } else {
                    self.maybe_close_betting_round();
                }
            }
            Phase::Drawing => {
                let start = match self.active_idx {
                    Some(active) if active != seat => active,
                    _ => (seat + 1) % self.players.len(),
                };
                self.next_draw_turn_from(start);
            }
            Phase::Waiting | Phase::Showdown => {}
        }
    }

    /// Atomically move chips from a player's balance into the pot.
    /// Callers have already validated the balance.
    fn commit(&mut self, seat: usize, amount: Chips) {
        let player = &mut self.players[seat];
        player.balance -= amount;
        player.round_bet += amount;
        player.hand_bet += amount;
        self.pot += amount;
    }

    /// Close the betting round if everyone left in the hand has matched
    /// the bet since the last raise, otherwise pass the turn on.
    fn after_betting_action(&mut self, seat: usize) {
        if !self.maybe_close_betting_round() {
            self.active_idx = Some(self.next_unfolded_after(seat));
        }
    }

    fn maybe_close_betting_round(&mut self) -> bool {
        // Folded seats never count toward the close, even if they had
        // matched the bet before folding.
        if self
            .contenders()
            .iter()
            .any(|&seat| !self.players[seat].has_called)
        {
            return false;
        }
        match self.phase {
            Phase::Betting1 => self.enter_drawing(),
            Phase::Betting2 => self.resolve_showdown(),
            _ => {}
        }
        true
    }

    fn enter_drawing(&mut self) {
        self.phase = Phase::Drawing;
        self.current_bet = 0;
        for player in &mut self.players {
            player.round_bet = 0;
            player.has_drawn = false;
            player.has_called = false;
        }
        self.active_idx = Some(self.next_unfolded_after(self.dealer_idx));
    }

    /// Hand the turn to the next contender still owed a draw, scanning
    /// from `start` inclusive, or close the phase when everyone has drawn.
    fn next_draw_turn_from(&mut self, start: usize) {
        let n = self.players.len();
        let mut idx = start % n;
        for _ in 0..n {
            let player = &self.players[idx];
            if !player.folded && !player.has_drawn {
                self.active_idx = Some(idx);
                return;
            }
            idx = (idx + 1) % n;
        }
        self.enter_betting2();
    }

    fn enter_betting2(&mut self) {
        self.phase = Phase::Betting2;
        self.current_bet = 0;
        for player in &mut self.players {
            player.has_called = false;
        }
        self.active_idx = Some(self.next_unfolded_after(self.dealer_idx));
    }

    /// Reveal, rank, and pay out. Remainder chips from an uneven split
    /// go one apiece to winners nearest the dealer's left, in seat order.
    fn resolve_showdown(&mut self) {
        self.phase = Phase::Showdown;
        let contenders = self.contenders();
        let ranks: Vec<HandRank> = contenders
            .iter()
            .filter_map(|&seat| self.players[seat].hand.as_ref())
            .map(eval::evaluate)
            .collect();
        let winners: Vec<usize> = eval::best_indices(&ranks)
            .into_iter()
            .map(|i| contenders[i])
            .collect();
        if winners.is_empty() {
            self.conclude_hand();
            return;
        }

        let share = self.pot / winners.len() as Chips;
        let mut remainder = self.pot % winners.len() as Chips;
        let mut payouts = vec![share; winners.len()];
        let n = self.players.len();
        let mut idx = (self.dealer_idx + 1) % n;
        while remainder > 0 {
            if let Some(w) = winners.iter().position(|&seat| seat == idx) {
                payouts[w] += 1;
                remainder -= 1;
            }
            idx = (idx + 1) % n;
        }

        let revealed = contenders
            .iter()
            .zip(&ranks)
            .map(|(&seat, rank)| {
                let player = &self.players[seat];
                RevealedHand {
                    player_id: player.id.clone(),
                    name: player.name.clone(),
                    cards: player.hand.map(|h| h.to_vec()).unwrap_or_default(),
                    rank: rank.category.label().to_string(),
                }
            })
            .collect();
        let awards: Vec<PotAward> = winners
            .iter()
            .zip(&payouts)
            .map(|(&seat, &amount)| PotAward {
                player_id: self.players[seat].id.clone(),
                amount,
            })
            .collect();
        for (&seat, &amount) in winners.iter().zip(&payouts) {
            self.players[seat].balance += amount;
            self.players[seat].last_action = Some(ActionLabel::Win(amount));
            info!("{} wins {amount}", self.players[seat].name);
        }

        self.last_showdown = Some(ShowdownSummary {
            hand_id: self.hand_count,
            pot: self.pot,
            revealed,
            winners: awards,
        });
        self.conclude_hand();
    }

    /// Everyone else folded: the pot goes to the last contender with no
    /// showdown and no reveal.
    fn award_to_last(&mut self, seat: usize) {
        let pot = self.pot;
        self.players[seat].balance += pot;
        self.players[seat].last_action = Some(ActionLabel::Win(pot));
        info!("{} wins {pot} uncontested", self.players[seat].name);
        self.last_showdown = Some(ShowdownSummary {
            hand_id: self.hand_count,
            pot,
            revealed: Vec::new(),
            winners: vec![PotAward {
                player_id: self.players[seat].id.clone(),
                amount: pot,
            }],
        });
        self.conclude_hand();
    }

    fn conclude_hand(&mut self) {
        self.pot = 0;
        self.current_bet = 0;
        self.active_idx = None;
        for player in &mut self.players {
            player.hand = None;
            player.round_bet = 0;
            player.hand_bet = 0;
            player.has_drawn = false;
            player.has_called = false;
        }
        self.phase = Phase::Waiting;
        self.remove_departed();
    }

    fn remove_departed(&mut self) {
        let mut seat = 0;
        while seat < self.players.len() {
            if self.players[seat].connected {
                seat += 1;
                continue;
            }
            self.players.remove(seat);
            // Keep the button on the same player when an earlier seat
            // goes away.
            if seat < self.dealer_idx {
                self.dealer_idx -= 1;
            }
        }
        if self.dealer_idx >= self.players.len() {
            self.dealer_idx = 0;
        }
    }
}
