//! Game-wide constants.

/// Number of cards in a standard deck.
pub const DECK_SIZE: usize = 52;

/// Number of cards in a five-card-draw hand.
pub const HAND_SIZE: usize = 5;

/// Lowest card rank value (deuce).
pub const MIN_RANK: u8 = 2;

/// Rank values for face cards. Aces always rank high here; the wheel
/// straight is the evaluator's business.
pub const JACK: u8 = 11;
pub const QUEEN: u8 = 12;
pub const KING: u8 = 13;
pub const ACE: u8 = 14;

/// Hard cap on seats at one table.
pub const MAX_PLAYERS: usize = 8;

/// Chips handed to a player when no buy-in is given at join time.
pub const DEFAULT_BUY_IN: u32 = 100;

/// Usernames longer than this are truncated at join time.
pub const MAX_NAME_LENGTH: usize = 32;
