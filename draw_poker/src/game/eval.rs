//! Five-card hand evaluation.
//!
//! `evaluate` is pure and deterministic; it drives both the rank label
//! shown to the player and the showdown ordering. Hands compare by
//! category first, then element-by-element on the tie-break tuple, so
//! two hands with identical tuples are a genuine tie (split pot).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::constants::{ACE, HAND_SIZE};
use super::entities::Card;

/// The nine standard categories, weakest first so the derived `Ord`
/// matches poker ranking.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum HandCategory {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl HandCategory {
    /// Human-readable label used in snapshots.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::HighCard => "High Card",
            Self::OnePair => "One Pair",
            Self::TwoPair => "Two Pair",
            Self::ThreeOfAKind => "Three of a Kind",
            Self::Straight => "Straight",
            Self::Flush => "Flush",
            Self::FullHouse => "Full House",
            Self::FourOfAKind => "Four of a Kind",
            Self::StraightFlush => "Straight Flush",
        }
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Totally ordered hand strength.
///
/// The tie-break tuple always has the same length for a given category,
/// so the derived lexicographic ordering compares element-by-element
/// exactly as the rules require. For the wheel (A-5 straight) the ace
/// counts low and the tuple head is 5.
#[derive(Clone, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandRank {
    pub category: HandCategory,
    pub tiebreak: Vec<u8>,
}

/// Classify exactly five cards.
#[must_use]
pub fn evaluate(cards: &[Card; HAND_SIZE]) -> HandRank {
    let mut ranks: Vec<u8> = cards.iter().map(|c| c.rank).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = cards.iter().all(|c| c.suit == cards[0].suit);

    // Rank groups ordered by count, then rank, both descending.
    let mut groups: Vec<(u8, u8)> = Vec::with_capacity(HAND_SIZE);
    for &rank in &ranks {
        match groups.iter_mut().find(|(_, r)| *r == rank) {
            Some((count, _)) => *count += 1,
            None => groups.push((1, rank)),
        }
    }
    groups.sort_unstable_by(|a, b| b.cmp(a));

    let straight_high = if groups.len() == HAND_SIZE {
        if ranks[0] - ranks[4] == 4 {
            Some(ranks[0])
        } else if ranks == [ACE, 5, 4, 3, 2] {
            Some(5)
        } else {
            None
        }
    } else {
        None
    };

    let grouped: Vec<u8> = groups.iter().map(|&(_, rank)| rank).collect();

    match (is_flush, straight_high, groups[0].0) {
        (true, Some(high), _) => HandRank {
            category: HandCategory::StraightFlush,
            tiebreak: vec![high],
        },
        (_, _, 4) => HandRank {
            category: HandCategory::FourOfAKind,
            tiebreak: grouped,
        },
        (_, _, 3) if groups[1].0 == 2 => HandRank {
            category: HandCategory::FullHouse,
            tiebreak: grouped,
        },
        (true, None, _) => HandRank {
            category: HandCategory::Flush,
            tiebreak: ranks,
        },
        (false, Some(high), _) => HandRank {
            category: HandCategory::Straight,
            tiebreak: vec![high],
        },
        (_, _, 3) => HandRank {
            category: HandCategory::ThreeOfAKind,
            tiebreak: grouped,
        },
        (_, _, 2) if groups[1].0 == 2 => HandRank {
            category: HandCategory::TwoPair,
            tiebreak: grouped,
        },
        (_, _, 2) => HandRank {
            category: HandCategory::OnePair,
            tiebreak: grouped,
        },
        _ => HandRank {
            category: HandCategory::HighCard,
            tiebreak: ranks,
        },
    }
}

/// Indices of the strongest hand(s); more than one index means a tie.
#[must_use]
pub fn best_indices(ranks: &[HandRank]) -> Vec<usize> {
    let Some(best) = ranks.iter().max() else {
        return Vec::new();
    };
    ranks
        .iter()
        .enumerate()
        .filter(|(_, rank)| *rank == best)
        .map(|(i, _)| i)
        .collect()
}
