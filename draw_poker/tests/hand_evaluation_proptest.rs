//! Property-based tests for hand evaluation using proptest.
//!
//! These verify totality, determinism, and ordering consistency across
//! randomly generated five-card hands.

use draw_poker::game::{Card, HandCategory, Suit, best_indices, evaluate};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn card_strategy() -> impl Strategy<Value = Card> {
    (2u8..=14, 0usize..4).prop_map(|(rank, suit_idx)| Card::new(rank, Suit::ALL[suit_idx]))
}

// Exactly 5 unique cards, as dealt from a real deck.
fn five_card_hand_strategy() -> impl Strategy<Value = [Card; 5]> {
    prop::collection::vec(card_strategy(), 5)
        .prop_filter("cards must be unique", |cards| {
            cards.iter().collect::<BTreeSet<_>>().len() == cards.len()
        })
        .prop_map(|cards| <[Card; 5]>::try_from(cards).unwrap())
}

proptest! {
    #[test]
    fn evaluate_is_total(cards in five_card_hand_strategy()) {
        let rank = evaluate(&cards);
        // Exactly one of the nine categories, and a non-empty tiebreak
        // tuple of in-range rank values.
        prop_assert!(!rank.tiebreak.is_empty());
        prop_assert!(rank.tiebreak.iter().all(|&v| (2..=14).contains(&v)));
        prop_assert!(!rank.category.label().is_empty());
    }

    #[test]
    fn evaluate_is_deterministic(cards in five_card_hand_strategy()) {
        prop_assert_eq!(evaluate(&cards), evaluate(&cards));
    }

    #[test]
    fn evaluate_ignores_card_order(cards in five_card_hand_strategy()) {
        let mut reversed = cards;
        reversed.reverse();
        prop_assert_eq!(evaluate(&cards), evaluate(&reversed));
    }

    #[test]
    fn ordering_is_consistent(
        a in five_card_hand_strategy(),
        b in five_card_hand_strategy(),
        c in five_card_hand_strategy(),
    ) {
        let (ra, rb, rc) = (evaluate(&a), evaluate(&b), evaluate(&c));
        // Antisymmetry.
        prop_assert_eq!(ra.cmp(&rb), rb.cmp(&ra).reverse());
        // Transitivity through a third hand.
        if ra <= rb && rb <= rc {
            prop_assert!(ra <= rc);
        }
    }

    #[test]
    fn category_dominates_tiebreak(a in five_card_hand_strategy(), b in five_card_hand_strategy()) {
        let (ra, rb) = (evaluate(&a), evaluate(&b));
        if ra.category != rb.category {
            prop_assert_eq!(ra.category > rb.category, ra > rb);
        }
    }

    #[test]
    fn suit_permutation_preserves_rank(cards in five_card_hand_strategy()) {
        // Rotating every suit maps flushes to flushes and leaves all
        // rank tuples untouched, so the evaluation must not move.
        let rotated = cards.map(|card| {
            let idx = Suit::ALL.iter().position(|&s| s == card.suit).unwrap();
            Card::new(card.rank, Suit::ALL[(idx + 1) % 4])
        });
        prop_assert_eq!(evaluate(&cards), evaluate(&rotated));
    }

    #[test]
    fn best_indices_points_at_maxima(hands in prop::collection::vec(five_card_hand_strategy(), 2..6)) {
        let ranks: Vec<_> = hands.iter().map(evaluate).collect();
        let winners = best_indices(&ranks);
        prop_assert!(!winners.is_empty());
        let best = winners.iter().map(|&i| ranks[i].clone()).max().unwrap();
        for (i, rank) in ranks.iter().enumerate() {
            if winners.contains(&i) {
                prop_assert_eq!(rank, &best);
            } else {
                prop_assert!(rank < &best);
            }
        }
    }
}

#[test]
fn known_hands_rank_in_poker_order() {
    let royal = [
        Card::new(14, Suit::Spades),
        Card::new(13, Suit::Spades),
        Card::new(12, Suit::Spades),
        Card::new(11, Suit::Spades),
        Card::new(10, Suit::Spades),
    ];
    let nines = [
        Card::new(9, Suit::Hearts),
        Card::new(9, Suit::Diamonds),
        Card::new(9, Suit::Clubs),
        Card::new(9, Suit::Spades),
        Card::new(2, Suit::Clubs),
    ];
    let sevens_full = [
        Card::new(7, Suit::Hearts),
        Card::new(7, Suit::Diamonds),
        Card::new(7, Suit::Clubs),
        Card::new(13, Suit::Spades),
        Card::new(13, Suit::Hearts),
    ];
    let r1 = evaluate(&royal);
    let r2 = evaluate(&nines);
    let r3 = evaluate(&sevens_full);
    assert_eq!(r1.category, HandCategory::StraightFlush);
    assert_eq!(r2.category, HandCategory::FourOfAKind);
    assert_eq!(r3.category, HandCategory::FullHouse);
    assert!(r1 > r2);
    assert!(r2 > r3);
}
