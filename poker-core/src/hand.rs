use std::collections::HashMap;

use itertools::Itertools;

use crate::types::Card;

/// Ordered from weakest to strongest; the derived `Ord` on `HandCategory`
/// gives `HandRank`'s own derived `Ord` the category comparison for free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandCategory {
    HighCard,
    Pair,
    TwoPair,
    Trips,
    Straight,
    Flush,
    FullHouse,
    Quads,
    StraightFlush,
    RoyalFlush,
}

impl HandCategory {
    pub fn description(self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::Pair => "Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::Trips => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::Quads => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
            HandCategory::RoyalFlush => "Royal Flush",
        }
    }
}

/// A classified 5-card (or smaller, for degenerate inputs) hand.
///
/// Deriving `Ord` on `(category, tiebreak)` gives the total order the
/// comparison contract asks for directly, rather than hand-rolling sign
/// arithmetic over the two fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct HandRank {
    pub category: HandCategory,
    pub tiebreak: Vec<u8>,
}

impl HandRank {
    pub fn description(&self) -> String {
        self.category.description().to_string()
    }
}

/// Evaluates the best hand obtainable from `cards`, trying every 5-card
/// subset when at least 5 are available. Never faults: fewer than 5 cards
/// yields a `HighCard` built from whatever is present.
pub fn evaluate(cards: &[Card]) -> HandRank {
    if cards.len() < 5 {
        let mut ranks: Vec<u8> = cards.iter().map(|c| c.rank.value()).collect();
        ranks.sort_unstable_by(|a, b| b.cmp(a));
        return HandRank {
            category: HandCategory::HighCard,
            tiebreak: ranks,
        };
    }

    cards
        .iter()
        .copied()
        .combinations(5)
        .map(|five| evaluate_five(&five))
        .max()
        .expect("combinations(5) over >=5 cards yields at least one subset")
}

fn evaluate_five(cards: &[Card]) -> HandRank {
    let mut ranks: Vec<u8> = cards.iter().map(|c| c.rank.value()).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));

    let flush = cards.iter().all(|c| c.suit == cards[0].suit);

    let mut unique = ranks.clone();
    unique.sort_unstable();
    unique.dedup();
    let straight_high: Option<u8> = if unique.len() == 5 {
        if unique == [2, 3, 4, 5, 14] {
            Some(5)
        } else if unique[4] - unique[0] == 4 {
            Some(unique[4])
        } else {
            None
        }
    } else {
        None
    };

    let mut counts: HashMap<u8, u8> = HashMap::new();
    for &r in &ranks {
        *counts.entry(r).or_insert(0) += 1;
    }

    let category_for = |count: u8| -> Vec<u8> {
        let mut rs: Vec<u8> = counts
            .iter()
            .filter(|&(_, &c)| c == count)
            .map(|(&r, _)| r)
            .collect();
        rs.sort_unstable_by(|a, b| b.cmp(a));
        rs
    };

    let quads = category_for(4);
    let trips = category_for(3);
    let pairs = category_for(2);

    if let Some(high) = straight_high
        && flush {
            return HandRank {
                category: if high == 14 {
                    HandCategory::RoyalFlush
                } else {
                    HandCategory::StraightFlush
                },
                tiebreak: vec![high],
            };
        }

    if let [quad_rank] = quads[..] {
        let kicker = ranks.iter().copied().find(|&r| r != quad_rank).unwrap_or(0);
        return HandRank {
            category: HandCategory::Quads,
            tiebreak: vec![quad_rank, kicker],
        };
    }

    if !trips.is_empty() && !pairs.is_empty() {
        return HandRank {
            category: HandCategory::FullHouse,
            tiebreak: vec![trips[0], pairs[0]],
        };
    }

    if flush {
        return HandRank {
            category: HandCategory::Flush,
            tiebreak: ranks,
        };
    }

    if let Some(high) = straight_high {
        return HandRank {
            category: HandCategory::Straight,
            tiebreak: vec![high],
        };
    }

    if let [trip_rank] = trips[..] {
        let kickers: Vec<u8> = ranks.iter().copied().filter(|&r| r != trip_rank).collect();
        return HandRank {
            category: HandCategory::Trips,
            tiebreak: vec![trip_rank, kickers[0], kickers[1]],
        };
    }

    if pairs.len() == 2 {
        let kicker = ranks
            .iter()
            .copied()
            .find(|r| !pairs.contains(r))
            .unwrap_or(0);
        return HandRank {
            category: HandCategory::TwoPair,
            tiebreak: vec![pairs[0], pairs[1], kicker],
        };
    }

    if let [pair_rank] = pairs[..] {
        let kickers: Vec<u8> = ranks.iter().copied().filter(|&r| r != pair_rank).collect();
        return HandRank {
            category: HandCategory::Pair,
            tiebreak: vec![pair_rank, kickers[0], kickers[1], kickers[2]],
        };
    }

    HandRank {
        category: HandCategory::HighCard,
        tiebreak: ranks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Rank, Suit};
    use rstest::rstest;

    fn card(rank: u8, suit: Suit) -> Card {
        Card::new(suit, Rank(rank))
    }

    #[test]
    fn high_card() {
        let cards = [
            card(2, Suit::Spades),
            card(7, Suit::Hearts),
            card(9, Suit::Diamonds),
            card(11, Suit::Clubs),
            card(13, Suit::Spades),
        ];
        let r = evaluate(&cards);
        assert_eq!(r.category, HandCategory::HighCard);
        assert_eq!(r.tiebreak, vec![13, 11, 9, 7, 2]);
    }

    #[test]
    fn wheel_straight() {
        let cards = [
            card(14, Suit::Spades),
            card(2, Suit::Hearts),
            card(3, Suit::Diamonds),
            card(4, Suit::Clubs),
            card(5, Suit::Spades),
        ];
        let r = evaluate(&cards);
        assert_eq!(r.category, HandCategory::Straight);
        assert_eq!(r.tiebreak, vec![5]);
    }

    #[test]
    fn royal_flush() {
        let cards = [
            card(10, Suit::Spades),
            card(11, Suit::Spades),
            card(12, Suit::Spades),
            card(13, Suit::Spades),
            card(14, Suit::Spades),
        ];
        let r = evaluate(&cards);
        assert_eq!(r.category, HandCategory::RoyalFlush);
    }

    #[test]
    fn evaluate_never_faults_on_short_hands() {
        let cards = [card(2, Suit::Spades), card(9, Suit::Hearts)];
        let r = evaluate(&cards);
        assert_eq!(r.category, HandCategory::HighCard);
        assert_eq!(r.tiebreak, vec![9, 2]);

        let none: [Card; 0] = [];
        let r = evaluate(&none);
        assert_eq!(r.category, HandCategory::HighCard);
        assert!(r.tiebreak.is_empty());
    }

    #[rstest]
    #[case(HandCategory::HighCard, HandCategory::Pair)]
    #[case(HandCategory::Pair, HandCategory::TwoPair)]
    #[case(HandCategory::TwoPair, HandCategory::Trips)]
    #[case(HandCategory::Trips, HandCategory::Straight)]
    #[case(HandCategory::Straight, HandCategory::Flush)]
    #[case(HandCategory::Flush, HandCategory::FullHouse)]
    #[case(HandCategory::FullHouse, HandCategory::Quads)]
    #[case(HandCategory::Quads, HandCategory::StraightFlush)]
    #[case(HandCategory::StraightFlush, HandCategory::RoyalFlush)]
    fn category_order_is_total(#[case] lower: HandCategory, #[case] higher: HandCategory) {
        assert!(lower < higher);
    }

    #[test]
    fn wheel_straight_loses_to_six_high() {
        let wheel = [
            card(14, Suit::Spades),
            card(2, Suit::Hearts),
            card(3, Suit::Diamonds),
            card(4, Suit::Clubs),
            card(5, Suit::Spades),
        ];
        let six_high = [
            card(2, Suit::Hearts),
            card(3, Suit::Diamonds),
            card(4, Suit::Clubs),
            card(5, Suit::Hearts),
            card(6, Suit::Spades),
        ];
        assert!(evaluate(&wheel) < evaluate(&six_high));
    }

    #[test]
    fn best_of_seven_picks_the_winning_five() {
        let cards = [
            card(2, Suit::Spades),
            card(7, Suit::Hearts),
            card(9, Suit::Diamonds),
            card(11, Suit::Clubs),
            card(13, Suit::Spades),
            card(13, Suit::Hearts),
            card(13, Suit::Diamonds),
        ];
        let r = evaluate(&cards);
        assert_eq!(r.category, HandCategory::Trips);
        assert_eq!(r.tiebreak, vec![13, 11, 9]);
    }
}
