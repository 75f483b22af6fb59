use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

pub const CARDS_IN_DECK: usize = 52;
pub const MIN_PLAYERS: usize = 4;
pub const MAX_PLAYERS: usize = 12;
pub const SMALL_BLIND: u32 = 5;
pub const BIG_BLIND: u32 = 10;
pub const INITIAL_CHIPS: u32 = 500;
pub const BUY_IN_AMOUNT: u32 = 500;
pub const TURN_TIMEOUT_SECS: u64 = 60;
pub const HEARTBEAT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank(pub u8);

impl Rank {
    pub const TWO: Rank = Rank(2);
    pub const ACE: Rank = Rank(14);

    pub const ALL: [Rank; 13] = [
        Rank(2),
        Rank(3),
        Rank(4),
        Rank(5),
        Rank(6),
        Rank(7),
        Rank(8),
        Rank(9),
        Rank(10),
        Rank(11),
        Rank(12),
        Rank(13),
        Rank(14),
    ];

    pub fn value(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Card { suit, rank }
    }
}

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new() -> Self {
        let mut cards = Vec::with_capacity(CARDS_IN_DECK);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::new(suit, rank));
            }
        }
        Deck { cards }
    }

    pub fn shuffled() -> Self {
        let mut deck = Self::new();
        deck.shuffle();
        deck
    }

    pub fn shuffle(&mut self) {
        let mut rng = rand::rng();
        self.cards.shuffle(&mut rng);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Removes and returns the head card, or `None` on an empty deck.
    pub fn draw(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            None
        } else {
            Some(self.cards.remove(0))
        }
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl GamePhase {
    pub fn is_betting_phase(self) -> bool {
        matches!(
            self,
            GamePhase::Preflop | GamePhase::Flop | GamePhase::Turn | GamePhase::River
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Fold,
    Check,
    Call,
    Raise(u32),
}

/// Where a participant currently sits relative to an in-progress hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Spectating,
    Playing,
}

#[derive(Debug, Clone)]
pub struct Seat {
    pub id: String,
    pub name: String,
    pub chips: u32,
    pub bet: u32,
    pub hole: Option<(Card, Card)>,
    pub folded: bool,
    pub all_in: bool,
    pub is_dealer: bool,
    pub is_small: bool,
    pub is_big: bool,
    pub status: SeatStatus,
    pub heartbeat_timeout: bool,
    /// Cleared at the start of every betting round, set when the seat acts.
    /// A raise clears it for every other seat, reopening the round for them.
    pub acted: bool,
}

impl Seat {
    pub fn new(id: String, name: String, chips: u32) -> Self {
        Seat {
            id,
            name,
            chips,
            bet: 0,
            hole: None,
            folded: false,
            all_in: false,
            is_dealer: false,
            is_small: false,
            is_big: false,
            status: SeatStatus::Playing,
            heartbeat_timeout: false,
            acted: false,
        }
    }

    pub fn new_spectator(id: String, name: String, chips: u32) -> Self {
        let mut seat = Self::new(id, name, chips);
        seat.status = SeatStatus::Spectating;
        seat
    }

    pub fn reset_for_new_hand(&mut self) {
        self.bet = 0;
        self.hole = None;
        self.folded = false;
        self.all_in = false;
        self.is_dealer = false;
        self.is_small = false;
        self.is_big = false;
        self.acted = false;
    }

    pub fn reset_for_new_round(&mut self) {
        self.bet = 0;
    }

    pub fn can_act(&self) -> bool {
        !self.folded && !self.all_in
    }
}
