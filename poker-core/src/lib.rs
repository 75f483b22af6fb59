pub mod error;
pub mod hand;
pub mod room;
pub mod types;

pub use error::RoomError;
pub use hand::{evaluate, HandCategory, HandRank};
pub use room::{ActionOutcome, Room, ShowdownResult, WinnerInfo};
pub use types::{
    Card, Deck, GamePhase, PlayerAction, Rank, Seat, SeatStatus, Suit, BIG_BLIND, BUY_IN_AMOUNT,
    CARDS_IN_DECK, HEARTBEAT_TIMEOUT_SECS, INITIAL_CHIPS, MAX_PLAYERS, MIN_PLAYERS, SMALL_BLIND,
    TURN_TIMEOUT_SECS,
};
