use thiserror::Error;

/// The closed taxonomy of everything that can go wrong inside a room.
///
/// Every variant's `Display` string is the single rendering of that error
/// to English text; the outer façade copies it verbatim into the outbound
/// `error` message rather than re-matching the taxonomy itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("room not found")]
    RoomNotFound,
    #[error("room is full")]
    RoomFull,
    #[error("name already taken in this room")]
    NameTaken,
    #[error("malformed request")]
    BadRequest,
    #[error("player is not seated")]
    NotSeated,
    #[error("a hand is already in progress")]
    GameInProgress,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("cannot check, there is a bet to call")]
    CannotCheck,
    #[error("raise is smaller than the minimum raise")]
    RaiseTooSmall,
    #[error("not enough chips for this action")]
    InsufficientChips,
    #[error("raise amount is invalid")]
    InvalidRaise,
    #[error("deck exhausted mid-hand")]
    DeckExhausted,
}
