//! Wire protocol: the JSON messages exchanged over the WebSocket channel.
//!
//! Inbound and outbound messages both use `serde`'s internally tagged enum
//! encoding (`#[serde(tag = "type")]`) so a tagged-variant dispatch replaces
//! any dynamic string matching on the message type.

use poker_core::{Card, GamePhase};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    CreateRoom {
        data: CreateRoomRequest,
        #[serde(rename = "playerId", default)]
        player_id: Option<String>,
    },
    JoinRoom {
        data: JoinRoomRequest,
        #[serde(rename = "playerId", default)]
        player_id: Option<String>,
    },
    JoinTable {
        #[serde(rename = "playerId")]
        player_id: String,
    },
    StartGame {
        #[serde(rename = "playerId")]
        player_id: String,
    },
    Action {
        data: ActionRequest,
        #[serde(rename = "playerId")]
        player_id: String,
    },
    BuyHand {
        #[serde(rename = "playerId")]
        player_id: String,
    },
    GetBuyHandStats {
        #[serde(rename = "playerId")]
        player_id: String,
    },
    Heartbeat {
        #[serde(rename = "playerId")]
        player_id: String,
    },
}

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub room_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub amount: Option<u32>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    Welcome {
        data: WelcomeData,
    },
    RoomCreated {
        data: RoomSnapshot,
    },
    RoomJoined {
        data: RoomSnapshot,
    },
    PlayerJoined {
        data: RosterEntry,
    },
    PlayerJoinedTable {
        data: RosterEntry,
    },
    PlayerLeft {
        data: RosterEntry,
    },
    PlayerMovedToSpectating {
        data: RosterEntry,
    },
    GameStarted {
        data: RoomSnapshot,
    },
    GameWaiting {
        data: RoomSnapshot,
    },
    ActionTaken {
        data: RosterEntry,
    },
    RoomUpdated {
        data: RoomSnapshot,
    },
    GameEnded {
        data: GameEndedData,
    },
    BuyHandSuccess {
        data: BuyHandSuccessData,
    },
    BuyHandStats {
        data: BuyHandStatsData,
    },
    Error {
        data: ErrorData,
    },
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeData {
    pub player_id: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct RosterEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct ErrorData {
    pub message: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct BuyHandSuccessData {
    pub chips: u32,
}

#[derive(Debug, Serialize, Clone)]
pub struct BuyHandStatsData {
    pub count: u32,
}

#[derive(Debug, Serialize, Clone)]
pub struct CardView {
    pub suit: poker_core::Suit,
    pub rank: u8,
}

impl From<Card> for CardView {
    fn from(c: Card) -> Self {
        CardView {
            suit: c.suit,
            rank: c.rank.value(),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: String,
    pub name: String,
    pub hand: Option<(CardView, CardView)>,
    pub chips: u32,
    pub bet: u32,
    pub folded: bool,
    pub is_dealer: bool,
    pub is_small: bool,
    pub is_big: bool,
    pub all_in: bool,
    pub status: poker_core::SeatStatus,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SpectatorView {
    pub id: String,
    pub name: String,
    pub chips: u32,
    pub status: poker_core::SeatStatus,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub id: String,
    pub players: Vec<PlayerView>,
    pub spectators: Vec<SpectatorView>,
    pub waiting_players: Vec<SpectatorView>,
    pub community_cards: Vec<CardView>,
    pub pot: u32,
    pub current_bet: u32,
    pub dealer_index: usize,
    pub current_turn: usize,
    pub game_phase: GamePhase,
}

#[derive(Debug, Serialize, Clone)]
pub struct WinnerView {
    pub id: String,
    pub name: String,
    pub chips: u32,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RevealedHand {
    pub id: String,
    pub name: String,
    pub hand: (CardView, CardView),
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GameEndedData {
    pub winner: Option<WinnerView>,
    pub winners: Vec<WinnerView>,
    pub is_tie: bool,
    pub pot: u32,
    pub winning_hand: String,
    pub all_hands: Vec<RevealedHand>,
    pub community_cards: Vec<CardView>,
}
