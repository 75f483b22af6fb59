//! The room actor: a `tokio` task that owns one `poker_core::Room`
//! exclusively and drains a single mailbox. This realizes the room's
//! exclusive lock as single-threaded ownership instead of a `Mutex` — there
//! is no lock to forget to release before a client write.

use std::sync::Arc;
use std::time::Duration;

use poker_core::{ActionOutcome, GamePhase, PlayerAction, Room, RoomError, ShowdownResult};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::ledger::ChipLedger;
use crate::protocol::{
    ActionRequest, BuyHandStatsData, BuyHandSuccessData, CardView, ClientMessage, ErrorData,
    GameEndedData, PlayerView, RevealedHand, RoomSnapshot, RosterEntry, ServerMessage,
    SpectatorView, WinnerView,
};
use crate::registry::RoomRegistry;

pub enum ActorMsg {
    Subscribe {
        conn_id: String,
        tx: mpsc::UnboundedSender<ServerMessage>,
    },
    Unsubscribe {
        conn_id: String,
    },
    Client {
        conn_id: String,
        msg: ClientMessage,
    },
    TimerFire {
        seat: usize,
        phase: GamePhase,
    },
    Heartbeat {
        conn_id: String,
        timed_out: bool,
    },
}

pub fn spawn(
    room_id: String,
    ledger: Arc<ChipLedger>,
    registry: Arc<RoomRegistry>,
    config: ServerConfig,
) -> mpsc::UnboundedSender<ActorMsg> {
    let (tx, rx) = mpsc::unbounded_channel();
    let actor = RoomActor {
        room: Room::new(room_id.clone()),
        subscribers: Vec::new(),
        ledger,
        registry,
        self_tx: tx.clone(),
        config,
    };
    tokio::spawn(actor.run(rx));
    tx
}

struct RoomActor {
    room: Room,
    subscribers: Vec<(String, mpsc::UnboundedSender<ServerMessage>)>,
    ledger: Arc<ChipLedger>,
    registry: Arc<RoomRegistry>,
    self_tx: mpsc::UnboundedSender<ActorMsg>,
    config: ServerConfig,
}

impl RoomActor {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<ActorMsg>) {
        let room_id = self.room.id.clone();
        info!(room_id = %room_id, "room actor started");
        while let Some(msg) = rx.recv().await {
            match msg {
                ActorMsg::Subscribe { conn_id, tx } => {
                    self.subscribers.retain(|(id, _)| id != &conn_id);
                    self.subscribers.push((conn_id, tx));
                }
                ActorMsg::Unsubscribe { conn_id } => {
                    self.subscribers.retain(|(id, _)| id != &conn_id);
                    if let Some(seat) = self.room.find_seat(&conn_id) {
                        let entry = RosterEntry {
                            id: seat.id.clone(),
                            name: seat.name.clone(),
                        };
                        self.room.leave(&conn_id);
                        self.broadcast_same(ServerMessage::PlayerLeft { data: entry });
                    }
                    self.broadcast_snapshot();
                }
                ActorMsg::Client { conn_id, msg } => {
                    self.handle_client(conn_id, msg).await;
                }
                ActorMsg::TimerFire { seat, phase } => {
                    if let Some(outcome) = self.room.apply_timer_fallback(seat, phase) {
                        debug!(room_id = %self.room.id, seat, "turn timer fired, auto-action applied");
                        self.handle_outcome(outcome).await;
                    }
                }
                ActorMsg::Heartbeat { conn_id, timed_out } => {
                    self.room.set_heartbeat_timeout(&conn_id, timed_out);
                    if timed_out && self.room.current_turn_seat_id() == Some(conn_id.as_str()) {
                        let seat = self.room.current_turn;
                        let phase = self.room.game_phase;
                        if let Some(outcome) = self.room.apply_timer_fallback(seat, phase) {
                            self.handle_outcome(outcome).await;
                        }
                    }
                }
            }
        }
        info!(room_id = %room_id, "room actor shutting down, no subscribers remain");
        self.registry.remove(&room_id);
    }

    fn send_to(&self, conn_id: &str, msg: ServerMessage) {
        if let Some((_, tx)) = self.subscribers.iter().find(|(id, _)| id == conn_id) {
            let _ = tx.send(msg);
        }
    }

    fn broadcast(&self, msg_for: impl Fn(&str) -> ServerMessage) {
        for (id, tx) in &self.subscribers {
            let _ = tx.send(msg_for(id));
        }
    }

    fn broadcast_same(&self, msg: ServerMessage) {
        for (_, tx) in &self.subscribers {
            let _ = tx.send(msg.clone());
        }
    }

    fn broadcast_snapshot(&self) {
        self.broadcast(|viewer| ServerMessage::RoomUpdated {
            data: self.snapshot_for(viewer),
        });
    }

    fn snapshot_for(&self, viewer_id: &str) -> RoomSnapshot {
        let players = self
            .room
            .players
            .iter()
            .map(|s| PlayerView {
                id: s.id.clone(),
                name: s.name.clone(),
                hand: if s.id == viewer_id {
                    s.hole.map(|(a, b)| (a.into(), b.into()))
                } else {
                    None
                },
                chips: s.chips,
                bet: s.bet,
                folded: s.folded,
                is_dealer: s.is_dealer,
                is_small: s.is_small,
                is_big: s.is_big,
                all_in: s.all_in,
                status: s.status,
            })
            .collect();
        let spectators = self
            .room
            .spectators
            .iter()
            .map(|s| SpectatorView {
                id: s.id.clone(),
                name: s.name.clone(),
                chips: s.chips,
                status: s.status,
            })
            .collect();
        let waiting_players = self
            .room
            .waiting
            .iter()
            .map(|s| SpectatorView {
                id: s.id.clone(),
                name: s.name.clone(),
                chips: s.chips,
                status: s.status,
            })
            .collect();
        RoomSnapshot {
            id: self.room.id.clone(),
            players,
            spectators,
            waiting_players,
            community_cards: self
                .room
                .community_cards
                .iter()
                .map(|&c| c.into())
                .collect(),
            pot: self.room.pot,
            current_bet: self.room.current_bet,
            dealer_index: self.room.dealer_index,
            current_turn: self.room.current_turn,
            game_phase: self.room.game_phase,
        }
    }

    async fn handle_client(&mut self, conn_id: String, msg: ClientMessage) {
        match msg {
            ClientMessage::CreateRoom { data, .. } => self.handle_join(conn_id, data.name, true),
            ClientMessage::JoinRoom { data, .. } => self.handle_join(conn_id, data.name, false),
            ClientMessage::JoinTable { .. } => match self.room.sit_down(&conn_id) {
                Ok(()) => {
                    if let Some(s) = self.room.find_seat(&conn_id) {
                        let entry = RosterEntry {
                            id: s.id.clone(),
                            name: s.name.clone(),
                        };
                        self.broadcast_same(ServerMessage::PlayerJoinedTable { data: entry });
                    }
                    self.broadcast_snapshot();
                }
                Err(e) => self.send_error(&conn_id, e),
            },
            ClientMessage::StartGame { .. } => match self.room.start_hand() {
                Ok(true) => {
                    info!(room_id = %self.room.id, "hand started");
                    self.broadcast(|viewer| ServerMessage::GameStarted {
                        data: self.snapshot_for(viewer),
                    });
                    self.schedule_turn_timer();
                }
                Ok(false) => {
                    self.broadcast(|viewer| ServerMessage::GameWaiting {
                        data: self.snapshot_for(viewer),
                    });
                }
                Err(e) => self.send_error(&conn_id, e),
            },
            ClientMessage::Action { data, .. } => self.handle_action(conn_id, data).await,
            ClientMessage::BuyHand { .. } => {
                match self.room.buy_hand(&conn_id, poker_core::BUY_IN_AMOUNT) {
                    Ok(chips) => {
                        self.send_to(
                            &conn_id,
                            ServerMessage::BuyHandSuccess {
                                data: BuyHandSuccessData { chips },
                            },
                        );
                        self.broadcast_snapshot();
                    }
                    Err(e) => self.send_error(&conn_id, e),
                }
            }
            ClientMessage::GetBuyHandStats { .. } => {
                let count = self
                    .room
                    .find_seat(&conn_id)
                    .map(|s| self.room.buy_hand_count(&s.name))
                    .unwrap_or(0);
                self.send_to(
                    &conn_id,
                    ServerMessage::BuyHandStats {
                        data: BuyHandStatsData { count },
                    },
                );
            }
            ClientMessage::Heartbeat { .. } => {
                self.room.set_heartbeat_timeout(&conn_id, false);
            }
        }
    }

    fn handle_join(&mut self, conn_id: String, name: String, created: bool) {
        if self.room.find_seat(&conn_id).is_none() {
            let chips = self.ledger.restore(&self.room.id, &name);
            if let Err(e) = self.room.join(conn_id.clone(), name, chips) {
                self.send_error(&conn_id, e);
                return;
            }
        }
        let snapshot = self.snapshot_for(&conn_id);
        if created {
            self.send_to(&conn_id, ServerMessage::RoomCreated { data: snapshot });
        } else {
            self.send_to(&conn_id, ServerMessage::RoomJoined { data: snapshot });
        }
        if let Some(s) = self.room.find_seat(&conn_id) {
            let entry = RosterEntry {
                id: s.id.clone(),
                name: s.name.clone(),
            };
            if self.room.game_phase == GamePhase::Waiting {
                self.broadcast_same(ServerMessage::PlayerJoined { data: entry });
            }
        }
    }

    async fn handle_action(&mut self, conn_id: String, req: ActionRequest) {
        let action = match req.action.as_str() {
            "fold" => PlayerAction::Fold,
            "check" => PlayerAction::Check,
            "call" => PlayerAction::Call,
            "raise" => match req.amount {
                Some(amount) => PlayerAction::Raise(amount),
                None => {
                    self.send_error(&conn_id, RoomError::InvalidRaise);
                    return;
                }
            },
            _ => {
                self.send_error(&conn_id, RoomError::BadRequest);
                return;
            }
        };

        match self.room.apply_action(&conn_id, action) {
            Ok(outcome) => {
                debug!(room_id = %self.room.id, %conn_id, action = req.action, "action applied");
                if let Some(s) = self.room.find_seat(&conn_id) {
                    let entry = RosterEntry {
                        id: s.id.clone(),
                        name: s.name.clone(),
                    };
                    self.broadcast_same(ServerMessage::ActionTaken { data: entry });
                }
                self.handle_outcome(outcome).await;
            }
            Err(e) => self.send_error(&conn_id, e),
        }
    }

    async fn handle_outcome(&mut self, outcome: ActionOutcome) {
        match outcome {
            ActionOutcome::Continue => {
                self.broadcast_snapshot();
                if self.room.game_phase.is_betting_phase() {
                    self.schedule_turn_timer();
                }
            }
            ActionOutcome::HandEnded(showdown) => self.finish_hand(showdown),
            ActionOutcome::AllInRunout { streets: _, showdown } => {
                self.broadcast_snapshot();
                sleep(Duration::from_millis(500)).await;
                self.finish_hand(showdown);
            }
        }
    }

    fn finish_hand(&mut self, showdown: ShowdownResult) {
        for w in &showdown.winners {
            self.ledger.save(&self.room.id, &w.name, w.chips);
        }
        for p in &self.room.players {
            self.ledger.save(&self.room.id, &p.name, p.chips);
        }
        info!(room_id = %self.room.id, pot = showdown.pot, winners = showdown.winners.len(), "hand ended");

        let winners: Vec<WinnerView> = showdown
            .winners
            .iter()
            .map(|w| WinnerView {
                id: w.id.clone(),
                name: w.name.clone(),
                chips: w.chips,
            })
            .collect();
        let all_hands: Vec<RevealedHand> = showdown
            .all_hands
            .iter()
            .map(|(id, name, (a, b))| RevealedHand {
                id: id.clone(),
                name: name.clone(),
                hand: ((*a).into(), (*b).into()),
            })
            .collect();
        let community_cards: Vec<CardView> =
            showdown.community_cards.iter().map(|&c| c.into()).collect();

        let data = GameEndedData {
            winner: winners.first().cloned(),
            winners,
            is_tie: showdown.is_tie,
            pot: showdown.pot,
            winning_hand: showdown.winning_hand,
            all_hands,
            community_cards,
        };
        self.broadcast_same(ServerMessage::GameEnded { data });
        for (id, name) in showdown.demoted_to_spectating {
            self.broadcast_same(ServerMessage::PlayerMovedToSpectating {
                data: RosterEntry { id, name },
            });
        }
        self.broadcast_snapshot();
    }

    fn schedule_turn_timer(&self) {
        let Some(seat) = self.room.players.get(self.room.current_turn) else {
            return;
        };
        if !seat.can_act() {
            return;
        }
        let seat_idx = self.room.current_turn;
        let phase = self.room.game_phase;
        let tx = self.self_tx.clone();
        let timeout = self.config.turn_timeout;
        tokio::spawn(async move {
            sleep(timeout).await;
            let _ = tx.send(ActorMsg::TimerFire {
                seat: seat_idx,
                phase,
            });
        });
    }

    fn send_error(&self, conn_id: &str, err: RoomError) {
        warn!(room_id = %self.room.id, %conn_id, error = %err, "action rejected");
        self.send_to(
            conn_id,
            ServerMessage::Error {
                data: ErrorData {
                    message: err.to_string(),
                },
            },
        );
    }
}
