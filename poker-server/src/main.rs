use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use clap::Parser;
use futures::{SinkExt, StreamExt};
use rand::Rng;
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use poker_server::actor::{self, ActorMsg};
use poker_server::config::{Cli, ServerConfig};
use poker_server::heartbeat::{self, HeartbeatClock};
use poker_server::ledger::ChipLedger;
use poker_server::protocol::{ClientMessage, ErrorData, ServerMessage, WelcomeData};
use poker_server::registry::RoomRegistry;

#[derive(Clone)]
struct AppState {
    ledger: Arc<ChipLedger>,
    registry: Arc<RoomRegistry>,
    config: ServerConfig,
}

fn fresh_conn_id() -> String {
    format!("p{:016x}", rand::rng().random::<u64>())
}

fn player_id_of(msg: &ClientMessage) -> Option<&str> {
    match msg {
        ClientMessage::CreateRoom { player_id, .. } | ClientMessage::JoinRoom { player_id, .. } => {
            player_id.as_deref()
        }
        ClientMessage::JoinTable { player_id }
        | ClientMessage::StartGame { player_id }
        | ClientMessage::Action { player_id, .. }
        | ClientMessage::BuyHand { player_id }
        | ClientMessage::GetBuyHandStats { player_id }
        | ClientMessage::Heartbeat { player_id } => Some(player_id.as_str()),
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ServerMessage>();

    let mut writer = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let Ok(text) = serde_json::to_string(&msg) else {
                continue;
            };
            if ws_tx.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let mut conn_id = fresh_conn_id();
    let _ = out_tx.send(ServerMessage::Welcome {
        data: WelcomeData {
            player_id: conn_id.clone(),
        },
    });

    let clock = HeartbeatClock::new();
    let mut current_room: Option<mpsc::UnboundedSender<ActorMsg>> = None;

    // A write failure (the client closed its read side) ends the writer task
    // early; that must be treated the same as the reader loop ending, so a
    // dead connection's player is removed from its room either way. Once the
    // writer branch fires, the JoinHandle has already resolved, so it must
    // not be polled again below.
    let mut writer_done = false;
    loop {
        let frame = tokio::select! {
            frame = ws_rx.next() => frame,
            _ = &mut writer => {
                writer_done = true;
                break;
            }
        };
        let Some(Ok(frame)) = frame else { break };
        let Message::Text(text) = frame else {
            continue;
        };
        clock.touch();

        let msg: ClientMessage = match serde_json::from_str(&text) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(%conn_id, error = %e, "malformed client message");
                let _ = out_tx.send(ServerMessage::Error {
                    data: ErrorData {
                        message: "bad request".to_string(),
                    },
                });
                continue;
            }
        };

        if let Some(pid) = player_id_of(&msg) {
            conn_id = pid.to_string();
        }

        match msg {
            ClientMessage::CreateRoom { .. } => {
                let room_id = state.registry.fresh_room_id();
                let tx = actor::spawn(
                    room_id.clone(),
                    state.ledger.clone(),
                    state.registry.clone(),
                    state.config.clone(),
                );
                state.registry.insert(room_id.clone(), tx.clone());
                info!(room_id = %room_id, %conn_id, "room created");
                let _ = tx.send(ActorMsg::Subscribe {
                    conn_id: conn_id.clone(),
                    tx: out_tx.clone(),
                });
                let _ = tx.send(ActorMsg::Client {
                    conn_id: conn_id.clone(),
                    msg,
                });
                if current_room.is_none() {
                    heartbeat::spawn(conn_id.clone(), clock.clone(), tx.clone(), state.config.heartbeat_timeout);
                }
                current_room = Some(tx);
            }
            ClientMessage::JoinRoom { ref data, .. } => match state.registry.get(&data.room_id) {
                Some(tx) => {
                    let _ = tx.send(ActorMsg::Subscribe {
                        conn_id: conn_id.clone(),
                        tx: out_tx.clone(),
                    });
                    let _ = tx.send(ActorMsg::Client {
                        conn_id: conn_id.clone(),
                        msg,
                    });
                    if current_room.is_none() {
                        heartbeat::spawn(conn_id.clone(), clock.clone(), tx.clone(), state.config.heartbeat_timeout);
                    }
                    current_room = Some(tx);
                }
                None => {
                    let _ = out_tx.send(ServerMessage::Error {
                        data: ErrorData {
                            message: poker_core::RoomError::RoomNotFound.to_string(),
                        },
                    });
                }
            },
            other => {
                if let Some(tx) = &current_room {
                    let _ = tx.send(ActorMsg::Client {
                        conn_id: conn_id.clone(),
                        msg: other,
                    });
                } else {
                    let _ = out_tx.send(ServerMessage::Error {
                        data: ErrorData {
                            message: poker_core::RoomError::RoomNotFound.to_string(),
                        },
                    });
                }
            }
        }
    }

    if let Some(tx) = current_room {
        let _ = tx.send(ActorMsg::Unsubscribe { conn_id });
    }
    if !writer_done {
        let _ = writer.await;
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let config = match ServerConfig::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let state = AppState {
        ledger: Arc::new(ChipLedger::new()),
        registry: Arc::new(RoomRegistry::new()),
        config: config.clone(),
    };

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(&config.static_dir))
        .with_state(state);

    let addr: SocketAddr = config.bind_addr;
    info!(%addr, static_dir = %config.static_dir, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
