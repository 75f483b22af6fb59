use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use poker_server::actor::{self, ActorMsg};
use poker_server::config::ServerConfig;
use poker_server::ledger::ChipLedger;
use poker_server::protocol::{
    ActionRequest, ClientMessage, CreateRoomRequest, JoinRoomRequest, ServerMessage,
};
use poker_server::registry::RoomRegistry;

fn test_config() -> ServerConfig {
    ServerConfig {
        bind_addr: "127.0.0.1:0".parse::<SocketAddr>().unwrap(),
        static_dir: ".".to_string(),
        turn_timeout: Duration::from_secs(60),
        heartbeat_timeout: Duration::from_secs(60),
    }
}

fn spawn_room(room_id: &str) -> mpsc::UnboundedSender<ActorMsg> {
    actor::spawn(
        room_id.to_string(),
        Arc::new(ChipLedger::new()),
        Arc::new(RoomRegistry::new()),
        test_config(),
    )
}

async fn recv(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> ServerMessage {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("message arrived in time")
        .expect("sender alive")
}

async fn recv_until(
    rx: &mut mpsc::UnboundedReceiver<ServerMessage>,
    pred: impl Fn(&ServerMessage) -> bool,
) -> ServerMessage {
    loop {
        let msg = recv(rx).await;
        if pred(&msg) {
            return msg;
        }
    }
}

fn subscribe(
    tx: &mpsc::UnboundedSender<ActorMsg>,
    conn_id: &str,
) -> mpsc::UnboundedReceiver<ServerMessage> {
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    tx.send(ActorMsg::Subscribe {
        conn_id: conn_id.to_string(),
        tx: out_tx,
    })
    .unwrap();
    out_rx
}

fn create_room(tx: &mpsc::UnboundedSender<ActorMsg>, conn_id: &str, name: &str) {
    tx.send(ActorMsg::Client {
        conn_id: conn_id.to_string(),
        msg: ClientMessage::CreateRoom {
            data: CreateRoomRequest {
                name: name.to_string(),
            },
            player_id: None,
        },
    })
    .unwrap();
}

fn join_room(tx: &mpsc::UnboundedSender<ActorMsg>, conn_id: &str, room_id: &str, name: &str) {
    tx.send(ActorMsg::Client {
        conn_id: conn_id.to_string(),
        msg: ClientMessage::JoinRoom {
            data: JoinRoomRequest {
                room_id: room_id.to_string(),
                name: name.to_string(),
            },
            player_id: None,
        },
    })
    .unwrap();
}

fn join_table(tx: &mpsc::UnboundedSender<ActorMsg>, conn_id: &str) {
    tx.send(ActorMsg::Client {
        conn_id: conn_id.to_string(),
        msg: ClientMessage::JoinTable {
            player_id: conn_id.to_string(),
        },
    })
    .unwrap();
}

fn start_game(tx: &mpsc::UnboundedSender<ActorMsg>, conn_id: &str) {
    tx.send(ActorMsg::Client {
        conn_id: conn_id.to_string(),
        msg: ClientMessage::StartGame {
            player_id: conn_id.to_string(),
        },
    })
    .unwrap();
}

fn take_action(tx: &mpsc::UnboundedSender<ActorMsg>, conn_id: &str, action: &str, amount: Option<u32>) {
    tx.send(ActorMsg::Client {
        conn_id: conn_id.to_string(),
        msg: ClientMessage::Action {
            data: ActionRequest {
                action: action.to_string(),
                amount,
            },
            player_id: conn_id.to_string(),
        },
    })
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn seating_and_start_deals_private_hole_cards() {
    let tx = spawn_room("room-a");
    let mut alice_rx = subscribe(&tx, "alice");
    let mut bob_rx = subscribe(&tx, "bob");

    create_room(&tx, "alice", "Alice");
    join_table(&tx, "alice");
    join_room(&tx, "bob", "room-a", "Bob");
    join_table(&tx, "bob");
    join_room(&tx, "carol", "room-a", "Carol");
    join_table(&tx, "carol");
    join_room(&tx, "dave", "room-a", "Dave");
    join_table(&tx, "dave");
    start_game(&tx, "alice");

    let started = recv_until(&mut alice_rx, |m| matches!(m, ServerMessage::GameStarted { .. })).await;
    let ServerMessage::GameStarted { data } = started else {
        unreachable!()
    };
    let alice_view = data.players.iter().find(|p| p.id == "alice").unwrap();
    assert!(alice_view.hand.is_some(), "a player sees their own hole cards");
    let bob_view_from_alice = data.players.iter().find(|p| p.id == "bob").unwrap();
    assert!(
        bob_view_from_alice.hand.is_none(),
        "a player never sees another player's hole cards"
    );

    let bob_started = recv_until(&mut bob_rx, |m| matches!(m, ServerMessage::GameStarted { .. })).await;
    let ServerMessage::GameStarted { data } = bob_started else {
        unreachable!()
    };
    assert!(data.players.iter().find(|p| p.id == "bob").unwrap().hand.is_some());
    assert!(data.players.iter().find(|p| p.id == "alice").unwrap().hand.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fold_to_one_ends_the_hand_and_persists_chips_to_the_ledger() {
    let ledger = Arc::new(ChipLedger::new());
    let registry = Arc::new(RoomRegistry::new());
    let tx = actor::spawn("room-b".to_string(), ledger.clone(), registry, test_config());
    let mut alice_rx = subscribe(&tx, "alice");
    let _bob_rx = subscribe(&tx, "bob");
    let _carol_rx = subscribe(&tx, "carol");
    let _dave_rx = subscribe(&tx, "dave");

    create_room(&tx, "alice", "Alice");
    join_table(&tx, "alice");
    join_room(&tx, "bob", "room-b", "Bob");
    join_table(&tx, "bob");
    join_room(&tx, "carol", "room-b", "Carol");
    join_table(&tx, "carol");
    join_room(&tx, "dave", "room-b", "Dave");
    join_table(&tx, "dave");
    start_game(&tx, "alice");
    recv_until(&mut alice_rx, |m| matches!(m, ServerMessage::GameStarted { .. })).await;

    // Dealer is Alice (seat 0); small blind Bob, big blind Carol, first to
    // act preflop is Dave. Dave, Alice and Bob fold in turn, leaving Carol
    // (the big blind) as the sole survivor.
    take_action(&tx, "dave", "fold", None);
    take_action(&tx, "alice", "fold", None);
    take_action(&tx, "bob", "fold", None);

    let ended = recv_until(&mut alice_rx, |m| matches!(m, ServerMessage::GameEnded { .. })).await;
    let ServerMessage::GameEnded { data } = ended else {
        unreachable!()
    };
    assert_eq!(data.winners.len(), 1);
    assert_eq!(data.winners[0].id, "carol");
    assert_eq!(data.winning_hand, "");

    // The ledger now reflects Carol's post-hand balance for this room.
    assert_eq!(ledger.restore("room-b", "Carol"), data.winners[0].chips);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reconnecting_to_the_same_id_rebinds_without_losing_the_seat() {
    let tx = spawn_room("room-c");
    let mut alice_rx = subscribe(&tx, "alice");
    let _bob_rx = subscribe(&tx, "bob");

    create_room(&tx, "alice", "Alice");
    join_table(&tx, "alice");
    join_room(&tx, "bob", "room-c", "Bob");
    join_table(&tx, "bob");

    // Drain everything already queued for Alice's original connection before
    // the swap, so a leftover broadcast from setup can't masquerade as a
    // post-reconnect message below.
    while timeout(Duration::from_millis(200), alice_rx.recv())
        .await
        .is_ok()
    {}

    // Alice's connection drops and reconnects under the same stable id.
    let mut alice_rx2 = subscribe(&tx, "alice");

    // The new receiver still sees broadcasts for the room Alice already sat down in.
    join_room(&tx, "carol", "room-c", "Carol");
    recv_until(&mut alice_rx2, |m| matches!(m, ServerMessage::PlayerJoined { .. })).await;

    // The stale receiver no longer gets new broadcasts once replaced: either
    // it times out waiting, or the actor's dropped sender closes the channel
    // outright. Either way, no further message is ever delivered on it.
    let stale = timeout(Duration::from_millis(300), alice_rx.recv()).await;
    assert!(!matches!(stale, Ok(Some(_))));
}
