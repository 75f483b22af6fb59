use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Minimal demo client for manual smoke-testing against a running server.
///
/// Usage:
///   client ws://127.0.0.1:8080/ws host Alice
///   client ws://127.0.0.1:8080/ws join Bob 123456
#[tokio::main]
async fn main() {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:8080/ws".to_string());
    let mode = std::env::args().nth(2).unwrap_or_else(|| "host".to_string());
    let name = std::env::args().nth(3).unwrap_or_else(|| "Player".to_string());
    let room_arg = std::env::args().nth(4);

    let (mut ws, _resp) = connect_async(url.as_str()).await.expect("connect");
    let mut player_id: Option<String> = None;

    match mode.as_str() {
        "host" => {
            let create = serde_json::json!({"type": "createRoom", "data": {"name": name}});
            ws.send(Message::Text(create.to_string())).await.unwrap();
        }
        "join" => {
            let room_id = room_arg.expect("room_id required for join");
            let join = serde_json::json!({
                "type": "joinRoom",
                "data": {"roomId": room_id, "name": name},
            });
            ws.send(Message::Text(join.to_string())).await.unwrap();
        }
        _ => {}
    }

    let mut reads = 0;
    while reads < 200 {
        let Some(Ok(msg)) = ws.next().await else {
            break;
        };
        let text = msg.to_string();
        println!("<- {text}");
        if let Ok(v) = serde_json::from_str::<Value>(&text) {
            match v.get("type").and_then(|t| t.as_str()) {
                Some("welcome") => {
                    player_id = v
                        .get("data")
                        .and_then(|d| d.get("playerId"))
                        .and_then(|p| p.as_str())
                        .map(str::to_string);
                }
                Some("roomCreated") | Some("roomJoined") => {
                    if let Some(pid) = &player_id {
                        let join_table = serde_json::json!({"type": "joinTable", "playerId": pid});
                        ws.send(Message::Text(join_table.to_string())).await.unwrap();
                        let start = serde_json::json!({"type": "startGame", "playerId": pid});
                        ws.send(Message::Text(start.to_string())).await.unwrap();
                    }
                }
                _ => {}
            }
        }
        reads += 1;
    }
}
