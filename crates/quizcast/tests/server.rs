//! End-to-end tests over real WebSocket connections: a host app and
//! player apps as raw JSON frames, the server as a black box.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use quizcast::QuizcastServer;
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::Message;

type Ws = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

// =========================================================================
// Helpers
// =========================================================================

async fn start() -> String {
    let server = QuizcastServer::builder()
        .bind("127.0.0.1:0")
        .build()
        .await
        .unwrap();
    let addr = server.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    addr
}

async fn ws(addr: &str) -> Ws {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .unwrap();
    ws
}

async fn send(ws: &mut Ws, msg: Value) {
    ws.send(Message::Text(msg.to_string().into())).await.unwrap();
}

/// Receives the next JSON frame, failing the test after 5 seconds.
async fn recv(ws: &mut Ws) -> Value {
    let frame = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match ws.next().await.expect("connection stayed open").unwrap() {
                Message::Text(text) => break text.to_string(),
                _ => continue,
            }
        }
    })
    .await
    .expect("timed out waiting for a frame");
    serde_json::from_str(&frame).unwrap()
}

/// Skips frames until one with the given `type` arrives.
async fn recv_until(ws: &mut Ws, kind: &str) -> Value {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let msg = recv(ws).await;
            if msg["type"] == kind {
                break msg;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for `{kind}`"))
}

fn quiz(timer_sec: u32) -> Value {
    json!({
        "type": "host:create",
        "title": "Capitals",
        "questions": [{
            "id": "q-1",
            "text": "Capital of France?",
            "choices": ["Paris", "Lyon", "Marseille", "Nice"],
            "correctIndex": 0,
            "timerSec": timer_sec,
        }],
    })
}

/// Creates a quiz and returns (host socket, quiz code, host token).
async fn create(addr: &str, timer_sec: u32) -> (Ws, String, String) {
    let mut host = ws(addr).await;
    send(&mut host, quiz(timer_sec)).await;

    let sync = recv(&mut host).await;
    assert_eq!(sync["type"], "sync");
    assert_eq!(sync["phase"], "lobby");
    let code = sync["data"]["quizCode"].as_str().unwrap().to_string();
    let token = sync["data"]["sessionToken"].as_str().unwrap().to_string();
    (host, code, token)
}

/// Joins a quiz and returns (player socket, session token).
async fn join(addr: &str, code: &str, name: &str) -> (Ws, String) {
    let mut player = ws(addr).await;
    send(&mut player, json!({ "type": "join", "quizCode": code, "name": name }))
        .await;

    let joined = recv(&mut player).await;
    assert_eq!(joined["type"], "joined");
    let session = recv(&mut player).await;
    assert_eq!(session["type"], "session");
    let token = session["sessionToken"].as_str().unwrap().to_string();
    (player, token)
}

// =========================================================================
// Creation and joining
// =========================================================================

#[tokio::test]
async fn test_create_quiz_replies_with_code_and_private_token() {
    let addr = start().await;
    let (_host, code, token) = create(&addr, 30).await;

    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    assert_eq!(token.len(), 32);
}

#[tokio::test]
async fn test_join_notifies_host_and_issues_token() {
    let addr = start().await;
    let (mut host, code, _token) = create(&addr, 30).await;

    let (mut player, token) = join(&addr, &code, "alice").await;
    assert_eq!(token.len(), 32);

    // The host sees the roster update — with no token in it.
    let joined = recv(&mut host).await;
    assert_eq!(joined["type"], "joined");
    assert_eq!(joined["players"], json!(["alice"]));
    assert!(joined.get("sessionToken").is_none());

    // The player's connection is a player binding, not a host one.
    send(&mut player, json!({"type": "host:end"})).await;
    let err = recv(&mut player).await;
    assert_eq!(err["type"], "error");
}

#[tokio::test]
async fn test_join_unknown_code_is_an_error() {
    let addr = start().await;
    let mut player = ws(&addr).await;

    send(
        &mut player,
        json!({ "type": "join", "quizCode": "ZZZZZZ", "name": "alice" }),
    )
    .await;

    let err = recv(&mut player).await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["message"], "no quiz with that code");
}

#[tokio::test]
async fn test_join_empty_code_is_an_error() {
    let addr = start().await;
    let mut player = ws(&addr).await;

    send(&mut player, json!({ "type": "join", "quizCode": "", "name": "a" }))
        .await;

    let err = recv(&mut player).await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["message"], "quiz code must not be empty");
}

// =========================================================================
// Malformed traffic
// =========================================================================

#[tokio::test]
async fn test_invalid_json_gets_error_reply_and_connection_survives() {
    let addr = start().await;
    let (_host, code, _t) = create(&addr, 30).await;
    let mut player = ws(&addr).await;

    player
        .send(Message::Text("this is not json".into()))
        .await
        .unwrap();
    let err = recv(&mut player).await;
    assert_eq!(err["type"], "error");

    // Same socket still works afterwards.
    send(
        &mut player,
        json!({ "type": "join", "quizCode": code, "name": "alice" }),
    )
    .await;
    let joined = recv(&mut player).await;
    assert_eq!(joined["type"], "joined");
}

#[tokio::test]
async fn test_unknown_message_type_gets_error_reply() {
    let addr = start().await;
    let mut player = ws(&addr).await;

    send(&mut player, json!({ "type": "host:cheat" })).await;

    let err = recv(&mut player).await;
    assert_eq!(err["type"], "error");
}

#[tokio::test]
async fn test_answer_before_joining_is_an_error() {
    let addr = start().await;
    let mut player = ws(&addr).await;

    send(
        &mut player,
        json!({ "type": "answer", "questionId": "q-1", "choiceIndex": 0 }),
    )
    .await;

    let err = recv(&mut player).await;
    assert_eq!(err["type"], "error");
}

// =========================================================================
// Running a quiz
// =========================================================================

#[tokio::test]
async fn test_start_delivers_stripped_question_to_everyone() {
    let addr = start().await;
    let (mut host, code, _t) = create(&addr, 30).await;
    let (mut player, _token) = join(&addr, &code, "alice").await;
    recv(&mut host).await; // roster update

    send(&mut host, json!({ "type": "host:start" })).await;

    for socket in [&mut host, &mut player] {
        let q = recv(socket).await;
        assert_eq!(q["type"], "question");
        assert_eq!(q["index"], 0);
        assert_eq!(q["total"], 1);
        assert_eq!(q["question"]["id"], "q-1");
        assert_eq!(q["question"]["timerSec"], 30);
        assert!(
            q["question"].get("correctIndex").is_none(),
            "the answer key must never reach a connection"
        );
    }

    // The countdown is live: a tick arrives within the next second.
    let tick = recv(&mut player).await;
    assert_eq!(tick["type"], "tick");
    assert_eq!(tick["remaining"], 29);
}

#[tokio::test]
async fn test_full_round_results_leaderboard_ended() {
    let addr = start().await;
    let (mut host, code, _t) = create(&addr, 1).await;
    let (mut player, _token) = join(&addr, &code, "alice").await;
    recv(&mut host).await; // roster update

    send(&mut host, json!({ "type": "host:start" })).await;
    recv_until(&mut player, "question").await;

    // Answer immediately — the full countdown is still remaining.
    send(
        &mut player,
        json!({ "type": "answer", "questionId": "q-1", "choiceIndex": 0 }),
    )
    .await;

    // One second later the countdown expires and results fan out.
    let results = recv_until(&mut player, "results").await;
    assert_eq!(results["correctIndex"], 0);
    assert_eq!(results["distribution"], json!([1, 0, 0, 0]));
    assert_eq!(results["scores"]["alice"], 1000);
    recv_until(&mut host, "results").await;

    send(&mut host, json!({ "type": "host:next" })).await;
    let leaderboard = recv_until(&mut player, "leaderboard").await;
    assert_eq!(leaderboard["rankings"][0]["name"], "alice");
    assert_eq!(leaderboard["rankings"][0]["score"], 1000);

    send(&mut host, json!({ "type": "host:next" })).await;
    let ended = recv_until(&mut player, "ended").await;
    assert_eq!(ended, json!({ "type": "ended" }));
    recv_until(&mut host, "ended").await;
}

// =========================================================================
// Reconnection
// =========================================================================

#[tokio::test]
async fn test_host_drop_pauses_and_reconnect_resyncs() {
    let addr = start().await;
    let (mut host, code, host_token) = create(&addr, 30).await;
    let (mut player, _token) = join(&addr, &code, "alice").await;
    recv(&mut host).await; // roster update
    send(&mut host, json!({ "type": "host:start" })).await;
    recv_until(&mut player, "question").await;

    drop(host); // the host's network dies mid-question

    let paused = recv_until(&mut player, "paused").await;
    assert_eq!(paused, json!({ "type": "paused" }));

    // A new socket presents the host token and is resynced + resumed.
    let mut host2 = ws(&addr).await;
    send(
        &mut host2,
        json!({ "type": "host:reconnect", "sessionToken": host_token }),
    )
    .await;

    let sync = recv(&mut host2).await;
    assert_eq!(sync["type"], "sync");
    assert_eq!(sync["phase"], "question");
    assert!(sync["data"].get("sessionToken").is_none(), "never reissued");

    let q = recv(&mut host2).await;
    assert_eq!(q["type"], "question");
    let tick = recv(&mut host2).await;
    assert_eq!(tick["type"], "tick");

    // Players see the countdown move again.
    let next_tick = recv_until(&mut player, "tick").await;
    assert!(next_tick["remaining"].as_u64().unwrap() < 30);
}

#[tokio::test]
async fn test_player_reconnect_resyncs_into_question() {
    let addr = start().await;
    let (mut host, code, _ht) = create(&addr, 30).await;
    let (player, token) = join(&addr, &code, "alice").await;
    recv(&mut host).await; // roster update
    send(&mut host, json!({ "type": "host:start" })).await;
    recv_until(&mut host, "question").await;

    drop(player); // network drop mid-question

    let mut player2 = ws(&addr).await;
    send(
        &mut player2,
        json!({ "type": "reconnect", "sessionToken": token }),
    )
    .await;

    let q = recv(&mut player2).await;
    assert_eq!(q["type"], "question");
    assert_eq!(q["question"]["id"], "q-1");
    assert!(q["question"].get("correctIndex").is_none());
    let tick = recv(&mut player2).await;
    assert_eq!(tick["type"], "tick");
}

#[tokio::test]
async fn test_reconnect_with_bogus_token_is_session_error() {
    let addr = start().await;
    let mut player = ws(&addr).await;

    send(
        &mut player,
        json!({ "type": "reconnect", "sessionToken": "deadbeef" }),
    )
    .await;

    let err = recv(&mut player).await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["message"], "session invalid or expired");
}
