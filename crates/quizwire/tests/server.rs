//! Integration tests for the gateway over real WebSocket connections.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use quizwire::prelude::*;
use quizwire_engine::{Answer, Question, RoomSettings};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Question source and score sink doubles
// =========================================================================

struct StaticSource {
    bank: Vec<Question>,
}

impl StaticSource {
    fn with_questions(n: usize) -> Self {
        let bank = (0..n)
            .map(|i| {
                Question::new(
                    format!("question {i}"),
                    vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    2,
                    "Verbal",
                )
            })
            .collect();
        Self { bank }
    }
}

impl QuestionSource for StaticSource {
    async fn fetch(&self, _domain: &str, count: usize) -> Result<Vec<Question>, SourceError> {
        Ok(self.bank.iter().take(count).cloned().collect())
    }
}

/// Discards scores; persistence is covered by the room-layer tests.
struct NullSink;

impl ScoreSink for NullSink {
    async fn persist(&self, _username: &str, _score: u32, _domain: &str) -> Result<(), SinkError> {
        Ok(())
    }
}

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port with a short reveal hold and returns
/// the address.
async fn start_server() -> String {
    let server = QuizServer::<StaticSource, NullSink>::builder()
        .bind("127.0.0.1:0")
        .reveal_hold(Duration::from_millis(50))
        .build(StaticSource::with_questions(5), NullSink)
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send_cmd(ws: &mut ClientWs, cmd: &ClientCommand) {
    let text = serde_json::to_string(cmd).expect("encode");
    ws.send(Message::text(text)).await.expect("send");
}

async fn recv_event(ws: &mut ClientWs) -> ServerEvent {
    let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for event")
        .expect("stream ended")
        .expect("recv");
    serde_json::from_slice(&msg.into_data()).expect("decode")
}

/// Receives events until one matches `pred`. Ack and broadcast ordering
/// is not fixed across the create/join boundary, so tests match on the
/// event they care about.
async fn recv_until(
    ws: &mut ClientWs,
    pred: impl Fn(&ServerEvent) -> bool,
) -> ServerEvent {
    for _ in 0..20 {
        let event = recv_event(ws).await;
        if pred(&event) {
            return event;
        }
    }
    panic!("expected event did not arrive");
}

fn settings(time_limit: u32, num_questions: usize) -> RoomSettings {
    RoomSettings {
        domain: "Verbal".into(),
        time_limit,
        num_questions,
        max_players: 8,
    }
}

/// Creates a room and returns its code.
async fn create_room(ws: &mut ClientWs, owner: &str, s: RoomSettings) -> RoomCode {
    send_cmd(
        ws,
        &ClientCommand::CreateRoom {
            username: owner.into(),
            settings: s,
        },
    )
    .await;
    match recv_until(ws, |e| matches!(e, ServerEvent::RoomCreated { .. })).await {
        ServerEvent::RoomCreated { room_code, .. } => room_code,
        _ => unreachable!(),
    }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_create_room_acks_with_code_and_settings() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send_cmd(
        &mut ws,
        &ClientCommand::CreateRoom {
            username: "ada".into(),
            settings: settings(0, 99),
        },
    )
    .await;

    let ack = recv_until(&mut ws, |e| matches!(e, ServerEvent::RoomCreated { .. })).await;
    match ack {
        ServerEvent::RoomCreated { room_code, settings } => {
            assert!((1000..=9999).contains(&room_code.into_inner()));
            // Defaults applied, question count capped at the bank size.
            assert_eq!(settings.time_limit, 20);
            assert_eq!(settings.num_questions, 5);
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_join_acks_and_updates_roster() {
    let addr = start_server().await;
    let mut owner = connect(&addr).await;
    let code = create_room(&mut owner, "ada", settings(20, 3)).await;

    let mut bob = connect(&addr).await;
    send_cmd(
        &mut bob,
        &ClientCommand::JoinRoom {
            room_code: code,
            username: "bob".into(),
        },
    )
    .await;

    let ack = recv_until(&mut bob, |e| matches!(e, ServerEvent::RoomJoined { .. })).await;
    match ack {
        ServerEvent::RoomJoined { room_code, .. } => assert_eq!(room_code, code),
        _ => unreachable!(),
    }

    // Both sides see the two-player roster.
    for ws in [&mut owner, &mut bob] {
        let update = recv_until(ws, |e| {
            matches!(e, ServerEvent::RoomUpdate { room } if room.players.len() == 2)
        })
        .await;
        match update {
            ServerEvent::RoomUpdate { room } => {
                assert_eq!(room.owner, "ada");
                assert_eq!(room.players[1].username, "bob");
            }
            _ => unreachable!(),
        }
    }
}

#[tokio::test]
async fn test_duplicate_username_gets_requester_only_error() {
    let addr = start_server().await;
    let mut owner = connect(&addr).await;
    let code = create_room(&mut owner, "ada", settings(20, 3)).await;

    let mut dupe = connect(&addr).await;
    send_cmd(
        &mut dupe,
        &ClientCommand::JoinRoom {
            room_code: code,
            username: "ada".into(),
        },
    )
    .await;

    let err = recv_until(&mut dupe, |e| matches!(e, ServerEvent::Error { .. })).await;
    match err {
        ServerEvent::Error { message } => assert!(message.contains("ada")),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_join_unknown_room_fails() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send_cmd(
        &mut ws,
        &ClientCommand::JoinRoom {
            room_code: RoomCode::new(1001).expect("valid code"),
            username: "bob".into(),
        },
    )
    .await;

    let err = recv_until(&mut ws, |e| matches!(e, ServerEvent::Error { .. })).await;
    match err {
        ServerEvent::Error { message } => assert!(message.contains("not found")),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_malformed_frame_gets_error_event() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::text("{\"type\": \"mystery\"}"))
        .await
        .expect("send");

    let err = recv_event(&mut ws).await;
    assert!(matches!(err, ServerEvent::Error { .. }));
}

#[tokio::test]
async fn test_chat_is_relayed_to_the_room() {
    let addr = start_server().await;
    let mut owner = connect(&addr).await;
    let code = create_room(&mut owner, "ada", settings(20, 3)).await;

    let mut bob = connect(&addr).await;
    send_cmd(
        &mut bob,
        &ClientCommand::JoinRoom {
            room_code: code,
            username: "bob".into(),
        },
    )
    .await;
    recv_until(&mut bob, |e| matches!(e, ServerEvent::RoomJoined { .. })).await;

    send_cmd(
        &mut bob,
        &ClientCommand::ChatMessage {
            room_code: code,
            username: "bob".into(),
            message: "ready when you are".into(),
        },
    )
    .await;

    for ws in [&mut owner, &mut bob] {
        let event = recv_until(ws, |e| matches!(e, ServerEvent::ChatMessage { .. })).await;
        match event {
            ServerEvent::ChatMessage { message } => {
                assert_eq!(message, "bob: ready when you are");
            }
            _ => unreachable!(),
        }
    }
}

#[tokio::test]
async fn test_full_game_over_websocket() {
    let addr = start_server().await;
    let mut owner = connect(&addr).await;
    let code = create_room(&mut owner, "ada", settings(30, 1)).await;

    let mut bob = connect(&addr).await;
    send_cmd(
        &mut bob,
        &ClientCommand::JoinRoom {
            room_code: code,
            username: "bob".into(),
        },
    )
    .await;
    recv_until(&mut bob, |e| matches!(e, ServerEvent::RoomJoined { .. })).await;

    send_cmd(
        &mut owner,
        &ClientCommand::StartQuiz {
            room_code: code,
            username: "ada".into(),
        },
    )
    .await;

    let started = recv_until(&mut bob, |e| matches!(e, ServerEvent::QuizStarted { .. })).await;
    match started {
        ServerEvent::QuizStarted {
            current_question_index,
            current_options,
            num_questions,
            ..
        } => {
            assert_eq!(current_question_index, 0);
            assert_eq!(current_options.len(), 4);
            assert_eq!(num_questions, 1);
        }
        _ => unreachable!(),
    }

    // Both answer right away; everyone answering closes the question
    // without waiting out the 30 seconds.
    send_cmd(
        &mut owner,
        &ClientCommand::SubmitAnswer {
            room_code: code,
            username: "ada".into(),
            answer: 2,
        },
    )
    .await;
    send_cmd(
        &mut bob,
        &ClientCommand::SubmitAnswer {
            room_code: code,
            username: "bob".into(),
            answer: 0,
        },
    )
    .await;

    let reveal = recv_until(&mut bob, |e| {
        matches!(e, ServerEvent::QuestionFinished { .. })
    })
    .await;
    match reveal {
        ServerEvent::QuestionFinished {
            correct_answer,
            players,
        } => {
            assert_eq!(correct_answer, 2);
            let ada = players.iter().find(|p| p.username == "ada").unwrap();
            assert_eq!(ada.answer, Answer::Choice(2));
            assert!(ada.score >= 100);
        }
        _ => unreachable!(),
    }

    // After the reveal hold, final standings reach both clients.
    for ws in [&mut owner, &mut bob] {
        let finished =
            recv_until(ws, |e| matches!(e, ServerEvent::QuizFinished { .. })).await;
        match finished {
            ServerEvent::QuizFinished { final_scores } => {
                let ada = final_scores.iter().find(|p| p.username == "ada").unwrap();
                let bob = final_scores.iter().find(|p| p.username == "bob").unwrap();
                assert!(ada.score >= 100);
                assert_eq!(bob.score, 0);
            }
            _ => unreachable!(),
        }
    }
}
