//! Per-connection handler: decode commands, dispatch to rooms, pump
//! events back out.
//!
//! Each connection runs two halves: an outbound pump task draining the
//! connection's event channel into the WebSocket sink, and the inbound
//! loop on the handler task itself. Room actors hold clones of the event
//! sender, so broadcasts reach the pump without touching the handler.

use futures_util::{SinkExt, StreamExt};
use quizwire_protocol::{ClientCommand, Codec, JsonCodec, RoomCode, ServerEvent};
use quizwire_room::{EventSender, QuestionSource, RoomRegistry, ScoreSink};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::QuizwireError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S, K>(
    ws: WebSocketStream<TcpStream>,
    registry: RoomRegistry<S, K>,
) -> Result<(), QuizwireError>
where
    S: QuestionSource,
    K: ScoreSink,
{
    let (mut sink, mut stream) = ws.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let codec = JsonCodec;

    // Outbound pump: events (acks, errors, room broadcasts) → JSON text
    // frames. Ends when the socket dies or the last sender is dropped.
    let pump = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let bytes = match codec.encode(&event) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode event");
                    continue;
                }
            };
            let Ok(text) = String::from_utf8(bytes) else {
                tracing::error!("encoded event was not utf-8");
                continue;
            };
            if sink.send(Message::text(text)).await.is_err() {
                break;
            }
        }
    });

    // Inbound loop: one command per frame.
    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(error = %e, "recv error");
                break;
            }
        };
        let data = match &frame {
            Message::Text(text) => text.as_bytes(),
            Message::Binary(bytes) => bytes.as_ref(),
            Message::Close(_) => break,
            // Pings are answered by tungstenite itself.
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
        };

        match codec.decode::<ClientCommand>(data) {
            Ok(cmd) => dispatch(&registry, &tx, cmd).await,
            Err(e) => {
                tracing::debug!(error = %e, "failed to decode command");
                let _ = tx.send(ServerEvent::Error {
                    message: e.to_string(),
                });
            }
        }
    }

    // The connection is gone; rooms may still hold sender clones, but
    // there is no socket left to write to.
    pump.abort();
    Ok(())
}

/// Routes one decoded command to the registry.
///
/// Create and join produce requester-only acks; every failure becomes a
/// requester-only `error` event. Room-wide effects (roster updates,
/// question flow) arrive through the event channel as broadcasts from
/// the room actor.
async fn dispatch<S, K>(
    registry: &RoomRegistry<S, K>,
    tx: &EventSender,
    cmd: ClientCommand,
) where
    S: QuestionSource,
    K: ScoreSink,
{
    let result = match cmd {
        ClientCommand::CreateRoom { username, settings } => registry
            .create_room(&username, tx.clone(), settings)
            .await
            .map(|(room_code, settings)| {
                tracing::info!(room = %room_code, owner = %username, "room created");
                Some(ServerEvent::RoomCreated {
                    room_code,
                    settings,
                })
            }),
        ClientCommand::JoinRoom {
            room_code,
            username,
        } => join(registry, tx, room_code, &username).await,
        ClientCommand::StartQuiz {
            room_code,
            username,
        } => registry.start_quiz(room_code, username).await.map(|_| None),
        ClientCommand::SubmitAnswer {
            room_code,
            username,
            answer,
        } => registry
            .submit_answer(room_code, username, answer)
            .await
            .map(|_| None),
        ClientCommand::ChatMessage {
            room_code,
            username,
            message,
        } => registry
            .chat(room_code, username, message)
            .await
            .map(|_| None),
    };

    match result {
        Ok(Some(ack)) => {
            let _ = tx.send(ack);
        }
        Ok(None) => {}
        Err(err) => {
            let _ = tx.send(ServerEvent::Error {
                message: err.to_string(),
            });
        }
    }
}

async fn join<S, K>(
    registry: &RoomRegistry<S, K>,
    tx: &EventSender,
    room_code: RoomCode,
    username: &str,
) -> Result<Option<ServerEvent>, quizwire_room::RoomError>
where
    S: QuestionSource,
    K: ScoreSink,
{
    let settings = registry.join_room(room_code, username, tx.clone()).await?;
    Ok(Some(ServerEvent::RoomJoined {
        room_code,
        settings,
    }))
}
