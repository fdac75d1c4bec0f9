//! Per-connection handler: join, edit relay, run and completion dispatch.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use codepair_ai::CompletionClient;
use codepair_common::ConnectionId;
use codepair_judge::poller::{poll_result, RunOutcome};
use codepair_judge::{JudgeApi, Submission};

use crate::protocol::{ClientMessage, ServerMessage};
use crate::room::{EditField, Role, RoomStore};

/// Outbound channel capacity per connection. A member that falls this far
/// behind silently misses relays (at-most-once best-effort delivery).
const OUTBOUND_CAPACITY: usize = 256;

/// Shared handles every connection task receives.
#[derive(Clone)]
pub struct Services {
    pub store: RoomStore,
    pub judge: Arc<dyn JudgeApi>,
    pub ai: Arc<dyn CompletionClient>,
    pub poll_interval: Duration,
    pub poll_deadline: Duration,
}

/// Handle a single WebSocket connection until it closes.
pub async fn handle_connection(
    ws: WebSocketStream<TcpStream>,
    addr: SocketAddr,
    services: Services,
) {
    let (mut sink, mut stream) = ws.split();
    let conn_id = ConnectionId::new();
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_CAPACITY);
    let mut joined: Option<(String, Role)> = None;

    tracing::debug!(peer = %addr, conn = %conn_id, "Connection open");

    loop {
        tokio::select! {
            // Outbound: relayed edits, our own acks, run/completion results.
            Some(msg) = rx.recv() => {
                if sink.send(Message::Text(msg.into())).await.is_err() {
                    break;
                }
            }

            // Inbound frames from this client.
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(msg) => {
                                handle_message(msg, &conn_id, &mut joined, &services, &tx).await;
                            }
                            Err(e) => {
                                tracing::warn!(peer = %addr, error = %e, "Invalid message");
                                reply(&tx, &ServerMessage::Error {
                                    message: format!("invalid message: {e}"),
                                });
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(peer = %addr, error = %e, "WS error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    if let Some((room_id, role)) = &joined {
        services.store.leave(room_id, &conn_id).await;
        tracing::info!(peer = %addr, room = %room_id, role = %role, "Participant disconnected");
    } else {
        tracing::debug!(peer = %addr, conn = %conn_id, "Connection closed");
    }
}

/// Dispatch one parsed client message. Replies and relays go through
/// outbound channels; nothing here touches the socket directly.
async fn handle_message(
    msg: ClientMessage,
    conn_id: &ConnectionId,
    joined: &mut Option<(String, Role)>,
    services: &Services,
    tx: &mpsc::Sender<String>,
) {
    match msg {
        ClientMessage::Join { room_id, role } => {
            handle_join(room_id, role, conn_id, joined, services, tx).await;
        }

        ClientMessage::CodeEdit { room_id, value } => {
            handle_edit(EditField::Code, room_id, value, conn_id, joined, services, tx).await;
        }
        ClientMessage::LanguageEdit { room_id, value } => {
            handle_edit(EditField::Language, room_id, value, conn_id, joined, services, tx).await;
        }
        ClientMessage::InputEdit { room_id, value } => {
            handle_edit(EditField::Input, room_id, value, conn_id, joined, services, tx).await;
        }

        ClientMessage::RunSubmit {
            source,
            language_id,
            stdin,
        } => {
            if source.is_empty() {
                reply(tx, &ServerMessage::Error {
                    message: "Source code and language ID are required".to_string(),
                });
                return;
            }
            let submission = Submission {
                source_code: source,
                language_id,
                stdin,
            };
            match services.judge.submit(&submission).await {
                Ok(token) => {
                    reply(tx, &ServerMessage::RunSubmitted {
                        token: token.clone(),
                    });
                    spawn_poll_task(token, services, tx.clone());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Run submit failed");
                    reply(tx, &ServerMessage::Error {
                        message: format!("Error: {e}"),
                    });
                }
            }
        }

        ClientMessage::RunStatus { token } => {
            if token.is_empty() {
                reply(tx, &ServerMessage::Error {
                    message: "Token is required".to_string(),
                });
                return;
            }
            let msg = match services.judge.fetch(&token).await {
                Ok(result) if result.is_terminal() => {
                    match RunOutcome::from_result(&token, &result) {
                        Ok(outcome) => outcome.into(),
                        Err(e) => RunOutcome::internal_error(&token, &e.to_string()).into(),
                    }
                }
                Ok(result) => ServerMessage::RunResult {
                    token,
                    status_id: result.status.id,
                    status: result.status.description,
                    output: String::new(),
                    time: None,
                    memory: None,
                },
                Err(e) => RunOutcome::internal_error(&token, &e.to_string()).into(),
            };
            reply(tx, &msg);
        }

        ClientMessage::LanguageList => match services.judge.languages().await {
            Ok(languages) => reply(tx, &ServerMessage::Languages { languages }),
            Err(e) => reply(tx, &ServerMessage::Error {
                message: format!("Failed to fetch languages: {e}"),
            }),
        },

        ClientMessage::Completion { code, language } => {
            if code.is_empty() {
                reply(tx, &ServerMessage::Error {
                    message: "Code is required".to_string(),
                });
                return;
            }
            let ai = services.ai.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let msg = match ai.complete(&code, &language).await {
                    Ok(suggestion) => ServerMessage::Completion { suggestion },
                    Err(e) => {
                        tracing::warn!(error = %e, "Completion failed");
                        ServerMessage::Error {
                            message: e.to_string(),
                        }
                    }
                };
                send(&tx, &msg).await;
            });
        }

        ClientMessage::Ping => reply(tx, &ServerMessage::Pong),
    }
}

async fn handle_join(
    room_id: String,
    role: Role,
    conn_id: &ConnectionId,
    joined: &mut Option<(String, Role)>,
    services: &Services,
    tx: &mpsc::Sender<String>,
) {
    match joined {
        Some((bound, bound_role)) if *bound == room_id => {
            // Re-join of the bound room: re-ack, nothing else changes.
            reply(tx, &ServerMessage::Joined {
                room_id,
                role: *bound_role,
            });
        }
        Some((bound, _)) => {
            reply(tx, &ServerMessage::Error {
                message: format!("already joined room {bound}"),
            });
        }
        None => {
            let snapshot = services
                .store
                .join(&room_id, conn_id.clone(), role, tx.clone())
                .await;
            *joined = Some((room_id.clone(), role));
            tracing::info!(conn = %conn_id, room = %room_id, role = %role, "Participant joined");

            reply(tx, &ServerMessage::Joined { room_id, role });
            if let Some(snapshot) = snapshot {
                reply(tx, &snapshot.into());
            }
        }
    }
}

/// Validate an edit against the connection's bound state, apply it, and
/// relay the bare value to the rest of the room.
async fn handle_edit(
    field: EditField,
    room_id: String,
    value: String,
    conn_id: &ConnectionId,
    joined: &Option<(String, Role)>,
    services: &Services,
    tx: &mpsc::Sender<String>,
) {
    let Some((bound, role)) = joined else {
        reply(tx, &ServerMessage::Error {
            message: "join a room before editing".to_string(),
        });
        return;
    };
    if *bound != room_id {
        reply(tx, &ServerMessage::Error {
            message: format!("not joined to room {room_id}"),
        });
        return;
    }
    if !role.can_edit() {
        tracing::warn!(conn = %conn_id, room = %room_id, "Viewer attempted an edit");
        reply(tx, &ServerMessage::Error {
            message: "role viewer cannot edit".to_string(),
        });
        return;
    }

    let peers = services
        .store
        .apply_edit(&room_id, conn_id, field, value.clone())
        .await;

    let msg = match field {
        EditField::Code => ServerMessage::CodeEdit { value },
        EditField::Language => ServerMessage::LanguageEdit { value },
        EditField::Input => ServerMessage::InputEdit { value },
    };
    let json = serde_json::to_string(&msg).unwrap();
    for peer in peers {
        if peer.try_send(json.clone()).is_err() {
            tracing::debug!(room = %room_id, "Peer channel full or closed, dropping relay");
        }
    }
}

/// One poll loop per run; the terminal outcome goes back to the submitting
/// connection only. A disconnect does not cancel the loop; the send just
/// lands on a closed channel.
fn spawn_poll_task(token: String, services: &Services, tx: mpsc::Sender<String>) {
    let judge = services.judge.clone();
    let interval = services.poll_interval;
    let deadline = services.poll_deadline;
    tokio::spawn(async move {
        let outcome = poll_result(judge.as_ref(), &token, interval, deadline).await;
        send(&tx, &ServerMessage::from(outcome)).await;
    });
}

/// Non-blocking reply on our own outbound channel. Must not await: the
/// connection task is also this channel's consumer.
fn reply(tx: &mpsc::Sender<String>, msg: &ServerMessage) {
    let json = serde_json::to_string(msg).unwrap();
    if tx.try_send(json).is_err() {
        tracing::debug!("Outbound channel full or closed, dropping reply");
    }
}

/// Blocking send from spawned tasks (they are not the channel's consumer).
async fn send(tx: &mpsc::Sender<String>, msg: &ServerMessage) {
    let json = serde_json::to_string(msg).unwrap();
    if tx.send(json).await.is_err() {
        tracing::debug!("Connection gone before result delivery");
    }
}
