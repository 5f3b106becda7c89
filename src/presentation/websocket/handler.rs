//! WebSocket Connection Handler
//!
//! Authenticates the upgrade, then runs one inbound task per connection plus
//! a writer task draining the connection's outbound queue.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::HeaderMap,
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{mpsc, Notify};
use tokio::time::interval;

use super::gateway::ConnectedSession;
use super::messages::{ClientFrame, FrameError};
use super::session::ConnectionState;
use crate::application::services::verify_within;
use crate::domain::{
    ConnectionHub, ConnectionId, MediaCapabilities, OutboundFrame, RoomEvent, RoomId,
    SignalingEnvelope, UserIdentity,
};
use crate::infrastructure::metrics;
use crate::presentation::middleware::auth::bearer_token;
use crate::shared::error::{AppError, SyncError};
use crate::startup::AppState;

/// Upgrade query string: `/ws?token=...&roomId=...`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectParams {
    pub token: Option<String>,
    pub room_id: Option<String>,
}

/// WebSocket upgrade handler
///
/// The token is verified before the upgrade; a bad or missing token is
/// answered with `401` and no connection is created.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let token = params
        .token
        .as_deref()
        .or_else(|| bearer_token(&headers))
        .ok_or_else(|| AppError::Unauthorized("Missing token".into()))?;
    let user = verify_within(
        state.verifier.as_ref(),
        token,
        state.settings.rooms.collaborator_timeout(),
    )
    .await
    .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    let room_id = params
        .room_id
        .ok_or_else(|| AppError::BadRequest("Missing roomId".into()))
        .and_then(|raw| RoomId::parse(raw).map_err(|e| AppError::BadRequest(e.to_string())))?;

    let limits = &state.settings.websocket;
    Ok(ws
        .max_message_size(limits.max_message_size)
        .max_frame_size(limits.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, state, user, room_id)))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState, user: UserIdentity, room_id: RoomId) {
    let (session, outbound) = state.gateway.accept(user);
    let connection_id = session.connection_id;
    let heartbeat = state.settings.websocket.heartbeat_interval();
    let mut conn = ConnectionState::new(connection_id, room_id);

    tracing::debug!(
        connection_id = %connection_id,
        room_id = %conn.handshake_room,
        "New WebSocket connection"
    );

    // Split socket for concurrent read/write
    let (sink, mut receiver) = socket.split();
    let close = session.close_signal();
    let mut writer = tokio::spawn(write_loop(
        sink,
        outbound,
        heartbeat,
        connection_id,
        Arc::clone(&close),
    ));

    let mut liveness = interval(heartbeat);
    liveness.tick().await; // Skip first immediate tick

    // Main message loop
    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        conn.touch();
                        if dispatch(&state, &session, &mut conn, text.as_str()).await.is_break() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(connection_id = %connection_id, "Connection closed");
                        break;
                    }
                    Some(Ok(_)) => conn.touch(),
                    Some(Err(e)) => {
                        tracing::debug!(connection_id = %connection_id, error = %e, "WebSocket error");
                        metrics::record_dropped_connection("transport-error");
                        break;
                    }
                }
            }

            _ = close.notified() => {
                tracing::info!(connection_id = %connection_id, "Closing connection on server request");
                break;
            }

            _ = liveness.tick() => {
                if !conn.is_alive(heartbeat * 2) {
                    tracing::info!(connection_id = %connection_id, "Heartbeat timeout, closing connection");
                    metrics::record_dropped_connection("heartbeat-timeout");
                    break;
                }
            }
        }
    }

    // Disconnect path: the only place membership is removed.
    state.gateway.unregister(&connection_id);
    if let Some(room) = conn.joined_room() {
        state.rooms.leave(room, &connection_id);
    }

    // Dropping the last sender lets the writer flush and send a close frame.
    drop(session);
    if tokio::time::timeout(Duration::from_secs(1), &mut writer)
        .await
        .is_err()
    {
        writer.abort();
    }

    tracing::info!(connection_id = %connection_id, "Connection finished");
}

/// Forward queued frames to the socket and ping on every heartbeat.
async fn write_loop(
    mut sink: futures::stream::SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<OutboundFrame>,
    heartbeat: Duration,
    connection_id: ConnectionId,
    close: Arc<Notify>,
) {
    let mut ping = interval(heartbeat);
    ping.tick().await;

    loop {
        tokio::select! {
            frame = outbound.recv() => {
                let Some(frame) = frame else { break };
                let text = match serde_json::to_string(&frame) {
                    Ok(t) => t,
                    Err(e) => {
                        tracing::error!(connection_id = %connection_id, "Failed to serialize frame: {}", e);
                        continue;
                    }
                };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    close.notify_one();
                    break;
                }
            }
            _ = ping.tick() => {
                if sink.send(Message::Ping(Default::default())).await.is_err() {
                    close.notify_one();
                    break;
                }
            }
        }
    }

    let _ = sink.close().await;
}

/// Decode and handle one inbound text frame. `Break` ends the connection.
async fn dispatch(
    state: &AppState,
    session: &ConnectedSession,
    conn: &mut ConnectionState,
    text: &str,
) -> ControlFlow<()> {
    let frame = match ClientFrame::parse(text) {
        Ok(frame) => frame,
        Err(FrameError::UnknownType(kind)) => {
            tracing::debug!(connection_id = %conn.connection_id, frame_type = %kind, "Unknown frame type dropped");
            metrics::record_frame("unknown");
            return ControlFlow::Continue(());
        }
        Err(FrameError::Malformed(reason)) => {
            reject(state, session, SyncError::ProtocolViolation(reason));
            return ControlFlow::Continue(());
        }
    };
    metrics::record_frame(frame.frame_type());

    match handle_frame(state, session, conn, frame).await {
        Ok(flow) => flow,
        Err(e @ SyncError::TransportFailure(_)) => {
            reject(state, session, e);
            ControlFlow::Break(())
        }
        Err(e) => {
            reject(state, session, e);
            ControlFlow::Continue(())
        }
    }
}

async fn handle_frame(
    state: &AppState,
    session: &ConnectedSession,
    conn: &mut ConnectionState,
    frame: ClientFrame,
) -> Result<ControlFlow<()>, SyncError> {
    let connection_id = conn.connection_id;

    if let ClientFrame::JoinRoom { room_id } = frame {
        if conn.joined_room().is_some() {
            return Err(SyncError::ProtocolViolation(
                "connection already joined a room".into(),
            ));
        }
        if room_id != conn.handshake_room {
            return Err(SyncError::ProtocolViolation(format!(
                "join-room for {room_id} on a connection opened for {}",
                conn.handshake_room
            )));
        }
        return match state.rooms.join(&room_id, connection_id).await {
            Ok(_) => {
                let _ = session.room.set(room_id.clone());
                conn.mark_joined(room_id);
                Ok(ControlFlow::Continue(()))
            }
            Err(e @ SyncError::TransportFailure(_)) => {
                // Already a member; the disconnect path must remove it.
                conn.mark_joined(room_id);
                Err(e)
            }
            Err(e) => Err(e),
        };
    }
    if matches!(frame, ClientFrame::Leave) {
        return Ok(ControlFlow::Break(()));
    }

    let room_id = conn
        .joined_room()
        .cloned()
        .ok_or_else(|| SyncError::ProtocolViolation("join-room must come first".into()))?;

    match frame {
        ClientFrame::SyncVideo {
            current_time,
            is_playing,
        } => {
            state
                .sync
                .apply_sync(&room_id, connection_id, current_time, is_playing)?;
        }
        ClientFrame::SendMessage { message } => {
            state.chat.broadcast_chat(&room_id, connection_id, &message)?;
        }
        ClientFrame::MediaState {
            has_audio,
            has_video,
        } => {
            state.gateway.set_capabilities(
                &connection_id,
                MediaCapabilities {
                    has_audio,
                    has_video,
                },
            );
            state.chat.broadcast_presence(&room_id)?;
        }
        signal => {
            if let Some((kind, to, payload)) = signal.into_signal() {
                state.signaling.relay(
                    &room_id,
                    SignalingEnvelope {
                        from: connection_id,
                        to,
                        kind,
                        payload,
                    },
                )?;
            }
        }
    }
    Ok(ControlFlow::Continue(()))
}

/// Log and count a failed frame; tell the client when the error is theirs to see.
fn reject(state: &AppState, session: &ConnectedSession, err: SyncError) {
    metrics::record_rejected_frame(err.code());
    if !err.is_client_visible() {
        tracing::debug!(connection_id = %session.connection_id, error = %err, "Frame dropped");
        return;
    }

    tracing::warn!(connection_id = %session.connection_id, error = %err, "Frame rejected");
    let frame = OutboundFrame::unsequenced(RoomEvent::error(err.code(), err.to_string()));
    if let Err(e) = state.gateway.deliver(&session.connection_id, frame) {
        tracing::debug!(connection_id = %session.connection_id, error = %e, "Error frame not delivered");
    }
}
