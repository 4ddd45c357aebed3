use std::time::Duration;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use boardsync_common::{ClientMessage, Topic, WsMessage};
use futures_util::{SinkExt, StreamExt, stream::SplitSink, stream::SplitStream};
use tokio::time::Instant;
use tokio_stream::StreamMap;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{debug, warn};

use super::api::{SharedState, apply_reorder};
use crate::sync::api::MoveNodeRequest;

/// How often to send WebSocket Ping frames.
pub const PING_INTERVAL: Duration = Duration::from_secs(30);

/// How long to wait for a Pong response before considering the connection dead.
pub const PONG_TIMEOUT: Duration = Duration::from_secs(60);

/// Keepalive timing for socket connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlive {
    pub ping_interval: Duration,
    pub pong_timeout: Duration,
}

impl Default for KeepAlive {
    fn default() -> Self {
        Self {
            ping_interval: PING_INTERVAL,
            pong_timeout: PONG_TIMEOUT,
        }
    }
}

/// This connection's topic subscriptions, merged into one stream.
type Subscriptions = StreamMap<Topic, BroadcastStream<String>>;

// ── WebSocket handler ────────────────────────────────────────────────

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    let (sender, receiver) = socket.split();
    let mut subscriptions = Subscriptions::new();
    run_socket_loop(&state, sender, receiver, &mut subscriptions).await;

    let topics: Vec<Topic> = subscriptions.keys().cloned().collect();
    drop(subscriptions);
    for topic in &topics {
        state.hub.release(topic);
    }
    debug!(topics = topics.len(), "socket closed");
}

/// Core WebSocket loop with ping/pong keepalive.
///
/// Combines topic forwarding, client message handling, and periodic
/// ping/pong health checking into a single select loop. If no Pong is
/// received within the pong timeout after a Ping is sent, the connection
/// is considered dead and the loop exits.
async fn run_socket_loop(
    state: &SharedState,
    mut sender: SplitSink<WebSocket, Message>,
    mut receiver: SplitStream<WebSocket>,
    subscriptions: &mut Subscriptions,
) {
    let keepalive = state.keepalive;
    let mut ping_interval = tokio::time::interval(keepalive.ping_interval);
    // The first tick completes immediately; consume it so the first real
    // ping fires after one full interval.
    ping_interval.tick().await;

    let mut last_pong = Instant::now();
    let mut awaiting_pong = false;

    loop {
        tokio::select! {
            // ── Periodic ping ───────────────────────────────────────
            _ = ping_interval.tick() => {
                if awaiting_pong && last_pong.elapsed() > keepalive.pong_timeout {
                    debug!("pong timeout; dropping socket");
                    break;
                }
                if sender.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
                awaiting_pong = true;
            }

            // ── Topic forwarding ────────────────────────────────────
            Some((topic, item)) = subscriptions.next(), if !subscriptions.is_empty() => {
                let text = match item {
                    Ok(json) => json,
                    Err(BroadcastStreamRecvError::Lagged(missed)) => {
                        warn!(%topic, missed, "subscriber lagged; requesting resync");
                        match encode(&WsMessage::ResyncRequired { topic }) {
                            Some(json) => json,
                            None => continue,
                        }
                    }
                };
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }

            // ── Client messages ─────────────────────────────────────
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<ClientMessage>(text.as_str()) {
                            Ok(client_msg) => dispatch(state, subscriptions, client_msg).await,
                            Err(e) => WsMessage::Error {
                                message: format!("Malformed message: {}", e),
                            },
                        };
                        let Some(json) = encode(&reply) else { continue };
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {
                        last_pong = Instant::now();
                        awaiting_pong = false;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        // Binary and Ping frames need no reply here
                    }
                    Some(Err(_)) => break,
                }
            }
        }
    }

    // Best-effort close frame
    let _ = sender.send(Message::Close(None)).await;
}

/// Handle one client message and produce the direct reply.
async fn dispatch(
    state: &SharedState,
    subscriptions: &mut Subscriptions,
    msg: ClientMessage,
) -> WsMessage {
    match msg {
        ClientMessage::Subscribe { topic } => {
            if !subscriptions.contains_key(&topic) {
                let rx = state.hub.subscribe(&topic);
                subscriptions.insert(topic.clone(), BroadcastStream::new(rx));
            }
            debug!(%topic, "subscribed");
            WsMessage::Subscribed { topic }
        }
        ClientMessage::Unsubscribe { topic } => {
            if subscriptions.remove(&topic).is_some() {
                state.hub.release(&topic);
            }
            debug!(%topic, "unsubscribed");
            WsMessage::Unsubscribed { topic }
        }
        ClientMessage::Reorder { request_id, intent } => {
            let item_uid = intent.item_uid.clone();
            match apply_reorder(state, item_uid.clone(), MoveNodeRequest::from(&intent)).await {
                Ok(outcome) => WsMessage::ReorderAccepted {
                    request_id,
                    item_uid,
                    container_uid: outcome.event.container_uid,
                    order: outcome.event.order,
                },
                Err(err) => WsMessage::ReorderRejected {
                    request_id,
                    item_uid,
                    reason: err.message().to_string(),
                },
            }
        }
        ClientMessage::Ping => WsMessage::Pong,
    }
}

fn encode(msg: &WsMessage) -> Option<String> {
    serde_json::to_string(msg)
        .inspect_err(|e| warn!(error = %e, "failed to serialize WsMessage"))
        .ok()
}

// ── Tests ────────────────────────────────────────────────────────────
