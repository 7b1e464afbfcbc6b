use actix_web::{web, Error, HttpRequest, Responder};
use actix_ws::{self, Message};
use futures_util::StreamExt;
use log::{debug, info, warn};
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::interval;

use crate::capture::session::{SessionEvent, SessionHandle};
use crate::models::stats::SessionStatus;

// How often heartbeat pings are sent
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

// Clients silent for this long are disconnected
const CLIENT_TIMEOUT: Duration = Duration::from_secs(15);

/// WebSocket message types that can be sent to clients
#[derive(Serialize)]
#[serde(tag = "type")]
enum WsOutMessage<'a> {
    #[serde(rename = "status")]
    Status { status: SessionStatus },

    #[serde(rename = "event")]
    Event { event: &'a SessionEvent },

    #[serde(rename = "ping")]
    Ping { timestamp: i64 },
}

/// Handle WebSocket connections
pub async fn ws_index(
    req: HttpRequest,
    body: web::Payload,
    session_handle: web::Data<SessionHandle>,
) -> Result<impl Responder, Error> {
    let addr = req
        .peer_addr()
        .map(|peer| peer.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    info!("WebSocket connection from: {}", addr);

    let (response, mut session, mut msg_stream) = actix_ws::handle(&req, body)?;
    let handle = session_handle.get_ref().clone();

    actix_rt::spawn(async move {
        let mut heartbeat = interval(HEARTBEAT_INTERVAL);
        let mut last_seen = Instant::now();
        let mut events = handle.subscribe();

        if let Err(e) = send_status(&mut session, &handle).await {
            warn!("Failed to send initial status: {}", e);
            return;
        }

        loop {
            tokio::select! {
                msg = msg_stream.next() => {
                    let msg = match msg {
                        Some(Ok(msg)) => msg,
                        _ => break,
                    };
                    last_seen = Instant::now();

                    match msg {
                        Message::Ping(bytes) => {
                            if session.pong(&bytes).await.is_err() {
                                break;
                            }
                        }
                        Message::Text(text) => {
                            debug!("Received text message: {}", text);
                            if text.trim() == "status" {
                                if let Err(e) = send_status(&mut session, &handle).await {
                                    warn!("Failed to send status: {}", e);
                                    break;
                                }
                            }
                        }
                        Message::Close(_) => {
                            info!("Client requested close");
                            break;
                        }
                        _ => {}
                    }
                }

                event = events.recv() => {
                    match event {
                        Ok(event) => {
                            let msg = WsOutMessage::Event { event: &event };
                            if let Ok(json) = serde_json::to_string(&msg) {
                                if session.text(json).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            debug!("WebSocket subscriber skipped {} events", skipped);
                        }
                        Err(RecvError::Closed) => break,
                    }
                }

                _ = heartbeat.tick() => {
                    if last_seen.elapsed() > CLIENT_TIMEOUT {
                        warn!("WebSocket client heartbeat timed out");
                        break;
                    }

                    if session.ping(b"").await.is_err() {
                        break;
                    }
                    let ping = WsOutMessage::Ping {
                        timestamp: chrono::Utc::now().timestamp(),
                    };
                    if let Ok(json) = serde_json::to_string(&ping) {
                        if session.text(json).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }

        let _ = session.close(None).await;
        info!("WebSocket connection closed");
    });

    Ok(response)
}

/// Send current status to WebSocket client
async fn send_status(
    session: &mut actix_ws::Session,
    handle: &SessionHandle,
) -> Result<(), String> {
    let status = handle.status().await.map_err(|e| e.to_string())?;
    let msg = WsOutMessage::Status { status };

    let json = serde_json::to_string(&msg).map_err(|e| e.to_string())?;
    session
        .text(json)
        .await
        .map_err(|_| "WebSocket session closed".to_string())
}
