use log::{debug, error, info};
use serde::Serialize;
use std::thread::{self, JoinHandle};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::capture::manager::{Action, CaptureManager, Outcome};
use crate::models::stats::{ExportReport, SessionStatus};
use crate::utils::error::{AppError, AppResult};

// Buffered events per WebSocket subscriber before it starts lagging
const EVENT_CAPACITY: usize = 64;

/// Events pushed to subscribers after a mutating action
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    #[serde(rename = "view")]
    ViewChanged { status: SessionStatus },

    #[serde(rename = "export")]
    ExportFinished { report: ExportReport },
}

struct Command {
    action: Action,
    reply: oneshot::Sender<AppResult<Outcome>>,
}

/// Cloneable handle that funnels actions into the session thread
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    /// Start the session thread that owns `manager`.
    ///
    /// The thread exits once every handle has been dropped.
    pub fn spawn(manager: CaptureManager, queue_size: usize) -> AppResult<(Self, JoinHandle<()>)> {
        let (tx, rx) = mpsc::channel(queue_size.max(1));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let thread_events = events.clone();

        let join = thread::Builder::new()
            .name("session".to_string())
            .spawn(move || run_session(manager, rx, thread_events))?;

        Ok((Self { tx, events }, join))
    }

    /// Send an action to the session thread and wait for its outcome
    pub async fn dispatch(&self, action: Action) -> AppResult<Outcome> {
        let (reply, response) = oneshot::channel();

        self.tx
            .send(Command { action, reply })
            .await
            .map_err(|_| AppError::SessionError("session thread has stopped".to_string()))?;

        response
            .await
            .map_err(|_| AppError::SessionError("session dropped the reply".to_string()))?
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn status(&self) -> AppResult<SessionStatus> {
        match self.dispatch(Action::Status).await? {
            Outcome::Status(status) => Ok(status),
            other => Err(unexpected(other)),
        }
    }
}

/// Error for an outcome that does not belong to the action sent
pub fn unexpected(outcome: Outcome) -> AppError {
    AppError::SessionError(format!("unexpected outcome: {:?}", outcome))
}

fn run_session(
    mut manager: CaptureManager,
    mut rx: mpsc::Receiver<Command>,
    events: broadcast::Sender<SessionEvent>,
) {
    info!("Session thread started");

    while let Some(Command { action, reply }) = rx.blocking_recv() {
        let mutating = action.is_mutating();
        let result = manager.dispatch(action);

        if let Err(e) = &result {
            debug!("Action failed: {}", e);
        }

        // Failed actions leave the session untouched
        if mutating && result.is_ok() {
            // No subscribers is not an error
            if let Ok(Outcome::Exported(report)) = &result {
                let _ = events.send(SessionEvent::ExportFinished {
                    report: report.clone(),
                });
            }
            let _ = events.send(SessionEvent::ViewChanged {
                status: manager.status(),
            });
        }

        if reply.send(result).is_err() {
            error!("Caller went away before the session replied");
        }
    }

    info!("Session thread stopped");
}
