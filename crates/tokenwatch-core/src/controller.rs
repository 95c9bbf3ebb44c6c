// ── Controller abstraction ──
//
// Lifecycle management for the single agent connection. Owns the socket
// for the duration of an activation, bridges socket events into the
// DataStore, and gates outbound commands on the socket being open.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use tokenwatch_api::websocket::{SocketEvent, WebSocketHandle};

use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::model::{Command, Inbound};
use crate::store::{DataStore, SyncEvent};
use crate::stream::StateStream;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
///
/// Only the latest transition is kept. The `Display` text is what the
/// store's status field shows after the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ConnectionState {
    #[strum(to_string = "Connecting...")]
    Connecting,
    #[strum(to_string = "Connected to agent")]
    Connected,
    #[strum(to_string = "Disconnected")]
    Disconnected,
    #[strum(to_string = "WebSocket error")]
    Error,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Exposes only
/// `activate`/`deactivate`/`send` plus read access to state; the socket
/// itself never leaves the controller.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ClientConfig,
    store: Arc<DataStore>,
    connection_state: watch::Sender<ConnectionState>,
    last_error: watch::Sender<Option<String>>,
    session: Mutex<Option<Session>>,
}

/// Everything that lives for exactly one activation.
struct Session {
    socket: WebSocketHandle,
    bridge: JoinHandle<()>,
}

impl Controller {
    /// Create a new Controller from configuration. Does NOT connect --
    /// call [`activate()`](Self::activate) to open the connection.
    pub fn new(config: ClientConfig) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (last_error, _) = watch::channel(None);

        Self {
            inner: Arc::new(ControllerInner {
                config,
                store: Arc::new(DataStore::new()),
                connection_state,
                last_error,
                session: Mutex::new(None),
            }),
        }
    }

    /// Access the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Access the underlying DataStore.
    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Open the connection.
    ///
    /// Resets the store to its initial state, reports `Connecting`, and
    /// returns once the socket task is spawned; the handshake completes in
    /// the background. Fails with [`CoreError::AlreadyActive`] if a
    /// previous activation has not been deactivated.
    pub async fn activate(&self) -> Result<(), CoreError> {
        let mut session = self.inner.session.lock().await;
        if session.is_some() {
            return Err(CoreError::AlreadyActive);
        }

        self.inner.store.reset();
        self.inner.last_error.send_replace(None);
        self.transition(ConnectionState::Connecting);

        let cancel = CancellationToken::new();
        let (socket, events) =
            match WebSocketHandle::connect(self.inner.config.endpoint.clone(), cancel) {
                Ok(pair) => pair,
                Err(e) => {
                    self.inner.last_error.send_replace(Some(e.to_string()));
                    self.transition(ConnectionState::Error);
                    return Err(e.into());
                }
            };

        let bridge = tokio::spawn(bridge_task(self.clone(), events));
        *session = Some(Session { socket, bridge });

        info!(endpoint = %self.inner.config.endpoint, "client activated");
        Ok(())
    }

    /// Close the connection, whatever state it is in.
    ///
    /// Returns after the socket task has finished and every event it
    /// produced has been applied. Safe to call when not active, and safe
    /// to call after the peer already closed: the socket is closed at most
    /// once.
    pub async fn deactivate(&self) {
        let Some(Session { socket, bridge }) = self.inner.session.lock().await.take() else {
            debug!("deactivate called while inactive");
            return;
        };

        socket.close();
        if let Err(e) = bridge.await {
            warn!(error = %e, "bridge task ended abnormally");
        }
        drop(socket);

        debug!("client deactivated");
    }

    /// Whether an activation is in progress.
    pub async fn is_active(&self) -> bool {
        self.inner.session.lock().await.is_some()
    }

    // ── Command sending ──────────────────────────────────────────

    /// Send a command to the agent if the connection is open for writing.
    ///
    /// Otherwise the command is dropped: no error, no queue, no retry.
    pub async fn send(&self, command: &Command) {
        let session = self.inner.session.lock().await;
        let Some(session) = session.as_ref() else {
            debug!(?command, "not active, command dropped");
            return;
        };

        if !session.socket.is_open() {
            debug!(
                ?command,
                ready_state = ?session.socket.ready_state(),
                "connection not open, command dropped"
            );
            return;
        }

        match command.encode() {
            Ok(frame) => {
                if session.socket.send_text(frame) {
                    debug!(?command, "command sent");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode command"),
        }
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Wait until the connection leaves `Connecting` and return where it
    /// landed. Returns immediately when not connecting.
    pub async fn wait_for_handshake(&self) -> ConnectionState {
        let mut rx = self.connection_state();
        match rx
            .wait_for(|state| *state != ConnectionState::Connecting)
            .await
        {
            Ok(state) => *state,
            // Unreachable while `self` holds the sender
            Err(_) => ConnectionState::Disconnected,
        }
    }

    /// The transport failure of the current or most recent activation.
    ///
    /// A failure is followed by `Disconnected`, which may overwrite
    /// `Error` before a watcher sees it; this stays set until the next
    /// [`activate()`](Self::activate).
    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error.borrow().clone()
    }

    /// Subscribe to mirrored state changes.
    pub fn subscribe(&self) -> StateStream {
        self.inner.store.subscribe()
    }

    // ── Internal ─────────────────────────────────────────────────

    /// Record a lifecycle transition in both the machine state and the
    /// displayed status.
    fn transition(&self, state: ConnectionState) {
        self.inner.connection_state.send_replace(state);
        self.inner.store.apply(SyncEvent::Connection(state));
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Apply socket events to the store, one at a time, in arrival order.
///
/// Ends when the socket task finishes and drops its sender.
async fn bridge_task(controller: Controller, mut events: mpsc::Receiver<SocketEvent>) {
    let store = Arc::clone(&controller.inner.store);

    while let Some(event) = events.recv().await {
        match event {
            SocketEvent::Open => controller.transition(ConnectionState::Connected),
            SocketEvent::Text(text) => {
                store.touch_frame();
                let message = Inbound::decode(&text);
                if matches!(message, Inbound::Unknown) {
                    trace!(len = text.len(), "ignoring frame");
                    continue;
                }
                debug!(kind = message.kind(), "applying message");
                store.apply(SyncEvent::Message(message));
            }
            SocketEvent::Closed { code, reason } => {
                debug!(?code, %reason, "connection closed");
                controller.transition(ConnectionState::Disconnected);
            }
            SocketEvent::Error(e) => {
                warn!(error = %e, "connection error");
                controller.inner.last_error.send_replace(Some(e.to_string()));
                controller.transition(ConnectionState::Error);
            }
        }
    }

    debug!("bridge task exiting");
}
