//! WebSocket connection to the agent feed.
//!
//! A [`WebSocketHandle`] owns exactly one connection attempt. A background
//! task performs the handshake, reads frames and writes outbound text.
//! Lifecycle changes and inbound frames are reported in arrival order as
//! [`SocketEvent`]s on a single-consumer channel. There is no reconnect:
//! once the socket has closed or failed the handle is spent.
//!
//! # Example
//!
//! ```rust,ignore
//! use tokenwatch_api::websocket::{SocketEvent, WebSocketHandle};
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let url = Url::parse("ws://localhost:8000")?;
//! let (handle, mut events) = WebSocketHandle::connect(url, CancellationToken::new())?;
//!
//! while let Some(event) = events.recv().await {
//!     if let SocketEvent::Open = event {
//!         handle.send_text(r#"{"type":"ask","question":"status?"}"#.into());
//!     }
//! }
//! ```

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;

// ── Channel capacities ───────────────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 1024;
const OUTBOUND_CHANNEL_CAPACITY: usize = 64;

/// Close code reported when the connection ended without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

// ── ReadyState ───────────────────────────────────────────────────────

/// Where the socket is in its lifecycle. Only `Open` accepts writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Connecting,
    Open,
    Closing,
    Closed,
}

// ── SocketEvent ──────────────────────────────────────────────────────

/// Something that happened on the socket.
///
/// A connection produces at most one `Open`, any number of `Text`, and
/// ends with exactly one `Closed`. A transport failure is reported as
/// `Error` immediately before that `Closed`, whose code is then
/// [`ABNORMAL_CLOSURE`].
#[derive(Debug)]
pub enum SocketEvent {
    /// Handshake completed; the socket is writable.
    Open,
    /// An inbound text frame, undecoded.
    Text(String),
    /// The socket closed, either locally or by the peer.
    Closed { code: Option<u16>, reason: String },
    /// The handshake or the established stream failed. Always followed
    /// by `Closed`.
    Error(Error),
}

/// How a connection ended without a transport failure.
struct CloseInfo {
    code: Option<u16>,
    reason: String,
}

impl CloseInfo {
    fn local() -> Self {
        Self {
            code: None,
            reason: "closed by client".into(),
        }
    }
}

// ── WebSocketHandle ──────────────────────────────────────────────────

/// Handle to a running WebSocket connection.
///
/// Dropping the handle closes the connection.
pub struct WebSocketHandle {
    ready_state: watch::Receiver<ReadyState>,
    outbound_tx: mpsc::Sender<String>,
    cancel: CancellationToken,
}

impl WebSocketHandle {
    /// Validate the URL and spawn the connection task.
    ///
    /// Returns immediately; the handshake happens in the background and
    /// its outcome arrives on the returned event receiver. Must be called
    /// from within a Tokio runtime.
    pub fn connect(
        url: Url,
        cancel: CancellationToken,
    ) -> Result<(Self, mpsc::Receiver<SocketEvent>), Error> {
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::UnsupportedScheme {
                scheme: url.scheme().to_string(),
            });
        }

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_CHANNEL_CAPACITY);
        let (ready_tx, ready_state) = watch::channel(ReadyState::Connecting);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            socket_task(url, event_tx, outbound_rx, ready_tx, task_cancel).await;
        });

        let handle = Self {
            ready_state,
            outbound_tx,
            cancel,
        };
        Ok((handle, event_rx))
    }

    /// Current lifecycle state of the socket.
    pub fn ready_state(&self) -> ReadyState {
        *self.ready_state.borrow()
    }

    /// Whether the socket currently accepts writes.
    pub fn is_open(&self) -> bool {
        self.ready_state() == ReadyState::Open
    }

    /// Queue a text frame for sending.
    ///
    /// Returns `false` without queuing anything if the socket is not open
    /// or the outbound buffer is full.
    pub fn send_text(&self, text: String) -> bool {
        if !self.is_open() {
            return false;
        }
        match self.outbound_tx.try_send(text) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Outbound frame dropped");
                false
            }
        }
    }

    /// Ask the background task to close the socket. Idempotent.
    ///
    /// Frames already accepted by [`send_text`](Self::send_text) are
    /// flushed before the close frame goes out.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for WebSocketHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Connection task ──────────────────────────────────────────────────

async fn socket_task(
    url: Url,
    event_tx: mpsc::Sender<SocketEvent>,
    mut outbound_rx: mpsc::Receiver<String>,
    ready_tx: watch::Sender<ReadyState>,
    cancel: CancellationToken,
) {
    let result = run_socket(&url, &event_tx, &mut outbound_rx, &ready_tx, &cancel).await;

    // The state flips before the final event so a consumer reacting to it
    // never sees a writable socket.
    ready_tx.send_replace(ReadyState::Closed);

    let info = match result {
        Ok(info) => info,
        Err(e) => {
            tracing::warn!(error = %e, "WebSocket error");
            let reason = e.to_string();
            emit(&event_tx, SocketEvent::Error(e)).await;
            CloseInfo {
                code: Some(ABNORMAL_CLOSURE),
                reason,
            }
        }
    };
    tracing::info!(code = ?info.code, reason = %info.reason, "WebSocket closed");
    emit(
        &event_tx,
        SocketEvent::Closed {
            code: info.code,
            reason: info.reason,
        },
    )
    .await;

    tracing::debug!("WebSocket task exiting");
}

/// Connect, then pump frames in both directions until the socket ends.
async fn run_socket(
    url: &Url,
    event_tx: &mpsc::Sender<SocketEvent>,
    outbound_rx: &mut mpsc::Receiver<String>,
    ready_tx: &watch::Sender<ReadyState>,
    cancel: &CancellationToken,
) -> Result<CloseInfo, Error> {
    tracing::info!(url = %url, "Connecting to WebSocket");

    let (ws_stream, _response) = tokio::select! {
        biased;
        () = cancel.cancelled() => {
            tracing::debug!("Connection attempt cancelled before handshake completed");
            return Ok(CloseInfo::local());
        }
        result = tokio_tungstenite::connect_async(url.as_str()) => {
            result.map_err(|e| Error::WebSocketConnect(e.to_string()))?
        }
    };

    ready_tx.send_replace(ReadyState::Open);
    tracing::info!("WebSocket connected");
    emit(event_tx, SocketEvent::Open).await;

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                ready_tx.send_replace(ReadyState::Closing);
                flush_outbound(&mut write, outbound_rx).await;
                if let Err(e) = write.close().await {
                    tracing::debug!(error = %e, "Close handshake did not complete");
                }
                return Ok(CloseInfo::local());
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        emit(event_tx, SocketEvent::Text(text.to_string())).await;
                    }
                    Some(Ok(Message::Ping(_))) => {
                        // tungstenite handles pong replies automatically
                        tracing::trace!("WebSocket ping");
                    }
                    Some(Ok(Message::Close(frame))) => {
                        ready_tx.send_replace(ReadyState::Closing);
                        let info = match frame {
                            Some(cf) => CloseInfo {
                                code: Some(u16::from(cf.code)),
                                reason: cf.reason.to_string(),
                            },
                            None => CloseInfo {
                                code: None,
                                reason: "closed by server".into(),
                            },
                        };
                        // The close reply is queued by the read; push it out.
                        if let Err(e) = write.flush().await {
                            tracing::debug!(error = %e, "Close reply not sent");
                        }
                        return Ok(info);
                    }
                    Some(Err(e)) => {
                        return Err(Error::WebSocketStream(e.to_string()));
                    }
                    None => {
                        return Ok(CloseInfo {
                            code: None,
                            reason: "stream ended".into(),
                        });
                    }
                    _ => {
                        // Binary, Pong, Frame -- ignore
                    }
                }
            }
            Some(text) = outbound_rx.recv() => {
                write
                    .send(Message::Text(text.into()))
                    .await
                    .map_err(|e| Error::WebSocketStream(e.to_string()))?;
            }
        }
    }
}

/// Write out frames that were accepted before the close was requested.
async fn flush_outbound(write: &mut WsSink, outbound_rx: &mut mpsc::Receiver<String>) {
    while let Ok(text) = outbound_rx.try_recv() {
        if let Err(e) = write.send(Message::Text(text.into())).await {
            tracing::debug!(error = %e, "Failed to flush outbound frame");
            break;
        }
    }
}

async fn emit(event_tx: &mpsc::Sender<SocketEvent>, event: SocketEvent) {
    // Ignore send errors -- the consumer has gone away
    let _ = event_tx.send(event).await;
}

// ── Tests ────────────────────────────────────────────────────────────
