// ── Central reactive data store ──
//
// Holds the current `SyncState` behind a `watch` channel. The controller's
// bridge task is the only writer; consumers read snapshots or subscribe.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::state::{SyncEvent, SyncState, reduce};
use crate::model::{Metadata, Token};
use crate::stream::StateStream;

/// Reactive store for the mirrored agent state.
///
/// Every applied event that changes something publishes a fresh
/// `Arc<SyncState>` snapshot to subscribers. Events that change nothing
/// (duplicate tokens, ignored frames) publish nothing.
pub struct DataStore {
    pub(crate) state: watch::Sender<Arc<SyncState>>,
    pub(crate) last_frame_at: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Arc::new(SyncState::default()));
        let (last_frame_at, _) = watch::channel(None);

        Self {
            state,
            last_frame_at,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    /// The whole state (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<SyncState> {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> String {
        self.state.borrow().status.clone()
    }

    pub fn metadata(&self) -> Metadata {
        self.state.borrow().metadata.clone()
    }

    pub fn tokens_snapshot(&self) -> Vec<Token> {
        self.state.borrow().tokens.as_slice().to_vec()
    }

    pub fn token_count(&self) -> usize {
        self.state.borrow().tokens.len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe(&self) -> StateStream {
        StateStream::new(self.state.subscribe())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    /// When the last inbound frame arrived, decodable or not.
    pub fn last_frame_at(&self) -> Option<DateTime<Utc>> {
        *self.last_frame_at.borrow()
    }

    // ── Mutations (controller only) ──────────────────────────────────

    /// Run one event through the reducer. Returns `true` if the state changed.
    pub(crate) fn apply(&self, event: SyncEvent) -> bool {
        self.state
            .send_if_modified(|snapshot| reduce(Arc::make_mut(snapshot), event))
    }

    /// Record that a frame arrived.
    pub(crate) fn touch_frame(&self) {
        self.last_frame_at.send_replace(Some(Utc::now()));
    }

    /// Back to the activation-time state.
    pub(crate) fn reset(&self) {
        self.state.send_replace(Arc::new(SyncState::default()));
        self.last_frame_at.send_replace(None);
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
