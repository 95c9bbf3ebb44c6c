// ── Mirrored state and its reducer ──
//
// Every change to the mirrored state goes through `reduce`, one event at a
// time, in arrival order. The reducer has no side effects, so the whole
// dispatch table is testable without a socket.

use serde::Serialize;

use super::collection::TokenCollection;
use crate::controller::ConnectionState;
use crate::model::{Inbound, Metadata};

/// The client's view of the remote agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncState {
    /// Display text of the latest lifecycle or `status` event.
    pub status: String,
    pub metadata: Metadata,
    pub tokens: TokenCollection,
}

impl Default for SyncState {
    /// The state at activation: connecting, nothing received yet.
    fn default() -> Self {
        Self {
            status: ConnectionState::Connecting.to_string(),
            metadata: Metadata::default(),
            tokens: TokenCollection::new(),
        }
    }
}

/// One input to the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The connection changed state; its display text becomes the status.
    Connection(ConnectionState),
    /// A decoded inbound frame.
    Message(Inbound),
}

/// Apply `event` to `state`. Returns `true` if anything changed.
pub fn reduce(state: &mut SyncState, event: SyncEvent) -> bool {
    match event {
        SyncEvent::Connection(connection) => set_status(state, connection.to_string()),
        SyncEvent::Message(Inbound::Status { message }) => set_status(state, message),
        SyncEvent::Message(Inbound::Meta(metadata)) => {
            if state.metadata == metadata {
                return false;
            }
            state.metadata = metadata;
            true
        }
        SyncEvent::Message(Inbound::Token { token }) => state.tokens.insert_if_absent(token),
        SyncEvent::Message(Inbound::Tokens { tokens }) => {
            state.tokens.replace(tokens);
            true
        }
        SyncEvent::Message(Inbound::Unknown) => false,
    }
}

fn set_status(state: &mut SyncState, status: String) -> bool {
    if state.status == status {
        return false;
    }
    state.status = status;
    true
}
