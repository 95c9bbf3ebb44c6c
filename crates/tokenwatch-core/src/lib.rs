// tokenwatch-core: Connection lifecycle and mirrored agent state for consumers (CLI).

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use controller::{ConnectionState, Controller};
pub use error::CoreError;
pub use model::{Command, Inbound, Metadata, Token};
pub use store::{DataStore, SyncEvent, SyncState, TokenCollection};
pub use stream::StateStream;
