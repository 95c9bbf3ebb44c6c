// ── Reactive state store ──
//
// Mirrored agent state with a pure reducer and push-based change
// notification.

mod collection;
mod data_store;
mod state;

pub use collection::TokenCollection;
pub use data_store::DataStore;
pub use state::{SyncEvent, SyncState, reduce};
