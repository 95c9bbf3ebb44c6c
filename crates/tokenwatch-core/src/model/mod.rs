// ── Domain model ──
//
// The wire payloads double as the domain model.

pub use tokenwatch_api::protocol::{Command, Inbound, Metadata, Token};
