// tokenwatch-api: WebSocket transport and wire protocol for the agent feed

pub mod error;
pub mod protocol;
pub mod websocket;

pub use error::Error;
pub use protocol::{Command, Inbound, Metadata, Token};
pub use websocket::{ABNORMAL_CLOSURE, ReadyState, SocketEvent, WebSocketHandle};
