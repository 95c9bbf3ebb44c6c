//! Wire protocol for the agent feed.
//!
//! Every frame in either direction is a UTF-8 JSON object tagged by a
//! `type` field. Inbound frames are decoded best-effort: anything that does
//! not match a known shape becomes [`Inbound::Unknown`] and is dropped by
//! the caller.

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ── Payload types ────────────────────────────────────────────────────

/// A token discovered by the agent. `name` is the identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub name: String,
    pub symbol: String,
    pub market_cap: f64,
    pub price: f64,
}

/// Descriptive metadata about the agent's current run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

// ── Inbound ──────────────────────────────────────────────────────────

/// A decoded frame from the agent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    /// Free-form status line, shown verbatim.
    Status { message: String },

    /// Replacement metadata.
    Meta(Metadata),

    /// A single newly discovered token.
    Token { token: Token },

    /// The complete token list, already deduplicated by the sender.
    Tokens { tokens: Vec<Token> },

    /// Any other tag, or a frame that failed to decode.
    #[serde(other)]
    Unknown,
}

impl Inbound {
    /// Decode one text frame. Never fails: malformed JSON, a missing or
    /// unknown `type`, and payloads of the wrong shape all yield
    /// [`Inbound::Unknown`].
    pub fn decode(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(error = %e, "Discarding undecodable frame");
                Self::Unknown
            }
        }
    }

    /// The wire tag of this message, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Meta(_) => "meta",
            Self::Token { .. } => "token",
            Self::Tokens { .. } => "tokens",
            Self::Unknown => "unknown",
        }
    }
}

// ── Outbound ─────────────────────────────────────────────────────────

/// A command sent from the client to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Replace the agent's current task.
    SetTask { task: String },
    /// Ask the agent a question.
    Ask { question: String },
}

impl Command {
    /// Serialize to the JSON text frame the agent expects.
    pub fn encode(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// The wire `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetTask { .. } => "set_task",
            Self::Ask { .. } => "ask",
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn foo() -> Token {
        Token {
            name: "Foo".into(),
            symbol: "FOO".into(),
            market_cap: 100.0,
            price: 0.5,
        }
    }

    #[test]
    fn decode_status() {
        let msg = Inbound::decode(r#"{"type":"status","message":"Scanning page 2"}"#);
        assert_eq!(
            msg,
            Inbound::Status {
                message: "Scanning page 2".into()
            }
        );
    }

    #[test]
    fn decode_meta() {
        let msg = Inbound::decode(
            r#"{"type":"meta","title":"Top Movers","description":"Tokens by market cap"}"#,
        );
        assert_eq!(
            msg,
            Inbound::Meta(Metadata {
                title: "Top Movers".into(),
                description: "Tokens by market cap".into(),
            })
        );
    }

    #[test]
    fn decode_meta_missing_fields_defaults_to_empty() {
        let msg = Inbound::decode(r#"{"type":"meta","title":"Only a title"}"#);
        assert_eq!(
            msg,
            Inbound::Meta(Metadata {
                title: "Only a title".into(),
                description: String::new(),
            })
        );
    }

    #[test]
    fn decode_single_token_uses_camel_case_market_cap() {
        let msg = Inbound::decode(
            r#"{"type":"token","token":{"name":"Foo","symbol":"FOO","marketCap":100,"price":0.5}}"#,
        );
        assert_eq!(msg, Inbound::Token { token: foo() });
    }

    #[test]
    fn decode_token_list() {
        let msg = Inbound::decode(
            r#"{"type":"tokens","tokens":[
                {"name":"Foo","symbol":"FOO","marketCap":100,"price":0.5},
                {"name":"Bar","symbol":"BAR","marketCap":2500000.75,"price":12}
            ]}"#,
        );
        let Inbound::Tokens { tokens } = msg else {
            panic!("expected tokens, got {msg:?}");
        };
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], foo());
        assert_eq!(tokens[1].name, "Bar");
        assert!((tokens[1].market_cap - 2_500_000.75).abs() < f64::EPSILON);
    }

    #[test]
    fn decode_unknown_tag_is_ignored() {
        let msg = Inbound::decode(r#"{"type":"error","message":"boom"}"#);
        assert_eq!(msg, Inbound::Unknown);
    }

    #[test]
    fn decode_garbage_is_ignored() {
        assert_eq!(Inbound::decode("not-json"), Inbound::Unknown);
        assert_eq!(Inbound::decode(""), Inbound::Unknown);
        assert_eq!(Inbound::decode("[1,2,3]"), Inbound::Unknown);
        assert_eq!(Inbound::decode(r#"{"message":"no tag"}"#), Inbound::Unknown);
        assert_eq!(Inbound::decode(r#"{"type":7}"#), Inbound::Unknown);
    }

    #[test]
    fn decode_wrong_payload_shape_is_ignored() {
        // marketCap must be numeric
        let msg = Inbound::decode(
            r#"{"type":"token","token":{"name":"Foo","symbol":"FOO","marketCap":"big","price":1}}"#,
        );
        assert_eq!(msg, Inbound::Unknown);

        // status without its message
        assert_eq!(Inbound::decode(r#"{"type":"status"}"#), Inbound::Unknown);

        // tokens must be a list
        assert_eq!(
            Inbound::decode(r#"{"type":"tokens","tokens":{"name":"Foo"}}"#),
            Inbound::Unknown
        );
    }

    #[test]
    fn kind_matches_wire_tag() {
        assert_eq!(Inbound::decode(r#"{"type":"status","message":""}"#).kind(), "status");
        assert_eq!(Inbound::decode(r#"{"type":"meta"}"#).kind(), "meta");
        assert_eq!(Inbound::decode(r#"{"type":"tokens","tokens":[]}"#).kind(), "tokens");
        assert_eq!(Inbound::Unknown.kind(), "unknown");
    }

    #[test]
    fn encode_set_task() {
        let cmd = Command::SetTask {
            task: "find new memecoins".into(),
        };
        insta::assert_snapshot!(cmd.encode().unwrap(), @r#"{"type":"set_task","task":"find new memecoins"}"#);
    }

    #[test]
    fn encode_ask() {
        let cmd = Command::Ask {
            question: "what is trending?".into(),
        };
        insta::assert_snapshot!(cmd.encode().unwrap(), @r#"{"type":"ask","question":"what is trending?"}"#);
        assert_eq!(cmd.kind(), "ask");
    }
}
