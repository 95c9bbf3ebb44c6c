// ── Token collection ──
//
// Insertion-ordered list of discovered tokens, keyed by `name` for the
// single-token path. Whole-list replacement keeps the sender's list as-is.

use serde::Serialize;

use crate::model::Token;

/// The mirrored token list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TokenCollection {
    tokens: Vec<Token>,
}

impl TokenCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `token` unless an entry with the same name exists.
    /// Returns `true` if it was added. The first payload for a name wins.
    pub(crate) fn insert_if_absent(&mut self, token: Token) -> bool {
        if self.contains(&token.name) {
            return false;
        }
        self.tokens.push(token);
        true
    }

    /// Replace the whole collection verbatim, duplicates included.
    pub(crate) fn replace(&mut self, tokens: Vec<Token>) {
        self.tokens = tokens;
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tokens.iter().any(|t| t.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<'a> IntoIterator for &'a TokenCollection {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
