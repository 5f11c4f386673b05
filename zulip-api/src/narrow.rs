//! Narrow expressions.
//!
//! A narrow is a list of `[operator, operand]` pairs the server uses to
//! filter messages, e.g. `[["stream", "general"], ["topic", "lunch"]]`.
//! Operands are usually strings but may be numbers or lists, as in
//! `["id", 42]` or `["dm", [8, 11]]`.

use serde::Serialize;
use serde_json::Value;

/// A server-side message filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Narrow(Vec<(String, Value)>);

impl Narrow {
    /// An empty narrow, matching every message the user can see.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an arbitrary `[operator, operand]` term.
    pub fn term(mut self, operator: impl Into<String>, operand: impl Into<Value>) -> Self {
        self.0.push((operator.into(), operand.into()));
        self
    }

    /// Restrict to a stream.
    pub fn stream(self, name: impl Into<String>) -> Self {
        self.term("stream", Value::String(name.into()))
    }

    /// Restrict to a topic.
    pub fn topic(self, name: impl Into<String>) -> Self {
        self.term("topic", Value::String(name.into()))
    }

    /// Restrict to messages sent by a user.
    pub fn sender(self, email: impl Into<String>) -> Self {
        self.term("sender", Value::String(email.into()))
    }

    /// Restrict to a single message.
    pub fn id(self, message_id: u64) -> Self {
        self.term("id", message_id)
    }

    /// Restrict to the direct-message conversation with these users.
    pub fn dm(self, user_ids: &[u64]) -> Self {
        self.term("dm", user_ids.to_vec())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn terms(&self) -> &[(String, Value)] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrow_serializes_as_pairs() {
        let narrow = Narrow::new().stream("general").topic("lunch");
        let json = serde_json::to_string(&narrow).unwrap();
        assert_eq!(json, r#"[["stream","general"],["topic","lunch"]]"#);
    }

    #[test]
    fn test_numeric_and_list_operands() {
        let narrow = Narrow::new().id(42).dm(&[8, 11]).term("is", "starred");
        let json = serde_json::to_string(&narrow).unwrap();
        assert_eq!(json, r#"[["id",42],["dm",[8,11]],["is","starred"]]"#);
        assert_eq!(narrow.terms()[0].1, Value::from(42));
    }

    #[test]
    fn test_empty_narrow() {
        let narrow = Narrow::new();
        assert!(narrow.is_empty());
        assert_eq!(serde_json::to_string(&narrow).unwrap(), "[]");
    }
}
