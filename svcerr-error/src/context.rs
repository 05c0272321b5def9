//! Structured field annotation attached to an error

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Points at the input field responsible for an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Name of the offending field
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

impl ErrorContext {
    /// Create a context for `field`
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// `{"field": .., "message": ..}` as a plain string map
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("field", self.field.clone()),
            ("message", self.message.clone()),
        ])
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_map() {
        let ctx = ErrorContext::new("email", "must not be empty");
        let map = ctx.to_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["field"], "email");
        assert_eq!(map["message"], "must not be empty");
    }

    #[test]
    fn test_display() {
        let ctx = ErrorContext::new("age", "out of range");
        assert_eq!(ctx.to_string(), "age: out of range");
    }

    #[test]
    fn test_serde() {
        let ctx = ErrorContext::new("a_field", "the field is empty");
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"field": "a_field", "message": "the field is empty"})
        );
    }
}
