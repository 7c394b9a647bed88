//! Error types for the dealer engine.

use crate::DealerName;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All possible errors from the dealer engine.
///
/// Most variants describe data-shape problems. Those are never returned as
/// `Err` from the merge/split/combine operations; they are recorded in a
/// [`ReconciliationReport`](crate::ReconciliationReport) instead. Only
/// contract violations such as [`Error::MissingResolver`] are returned.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Error {
    // Document shape
    #[error("invalid document: {reason}")]
    InvalidDocument { reason: String },

    #[error("dealer at index {index} has no usable name")]
    MissingName { index: usize },

    #[error("missing required field: {field}")]
    MissingRequiredField { field: String },

    #[error("type mismatch for field '{field}': expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: String,
        got: String,
    },

    // Reconciliation
    #[error("duplicate dealer name: {name}")]
    DuplicateName { name: DealerName },

    #[error("dealer name conflict: {name}")]
    NameConflict { name: DealerName },

    #[error("filename collision on '{key}': {}", names.join(", "))]
    FilenameCollision { key: String, names: Vec<DealerName> },

    #[error("merge cancelled by user at '{name}'")]
    UserCancelled { name: DealerName },

    // Contract violations
    #[error("prompt policy requires a conflict resolver")]
    MissingResolver,

    #[error("serialization failed: {reason}")]
    Serialization { reason: String },
}

impl Error {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Error::InvalidDocument {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization {
            reason: err.to_string(),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::invalid("top-level value is not an object");
        assert_eq!(
            err.to_string(),
            "invalid document: top-level value is not an object"
        );

        let err = Error::MissingName { index: 3 };
        assert_eq!(err.to_string(), "dealer at index 3 has no usable name");

        let err = Error::FilenameCollision {
            key: "Big_Bob".into(),
            names: vec!["Big Bob".into(), "Big/Bob".into()],
        };
        assert_eq!(
            err.to_string(),
            "filename collision on 'Big_Bob': Big Bob, Big/Bob"
        );
    }

    #[test]
    fn error_serializes_with_kind_tag() {
        let err = Error::NameConflict { name: "Ray".into() };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "nameConflict", "name": "Ray"}));

        let parsed: Error = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, err);
    }
}
