//! Error types

use thiserror::Error;

use crate::widget::{InputKind, WidgetTag};

/// A mistake in how a table was put together.
///
/// These are programming errors; they surface once, when the table is built,
/// never while it is being read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The configuration names a field the record shape does not have.
    #[error("field '{field}' does not exist on {record}")]
    UnknownField { record: &'static str, field: String },

    /// The configured input cannot carry the field's value type.
    #[error("field '{field}' is a {channel} field and cannot use a '{kind}' input")]
    KindMismatch {
        field: String,
        channel: &'static str,
        kind: InputKind,
    },

    /// The same field key was configured twice.
    #[error("field '{0}' is configured more than once")]
    DuplicateField(String),

    /// A default column width for a column that is not in the column order.
    #[error("width given for unknown column '{0}'")]
    UnknownColumn(String),

    /// A tag name that is not part of the widget set.
    #[error("unknown widget tag '{0}'")]
    UnknownTag(String),

    /// A tag that does not carry a value was used where an input is required.
    #[error("'{0}' widgets cannot be bound to a field")]
    NotAnInput(WidgetTag),
}

/// A persisted or requested customization that failed validation.
///
/// Always recovered locally: the candidate is discarded and the previous value
/// kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomizationError {
    /// The raw data is not of the expected shape.
    #[error("malformed customization data: {0}")]
    Parse(String),

    /// A key that is not in the current field set.
    #[error("unknown column '{0}'")]
    UnknownKey(String),

    /// A current field is missing from a column order.
    #[error("column order is missing '{0}'")]
    MissingKey(String),

    /// A column appears more than once in a column order.
    #[error("column '{0}' appears more than once")]
    DuplicateKey(String),

    /// A move target beyond the end of the column order.
    #[error("index {index} is out of range for {len} columns")]
    OutOfRange { index: usize, len: usize },
}

impl CustomizationError {
    pub fn parse(message: impl ToString) -> Self {
        Self::Parse(message.to_string())
    }
}

/// A write that a binding refused. The record is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    /// The value does not fit the field's type, e.g. `2.5` for an integer.
    #[error("field '{field}' cannot hold {value}")]
    Unrepresentable { field: &'static str, value: String },

    /// The bound record is gone because the collection was replaced.
    #[error("record {index} no longer exists")]
    MissingRecord { index: usize },
}

/// Failure inside a persistence backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend cannot be reached at all.
    #[error("persistence backend unavailable: {0}")]
    Unavailable(String),

    /// The backend failed while reading or writing.
    #[error("persistence backend error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl BackendError {
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::KindMismatch {
            field: "level".into(),
            channel: "number",
            kind: InputKind::Text,
        };
        assert_eq!(
            err.to_string(),
            "field 'level' is a number field and cannot use a 'text' input"
        );
    }

    #[test]
    fn test_customization_error_display() {
        assert_eq!(
            CustomizationError::MissingKey("race".into()).to_string(),
            "column order is missing 'race'"
        );
        assert_eq!(
            CustomizationError::parse("expected array").to_string(),
            "malformed customization data: expected array"
        );
    }

    #[test]
    fn test_write_error_display() {
        let err = WriteError::Unrepresentable {
            field: "level",
            value: "2.5".into(),
        };
        assert_eq!(err.to_string(), "field 'level' cannot hold 2.5");
    }
}
