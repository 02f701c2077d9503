//! Errors raised while building, editing, or decoding settings.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("setting `{0}` is already registered")]
    DuplicateSetting(String),

    #[error("unknown setting: {0}")]
    UnknownSetting(String),

    #[error("setting `{name}` expects {expected}, got {found}")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
    },

    #[error("value out of bounds for `{name}`: {value} (allowed {min}..={max})")]
    OutOfBounds {
        name: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("invalid value for `{name}`: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("index {index} out of range for `{name}` (length {len})")]
    IndexOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },

    #[error("settings document must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    #[error("schema `{0}` is already registered")]
    DuplicateSchema(String),

    #[error("malformed settings document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SettingsError>;
