//! Error types for vocab-core.

use thiserror::Error;

use crate::drill::Step;

/// Result type alias using DrillError.
pub type Result<T> = std::result::Result<T, DrillError>;

/// Errors raised by the drill sequencer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrillError {
    #[error("a drill session needs at least one word")]
    EmptySession,

    #[error("word index {index} out of range for {len} words")]
    WordOutOfRange { index: usize, len: usize },

    #[error("{event} is not allowed in step {step}")]
    InvalidEvent { step: Step, event: &'static str },

    #[error("session already complete")]
    SessionComplete,
}

/// Errors that can occur while parsing a custom word list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("word list is empty")]
    EmptyList,

    #[error("invalid word at position {position}: {value}")]
    InvalidWord { position: usize, value: String },
}
