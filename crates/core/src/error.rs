//! Error types for the site behavior layer.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the deck controller and its platform services.
#[derive(Error, Debug)]
pub enum Error {
    /// The page contains no slide elements. Fatal to the deck controller
    /// only; the rest of the page keeps working.
    #[error("no slides found in the presentation container")]
    EmptyDeck,

    /// Speech synthesis is not provided by the platform.
    #[error("speech synthesis not supported")]
    SpeechUnavailable,

    /// Speech synthesis failed to start or play an utterance.
    #[error("speech synthesis error: {0}")]
    Speech(String),

    /// The fullscreen request was denied or failed.
    #[error("fullscreen request failed: {0}")]
    Fullscreen(String),
}
