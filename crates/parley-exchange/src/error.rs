//! Error types for parley-exchange

use thiserror::Error;

/// Result type alias using parley-exchange Error
pub type Result<T> = std::result::Result<T, Error>;

/// Why the controller declined an action. Rejections leave the state
/// untouched and are not surfaced in the exchange history.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Empty or whitespace-only submission
    #[error("Input is empty")]
    EmptyInput,

    /// A generation request is already in flight
    #[error("A response is still pending (stop, pause or cancel it first)")]
    Busy,

    /// The exchange was cancelled and needs a reset
    #[error("Exchange was cancelled (reset to continue)")]
    Interrupted,

    /// Interrupt requested with nothing in flight
    #[error("No response is pending")]
    NotAwaiting,

    /// Refinement requested before anything was generated
    #[error("Nothing has been generated yet")]
    NoArtifact,

    /// Refinement tag did not parse
    #[error("Unknown refinement: '{0}'")]
    UnknownRefinement(String),
}

/// Errors from the exchange runtime
#[derive(Error, Debug)]
pub enum Error {
    /// The controller declined the action
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// The exchange task has shut down
    #[error("Exchange is closed")]
    Closed,
}

impl Error {
    /// Check if this error is a silent rejection rather than a failure
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::Rejected(_))
    }
}
