//! parley-exchange: turn-taking exchange controller
//!
//! [`ExchangeController`] is a synchronous state machine that owns the turn
//! history, the single in-flight generation request and the artifact lineage.
//! [`Exchange`] drives it from one tokio task and hands out a cloneable
//! [`ExchangeHandle`] for submitting, interrupting and refining.

pub mod controller;
pub mod conversation;
pub mod error;
pub mod events;
pub mod exchange;
pub mod handle;
pub mod refine;
pub mod state;

#[cfg(test)]
mod proptests;
#[cfg(test)]
mod testing;

pub use controller::{ExchangeController, Resolution, Submission};
pub use conversation::{Role, Transcript, Turn};
pub use error::{Error, Rejection, Result};
pub use events::ExchangeEvent;
pub use exchange::Exchange;
pub use handle::ExchangeHandle;
pub use refine::{SHORTEN_MAX_CHARS, TRUNCATION_MARKER, refine};
pub use state::{ExchangeState, InterruptKind, RequestId, Snapshot};
