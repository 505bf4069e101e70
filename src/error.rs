use rust_decimal::Decimal;
use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::session::State;

/// A request transaction that cannot be put on the wire.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("origin account id is empty")]
    EmptyOrigin,
    #[error("destination account id is empty")]
    EmptyDestination,
    #[error("amount {0} is not a positive value")]
    NonPositiveAmount(Decimal),
    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A reply payload that cannot be turned back into a transaction.
///
/// An empty reply is kept distinct from a malformed one: the remote closing
/// its write half without sending anything must never look like a parse
/// problem, and never like an accepted transaction.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("reply was empty")]
    EmptyReply,
    #[error("malformed reply: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("reply carries no status")]
    MissingStatus,
    #[error("rejected reply carries no explanation")]
    MissingReason,
}

/// A failure inside one session phase, returned from the phase method rather
/// than thrown across the async boundary.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("connect failed: {0}")]
    Connect(#[source] io::Error),
    #[error("transport failed: {0}")]
    Transport(#[source] io::Error),
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
    #[error("{op} is not valid in the {state:?} state")]
    OutOfOrder { op: &'static str, state: State },
}

/// Everything that can make one exchange come back as `Outcome::Failed`.
///
/// A well-formed rejected reply is not in here: that is a business outcome,
/// not a failure of the exchange.
#[derive(Error, Debug)]
pub enum FailureKind {
    #[error("could not encode request: {0}")]
    Encoding(#[from] EncodeError),
    #[error("could not reach the service: {0}")]
    Connect(#[source] io::Error),
    #[error("transport failure: {0}")]
    Transport(#[source] io::Error),
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
    #[error("session driven out of order: {0}")]
    OutOfOrder(String),
    #[error("phase deadline of {0:?} elapsed")]
    Timeout(Duration),
    #[error("could not decode reply: {0}")]
    Decoding(#[from] DecodeError),
}

impl From<SessionError> for FailureKind {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Connect(e) => FailureKind::Connect(e),
            SessionError::Transport(e) => FailureKind::Transport(e),
            SessionError::ShortWrite { written, expected } => {
                FailureKind::ShortWrite { written, expected }
            }
            err @ SessionError::OutOfOrder { .. } => FailureKind::OutOfOrder(err.to_string()),
        }
    }
}

/// Errors raised by the harness itself, as opposed to per-transaction
/// outcomes, which travel inside each worker's report.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Errors while reading a transaction script.
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
