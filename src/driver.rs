//! Drives one session through its three phases for one transaction.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::codec;
use crate::error::{FailureKind, SessionError};
use crate::session::Session;
use crate::transaction::Transaction;

/// The three phases of one exchange, for failure attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connect,
    Send,
    Receive,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Connect => write!(f, "connect"),
            Phase::Send => write!(f, "send"),
            Phase::Receive => write!(f, "receive"),
        }
    }
}

/// What one exchange came to.
///
/// A rejection is a completed exchange whose reply said no; only transport,
/// timeout and codec problems count as failures.
#[derive(Debug)]
pub enum Outcome {
    Success(Transaction),
    Rejected { response: Transaction, reason: String },
    Failed { phase: Phase, error: FailureKind },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected { .. })
    }
}

/// Sequences connect, send and receive, each under a bounded deadline, and
/// always releases the connection on the way out. Never retries; retry
/// policy belongs to the caller.
#[derive(Debug, Clone)]
pub struct Driver {
    phase_timeout: Duration,
}

impl Driver {
    pub fn new(phase_timeout: Duration) -> Self {
        Self { phase_timeout }
    }

    /// Runs one full exchange against `addr` for `request`.
    ///
    /// No phase starts before the previous one completed; the first failure
    /// short-circuits the rest, but disconnection still runs on every exit
    /// path.
    pub async fn execute(&self, addr: &str, request: &Transaction) -> Outcome {
        let payload = match codec::serialize(request) {
            Ok(payload) => payload,
            Err(e) => {
                // Nothing was connected yet; the request never left.
                return Outcome::Failed {
                    phase: Phase::Send,
                    error: e.into(),
                };
            }
        };

        let mut session = Session::new();
        let exchanged = self.exchange(&mut session, addr, &payload).await;
        session.disconnect().await;

        let reply = match exchanged {
            Ok(reply) => reply,
            Err((phase, error)) => return Outcome::Failed { phase, error },
        };

        match codec::deserialize(&reply) {
            Ok(response) if response.is_rejected() => {
                let reason = response.reason.clone().unwrap_or_default();
                Outcome::Rejected { response, reason }
            }
            Ok(response) => Outcome::Success(response),
            Err(e) => Outcome::Failed {
                phase: Phase::Receive,
                error: e.into(),
            },
        }
    }

    async fn exchange(
        &self,
        session: &mut Session,
        addr: &str,
        payload: &[u8],
    ) -> Result<Vec<u8>, (Phase, FailureKind)> {
        self.bounded(Phase::Connect, session.connect(addr)).await?;
        self.bounded(Phase::Send, session.send(payload)).await?;
        self.bounded(Phase::Receive, session.receive()).await
    }

    /// Every phase wait carries a mandatory deadline; an elapsed one is a
    /// timeout failure, never an indefinite block.
    async fn bounded<T>(
        &self,
        phase: Phase,
        wait: impl Future<Output = Result<T, SessionError>>,
    ) -> Result<T, (Phase, FailureKind)> {
        match timeout(self.phase_timeout, wait).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err((phase, e.into())),
            Err(_) => Err((phase, FailureKind::Timeout(self.phase_timeout))),
        }
    }
}
