use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Verdict the remote service attaches to a reply.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Accepted,
    Rejected,
}

/// One transfer between two accounts.
///
/// A request carries origin, destination, amount and description with no
/// status; a reply echoes those fields and adds a status, plus an
/// explanation when rejected. Values are immutable once built: replies are
/// fresh instances, never a request mutated in place.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    pub origin: String,
    pub destination: String,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Transaction {
    /// Builds an outbound request. Status stays absent until the remote
    /// service has spoken.
    pub fn request(
        origin: impl Into<String>,
        destination: impl Into<String>,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            amount,
            description: description.into(),
            status: None,
            reason: None,
        }
    }

    /// Builds the accepted reply for this request.
    pub fn accepted(&self) -> Self {
        Self {
            status: Some(Status::Accepted),
            reason: None,
            ..self.clone()
        }
    }

    /// Builds the rejected reply for this request.
    pub fn rejected(&self, reason: impl Into<String>) -> Self {
        Self {
            status: Some(Status::Rejected),
            reason: Some(reason.into()),
            ..self.clone()
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.status == Some(Status::Rejected)
    }
}
