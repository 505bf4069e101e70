//! Wire codec for the transaction exchange.
//!
//! One JSON document per direction. Requests never carry a status field;
//! replies must carry one, and a rejected reply must explain itself.

use rust_decimal::Decimal;

use crate::error::{DecodeError, EncodeError};
use crate::transaction::{Status, Transaction};

/// Encodes a request transaction into its wire payload.
pub fn serialize(tx: &Transaction) -> Result<Vec<u8>, EncodeError> {
    if tx.origin.trim().is_empty() {
        return Err(EncodeError::EmptyOrigin);
    }
    if tx.destination.trim().is_empty() {
        return Err(EncodeError::EmptyDestination);
    }
    if tx.amount <= Decimal::ZERO {
        return Err(EncodeError::NonPositiveAmount(tx.amount));
    }
    Ok(serde_json::to_vec(tx)?)
}

/// Decodes an accumulated reply payload.
///
/// Zero bytes means the remote closed without answering; that is reported as
/// [`DecodeError::EmptyReply`], never defaulted to an accepted transaction.
pub fn deserialize(bytes: &[u8]) -> Result<Transaction, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyReply);
    }
    let tx: Transaction = serde_json::from_slice(bytes)?;
    match tx.status {
        None => Err(DecodeError::MissingStatus),
        Some(Status::Rejected) if tx.reason.as_deref().is_none_or(|r| r.trim().is_empty()) => {
            Err(DecodeError::MissingReason)
        }
        Some(_) => Ok(tx),
    }
}
