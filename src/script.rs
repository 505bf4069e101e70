//! CSV transaction scripts.
//!
//! A script is the externally supplied per-worker transaction sequence:
//! `origin, destination, amount, description`, one exchange per row.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

use crate::error::ScriptError;
use crate::transaction::Transaction;

#[derive(Debug, Deserialize)]
struct Row {
    origin: String,
    destination: String,
    amount: Decimal,
    #[serde(default)]
    description: String,
}

pub struct ScriptReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ScriptReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn transactions(self) -> impl Iterator<Item = Result<Transaction, ScriptError>> {
        self.reader.into_deserialize().map(|row| {
            row.map(|row: Row| {
                Transaction::request(row.origin, row.destination, row.amount, row.description)
            })
            .map_err(ScriptError::from)
        })
    }
}
