use crate::domain::funding::SourceKind;
use crate::domain::money::Currency;
use crate::error::{Result, SettlementError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One row of the wallet seed file: a funding source and its owner.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WalletRecord {
    pub customer: String,
    pub source: String,
    pub kind: SourceKind,
    pub currency: Currency,
    pub available: Decimal,
}

/// Reads funding sources from a CSV source.
pub struct WalletReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> WalletReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes wallet rows.
    pub fn wallets(self) -> impl Iterator<Item = Result<WalletRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(SettlementError::from))
    }
}
