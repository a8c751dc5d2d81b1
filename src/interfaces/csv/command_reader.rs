use crate::domain::fees::PayerTier;
use crate::domain::money::Currency;
use crate::error::{Result, SettlementError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// The operation a command row requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandOp {
    SubmitOrder,
    Pay,
    Confirm,
    StartProcessing,
    Ship,
    Deliver,
    Complete,
    Cancel,
    Fail,
    SubmitBooking,
    ConfirmBooking,
    CompleteBooking,
    CancelBooking,
    NoShow,
}

/// One row of the settlement command feed.
///
/// Only `op` and `id` are always required; the rest of the columns matter to
/// some operations and are ignored by the others. Empty cells read as `None`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandRecord {
    pub op: CommandOp,
    pub id: String,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub tier: Option<PayerTier>,
    #[serde(default)]
    pub rewards: Option<bool>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub tracking: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Reads settlement commands from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over
/// `Result<CommandRecord>`. It handles whitespace trimming and flexible
/// record lengths automatically.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes commands.
    pub fn commands(self) -> impl Iterator<Item = Result<CommandRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(SettlementError::from))
    }
}
