use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::money::Currency;

pub type Result<T> = std::result::Result<T, SettlementError>;

#[derive(Error, Debug)]
pub enum SettlementError {
    #[error("invalid monetary amount: {0}")]
    InvalidAmount(Decimal),
    #[error("source {source_id} is denominated in {found}, payment requires {expected}")]
    SourceCurrencyMismatch {
        source_id: String,
        expected: Currency,
        found: Currency,
    },
    #[error("no funding source can cover the remaining {remaining} {currency}")]
    NoEligibleFunding {
        currency: Currency,
        remaining: Decimal,
    },
    #[error("source {source_id} holds {available}, {required} required")]
    InsufficientBalance {
        source_id: String,
        available: Decimal,
        required: Decimal,
    },
    #[error("a funding source must be selected to cover the remaining {remaining} {currency}")]
    MissingFundingSelection {
        currency: Currency,
        remaining: Decimal,
    },
    #[error("carrier and tracking number are required to mark an order shipped")]
    MissingTrackingInfo,
    #[error("{entity} {id} is {status} and accepts no further transitions")]
    TerminalStateViolation {
        entity: &'static str,
        id: String,
        status: String,
    },
    #[error("cannot {action} {entity} {id} while it is {from}")]
    IllegalTransition {
        entity: &'static str,
        id: String,
        from: String,
        action: &'static str,
    },
    #[error("order {id} has no completed payment")]
    PaymentOutstanding { id: String },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("{entity} {id} was modified concurrently (expected version {expected}, found {found})")]
    ConcurrentModification {
        entity: &'static str,
        id: String,
        expected: u64,
        found: u64,
    },
    #[error("malformed command: {0}")]
    MalformedCommand(String),
    #[error("config error: {0}")]
    ConfigError(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
