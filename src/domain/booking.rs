use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SettlementError};
use super::money::{Amount, Currency};

/// Lifecycle of a scheduled service booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::NoShow
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::NoShow => "no-show",
        };
        f.write_str(name)
    }
}

/// Represents a scheduled service booking.
///
/// The open states are exactly pending and confirmed, so the cancellation and
/// no-show guards reduce to the terminal check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub booking_number: String,
    /// The provider entity the booking was made with.
    pub entity_id: String,
    pub customer_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub currency: Currency,
    pub price: Amount,
    pub status: BookingStatus,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub no_show_at: Option<DateTime<Utc>>,
    /// Bumped by the store on every successful save.
    pub version: u64,
}

impl Booking {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        booking_number: String,
        entity_id: String,
        customer_id: String,
        scheduled_at: DateTime<Utc>,
        currency: Currency,
        price: Amount,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            booking_number,
            entity_id,
            customer_id,
            scheduled_at,
            currency,
            price,
            status: BookingStatus::Pending,
            cancellation_reason: None,
            created_at: now,
            confirmed_at: None,
            completed_at: None,
            cancelled_at: None,
            no_show_at: None,
            version: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    fn guard_open(&self) -> Result<()> {
        if self.status.is_terminal() {
            return Err(SettlementError::TerminalStateViolation {
                entity: "booking",
                id: self.id.clone(),
                status: self.status.to_string(),
            });
        }
        Ok(())
    }

    fn illegal(&self, action: &'static str) -> SettlementError {
        SettlementError::IllegalTransition {
            entity: "booking",
            id: self.id.clone(),
            from: self.status.to_string(),
            action,
        }
    }

    /// Confirms a pending booking.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.guard_open()?;
        if self.status != BookingStatus::Pending {
            return Err(self.illegal("confirm"));
        }
        self.status = BookingStatus::Confirmed;
        self.confirmed_at = Some(now);
        Ok(())
    }

    /// Completes a confirmed booking after the service is rendered.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.guard_open()?;
        if self.status != BookingStatus::Confirmed {
            return Err(self.illegal("complete"));
        }
        self.status = BookingStatus::Completed;
        self.completed_at = Some(now);
        Ok(())
    }

    /// Cancels an open booking. Earlier timestamps are kept for audit.
    pub fn cancel(&mut self, reason: Option<String>, now: DateTime<Utc>) -> Result<()> {
        self.guard_open()?;
        self.status = BookingStatus::Cancelled;
        self.cancellation_reason = reason;
        self.cancelled_at = Some(now);
        Ok(())
    }

    /// Records that the customer never arrived.
    pub fn mark_no_show(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.guard_open()?;
        self.status = BookingStatus::NoShow;
        self.no_show_at = Some(now);
        Ok(())
    }
}
