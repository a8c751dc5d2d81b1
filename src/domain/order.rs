use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SettlementError};
use super::money::{Amount, Currency};

/// Overall progress of an order through settlement and fulfillment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
    Failed,
}

impl OrderStatus {
    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Cancelled | OrderStatus::Failed
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Physical fulfillment progress, tracked separately from the order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FulfillmentStatus {
    #[default]
    Unfulfilled,
    Partial,
    Fulfilled,
    Shipped,
    Delivered,
}

impl fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FulfillmentStatus::Unfulfilled => "unfulfilled",
            FulfillmentStatus::Partial => "partial",
            FulfillmentStatus::Fulfilled => "fulfilled",
            FulfillmentStatus::Shipped => "shipped",
            FulfillmentStatus::Delivered => "delivered",
        };
        f.write_str(name)
    }
}

/// Settlement state of the order's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        };
        f.write_str(name)
    }
}

/// Carrier details recorded when an order ships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub carrier: String,
    pub tracking_number: String,
    pub shipped_at: DateTime<Utc>,
    pub estimated_delivery: DateTime<Utc>,
}

/// Monetary breakdown of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Amount,
    pub tax: Amount,
    pub shipping_cost: Amount,
    pub service_fee: Amount,
    pub discount: Amount,
    /// Sum of the parts minus the discount, floored at zero.
    pub total: Amount,
}

impl OrderTotals {
    pub fn new(
        subtotal: Amount,
        tax: Amount,
        shipping_cost: Amount,
        service_fee: Amount,
        discount: Amount,
    ) -> Self {
        let total = (subtotal + tax + shipping_cost + service_fee).saturating_sub(discount);
        Self {
            subtotal,
            tax,
            shipping_cost,
            service_fee,
            discount,
            total,
        }
    }
}

/// Represents the state of a customer order.
///
/// Transitions are the only way state changes. Each guard rejects without
/// mutating, timestamps are stamped on entry and never cleared, and a
/// terminal status freezes the order for good.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    /// The merchant entity the order was placed against.
    pub entity_id: String,
    pub customer_id: String,
    pub currency: Currency,
    pub totals: OrderTotals,
    pub status: OrderStatus,
    pub fulfillment_status: FulfillmentStatus,
    pub payment_status: PaymentStatus,
    pub shipping_info: Option<ShippingInfo>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Bumped by the store on every successful save.
    pub version: u64,
}

impl Order {
    pub fn new(
        id: String,
        order_number: String,
        entity_id: String,
        customer_id: String,
        currency: Currency,
        totals: OrderTotals,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            order_number,
            entity_id,
            customer_id,
            currency,
            totals,
            status: OrderStatus::Pending,
            fulfillment_status: FulfillmentStatus::Unfulfilled,
            payment_status: PaymentStatus::Pending,
            shipping_info: None,
            cancellation_reason: None,
            created_at: now,
            confirmed_at: None,
            delivered_at: None,
            completed_at: None,
            cancelled_at: None,
            version: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    fn guard_open(&self) -> Result<()> {
        if self.status.is_terminal() {
            return Err(SettlementError::TerminalStateViolation {
                entity: "order",
                id: self.id.clone(),
                status: self.status.to_string(),
            });
        }
        Ok(())
    }

    fn illegal(&self, action: &'static str, from: String) -> SettlementError {
        SettlementError::IllegalTransition {
            entity: "order",
            id: self.id.clone(),
            from,
            action,
        }
    }

    fn require_paid(&self) -> Result<()> {
        if self.payment_status != PaymentStatus::Completed {
            return Err(SettlementError::PaymentOutstanding {
                id: self.id.clone(),
            });
        }
        Ok(())
    }

    /// Marks the payment completed once it has been collected.
    pub fn record_payment(&mut self) -> Result<()> {
        self.guard_open()?;
        if self.payment_status != PaymentStatus::Pending {
            return Err(self.illegal("record payment", self.payment_status.to_string()));
        }
        self.payment_status = PaymentStatus::Completed;
        Ok(())
    }

    /// Confirms a pending, fully paid order.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.guard_open()?;
        if self.status != OrderStatus::Pending {
            return Err(self.illegal("confirm", self.status.to_string()));
        }
        self.require_paid()?;
        self.status = OrderStatus::Confirmed;
        self.confirmed_at = Some(now);
        Ok(())
    }

    /// Moves a confirmed order into fulfillment preparation.
    pub fn start_processing(&mut self) -> Result<()> {
        self.guard_open()?;
        if self.status != OrderStatus::Confirmed {
            return Err(self.illegal("start processing", self.status.to_string()));
        }
        self.status = OrderStatus::Processing;
        Ok(())
    }

    /// Records carrier details and marks the order shipped.
    ///
    /// Requires completed payment, an unfulfilled order, and non-blank carrier
    /// and tracking number. The delivery estimate is shipped time plus
    /// `transit_days`.
    pub fn mark_shipped(
        &mut self,
        carrier: &str,
        tracking_number: &str,
        transit_days: i64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.guard_open()?;
        if self.fulfillment_status != FulfillmentStatus::Unfulfilled {
            return Err(self.illegal("ship", self.fulfillment_status.to_string()));
        }
        self.require_paid()?;
        let carrier = carrier.trim();
        let tracking_number = tracking_number.trim();
        if carrier.is_empty() || tracking_number.is_empty() {
            return Err(SettlementError::MissingTrackingInfo);
        }
        self.status = OrderStatus::Shipped;
        self.fulfillment_status = FulfillmentStatus::Shipped;
        self.shipping_info = Some(ShippingInfo {
            carrier: carrier.to_string(),
            tracking_number: tracking_number.to_string(),
            shipped_at: now,
            estimated_delivery: now + Duration::days(transit_days),
        });
        Ok(())
    }

    /// Marks a shipped order delivered.
    pub fn mark_delivered(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.guard_open()?;
        if self.status != OrderStatus::Shipped {
            return Err(self.illegal("deliver", self.status.to_string()));
        }
        self.status = OrderStatus::Delivered;
        self.fulfillment_status = FulfillmentStatus::Delivered;
        self.delivered_at = Some(now);
        Ok(())
    }

    /// Completes an order that has shipped or been delivered.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.guard_open()?;
        if !matches!(self.status, OrderStatus::Shipped | OrderStatus::Delivered) {
            return Err(self.illegal("complete", self.status.to_string()));
        }
        self.status = OrderStatus::Completed;
        self.completed_at = Some(now);
        Ok(())
    }

    /// Cancels any non-terminal order. Earlier timestamps are kept for audit.
    pub fn cancel(&mut self, reason: Option<String>, now: DateTime<Utc>) -> Result<()> {
        self.guard_open()?;
        self.status = OrderStatus::Cancelled;
        self.cancellation_reason = reason;
        self.cancelled_at = Some(now);
        Ok(())
    }

    /// Fails any non-terminal order, e.g. when fulfillment is impossible.
    pub fn mark_failed(&mut self, reason: Option<String>) -> Result<()> {
        self.guard_open()?;
        self.status = OrderStatus::Failed;
        self.cancellation_reason = reason;
        Ok(())
    }
}
