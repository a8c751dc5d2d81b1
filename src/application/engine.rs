use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::SettlementConfig;
use crate::domain::allocation::{self, AllocationPlan};
use crate::domain::booking::Booking;
use crate::domain::fees::{self, FeeQuote, PayerTier};
use crate::domain::money::{Amount, Currency};
use crate::domain::order::Order;
use crate::domain::ports::{
    BookingStoreBox, Notification, NotificationDispatcherBox, NotificationKind, OrderStoreBox,
    WalletDirectoryBox,
};
use crate::error::{Result, SettlementError};

/// A transition requested on an order.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderAction {
    RecordPayment,
    Confirm,
    StartProcessing,
    Ship {
        carrier: String,
        tracking_number: String,
    },
    MarkDelivered,
    Complete,
    Cancel {
        reason: Option<String>,
    },
    Fail {
        reason: Option<String>,
    },
}

/// A transition requested on a booking.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingAction {
    Confirm,
    Complete,
    Cancel { reason: Option<String> },
    MarkNoShow,
}

/// The main entry point for the settlement application.
///
/// `SettlementEngine` quotes fees, plans payment allocations, and drives the
/// order and booking lifecycles. It owns the storage backends and ensures
/// sequential consistency by awaiting storage operations for each command.
/// Every transition goes load, guard, mutate, versioned save, notify.
pub struct SettlementEngine {
    orders: OrderStoreBox,
    bookings: BookingStoreBox,
    wallets: WalletDirectoryBox,
    notifier: NotificationDispatcherBox,
    config: SettlementConfig,
}

impl SettlementEngine {
    pub fn new(
        orders: OrderStoreBox,
        bookings: BookingStoreBox,
        wallets: WalletDirectoryBox,
        notifier: NotificationDispatcherBox,
        config: SettlementConfig,
    ) -> Self {
        Self {
            orders,
            bookings,
            wallets,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    /// Quotes the service fee and total for a base amount under the
    /// configured fee policy. Pure; quoting twice gives the same answer.
    pub fn quote_fee(
        &self,
        base_amount: Decimal,
        currency: Currency,
        tier: PayerTier,
    ) -> Result<FeeQuote> {
        fees::quote_fee(base_amount, currency, tier, &self.config.fees)
    }

    /// Plans how `total` is covered by the customer's funding sources.
    ///
    /// The customer's sources are read fresh, and when a selection names one
    /// of them its balance is re-read individually, so a plan is always
    /// validated against current balances rather than whatever listing the
    /// caller had on screen. The plan itself debits nothing.
    pub async fn allocate_payment(
        &self,
        customer_id: &str,
        total: Amount,
        currency: Currency,
        use_rewards: bool,
        selection: Option<&str>,
    ) -> Result<AllocationPlan> {
        let mut candidates = self.wallets.sources_for(customer_id).await?;

        if let Some(id) = selection
            && let Some(fresh) = self.wallets.get(id).await?
            && let Some(slot) = candidates.iter_mut().find(|s| s.id == fresh.id)
        {
            *slot = fresh;
        }

        let rewards = candidates.iter().find(|s| s.kind.is_rewards()).cloned();
        allocation::allocate(
            total,
            currency,
            use_rewards,
            rewards.as_ref(),
            &candidates,
            selection,
        )
    }

    /// Inserts a newly created order.
    pub async fn submit_order(&self, order: Order) -> Result<Order> {
        let saved = self.orders.save(order, 0).await?;
        info!(order_id = %saved.id, total = %saved.totals.total, "order submitted");
        Ok(saved)
    }

    /// Inserts a newly created booking.
    pub async fn submit_booking(&self, booking: Booking) -> Result<Booking> {
        let saved = self.bookings.save(booking, 0).await?;
        info!(booking_id = %saved.id, price = %saved.price, "booking submitted");
        Ok(saved)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Order> {
        self.orders
            .get(order_id)
            .await?
            .ok_or_else(|| SettlementError::NotFound {
                entity: "order",
                id: order_id.to_string(),
            })
    }

    pub async fn get_booking(&self, booking_id: &str) -> Result<Booking> {
        self.bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| SettlementError::NotFound {
                entity: "booking",
                id: booking_id.to_string(),
            })
    }

    /// Applies `action` to the stored order.
    ///
    /// The order is loaded, the transition guard runs against that snapshot,
    /// and the result is saved expecting the loaded version. A save that lost
    /// the race surfaces as `ConcurrentModification` and nothing is stored.
    pub async fn transition_order(&self, order_id: &str, action: OrderAction) -> Result<Order> {
        let mut order = self.get_order(order_id).await?;
        let expected_version = order.version;
        let now = Utc::now();

        let kind = match &action {
            OrderAction::RecordPayment => {
                order.record_payment()?;
                NotificationKind::PaymentRecorded
            }
            OrderAction::Confirm => {
                order.confirm(now)?;
                NotificationKind::OrderConfirmed
            }
            OrderAction::StartProcessing => {
                order.start_processing()?;
                NotificationKind::OrderProcessing
            }
            OrderAction::Ship {
                carrier,
                tracking_number,
            } => {
                order.mark_shipped(carrier, tracking_number, self.config.transit_days, now)?;
                NotificationKind::OrderShipped
            }
            OrderAction::MarkDelivered => {
                order.mark_delivered(now)?;
                NotificationKind::OrderDelivered
            }
            OrderAction::Complete => {
                order.complete(now)?;
                NotificationKind::OrderCompleted
            }
            OrderAction::Cancel { reason } => {
                order.cancel(reason.clone(), now)?;
                NotificationKind::OrderCancelled
            }
            OrderAction::Fail { reason } => {
                order.mark_failed(reason.clone())?;
                NotificationKind::OrderFailed
            }
        };

        let saved = self.orders.save(order, expected_version).await?;
        info!(order_id = %saved.id, status = %saved.status, "order transition applied");
        self.notify(kind, &saved.id).await;
        Ok(saved)
    }

    /// Applies `action` to the stored booking, same contract as orders.
    pub async fn transition_booking(
        &self,
        booking_id: &str,
        action: BookingAction,
    ) -> Result<Booking> {
        let mut booking = self.get_booking(booking_id).await?;
        let expected_version = booking.version;
        let now = Utc::now();

        let kind = match &action {
            BookingAction::Confirm => {
                booking.confirm(now)?;
                NotificationKind::BookingConfirmed
            }
            BookingAction::Complete => {
                booking.complete(now)?;
                NotificationKind::BookingCompleted
            }
            BookingAction::Cancel { reason } => {
                booking.cancel(reason.clone(), now)?;
                NotificationKind::BookingCancelled
            }
            BookingAction::MarkNoShow => {
                booking.mark_no_show(now)?;
                NotificationKind::BookingNoShow
            }
        };

        let saved = self.bookings.save(booking, expected_version).await?;
        info!(booking_id = %saved.id, status = %saved.status, "booking transition applied");
        self.notify(kind, &saved.id).await;
        Ok(saved)
    }

    /// Final state of all orders, for reporting.
    pub async fn all_orders(&self) -> Result<Vec<Order>> {
        self.orders.all_orders().await
    }

    /// Final state of all bookings, for reporting.
    pub async fn all_bookings(&self) -> Result<Vec<Booking>> {
        self.bookings.all_bookings().await
    }

    // Best-effort: the transition is already durable at this point.
    async fn notify(&self, kind: NotificationKind, entity_id: &str) {
        let notification = Notification {
            kind,
            entity_id: entity_id.to_string(),
        };
        if let Err(err) = self.notifier.dispatch(notification).await {
            warn!(entity_id, error = %err, "notification dispatch failed");
        }
    }
}
