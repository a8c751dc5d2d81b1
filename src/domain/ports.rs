use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use super::booking::Booking;
use super::funding::FundingSource;
use super::order::Order;

/// Persistence port for orders.
///
/// `save` succeeds only when the stored version equals `expected_version`;
/// the store then bumps the version by one. An `expected_version` of zero
/// inserts a new order. A mismatch is a concurrent modification and leaves
/// the stored order untouched.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get(&self, order_id: &str) -> Result<Option<Order>>;
    async fn save(&self, order: Order, expected_version: u64) -> Result<Order>;
    async fn all_orders(&self) -> Result<Vec<Order>>;
}

/// Persistence port for bookings, under the same version contract as orders.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn get(&self, booking_id: &str) -> Result<Option<Booking>>;
    async fn save(&self, booking: Booking, expected_version: u64) -> Result<Booking>;
    async fn all_bookings(&self) -> Result<Vec<Booking>>;
}

/// Read-only lookup of a customer's funding sources.
///
/// Balances returned here are snapshots. Debiting them is the host's concern,
/// outside this port.
#[async_trait]
pub trait WalletDirectory: Send + Sync {
    async fn sources_for(&self, customer_id: &str) -> Result<Vec<FundingSource>>;
    async fn get(&self, source_id: &str) -> Result<Option<FundingSource>>;
}

/// What happened, for anyone listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    PaymentRecorded,
    OrderConfirmed,
    OrderProcessing,
    OrderShipped,
    OrderDelivered,
    OrderCompleted,
    OrderCancelled,
    OrderFailed,
    BookingConfirmed,
    BookingCompleted,
    BookingCancelled,
    BookingNoShow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub entity_id: String,
}

/// Delivery port for post-transition notifications.
///
/// Dispatch happens after the state change is stored; a delivery failure
/// never rolls the transition back.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notification: Notification) -> Result<()>;
}

pub type OrderStoreBox = Box<dyn OrderStore>;
pub type BookingStoreBox = Box<dyn BookingStore>;
pub type WalletDirectoryBox = Box<dyn WalletDirectory>;
pub type NotificationDispatcherBox = Box<dyn NotificationDispatcher>;
