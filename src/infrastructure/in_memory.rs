use crate::domain::booking::Booking;
use crate::domain::funding::FundingSource;
use crate::domain::money::Amount;
use crate::domain::order::Order;
use crate::domain::ports::{
    BookingStore, Notification, NotificationDispatcher, OrderStore, WalletDirectory,
};
use crate::error::{Result, SettlementError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for orders.
///
/// Uses `Arc<RwLock<HashMap<String, Order>>>` to allow shared concurrent
/// access. The version check and the insert happen under one write lock, so
/// exactly one of two racing saves wins.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<String, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get(&self, order_id: &str) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(order_id).cloned())
    }

    async fn save(&self, mut order: Order, expected_version: u64) -> Result<Order> {
        let mut orders = self.orders.write().await;
        match (orders.get(&order.id).map(|o| o.version), expected_version) {
            (None, 0) => {}
            (None, _) => {
                return Err(SettlementError::NotFound {
                    entity: "order",
                    id: order.id.clone(),
                });
            }
            (Some(found), expected) if found != expected => {
                return Err(SettlementError::ConcurrentModification {
                    entity: "order",
                    id: order.id.clone(),
                    expected,
                    found,
                });
            }
            (Some(_), _) => {}
        }
        order.version = expected_version + 1;
        let saved = order.clone();
        orders.insert(order.id.clone(), order);
        Ok(saved)
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.values().cloned().collect())
    }
}

/// A thread-safe in-memory store for bookings, same contract as orders.
#[derive(Default, Clone)]
pub struct InMemoryBookingStore {
    bookings: Arc<RwLock<HashMap<String, Booking>>>,
}

impl InMemoryBookingStore {
    /// Creates a new, empty in-memory booking store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn get(&self, booking_id: &str) -> Result<Option<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings.get(booking_id).cloned())
    }

    async fn save(&self, mut booking: Booking, expected_version: u64) -> Result<Booking> {
        let mut bookings = self.bookings.write().await;
        match (
            bookings.get(&booking.id).map(|b| b.version),
            expected_version,
        ) {
            (None, 0) => {}
            (None, _) => {
                return Err(SettlementError::NotFound {
                    entity: "booking",
                    id: booking.id.clone(),
                });
            }
            (Some(found), expected) if found != expected => {
                return Err(SettlementError::ConcurrentModification {
                    entity: "booking",
                    id: booking.id.clone(),
                    expected,
                    found,
                });
            }
            (Some(_), _) => {}
        }
        booking.version = expected_version + 1;
        let saved = booking.clone();
        bookings.insert(booking.id.clone(), booking);
        Ok(saved)
    }

    async fn all_bookings(&self) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings.values().cloned().collect())
    }
}

/// A thread-safe in-memory wallet directory.
///
/// Sources are keyed by id and tagged with their owner. The `WalletDirectory`
/// port only reads; `upsert` and `debit` exist for the host driving the
/// directory, and for tests that move balances between reads.
#[derive(Default, Clone)]
pub struct InMemoryWalletDirectory {
    sources: Arc<RwLock<HashMap<String, (String, FundingSource)>>>,
}

impl InMemoryWalletDirectory {
    /// Creates a new, empty wallet directory.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, customer_id: &str, source: FundingSource) {
        let mut sources = self.sources.write().await;
        sources.insert(source.id.clone(), (customer_id.to_string(), source));
    }

    /// Takes `amount` out of a source's available balance.
    pub async fn debit(&self, source_id: &str, amount: Amount) -> Result<()> {
        let mut sources = self.sources.write().await;
        let Some((_, source)) = sources.get_mut(source_id) else {
            return Err(SettlementError::NotFound {
                entity: "funding source",
                id: source_id.to_string(),
            });
        };
        if source.available < amount {
            return Err(SettlementError::InsufficientBalance {
                source_id: source.id.clone(),
                available: source.available.value(),
                required: amount.value(),
            });
        }
        source.available = source.available.saturating_sub(amount);
        Ok(())
    }
}

#[async_trait]
impl WalletDirectory for InMemoryWalletDirectory {
    async fn sources_for(&self, customer_id: &str) -> Result<Vec<FundingSource>> {
        let sources = self.sources.read().await;
        let mut owned: Vec<FundingSource> = sources
            .values()
            .filter(|(owner, _)| owner == customer_id)
            .map(|(_, source)| source.clone())
            .collect();
        owned.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(owned)
    }

    async fn get(&self, source_id: &str) -> Result<Option<FundingSource>> {
        let sources = self.sources.read().await;
        Ok(sources.get(source_id).map(|(_, source)| source.clone()))
    }
}

/// A notification dispatcher that keeps everything it delivers.
///
/// `failing()` builds one that refuses every dispatch, for exercising the
/// rule that delivery failures never roll back a stored transition.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    delivered: Arc<RwLock<Vec<Notification>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            delivered: Arc::default(),
            fail: true,
        }
    }

    pub async fn delivered(&self) -> Vec<Notification> {
        self.delivered.read().await.clone()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingNotifier {
    async fn dispatch(&self, notification: Notification) -> Result<()> {
        if self.fail {
            return Err(SettlementError::IoError(std::io::Error::other(
                "notification channel unavailable",
            )));
        }
        self.delivered.write().await.push(notification);
        Ok(())
    }
}
