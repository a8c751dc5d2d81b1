#![allow(dead_code)]

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use settler::application::engine::SettlementEngine;
use settler::config::SettlementConfig;
use settler::domain::booking::Booking;
use settler::domain::funding::{FundingSource, SourceKind};
use settler::domain::money::{Amount, Currency};
use settler::domain::order::{Order, OrderTotals};
use settler::infrastructure::in_memory::{
    InMemoryBookingStore, InMemoryOrderStore, InMemoryWalletDirectory, RecordingNotifier,
};

/// Engine wired to in-memory adapters, with handles kept for seeding wallets
/// and inspecting notifications.
pub fn test_engine() -> (SettlementEngine, InMemoryWalletDirectory, RecordingNotifier) {
    let wallets = InMemoryWalletDirectory::new();
    let notifier = RecordingNotifier::new();
    let engine = SettlementEngine::new(
        Box::new(InMemoryOrderStore::new()),
        Box::new(InMemoryBookingStore::new()),
        Box::new(wallets.clone()),
        Box::new(notifier.clone()),
        SettlementConfig::default(),
    );
    (engine, wallets, notifier)
}

pub fn amount(value: Decimal) -> Amount {
    Amount::new(value).unwrap()
}

/// An order for `subtotal` plus `service_fee`, nothing else on the bill.
pub fn order(id: &str, subtotal: Decimal, service_fee: Decimal) -> Order {
    let totals = OrderTotals::new(
        amount(subtotal),
        Amount::ZERO,
        Amount::ZERO,
        amount(service_fee),
        Amount::ZERO,
    );
    Order::new(
        id.to_string(),
        format!("ORD-{id}"),
        "main".to_string(),
        "cust-1".to_string(),
        Currency::Usd,
        totals,
        Utc::now(),
    )
}

pub fn booking(id: &str, price: Decimal) -> Booking {
    let now = Utc::now();
    Booking::new(
        id.to_string(),
        format!("BKG-{id}"),
        "salon-1".to_string(),
        "cust-1".to_string(),
        now + Duration::days(1),
        Currency::Usd,
        amount(price),
        now,
    )
}

pub async fn seed_source(
    wallets: &InMemoryWalletDirectory,
    customer: &str,
    id: &str,
    kind: SourceKind,
    currency: Currency,
    balance: Decimal,
) {
    wallets
        .upsert(
            customer,
            FundingSource {
                id: id.to_string(),
                kind,
                currency,
                available: amount(balance),
            },
        )
        .await;
}
