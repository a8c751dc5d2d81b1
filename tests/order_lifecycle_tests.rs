mod common;

use common::{order, test_engine};
use rust_decimal_macros::dec;
use settler::application::engine::OrderAction;
use settler::domain::order::{FulfillmentStatus, OrderStatus, PaymentStatus};
use settler::domain::ports::NotificationKind;
use settler::error::SettlementError;

#[tokio::test]
async fn test_full_lifecycle_happy_path() {
    let (engine, _, _) = test_engine();
    let submitted = engine.submit_order(order("o-1", dec!(100), dec!(10))).await.unwrap();
    assert_eq!(submitted.version, 1);
    assert_eq!(submitted.totals.total.value(), dec!(110.00));

    engine
        .transition_order("o-1", OrderAction::RecordPayment)
        .await
        .unwrap();
    engine
        .transition_order("o-1", OrderAction::Confirm)
        .await
        .unwrap();
    engine
        .transition_order("o-1", OrderAction::StartProcessing)
        .await
        .unwrap();
    engine
        .transition_order(
            "o-1",
            OrderAction::Ship {
                carrier: "UPS".to_string(),
                tracking_number: "1Z999".to_string(),
            },
        )
        .await
        .unwrap();
    engine
        .transition_order("o-1", OrderAction::MarkDelivered)
        .await
        .unwrap();
    let done = engine
        .transition_order("o-1", OrderAction::Complete)
        .await
        .unwrap();

    assert_eq!(done.status, OrderStatus::Completed);
    assert_eq!(done.fulfillment_status, FulfillmentStatus::Delivered);
    assert_eq!(done.payment_status, PaymentStatus::Completed);
    // One bump per transition on top of the insert.
    assert_eq!(done.version, 7);

    // The audit trail survives completion.
    assert!(done.confirmed_at.is_some());
    assert!(done.delivered_at.is_some());
    assert!(done.completed_at.is_some());
    let info = done.shipping_info.unwrap();
    assert_eq!(info.carrier, "UPS");
    assert!(done.confirmed_at.unwrap() <= info.shipped_at);
    assert!(info.shipped_at <= done.delivered_at.unwrap());
}

#[tokio::test]
async fn test_completed_order_cannot_be_cancelled() {
    let (engine, _, _) = test_engine();
    engine.submit_order(order("o-1", dec!(100), dec!(10))).await.unwrap();
    engine
        .transition_order("o-1", OrderAction::RecordPayment)
        .await
        .unwrap();
    engine
        .transition_order(
            "o-1",
            OrderAction::Ship {
                carrier: "UPS".to_string(),
                tracking_number: "1Z999".to_string(),
            },
        )
        .await
        .unwrap();
    let done = engine
        .transition_order("o-1", OrderAction::Complete)
        .await
        .unwrap();

    let result = engine
        .transition_order(
            "o-1",
            OrderAction::Cancel {
                reason: Some("too late".to_string()),
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(SettlementError::TerminalStateViolation { .. })
    ));

    // The stored order is untouched by the rejected cancel.
    let stored = engine.get_order("o-1").await.unwrap();
    assert_eq!(stored.status, OrderStatus::Completed);
    assert_eq!(stored.version, done.version);
    assert!(stored.cancelled_at.is_none());
    assert!(stored.cancellation_reason.is_none());
}

#[tokio::test]
async fn test_unpaid_order_cannot_move_forward() {
    let (engine, _, _) = test_engine();
    engine.submit_order(order("o-1", dec!(100), dec!(10))).await.unwrap();

    let confirm = engine.transition_order("o-1", OrderAction::Confirm).await;
    assert!(matches!(
        confirm,
        Err(SettlementError::PaymentOutstanding { .. })
    ));

    let ship = engine
        .transition_order(
            "o-1",
            OrderAction::Ship {
                carrier: "UPS".to_string(),
                tracking_number: "1Z999".to_string(),
            },
        )
        .await;
    assert!(matches!(
        ship,
        Err(SettlementError::PaymentOutstanding { .. })
    ));

    let stored = engine.get_order("o-1").await.unwrap();
    assert_eq!(stored.status, OrderStatus::Pending);
    assert_eq!(stored.version, 1);
}

#[tokio::test]
async fn test_ship_without_tracking_rejected() {
    let (engine, _, _) = test_engine();
    engine.submit_order(order("o-1", dec!(100), dec!(10))).await.unwrap();
    engine
        .transition_order("o-1", OrderAction::RecordPayment)
        .await
        .unwrap();

    let result = engine
        .transition_order(
            "o-1",
            OrderAction::Ship {
                carrier: "UPS".to_string(),
                tracking_number: "  ".to_string(),
            },
        )
        .await;
    assert!(matches!(result, Err(SettlementError::MissingTrackingInfo)));

    let stored = engine.get_order("o-1").await.unwrap();
    assert!(stored.shipping_info.is_none());
    assert_eq!(stored.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_cancellation_keeps_audit_trail() {
    let (engine, _, _) = test_engine();
    engine.submit_order(order("o-1", dec!(100), dec!(10))).await.unwrap();
    engine
        .transition_order("o-1", OrderAction::RecordPayment)
        .await
        .unwrap();
    let confirmed = engine
        .transition_order("o-1", OrderAction::Confirm)
        .await
        .unwrap();

    let cancelled = engine
        .transition_order(
            "o-1",
            OrderAction::Cancel {
                reason: Some("out of stock".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.confirmed_at, confirmed.confirmed_at);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("out of stock"));
    assert!(cancelled.cancelled_at.is_some());
}

#[tokio::test]
async fn test_skipping_steps_is_rejected() {
    let (engine, _, _) = test_engine();
    engine.submit_order(order("o-1", dec!(100), dec!(10))).await.unwrap();
    engine
        .transition_order("o-1", OrderAction::RecordPayment)
        .await
        .unwrap();

    // Not shipped yet: neither deliver nor complete is reachable.
    let deliver = engine
        .transition_order("o-1", OrderAction::MarkDelivered)
        .await;
    assert!(matches!(
        deliver,
        Err(SettlementError::IllegalTransition { .. })
    ));
    let complete = engine.transition_order("o-1", OrderAction::Complete).await;
    assert!(matches!(
        complete,
        Err(SettlementError::IllegalTransition { .. })
    ));
}

#[tokio::test]
async fn test_order_notifications_in_order() {
    let (engine, _, notifier) = test_engine();
    engine.submit_order(order("o-1", dec!(100), dec!(10))).await.unwrap();
    engine
        .transition_order("o-1", OrderAction::RecordPayment)
        .await
        .unwrap();
    engine
        .transition_order("o-1", OrderAction::Confirm)
        .await
        .unwrap();
    engine
        .transition_order(
            "o-1",
            OrderAction::Ship {
                carrier: "UPS".to_string(),
                tracking_number: "1Z999".to_string(),
            },
        )
        .await
        .unwrap();
    let _ = engine
        .transition_order("o-1", OrderAction::Confirm)
        .await;

    let kinds: Vec<NotificationKind> = notifier
        .delivered()
        .await
        .iter()
        .map(|n| n.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::PaymentRecorded,
            NotificationKind::OrderConfirmed,
            NotificationKind::OrderShipped,
        ]
    );
}

#[tokio::test]
async fn test_losing_writer_changes_nothing() {
    use settler::application::engine::SettlementEngine;
    use settler::config::SettlementConfig;
    use settler::domain::ports::OrderStore;
    use settler::infrastructure::in_memory::{
        InMemoryBookingStore, InMemoryOrderStore, InMemoryWalletDirectory, RecordingNotifier,
    };

    // Keep a handle on the order store so a second writer can race the engine.
    let store = InMemoryOrderStore::new();
    let engine = SettlementEngine::new(
        Box::new(store.clone()),
        Box::new(InMemoryBookingStore::new()),
        Box::new(InMemoryWalletDirectory::new()),
        Box::new(RecordingNotifier::new()),
        SettlementConfig::default(),
    );

    engine.submit_order(order("o-1", dec!(100), dec!(10))).await.unwrap();

    // Both writers load version 1; the engine commits first.
    let snapshot = engine.get_order("o-1").await.unwrap();
    engine
        .transition_order("o-1", OrderAction::RecordPayment)
        .await
        .unwrap();

    let mut stale = snapshot.clone();
    stale
        .cancel(Some("stale".to_string()), chrono::Utc::now())
        .unwrap();
    let result = store.save(stale, snapshot.version).await;
    assert!(matches!(
        result,
        Err(SettlementError::ConcurrentModification {
            expected: 1,
            found: 2,
            ..
        })
    ));

    let stored = engine.get_order("o-1").await.unwrap();
    assert_eq!(stored.status, OrderStatus::Pending);
    assert_eq!(stored.payment_status, PaymentStatus::Completed);
}
