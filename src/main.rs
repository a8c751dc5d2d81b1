use chrono::{Duration, Utc};
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use settler::application::engine::{BookingAction, OrderAction, SettlementEngine};
use settler::config::SettlementConfig;
use settler::domain::booking::Booking;
use settler::domain::funding::FundingSource;
use settler::domain::money::Amount;
use settler::domain::order::{Order, OrderTotals};
use settler::error::SettlementError;
use settler::infrastructure::in_memory::{
    InMemoryBookingStore, InMemoryOrderStore, InMemoryWalletDirectory, RecordingNotifier,
};
use settler::interfaces::csv::command_reader::{CommandOp, CommandReader, CommandRecord};
use settler::interfaces::csv::report_writer::ReportWriter;
use settler::interfaces::csv::wallet_reader::WalletReader;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input settlement commands CSV file
    commands: PathBuf,

    /// Wallet seed CSV file (customer, source, kind, currency, available)
    #[arg(long)]
    wallets: Option<PathBuf>,

    /// Engine configuration JSON file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "settler=warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SettlementConfig::from_json_file(path).into_diagnostic()?,
        None => SettlementConfig::default(),
    };

    let wallets = InMemoryWalletDirectory::new();
    if let Some(path) = &cli.wallets {
        let file = File::open(path).into_diagnostic()?;
        for record in WalletReader::new(file).wallets() {
            match record {
                Ok(row) => match Amount::new(row.available) {
                    Ok(available) => {
                        wallets
                            .upsert(
                                &row.customer,
                                FundingSource {
                                    id: row.source,
                                    kind: row.kind,
                                    currency: row.currency,
                                    available,
                                },
                            )
                            .await;
                    }
                    Err(e) => warn!(source = %row.source, error = %e, "skipping wallet row"),
                },
                Err(e) => warn!(error = %e, "skipping malformed wallet row"),
            }
        }
    }

    let engine = SettlementEngine::new(
        Box::new(InMemoryOrderStore::new()),
        Box::new(InMemoryBookingStore::new()),
        Box::new(wallets.clone()),
        Box::new(RecordingNotifier::new()),
        config,
    );

    // Apply commands in feed order; a rejected command never stops the batch.
    let file = File::open(&cli.commands).into_diagnostic()?;
    for command in CommandReader::new(file).commands() {
        match command {
            Ok(record) => {
                let id = record.id.clone();
                if let Err(e) = apply_command(&engine, &wallets, record).await {
                    warn!(id = %id, error = %e, "command rejected");
                }
            }
            Err(e) => {
                warn!(error = %e, "skipping malformed command row");
            }
        }
    }

    let orders = engine.all_orders().await.into_diagnostic()?;
    let bookings = engine.all_bookings().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    writer.write_report(orders, bookings).into_diagnostic()?;

    Ok(())
}

async fn apply_command(
    engine: &SettlementEngine,
    wallets: &InMemoryWalletDirectory,
    record: CommandRecord,
) -> settler::error::Result<()> {
    match record.op {
        CommandOp::SubmitOrder => {
            let customer = require(record.customer, "customer")?;
            let amount = require(record.amount, "amount")?;
            let currency = require(record.currency, "currency")?;
            let tier = record.tier.unwrap_or_default();
            let entity = record.entity.unwrap_or_else(|| "main".to_string());

            let quote = engine.quote_fee(amount, currency, tier)?;
            let totals = OrderTotals::new(
                quote.base_amount,
                Amount::ZERO,
                Amount::ZERO,
                quote.service_fee_amount,
                Amount::ZERO,
            );
            let order = Order::new(
                record.id.clone(),
                format!("ORD-{}", record.id),
                entity,
                customer,
                currency,
                totals,
                Utc::now(),
            );
            engine.submit_order(order).await?;
        }
        CommandOp::Pay => {
            let customer = require(record.customer, "customer")?;
            let order = engine.get_order(&record.id).await?;
            let plan = engine
                .allocate_payment(
                    &customer,
                    order.totals.total,
                    order.currency,
                    record.rewards.unwrap_or(false),
                    record.source.as_deref(),
                )
                .await?;

            // Record the payment first; a rejected command must leave wallets
            // untouched. The plan's balance checks keep the debits below from
            // failing within one batch iteration.
            engine
                .transition_order(&record.id, OrderAction::RecordPayment)
                .await?;
            if let Some(rewards_id) = &plan.rewards_source_id
                && !plan.rewards_applied.is_zero()
            {
                wallets.debit(rewards_id, plan.rewards_applied).await?;
            }
            if let Some(source) = &plan.chosen_source {
                wallets.debit(&source.id, plan.source_contribution).await?;
            }
        }
        CommandOp::Confirm => {
            engine
                .transition_order(&record.id, OrderAction::Confirm)
                .await?;
        }
        CommandOp::StartProcessing => {
            engine
                .transition_order(&record.id, OrderAction::StartProcessing)
                .await?;
        }
        CommandOp::Ship => {
            engine
                .transition_order(
                    &record.id,
                    OrderAction::Ship {
                        carrier: record.carrier.unwrap_or_default(),
                        tracking_number: record.tracking.unwrap_or_default(),
                    },
                )
                .await?;
        }
        CommandOp::Deliver => {
            engine
                .transition_order(&record.id, OrderAction::MarkDelivered)
                .await?;
        }
        CommandOp::Complete => {
            engine
                .transition_order(&record.id, OrderAction::Complete)
                .await?;
        }
        CommandOp::Cancel => {
            engine
                .transition_order(
                    &record.id,
                    OrderAction::Cancel {
                        reason: record.reason,
                    },
                )
                .await?;
        }
        CommandOp::Fail => {
            engine
                .transition_order(
                    &record.id,
                    OrderAction::Fail {
                        reason: record.reason,
                    },
                )
                .await?;
        }
        CommandOp::SubmitBooking => {
            let customer = require(record.customer, "customer")?;
            let amount = require(record.amount, "amount")?;
            let currency = require(record.currency, "currency")?;
            let entity = record.entity.unwrap_or_else(|| "main".to_string());
            let now = Utc::now();

            // The feed carries no schedule column; book for the next day.
            let booking = Booking::new(
                record.id.clone(),
                format!("BKG-{}", record.id),
                entity,
                customer,
                now + Duration::days(1),
                currency,
                Amount::new(amount)?,
                now,
            );
            engine.submit_booking(booking).await?;
        }
        CommandOp::ConfirmBooking => {
            engine
                .transition_booking(&record.id, BookingAction::Confirm)
                .await?;
        }
        CommandOp::CompleteBooking => {
            engine
                .transition_booking(&record.id, BookingAction::Complete)
                .await?;
        }
        CommandOp::CancelBooking => {
            engine
                .transition_booking(
                    &record.id,
                    BookingAction::Cancel {
                        reason: record.reason,
                    },
                )
                .await?;
        }
        CommandOp::NoShow => {
            engine
                .transition_booking(&record.id, BookingAction::MarkNoShow)
                .await?;
        }
    }
    Ok(())
}

fn require<T>(value: Option<T>, field: &str) -> settler::error::Result<T> {
    value.ok_or_else(|| SettlementError::MalformedCommand(format!("missing {field} column")))
}
