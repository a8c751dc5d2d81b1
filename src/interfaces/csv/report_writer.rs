use crate::domain::booking::Booking;
use crate::domain::order::Order;
use crate::error::Result;
use std::io::Write;

/// Writes the final state of all entities as CSV.
///
/// Orders come first, then bookings, each sorted by id so the report is
/// deterministic. Booking rows leave the order-only columns empty. Totals are
/// printed with two decimal places.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(out),
        }
    }

    pub fn write_report(
        &mut self,
        mut orders: Vec<Order>,
        mut bookings: Vec<Booking>,
    ) -> Result<()> {
        self.writer
            .write_record(["kind", "id", "status", "fulfillment", "payment", "total"])?;

        orders.sort_by(|a, b| a.id.cmp(&b.id));
        for order in &orders {
            self.writer.write_record([
                "order",
                &order.id,
                &order.status.to_string(),
                &order.fulfillment_status.to_string(),
                &order.payment_status.to_string(),
                &format!("{:.2}", order.totals.total.value()),
            ])?;
        }

        bookings.sort_by(|a, b| a.id.cmp(&b.id));
        for booking in &bookings {
            self.writer.write_record([
                "booking",
                &booking.id,
                &booking.status.to_string(),
                "",
                "",
                &format!("{:.2}", booking.price.value()),
            ])?;
        }

        self.writer.flush()?;
        Ok(())
    }
}
