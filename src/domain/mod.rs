//! Domain layer: money, fees, allocation, and the order and booking
//! lifecycles, plus the ports the application layer drives them through.
//!
//! Everything here is pure and synchronous except the port traits. Transition
//! methods take the clock as an argument so the rules stay deterministic.

pub mod allocation;
pub mod booking;
pub mod fees;
pub mod funding;
pub mod money;
pub mod order;
pub mod ports;
