//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `SettlementEngine` which acts as the primary entry
//! point for quoting fees, planning payment allocations, and applying
//! lifecycle transitions. It owns the storage ports and awaits every save, so
//! commands against the same entity are sequentially consistent.

pub mod engine;
