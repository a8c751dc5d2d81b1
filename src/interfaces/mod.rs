//! Interface layer translating between external formats and the domain.

pub mod csv;
