//! Data models for the TradeFlow application core.
//!
//! Record structs mirror the hosted backend's column names exactly, including
//! the embedded join rows returned by the fixed read queries.

mod client;
mod communication;
mod invoice;
mod job;
mod snapshot;

pub use client::*;
pub use communication::*;
pub use invoice::*;
pub use job::*;
pub use snapshot::*;
