//! Persistence seam for periods and praise.
//!
//! The service reads a snapshot, runs the engine and writes the result back
//! while holding the period lock. Any store that can read and write periods
//! and praise items can back it.

pub mod memory;
pub mod traits;

pub use memory::InMemoryLedger;
pub use traits::{LedgerError, PraiseLedger};
