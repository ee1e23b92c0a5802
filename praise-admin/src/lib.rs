//! Praise Admin - administrative layer over the quantification engine
//!
//! Wraps the pure engine with what a running service needs:
//!
//! - **Ledger**: async storage seam for periods, praise and the quantifier pool
//! - **Locking**: one writer per period for every read-compute-write cycle
//! - **Audit**: bounded trail of who did what to which period
//! - **Service**: one method per administrative endpoint
//!
//! # Architecture
//!
//! ```text
//! endpoint ──► QuantificationService ──► PeriodLocks::lock(period)
//!                     │
//!                     ├──► PraiseLedger (load snapshot)
//!                     ├──► quantification engine
//!                     ├──► PraiseLedger (save result)
//!                     └──► AuditLog
//! ```

pub mod audit;
pub mod config;
pub mod dto;
pub mod error;
pub mod ledger;
pub mod locks;
pub mod service;

// Re-export main types
pub use audit::{AuditAction, AuditEntry, AuditLog, AuditOutcome, AuditStats};
pub use config::{AdminConfig, AuditConfig};
pub use dto::*;
pub use error::{AdminError, Result};
pub use ledger::{InMemoryLedger, LedgerError, PraiseLedger};
pub use locks::PeriodLocks;
pub use service::QuantificationService;
