//! Praise Quantification Engine
//!
//! Assigns quantifiers to a period's praise, scores each item from the
//! quantifications it collects, and swaps quantifiers mid-cycle without
//! losing submitted work:
//!
//! - **Pool sizing**: is the quantifier pool large enough for the redundancy factor
//! - **Assignment**: balanced, deterministic, all-or-nothing distribution of praise
//! - **Consensus**: one realized score per item from dismissals, duplicates and scores
//! - **Replacement**: hand pending work to a new quantifier, keep submitted work
//!
//! Every operation is a pure function over in-memory snapshots. Callers own
//! persistence and must serialize assignment, replacement and submissions
//! per period.
//!
//! # Architecture
//!
//! ```text
//! assign:   check_pool_size ──► AssignmentEngine ──► Period(QUANTIFY) + placeholders
//! submit:   apply_quantification ──► ConsensusScorer ──► item + duplicates rescored
//! replace:  replace_quantifier ──► ConsensusScorer ──► Period + changed items
//! close:    close_period ──► Period(CLOSED)
//! ```
//!
//! # Example
//!
//! ```
//! use quantification::{assign_quantifiers, Period, PraiseItem, QuantificationSettings, UserId};
//!
//! let items = vec![
//!     PraiseItem::new("alice", "bob"),
//!     PraiseItem::new("bob", "carol"),
//! ];
//! let period = Period::new("2024-q1", chrono::Utc::now()).with_participants_from(&items);
//! let settings = QuantificationSettings::default().with_redundancy(2);
//! let pool: Vec<UserId> = ["q1", "q2", "q3"].into_iter().map(UserId::from).collect();
//!
//! let outcome = assign_quantifiers(&period, &items, &pool, &settings).unwrap();
//! assert!(outcome.praise_items.iter().all(|item| item.quantifications.len() == 2));
//! ```

pub mod assignment;
pub mod consensus;
pub mod duplicate;
pub mod error;
pub mod lifecycle;
pub mod pool;
pub mod replacement;
pub mod report;
pub mod settings;
pub mod submission;
pub mod types;

// Re-export main types
pub use assignment::{assign_quantifiers, AssignmentEngine, AssignmentOutcome, QuantifierPoolEntry};
pub use consensus::{realize_score, ConsensusScorer, ScoreLookup, ScoreOutcome};
pub use duplicate::DuplicateGraph;
pub use error::{QuantificationError, Result};
pub use lifecycle::close_period;
pub use pool::{check_pool_size, PoolSizeReport};
pub use replacement::{replace_quantifier, ReplacementOutcome};
pub use report::{quantifier_progress, receiver_totals, QuantifierProgress, ReceiverTotal};
pub use settings::QuantificationSettings;
pub use submission::{apply_quantification, apply_quantifications, QuantificationInput};
pub use types::*;
