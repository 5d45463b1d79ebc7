//! Settlement Engine
//!
//! Reduces a group's net balances to a list of suggested payments.
//!
//! # Architecture
//!
//! Each request runs two pure steps:
//!
//! 1. **Aggregation**: fold expenses and settlements into balances
//!    (`ledger-core`)
//! 2. **Netting**: match debtors with creditors greedily
//!
//! # Netting Algorithm
//!
//! Greedy bipartite matching in a fixed, configurable order:
//! - Every balanced snapshot is settled completely
//! - Identical snapshots give identical plans
//! - The number of transfers is bounded, not minimised
//!
//! # Example
//!
//! ```
//! use ledger_core::{Expense, Group, Member, MemberId};
//! use rust_decimal::Decimal;
//! use settlement::{Config, SettlementEngine};
//!
//! fn main() -> settlement::Result<()> {
//!     let engine = SettlementEngine::new(Config::default());
//!
//!     let group = Group::new("trip", "Goa trip", vec![
//!         Member::new("a", "Asha"),
//!         Member::new("b", "Bilal"),
//!         Member::new("c", "Chen"),
//!     ]);
//!     let hotel = Expense::new(
//!         group.id.clone(),
//!         "hotel",
//!         Decimal::new(300, 0),
//!         MemberId::new("a"),
//!         vec![MemberId::new("a"), MemberId::new("b"), MemberId::new("c")],
//!     );
//!
//!     let result = engine.settle_group(&group, &[hotel], &[])?;
//!     for transfer in &result.plan.transfers {
//!         println!("{}", transfer);
//!     }
//!     assert_eq!(result.plan.len(), 2);
//!
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod netting;
pub mod error;
pub mod config;
pub mod engine;

// Re-exports
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, NettingConfig};
pub use netting::NettingEngine;
pub use engine::{GroupSettlement, SettlementEngine};
