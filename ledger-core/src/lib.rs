//! Group Ledger Core
//!
//! Aggregates a group's shared expenses and settlements into a signed net
//! balance per member.
//!
//! # Architecture
//!
//! - **Pure aggregation**: balances are derived on demand from immutable
//!   expense and settlement records; nothing is persisted here
//! - **Exact arithmetic**: every amount is a `Decimal`, shares are split in
//!   whole currency units
//! - **Stable identity**: members are joined by ID, names are for display
//!
//! # Invariants
//!
//! - Money conservation: Σ(balances) == 0 for every group
//! - Sign convention: positive = owed money, negative = owes money
//! - Deterministic: same records → same balances

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod tolerance;
pub mod balance;
pub mod ledger;
pub mod overview;
pub mod error;
pub mod config;

// Re-exports
pub use error::{Error, Result};
pub use types::{Expense, Group, GroupId, LedgerVersion, Member, MemberId, Settlement};
pub use tolerance::{Tolerance, MAX_SCALE};
pub use balance::{checked_sum, BalanceSheet, MemberBalance};
pub use ledger::{settled_between, BalanceAggregator};
pub use overview::MemberOverview;
pub use config::Config;
