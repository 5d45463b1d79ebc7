//! Error types for the group ledger

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Amount is zero, negative, or finer than the currency scale
    #[error("Invalid amount {amount} on record {record}: {reason}")]
    InvalidAmount {
        /// Expense or settlement ID
        record: Uuid,
        /// Offending amount
        amount: Decimal,
        /// What rule was broken
        reason: String,
    },

    /// Expense split among nobody
    #[error("Expense {0} has no participants")]
    EmptyParticipants(Uuid),

    /// Same member listed twice in one expense
    #[error("Member {member} listed twice in expense {expense}")]
    DuplicateParticipant {
        /// Expense ID
        expense: Uuid,
        /// Repeated member
        member: String,
    },

    /// Same member ID appears twice in a group or snapshot
    #[error("Duplicate member: {0}")]
    DuplicateMember(String),

    /// Record references a member outside the group
    #[error("Unknown member {member} referenced by record {record}")]
    UnknownMember {
        /// Expense or settlement ID
        record: Uuid,
        /// Member ID that was not found
        member: String,
    },

    /// Member not present in a balance sheet
    #[error("Member not found: {0}")]
    MemberNotFound(String),

    /// Record belongs to another group
    #[error("Record {record} belongs to group {found}, expected {expected}")]
    GroupMismatch {
        /// Expense or settlement ID
        record: Uuid,
        /// Group being aggregated
        expected: String,
        /// Group named on the record
        found: String,
    },

    /// Settlement paid by a member to themselves
    #[error("Settlement {0} has the same payer and payee")]
    SelfSettlement(Uuid),

    /// Amount arithmetic left the representable Decimal range
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// Invariant violation (money conservation)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
