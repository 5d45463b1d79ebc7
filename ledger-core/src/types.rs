//! Core types for the group ledger
//!
//! All types are designed for:
//! - Stable identity (member IDs are the join key, never display names)
//! - Exact arithmetic (Decimal for money)
//! - Immutability (expenses and settlements are never edited in place)

use crate::tolerance::Tolerance;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Member identifier (stable user ID, not the display name)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(String);

impl MemberId {
    /// Create new member ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Group identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(String);

impl GroupId {
    /// Create new group ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Group member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    /// Stable identifier
    pub id: MemberId,

    /// Display name
    pub name: String,
}

impl Member {
    /// Create new member
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: MemberId::new(id),
            name: name.into(),
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Named collection of members sharing expenses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group ID
    pub id: GroupId,

    /// Display name
    pub name: String,

    /// Members, in display order
    pub members: Vec<Member>,
}

impl Group {
    /// Create new group
    pub fn new(id: impl Into<String>, name: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            id: GroupId::new(id),
            name: name.into(),
            members,
        }
    }

    /// Look up a member by ID
    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == id)
    }
}

/// One paid amount split equally among participants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense ID (UUIDv7 for time-ordering)
    pub id: Uuid,

    /// Group this expense belongs to
    pub group_id: GroupId,

    /// What was paid for
    pub description: String,

    /// Total amount paid
    pub amount: Decimal,

    /// Member who paid
    pub payer: MemberId,

    /// Members sharing the cost, in split order
    pub participants: Vec<MemberId>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Create new expense stamped with the current time
    pub fn new(
        group_id: GroupId,
        description: impl Into<String>,
        amount: Decimal,
        payer: MemberId,
        participants: Vec<MemberId>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            group_id,
            description: description.into(),
            amount,
            payer,
            participants,
            created_at: Utc::now(),
        }
    }

    /// Each participant's share of the amount.
    ///
    /// Leftover minor units are assigned to the leading participants; see
    /// [`Tolerance::split_evenly`].
    pub fn shares(&self, tolerance: &Tolerance) -> Vec<(MemberId, Decimal)> {
        self.participants
            .iter()
            .cloned()
            .zip(tolerance.split_evenly(self.amount, self.participants.len()))
            .collect()
    }
}

/// Real-world payment from one member to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Settlement ID
    pub id: Uuid,

    /// Group this settlement belongs to
    pub group_id: GroupId,

    /// Member who paid
    pub from: MemberId,

    /// Member who received
    pub to: MemberId,

    /// Amount paid
    pub amount: Decimal,

    /// Settlement timestamp
    pub settled_at: DateTime<Utc>,

    /// How it was paid (cash, bank transfer, ...)
    #[serde(default)]
    pub payment_method: Option<String>,

    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl Settlement {
    /// Create new settlement stamped with the current time
    pub fn new(group_id: GroupId, from: MemberId, to: MemberId, amount: Decimal) -> Self {
        Self {
            id: Uuid::now_v7(),
            group_id,
            from,
            to,
            amount,
            settled_at: Utc::now(),
            payment_method: None,
            notes: None,
        }
    }
}

/// Identifies one state of a group's history.
///
/// Two invocations with equal versions see the same inputs, so callers that
/// cache balance sheets key them by this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerVersion {
    /// Group ID
    pub group_id: GroupId,

    /// Latest expense timestamp
    pub last_expense_at: Option<DateTime<Utc>>,

    /// Latest settlement timestamp
    pub last_settlement_at: Option<DateTime<Utc>>,

    /// Number of expenses (changes when a ledger is cleared)
    pub expense_count: usize,

    /// Number of settlements
    pub settlement_count: usize,
}

impl LedgerVersion {
    /// Compute the version of a group's history
    pub fn of(group_id: &GroupId, expenses: &[Expense], settlements: &[Settlement]) -> Self {
        Self {
            group_id: group_id.clone(),
            last_expense_at: expenses.iter().map(|e| e.created_at).max(),
            last_settlement_at: settlements.iter().map(|s| s.settled_at).max(),
            expense_count: expenses.len(),
            settlement_count: settlements.len(),
        }
    }
}
