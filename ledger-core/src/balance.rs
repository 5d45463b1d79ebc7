//! Balance snapshot of one group
//!
//! Sign convention: positive = net creditor (is owed money by the group),
//! negative = net debtor (owes money to the group).

use crate::{
    tolerance::Tolerance,
    types::{GroupId, Member, MemberId},
    Error, Result,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One member's net position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    /// Member
    pub member: Member,

    /// Signed net balance
    pub balance: Decimal,
}

/// Signed balance per member, in the group's member order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SheetRecord", into = "SheetRecord")]
pub struct BalanceSheet {
    group_id: GroupId,
    entries: Vec<MemberBalance>,
    index: HashMap<MemberId, usize>,
    total_expenses: Decimal,
}

/// Wire shape of a [`BalanceSheet`]; the lookup index is rebuilt on load
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SheetRecord {
    group_id: GroupId,
    entries: Vec<MemberBalance>,
    #[serde(default)]
    total_expenses: Decimal,
}

impl TryFrom<SheetRecord> for BalanceSheet {
    type Error = Error;

    fn try_from(record: SheetRecord) -> Result<Self> {
        if record.total_expenses < Decimal::ZERO {
            return Err(Error::InvariantViolation(format!(
                "group {} has negative total expenses {}",
                record.group_id, record.total_expenses
            )));
        }

        let mut sheet = BalanceSheet::from_positions(
            record.group_id,
            record.entries.into_iter().map(|e| (e.member, e.balance)),
        )?;
        sheet.total_expenses = record.total_expenses;
        Ok(sheet)
    }
}

impl From<BalanceSheet> for SheetRecord {
    fn from(sheet: BalanceSheet) -> Self {
        Self {
            group_id: sheet.group_id,
            entries: sheet.entries,
            total_expenses: sheet.total_expenses,
        }
    }
}

impl BalanceSheet {
    /// Every member at zero
    pub fn zeroed<'a>(
        group_id: GroupId,
        members: impl IntoIterator<Item = &'a Member>,
    ) -> Result<Self> {
        Self::from_positions(
            group_id,
            members.into_iter().map(|m| (m.clone(), Decimal::ZERO)),
        )
    }

    /// Build a sheet from externally supplied positions
    pub fn from_positions(
        group_id: GroupId,
        positions: impl IntoIterator<Item = (Member, Decimal)>,
    ) -> Result<Self> {
        let mut entries = Vec::new();
        let mut index = HashMap::new();

        for (member, balance) in positions {
            if index.insert(member.id.clone(), entries.len()).is_some() {
                return Err(Error::DuplicateMember(member.id.to_string()));
            }
            entries.push(MemberBalance { member, balance });
        }

        Ok(Self {
            group_id,
            entries,
            index,
            total_expenses: Decimal::ZERO,
        })
    }

    /// Group ID
    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    /// Balances in member order
    pub fn entries(&self) -> &[MemberBalance] {
        &self.entries
    }

    /// Iterate balances in member order
    pub fn iter(&self) -> impl Iterator<Item = &MemberBalance> {
        self.entries.iter()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No members at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check membership
    pub fn contains(&self, id: &MemberId) -> bool {
        self.index.contains_key(id)
    }

    /// Balance of a member
    pub fn get(&self, id: &MemberId) -> Option<Decimal> {
        self.index.get(id).map(|&i| self.entries[i].balance)
    }

    /// Member details by ID
    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.index.get(id).map(|&i| &self.entries[i].member)
    }

    /// Sum of all balances (zero for a consistent group)
    pub fn total(&self) -> Result<Decimal> {
        checked_sum(self.entries.iter().map(|e| e.balance))
    }

    /// Total amount spent through expenses
    pub fn total_expenses(&self) -> Decimal {
        self.total_expenses
    }

    /// All balances within tolerance of zero
    pub fn is_settled(&self, tolerance: &Tolerance) -> bool {
        self.entries.iter().all(|e| tolerance.is_settled(e.balance))
    }

    /// Apply a payment: `from` moves up by `amount`, `to` moves down.
    ///
    /// The sheet is left untouched on error.
    pub fn transfer(&mut self, from: &MemberId, to: &MemberId, amount: Decimal) -> Result<()> {
        let from_idx = self.position(from)?;
        let to_idx = self.position(to)?;

        let from_balance = self.entries[from_idx]
            .balance
            .checked_add(amount)
            .ok_or_else(|| overflow(from, amount))?;
        let to_balance = self.entries[to_idx]
            .balance
            .checked_sub(amount)
            .ok_or_else(|| overflow(to, amount))?;

        self.entries[from_idx].balance = from_balance;
        self.entries[to_idx].balance = to_balance;
        Ok(())
    }

    /// Shift one member's balance by a signed delta
    pub(crate) fn adjust(&mut self, id: &MemberId, delta: Decimal) -> Result<()> {
        let idx = self.position(id)?;
        self.entries[idx].balance = self.entries[idx]
            .balance
            .checked_add(delta)
            .ok_or_else(|| overflow(id, delta))?;
        Ok(())
    }

    pub(crate) fn record_expense_total(&mut self, amount: Decimal) -> Result<()> {
        self.total_expenses = self.total_expenses.checked_add(amount).ok_or_else(|| {
            Error::Overflow(format!(
                "group {} total expenses {} + {}",
                self.group_id, self.total_expenses, amount
            ))
        })?;
        Ok(())
    }

    fn position(&self, id: &MemberId) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| Error::MemberNotFound(id.to_string()))
    }
}

/// Sum amounts, failing instead of panicking when the total leaves the
/// Decimal range
pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Result<Decimal> {
    amounts.into_iter().try_fold(Decimal::ZERO, |total, amount| {
        total
            .checked_add(amount)
            .ok_or_else(|| Error::Overflow(format!("sum {} + {}", total, amount)))
    })
}

fn overflow(id: &MemberId, delta: Decimal) -> Error {
    Error::Overflow(format!("balance of {} shifted by {}", id, delta))
}
