//! Cross-group member overview
//!
//! Dashboard totals for one member built from the balance sheets of every
//! group they belong to.

use crate::{
    balance::BalanceSheet,
    tolerance::Tolerance,
    types::MemberId,
    Error, Result,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a member is owed and owes across groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberOverview {
    /// Member ID
    pub member_id: MemberId,

    /// Sum of creditor balances
    pub total_owed: Decimal,

    /// Sum of debtor balances (as a positive magnitude)
    pub total_owing: Decimal,

    /// total_owed - total_owing
    pub net: Decimal,

    /// Groups the member appears in
    pub groups: usize,

    /// Groups where the member is not settled
    pub open_groups: usize,
}

impl MemberOverview {
    /// Collect totals for `member_id` over a set of sheets
    pub fn collect<'a>(
        member_id: &MemberId,
        sheets: impl IntoIterator<Item = &'a BalanceSheet>,
        tolerance: &Tolerance,
    ) -> Result<Self> {
        let mut overview = Self {
            member_id: member_id.clone(),
            total_owed: Decimal::ZERO,
            total_owing: Decimal::ZERO,
            net: Decimal::ZERO,
            groups: 0,
            open_groups: 0,
        };

        for balance in sheets.into_iter().filter_map(|s| s.get(member_id)) {
            overview.groups += 1;

            if tolerance.is_creditor(balance) {
                overview.total_owed = add(overview.total_owed, balance, member_id)?;
                overview.open_groups += 1;
            } else if tolerance.is_debtor(balance) {
                overview.total_owing = add(overview.total_owing, balance.abs(), member_id)?;
                overview.open_groups += 1;
            }
        }

        // Both totals are non-negative, so the difference always fits
        overview.net = overview.total_owed - overview.total_owing;
        Ok(overview)
    }

    /// Nothing owed either way
    pub fn is_settled(&self) -> bool {
        self.open_groups == 0
    }
}

fn add(total: Decimal, amount: Decimal, member_id: &MemberId) -> Result<Decimal> {
    total
        .checked_add(amount)
        .ok_or_else(|| Error::Overflow(format!("overview of {}: {} + {}", member_id, total, amount)))
}
