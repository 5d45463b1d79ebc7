//! Balance aggregation
//!
//! Folds a group's expense and settlement history into a [`BalanceSheet`].
//!
//! # Example
//!
//! ```
//! use ledger_core::{BalanceAggregator, Config, Expense, Group, Member, MemberId};
//! use rust_decimal::Decimal;
//!
//! # fn main() -> ledger_core::Result<()> {
//! let group = Group::new("flat", "Flat 4B", vec![
//!     Member::new("a", "Asha"),
//!     Member::new("b", "Bilal"),
//! ]);
//! let rent = Expense::new(
//!     group.id.clone(),
//!     "rent",
//!     Decimal::new(1000, 0),
//!     MemberId::new("a"),
//!     vec![MemberId::new("a"), MemberId::new("b")],
//! );
//!
//! let sheet = BalanceAggregator::new(&Config::default()).aggregate(&group, &[rent], &[])?;
//! assert_eq!(sheet.get(&MemberId::new("a")), Some(Decimal::new(500, 0)));
//! assert_eq!(sheet.get(&MemberId::new("b")), Some(Decimal::new(-500, 0)));
//! # Ok(())
//! # }
//! ```

use crate::{
    balance::BalanceSheet,
    tolerance::Tolerance,
    types::{Expense, Group, GroupId, MemberId, Settlement},
    Config, Error, Result,
};
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

/// Balance aggregator
#[derive(Debug, Clone)]
pub struct BalanceAggregator {
    tolerance: Tolerance,
}

impl BalanceAggregator {
    /// Create aggregator from configuration
    pub fn new(config: &Config) -> Self {
        Self::with_tolerance(config.tolerance)
    }

    /// Create aggregator with an explicit tolerance
    pub fn with_tolerance(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    /// Tolerance in use
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Compute the balance sheet of a group.
    ///
    /// Expenses are applied before settlements; both are order-independent
    /// for the final result. Any invalid record rejects the whole call.
    pub fn aggregate(
        &self,
        group: &Group,
        expenses: &[Expense],
        settlements: &[Settlement],
    ) -> Result<BalanceSheet> {
        info!(
            "Aggregating group {}: {} members, {} expenses, {} settlements",
            group.id,
            group.members.len(),
            expenses.len(),
            settlements.len()
        );

        let mut sheet = BalanceSheet::zeroed(group.id.clone(), &group.members)?;

        for expense in expenses {
            self.apply_expense(&mut sheet, expense)?;
        }

        for settlement in settlements {
            self.apply_settlement(&mut sheet, settlement)?;
        }

        // Money conservation: every expense and settlement nets to zero
        let residual = sheet.total()?;
        if !self.tolerance.is_settled(residual) {
            return Err(Error::InvariantViolation(format!(
                "group {} balances sum to {} instead of zero",
                group.id, residual
            )));
        }

        info!(
            "Group {} aggregated: {} spent, settled = {}",
            group.id,
            sheet.total_expenses(),
            sheet.is_settled(&self.tolerance)
        );

        Ok(sheet)
    }

    /// Credit the payer with the full amount, debit each participant's share
    fn apply_expense(&self, sheet: &mut BalanceSheet, expense: &Expense) -> Result<()> {
        self.validate_expense(sheet, expense)?;

        sheet.adjust(&expense.payer, expense.amount)?;
        for (participant, share) in expense.shares(&self.tolerance) {
            sheet.adjust(&participant, -share)?;
        }
        sheet.record_expense_total(expense.amount)?;

        debug!(
            "Applied expense {} ({}): {} paid by {} split {} ways",
            expense.id,
            expense.description,
            expense.amount,
            expense.payer,
            expense.participants.len()
        );

        Ok(())
    }

    /// `from` paid `to`, reducing both outstanding amounts
    fn apply_settlement(&self, sheet: &mut BalanceSheet, settlement: &Settlement) -> Result<()> {
        self.validate_settlement(sheet, settlement)?;

        let before = sheet.get(&settlement.from).unwrap_or(Decimal::ZERO);
        sheet.transfer(&settlement.from, &settlement.to, settlement.amount)?;

        let after = sheet.get(&settlement.from).unwrap_or(Decimal::ZERO);
        if !self.tolerance.is_creditor(before) && self.tolerance.is_creditor(after) {
            debug!(
                "Settlement {} over-settles {}: balance {} -> {}",
                settlement.id, settlement.from, before, after
            );
        }

        debug!(
            "Applied settlement {}: {} paid {} {}",
            settlement.id, settlement.from, settlement.to, settlement.amount
        );

        Ok(())
    }

    fn validate_expense(&self, sheet: &BalanceSheet, expense: &Expense) -> Result<()> {
        self.validate_group(sheet, expense.id, &expense.group_id)?;
        self.validate_amount(expense.id, expense.amount)?;

        if expense.participants.is_empty() {
            return Err(Error::EmptyParticipants(expense.id));
        }

        self.validate_member(sheet, expense.id, &expense.payer)?;

        let mut seen = HashSet::with_capacity(expense.participants.len());
        for participant in &expense.participants {
            self.validate_member(sheet, expense.id, participant)?;
            if !seen.insert(participant) {
                return Err(Error::DuplicateParticipant {
                    expense: expense.id,
                    member: participant.to_string(),
                });
            }
        }

        Ok(())
    }

    fn validate_settlement(&self, sheet: &BalanceSheet, settlement: &Settlement) -> Result<()> {
        self.validate_group(sheet, settlement.id, &settlement.group_id)?;
        self.validate_amount(settlement.id, settlement.amount)?;
        self.validate_member(sheet, settlement.id, &settlement.from)?;
        self.validate_member(sheet, settlement.id, &settlement.to)?;

        if settlement.from == settlement.to {
            return Err(Error::SelfSettlement(settlement.id));
        }

        Ok(())
    }

    fn validate_group(&self, sheet: &BalanceSheet, record: Uuid, group_id: &GroupId) -> Result<()> {
        if group_id != sheet.group_id() {
            return Err(Error::GroupMismatch {
                record,
                expected: sheet.group_id().to_string(),
                found: group_id.to_string(),
            });
        }
        Ok(())
    }

    fn validate_amount(&self, record: Uuid, amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount {
                record,
                amount,
                reason: "amount must be positive".to_string(),
            });
        }

        if !self.tolerance.fits_scale(amount) {
            return Err(Error::InvalidAmount {
                record,
                amount,
                reason: format!("more than {} decimal places", self.tolerance.scale()),
            });
        }

        Ok(())
    }

    fn validate_member(&self, sheet: &BalanceSheet, record: Uuid, member: &MemberId) -> Result<()> {
        if !sheet.contains(member) {
            return Err(Error::UnknownMember {
                record,
                member: member.to_string(),
            });
        }
        Ok(())
    }
}

/// Total already paid by `from` to `to` across a settlement history
pub fn settled_between(settlements: &[Settlement], from: &MemberId, to: &MemberId) -> Decimal {
    settlements
        .iter()
        .filter(|s| &s.from == from && &s.to == to)
        .map(|s| s.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Member;
    use rust_decimal_macros::dec;

    fn group() -> Group {
        Group::new(
            "trip",
            "Goa trip",
            vec![
                Member::new("a", "Asha"),
                Member::new("b", "Bilal"),
                Member::new("c", "Chen"),
            ],
        )
    }

    fn id(s: &str) -> MemberId {
        MemberId::new(s)
    }

    fn expense(amount: Decimal, payer: &str, participants: &[&str]) -> Expense {
        Expense::new(
            GroupId::new("trip"),
            "test",
            amount,
            id(payer),
            participants.iter().map(|p| id(p)).collect(),
        )
    }

    fn settlement(from: &str, to: &str, amount: Decimal) -> Settlement {
        Settlement::new(GroupId::new("trip"), id(from), id(to), amount)
    }

    fn aggregator() -> BalanceAggregator {
        BalanceAggregator::new(&Config::default())
    }

    #[test]
    fn test_payer_among_participants() {
        let sheet = aggregator()
            .aggregate(&group(), &[expense(dec!(300), "a", &["a", "b", "c"])], &[])
            .unwrap();

        assert_eq!(sheet.get(&id("a")), Some(dec!(200)));
        assert_eq!(sheet.get(&id("b")), Some(dec!(-100)));
        assert_eq!(sheet.get(&id("c")), Some(dec!(-100)));
        assert_eq!(sheet.total_expenses(), dec!(300));
    }

    #[test]
    fn test_payer_not_participating() {
        let sheet = aggregator()
            .aggregate(&group(), &[expense(dec!(50), "a", &["b", "c"])], &[])
            .unwrap();

        assert_eq!(sheet.get(&id("a")), Some(dec!(50)));
        assert_eq!(sheet.get(&id("b")), Some(dec!(-25)));
        assert_eq!(sheet.get(&id("c")), Some(dec!(-25)));
    }

    #[test]
    fn test_settlement_reduces_both_sides() {
        let sheet = aggregator()
            .aggregate(
                &group(),
                &[expense(dec!(300), "a", &["a", "b", "c"])],
                &[settlement("b", "a", dec!(100))],
            )
            .unwrap();

        assert_eq!(sheet.get(&id("a")), Some(dec!(100)));
        assert_eq!(sheet.get(&id("b")), Some(dec!(0)));
        assert_eq!(sheet.get(&id("c")), Some(dec!(-100)));
    }

    #[test]
    fn test_over_settlement_flips_sign() {
        let sheet = aggregator()
            .aggregate(
                &group(),
                &[expense(dec!(300), "a", &["a", "b", "c"])],
                &[settlement("b", "a", dec!(150))],
            )
            .unwrap();

        assert_eq!(sheet.get(&id("b")), Some(dec!(50)));
        assert_eq!(sheet.get(&id("a")), Some(dec!(50)));
        assert_eq!(sheet.total().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_empty_history_is_all_zero() {
        let sheet = aggregator().aggregate(&group(), &[], &[]).unwrap();

        assert_eq!(sheet.len(), 3);
        assert!(sheet.iter().all(|e| e.balance.is_zero()));
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let err = aggregator()
            .aggregate(&group(), &[expense(dec!(0), "a", &["b"])], &[])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAmount { .. }));

        let err = aggregator()
            .aggregate(&group(), &[], &[settlement("b", "a", dec!(-5))])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAmount { .. }));
    }

    #[test]
    fn test_rejects_sub_cent_amount() {
        let err = aggregator()
            .aggregate(&group(), &[expense(dec!(10.005), "a", &["b"])], &[])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAmount { .. }));
    }

    #[test]
    fn test_rejects_empty_participants() {
        let bad = expense(dec!(10), "a", &[]);
        let err = aggregator().aggregate(&group(), &[bad.clone()], &[]).unwrap_err();
        assert!(matches!(err, Error::EmptyParticipants(e) if e == bad.id));
    }

    #[test]
    fn test_rejects_duplicate_participant() {
        let err = aggregator()
            .aggregate(&group(), &[expense(dec!(10), "a", &["b", "b"])], &[])
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateParticipant { member, .. } if member == "b"));
    }

    #[test]
    fn test_rejects_unknown_member() {
        let err = aggregator()
            .aggregate(&group(), &[expense(dec!(10), "zed", &["a"])], &[])
            .unwrap_err();
        assert!(matches!(err, Error::UnknownMember { member, .. } if member == "zed"));

        let err = aggregator()
            .aggregate(&group(), &[], &[settlement("a", "zed", dec!(1))])
            .unwrap_err();
        assert!(matches!(err, Error::UnknownMember { member, .. } if member == "zed"));
    }

    #[test]
    fn test_rejects_foreign_record() {
        let mut foreign = expense(dec!(10), "a", &["b"]);
        foreign.group_id = GroupId::new("other");

        let err = aggregator().aggregate(&group(), &[foreign], &[]).unwrap_err();
        assert!(matches!(err, Error::GroupMismatch { found, .. } if found == "other"));
    }

    #[test]
    fn test_rejects_self_settlement() {
        let err = aggregator()
            .aggregate(&group(), &[], &[settlement("a", "a", dec!(10))])
            .unwrap_err();
        assert!(matches!(err, Error::SelfSettlement(_)));
    }

    #[test]
    fn test_rejects_duplicate_group_member() {
        let mut group = group();
        group.members.push(Member::new("a", "Asha (work)"));

        let err = aggregator().aggregate(&group, &[], &[]).unwrap_err();
        assert!(matches!(err, Error::DuplicateMember(_)));
    }

    #[test]
    fn test_display_names_may_collide() {
        let group = Group::new(
            "trip",
            "Goa trip",
            vec![Member::new("a1", "Sam"), Member::new("a2", "Sam")],
        );
        let sheet = aggregator()
            .aggregate(
                &group,
                &[Expense::new(
                    GroupId::new("trip"),
                    "fuel",
                    dec!(40),
                    id("a1"),
                    vec![id("a1"), id("a2")],
                )],
                &[],
            )
            .unwrap();

        assert_eq!(sheet.get(&id("a1")), Some(dec!(20)));
        assert_eq!(sheet.get(&id("a2")), Some(dec!(-20)));
    }

    #[test]
    fn test_huge_history_overflows_into_error() {
        let half = (Decimal::MAX / Decimal::TWO).round_dp(0);
        let expenses: Vec<Expense> = (0..3).map(|_| expense(half, "a", &["b"])).collect();

        let err = aggregator().aggregate(&group(), &expenses, &[]).unwrap_err();
        assert!(matches!(err, Error::Overflow(_)));
    }

    #[test]
    fn test_settlement_overflow_is_an_error() {
        let half = (Decimal::MAX / Decimal::TWO).round_dp(0);

        let err = aggregator()
            .aggregate(
                &group(),
                &[expense(half, "a", &["b"])],
                &[settlement("a", "b", Decimal::MAX)],
            )
            .unwrap_err();
        assert!(matches!(err, Error::Overflow(_)));
    }

    #[test]
    fn test_settled_between() {
        let history = vec![
            settlement("b", "a", dec!(40)),
            settlement("b", "a", dec!(10.50)),
            settlement("a", "b", dec!(5)),
            settlement("c", "a", dec!(7)),
        ];

        assert_eq!(settled_between(&history, &id("b"), &id("a")), dec!(50.50));
        assert_eq!(settled_between(&history, &id("a"), &id("b")), dec!(5));
        assert_eq!(settled_between(&history, &id("a"), &id("c")), Decimal::ZERO);
    }
}
