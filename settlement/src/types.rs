//! Core types for the settlement engine

use ledger_core::{checked_sum, BalanceSheet, GroupId, Member, MemberBalance, MemberId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Suggested payment from a debtor to a creditor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Debtor (pays)
    pub from: Member,

    /// Creditor (receives)
    pub to: Member,

    /// Amount to pay
    pub amount: Decimal,
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.from.name, self.to.name, self.amount)
    }
}

/// Order in which debtors and creditors are matched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchOrder {
    /// Balance sheet order (the group's member order)
    #[default]
    Input,
    /// Lexicographic by member ID
    MemberId,
    /// Largest magnitude first, ties in balance sheet order
    LargestFirst,
}

impl MatchOrder {
    /// Config/env spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOrder::Input => "input",
            MatchOrder::MemberId => "member-id",
            MatchOrder::LargestFirst => "largest-first",
        }
    }
}

impl FromStr for MatchOrder {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "input" => Ok(MatchOrder::Input),
            "member-id" => Ok(MatchOrder::MemberId),
            "largest-first" => Ok(MatchOrder::LargestFirst),
            other => Err(crate::Error::Config(format!("Unknown match order: {}", other))),
        }
    }
}

impl fmt::Display for MatchOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered list of transfers that zeroes a group's balances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPlan {
    /// Group ID
    pub group_id: GroupId,

    /// Transfers in emission order
    pub transfers: Vec<Transfer>,

    /// Sum of the input snapshot (zero for a consistent group)
    pub residual: Decimal,

    /// Members still holding a balance after the pass
    pub unsettled: Vec<MemberBalance>,
}

impl SettlementPlan {
    /// No transfers needed
    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Number of transfers
    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    /// Executing the plan settles every member
    pub fn is_complete(&self) -> bool {
        self.unsettled.is_empty()
    }

    /// Total money moved by the plan
    pub fn total_amount(&self) -> crate::Result<Decimal> {
        Ok(checked_sum(self.transfers.iter().map(|t| t.amount))?)
    }

    /// Transfers a member pays or receives
    pub fn involving<'a>(&'a self, member: &'a MemberId) -> impl Iterator<Item = &'a Transfer> + 'a {
        self.transfers
            .iter()
            .filter(move |t| &t.from.id == member || &t.to.id == member)
    }

    /// What a member receives and pays under this plan
    pub fn position_of(&self, member: &MemberId) -> crate::Result<MemberPosition> {
        let owed = checked_sum(
            self.transfers
                .iter()
                .filter(|t| &t.to.id == member)
                .map(|t| t.amount),
        )?;
        let owing = checked_sum(
            self.transfers
                .iter()
                .filter(|t| &t.from.id == member)
                .map(|t| t.amount),
        )?;

        Ok(MemberPosition {
            member_id: member.clone(),
            owed,
            owing,
            net: owed - owing,
        })
    }

    /// Summary counts
    pub fn stats(&self) -> crate::Result<PlanStats> {
        let debtors: BTreeSet<&MemberId> = self.transfers.iter().map(|t| &t.from.id).collect();
        let creditors: BTreeSet<&MemberId> = self.transfers.iter().map(|t| &t.to.id).collect();

        Ok(PlanStats {
            member_count: debtors.union(&creditors).count(),
            debtor_count: debtors.len(),
            creditor_count: creditors.len(),
            transfer_count: self.transfers.len(),
            total_amount: self.total_amount()?,
        })
    }

    /// Balances after every transfer is executed (debtor += amount, creditor -= amount)
    pub fn apply_to(&self, sheet: &BalanceSheet) -> crate::Result<BalanceSheet> {
        let mut after = sheet.clone();
        for transfer in &self.transfers {
            after.transfer(&transfer.from.id, &transfer.to.id, transfer.amount)?;
        }
        Ok(after)
    }
}

/// A member's side of a settlement plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPosition {
    /// Member ID
    pub member_id: MemberId,

    /// Amount the member receives
    pub owed: Decimal,

    /// Amount the member pays
    pub owing: Decimal,

    /// owed - owing
    pub net: Decimal,
}

/// Settlement plan statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStats {
    /// Members paying or receiving
    pub member_count: usize,

    /// Members paying
    pub debtor_count: usize,

    /// Members receiving
    pub creditor_count: usize,

    /// Number of transfers
    pub transfer_count: usize,

    /// Total amount transferred
    pub total_amount: Decimal,
}
