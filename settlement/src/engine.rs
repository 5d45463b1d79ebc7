//! Main settlement engine
//!
//! Orchestrates balance aggregation and netting for one group at a time.
//! Every consumer (dashboard totals, group detail views) goes through this
//! type so balances are derived once, with one sign convention.

use crate::{
    config::Config,
    netting::NettingEngine,
    types::SettlementPlan,
    Result,
};
use ledger_core::{
    BalanceAggregator, BalanceSheet, Expense, Group, LedgerVersion, MemberId, MemberOverview,
    Settlement,
};
use serde::{Deserialize, Serialize};

/// Balances and suggested payments for one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSettlement {
    /// History version the result was computed from
    pub version: LedgerVersion,

    /// Net balance per member
    pub balances: BalanceSheet,

    /// Suggested payments
    pub plan: SettlementPlan,
}

/// Settlement engine
#[derive(Debug, Clone)]
pub struct SettlementEngine {
    /// Balance aggregator
    aggregator: BalanceAggregator,

    /// Netting engine
    netting: NettingEngine,

    /// Configuration
    config: Config,
}

impl SettlementEngine {
    /// Create new settlement engine
    pub fn new(config: Config) -> Self {
        let aggregator = BalanceAggregator::new(&config.ledger);
        let netting = NettingEngine::from_config(&config);

        Self {
            aggregator,
            netting,
            config,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Net balance per member
    pub fn balances(
        &self,
        group: &Group,
        expenses: &[Expense],
        settlements: &[Settlement],
    ) -> Result<BalanceSheet> {
        Ok(self.aggregator.aggregate(group, expenses, settlements)?)
    }

    /// Suggested payments for a snapshot
    pub fn plan(&self, sheet: &BalanceSheet) -> Result<SettlementPlan> {
        self.netting.compute_plan(sheet)
    }

    /// Aggregate a group's history and plan its settlement.
    ///
    /// `expenses` and `settlements` must be read at the same moment; mixing
    /// snapshots can break the zero-sum invariant.
    pub fn settle_group(
        &self,
        group: &Group,
        expenses: &[Expense],
        settlements: &[Settlement],
    ) -> Result<GroupSettlement> {
        let version = LedgerVersion::of(&group.id, expenses, settlements);
        let balances = self.balances(group, expenses, settlements)?;
        let plan = self.plan(&balances)?;

        tracing::info!(
            "Group {} settled: {} members, {} transfers",
            group.id,
            balances.len(),
            plan.len()
        );

        Ok(GroupSettlement {
            version,
            balances,
            plan,
        })
    }

    /// Dashboard totals for one member across groups
    pub fn overview(
        &self,
        member: &MemberId,
        groups: &[GroupSettlement],
    ) -> Result<MemberOverview> {
        Ok(MemberOverview::collect(
            member,
            groups.iter().map(|g| &g.balances),
            &self.config.ledger.tolerance,
        )?)
    }
}
