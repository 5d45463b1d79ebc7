//! Greedy bipartite netting
//!
//! Turns a balance snapshot into payer → payee transfers.
//!
//! # Algorithm
//!
//! 1. Split members into debtors (balance ≤ −ε) and creditors (balance ≥ ε);
//!    everyone else is already settled
//! 2. Order both sides by the configured [`MatchOrder`]
//! 3. Walk debtors; each pays creditors in order, `min(debt, credit)` at a
//!    time, until the debt is below ε
//!
//! # Example
//!
//! ```text
//! Balances:
//!   A: +200 (creditor)
//!   B: -100 (debtor)
//!   C: -100 (debtor)
//!
//! Transfers:
//!   B pays A: 100
//!   C pays A: 100
//! ```
//!
//! The pass always settles a balanced snapshot completely. It does not
//! search for the fewest possible transfers: with D debtors and C creditors
//! it emits at most D + C − 1.

use crate::{
    config::Config,
    types::{MatchOrder, SettlementPlan, Transfer},
    Error, Result,
};
use ledger_core::{BalanceSheet, Member, MemberBalance, Tolerance};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

/// Netting engine
#[derive(Debug, Clone)]
pub struct NettingEngine {
    /// Settlement threshold
    tolerance: Tolerance,

    /// Matching order
    order: MatchOrder,

    /// Refuse snapshots that do not sum to zero
    reject_unbalanced: bool,
}

impl NettingEngine {
    /// Create new netting engine
    pub fn new(tolerance: Tolerance, order: MatchOrder, reject_unbalanced: bool) -> Self {
        Self {
            tolerance,
            order,
            reject_unbalanced,
        }
    }

    /// Create netting engine from configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.ledger.tolerance,
            config.netting.order,
            config.netting.reject_unbalanced,
        )
    }

    /// Matching order in use
    pub fn order(&self) -> MatchOrder {
        self.order
    }

    /// Compute the settlement plan for a snapshot
    pub fn compute_plan(&self, sheet: &BalanceSheet) -> Result<SettlementPlan> {
        let residual = sheet.total()?;
        if !self.tolerance.is_settled(residual) {
            if self.reject_unbalanced {
                return Err(Error::Unbalanced { residual });
            }
            warn!(
                "Group {} snapshot sums to {}; plan will leave residual balances",
                sheet.group_id(),
                residual
            );
        }

        // Step 1: Separate debtors and creditors (magnitudes)
        let mut debtors: Vec<(&Member, Decimal)> = sheet
            .iter()
            .filter(|e| self.tolerance.is_debtor(e.balance))
            .map(|e| (&e.member, e.balance.abs()))
            .collect();

        let mut creditors: Vec<(&Member, Decimal)> = sheet
            .iter()
            .filter(|e| self.tolerance.is_creditor(e.balance))
            .map(|e| (&e.member, e.balance))
            .collect();

        info!(
            "Netting group {}: {} debtors, {} creditors, order {}",
            sheet.group_id(),
            debtors.len(),
            creditors.len(),
            self.order
        );

        // Step 2: Deterministic ordering
        self.sort(&mut debtors);
        self.sort(&mut creditors);

        // Step 3: Greedy matching
        let transfers = self.match_positions(&mut debtors, &mut creditors);

        // Step 4: Whatever is left signals an inconsistent snapshot
        let unsettled: Vec<MemberBalance> = debtors
            .iter()
            .filter(|(_, debt)| !self.tolerance.is_settled(*debt))
            .map(|(member, debt)| MemberBalance {
                member: (*member).clone(),
                balance: -*debt,
            })
            .chain(
                creditors
                    .iter()
                    .filter(|(_, credit)| !self.tolerance.is_settled(*credit))
                    .map(|(member, credit)| MemberBalance {
                        member: (*member).clone(),
                        balance: *credit,
                    }),
            )
            .collect();

        if !unsettled.is_empty() {
            warn!(
                "Group {}: {} members left unsettled after netting",
                sheet.group_id(),
                unsettled.len()
            );
        }

        let plan = SettlementPlan {
            group_id: sheet.group_id().clone(),
            transfers,
            residual,
            unsettled,
        };

        info!(
            "Settlement plan for group {}: {} transfers",
            sheet.group_id(),
            plan.len()
        );

        Ok(plan)
    }

    /// Order one side of the match. Sorts are stable, so ties keep sheet order.
    fn sort(&self, positions: &mut [(&Member, Decimal)]) {
        match self.order {
            MatchOrder::Input => {}
            MatchOrder::MemberId => positions.sort_by(|a, b| a.0.id.cmp(&b.0.id)),
            MatchOrder::LargestFirst => positions.sort_by(|a, b| b.1.cmp(&a.1)),
        }
    }

    /// Pair debtors with creditors, decrementing remaining magnitudes in place
    fn match_positions(
        &self,
        debtors: &mut [(&Member, Decimal)],
        creditors: &mut [(&Member, Decimal)],
    ) -> Vec<Transfer> {
        let mut transfers = Vec::new();

        for (debtor, debt) in debtors.iter_mut() {
            for (creditor, credit) in creditors.iter_mut() {
                if self.tolerance.is_settled(*debt) {
                    break;
                }
                if self.tolerance.is_settled(*credit) {
                    continue;
                }

                let amount = (*debt).min(*credit);
                debug!("{} pays {} {}", debtor.id, creditor.id, amount);

                transfers.push(Transfer {
                    from: (*debtor).clone(),
                    to: (*creditor).clone(),
                    amount,
                });

                *debt -= amount;
                *credit -= amount;
            }
        }

        transfers
    }
}
