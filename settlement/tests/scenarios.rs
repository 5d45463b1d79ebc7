//! End-to-end group scenarios: history in, balances and transfers out

use ledger_core::{Expense, Group, GroupId, Member, MemberId, Settlement, Tolerance};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use settlement::{Config, GroupSettlement, MatchOrder, SettlementEngine};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn id(s: &str) -> MemberId {
    MemberId::new(s)
}

fn abc() -> Group {
    Group::new(
        "trip",
        "Weekend trip",
        vec![
            Member::new("A", "Asha"),
            Member::new("B", "Bilal"),
            Member::new("C", "Chen"),
        ],
    )
}

fn expense(amount: Decimal, payer: &str, participants: &[&str]) -> Expense {
    Expense::new(
        GroupId::new("trip"),
        "shared cost",
        amount,
        id(payer),
        participants.iter().map(|p| id(p)).collect(),
    )
}

fn settle(from: &str, to: &str, amount: Decimal) -> Settlement {
    Settlement::new(GroupId::new("trip"), id(from), id(to), amount)
}

fn transfers(result: &GroupSettlement) -> Vec<(&str, &str, Decimal)> {
    result
        .plan
        .transfers
        .iter()
        .map(|t| (t.from.id.as_str(), t.to.id.as_str(), t.amount))
        .collect()
}

fn engine() -> SettlementEngine {
    init_tracing();
    SettlementEngine::new(Config::default())
}

#[test]
fn scenario_a_single_shared_expense() {
    let result = engine()
        .settle_group(&abc(), &[expense(dec!(300), "A", &["A", "B", "C"])], &[])
        .unwrap();

    assert_eq!(result.balances.get(&id("A")), Some(dec!(200)));
    assert_eq!(result.balances.get(&id("B")), Some(dec!(-100)));
    assert_eq!(result.balances.get(&id("C")), Some(dec!(-100)));

    assert_eq!(
        transfers(&result),
        vec![("B", "A", dec!(100)), ("C", "A", dec!(100))]
    );
    assert_eq!(result.plan.transfers[0].to.name, "Asha");
}

#[test]
fn scenario_b_after_partial_settlement() {
    let result = engine()
        .settle_group(
            &abc(),
            &[expense(dec!(300), "A", &["A", "B", "C"])],
            &[settle("B", "A", dec!(100))],
        )
        .unwrap();

    assert_eq!(result.balances.get(&id("A")), Some(dec!(100)));
    assert_eq!(result.balances.get(&id("B")), Some(dec!(0)));
    assert_eq!(result.balances.get(&id("C")), Some(dec!(-100)));

    assert_eq!(transfers(&result), vec![("C", "A", dec!(100))]);
}

#[test]
fn scenario_c_uneven_three_way_split() {
    let tolerance = Tolerance::default();
    let hundred = expense(dec!(100), "A", &["A", "B", "C"]);

    let shares: Vec<Decimal> = hundred.shares(&tolerance).into_iter().map(|(_, s)| s).collect();
    let max = shares.iter().max().copied().unwrap();
    let min = shares.iter().min().copied().unwrap();
    assert!(max - min <= tolerance.minor_unit());
    assert_eq!(shares.iter().sum::<Decimal>(), dec!(100));

    let result = engine().settle_group(&abc(), &[hundred], &[]).unwrap();

    assert_eq!(result.balances.total().unwrap(), Decimal::ZERO);
    assert_eq!(result.balances.get(&id("A")), Some(dec!(66.66)));
    assert_eq!(result.balances.get(&id("B")), Some(dec!(-33.33)));
    assert_eq!(result.balances.get(&id("C")), Some(dec!(-33.33)));

    let after = result.plan.apply_to(&result.balances).unwrap();
    assert!(after.is_settled(&tolerance));
}

#[test]
fn settling_the_plan_closes_the_group() {
    let engine = engine();
    let group = abc();
    let expenses = vec![
        expense(dec!(120.50), "A", &["A", "B", "C"]),
        expense(dec!(45), "B", &["B", "C"]),
        expense(dec!(9.99), "C", &["A"]),
    ];

    let first = engine.settle_group(&group, &expenses, &[]).unwrap();
    assert!(!first.plan.is_empty());

    // Record every suggested transfer as a real settlement
    let settlements: Vec<Settlement> = first
        .plan
        .transfers
        .iter()
        .map(|t| settle(t.from.id.as_str(), t.to.id.as_str(), t.amount))
        .collect();

    let second = engine.settle_group(&group, &expenses, &settlements).unwrap();
    assert!(second.balances.is_settled(&engine.config().ledger.tolerance));
    assert!(second.plan.is_empty());
    assert_ne!(first.version, second.version);
}

#[test]
fn empty_and_single_member_groups() {
    let engine = engine();

    let solo = Group::new("solo", "Just me", vec![Member::new("A", "Asha")]);
    let own_lunch = Expense::new(GroupId::new("solo"), "lunch", dec!(12), id("A"), vec![id("A")]);
    let result = engine.settle_group(&solo, &[own_lunch], &[]).unwrap();
    assert_eq!(result.balances.get(&id("A")), Some(Decimal::ZERO));
    assert!(result.plan.is_empty());

    let quiet = engine.settle_group(&abc(), &[], &[]).unwrap();
    assert!(quiet.plan.is_empty());
    assert!(quiet.plan.is_complete());
}

#[test]
fn over_settlement_turns_debtor_into_creditor() {
    let result = engine()
        .settle_group(
            &abc(),
            &[expense(dec!(300), "A", &["A", "B", "C"])],
            &[settle("B", "A", dec!(130))],
        )
        .unwrap();

    assert_eq!(result.balances.get(&id("B")), Some(dec!(30)));
    assert_eq!(result.balances.get(&id("A")), Some(dec!(70)));
    assert_eq!(
        transfers(&result),
        vec![("C", "A", dec!(70)), ("C", "B", dec!(30))]
    );
}

#[test]
fn member_views_come_from_one_plan() {
    let result = engine()
        .settle_group(
            &abc(),
            &[
                expense(dec!(300), "A", &["A", "B", "C"]),
                expense(dec!(60), "B", &["A", "B", "C"]),
            ],
            &[],
        )
        .unwrap();

    // A: +200 - 20 = +180, B: -100 + 40 = -60, C: -120
    let a = result.plan.position_of(&id("A")).unwrap();
    assert_eq!(a.owed, dec!(180));
    assert_eq!(a.net, result.balances.get(&id("A")).unwrap());

    let c = result.plan.position_of(&id("C")).unwrap();
    assert_eq!(c.owing, dec!(120));
    assert_eq!(c.net, result.balances.get(&id("C")).unwrap());

    assert_eq!(result.plan.involving(&id("B")).count(), 1);
}

#[test]
fn match_order_comes_from_config() {
    let mut config = Config::default();
    config.netting.order = MatchOrder::LargestFirst;
    let engine = SettlementEngine::new(config);

    let result = engine
        .settle_group(
            &abc(),
            &[
                expense(dec!(30), "A", &["B"]),
                expense(dec!(90), "A", &["C"]),
            ],
            &[],
        )
        .unwrap();

    assert_eq!(
        transfers(&result),
        vec![("C", "A", dec!(90)), ("B", "A", dec!(30))]
    );
}

#[test]
fn group_settlement_serializes() {
    let result = engine()
        .settle_group(&abc(), &[expense(dec!(300), "A", &["A", "B", "C"])], &[])
        .unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let restored: GroupSettlement = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, result);
}
