use std::collections::HashMap;
use tradebook::engine::{process_fifo_grouped, review_plan, Verdict};
use tradebook::{Decimal, Direction, Position, Strategy, Symbol, TimeMs, Trade, TradePlan};

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn planned_position(entry: &str, target: &str, qty: i64) -> Position {
    Position::new(
        Symbol::new("NVDA"),
        Strategy::StockLong,
        TradePlan {
            entry_price: d(entry),
            quantity: qty,
            target_price: d(target),
            stop_price: d("0"),
            thesis: "earnings run-up".to_string(),
        },
        TimeMs::new(0),
    )
}

fn execute(position: &mut Position, direction: Direction, qty: i64, px: &str, at: i64) {
    let trade = Trade::new(
        position.id,
        direction,
        qty,
        d(px),
        TimeMs::new(at),
        position.symbol.clone(),
    );
    position.append_trade(trade).unwrap();
}

fn review(position: &Position) -> tradebook::PlanReview {
    let report = process_fifo_grouped(position.trades(), &HashMap::new());
    review_plan(position, &report, Decimal::cent())
}

#[test]
fn test_beat_the_plan_on_entry_exit_and_profit() {
    let mut position = planned_position("500", "550", 50);
    execute(&mut position, Direction::Buy, 50, "495", 1);
    execute(&mut position, Direction::Sell, 50, "560", 2);

    let review = review(&position);

    assert_eq!(review.entry.planned, d("500"));
    assert_eq!(review.entry.actual, d("495"));
    assert_eq!(review.entry.delta, d("-5"));
    assert_eq!(review.entry.verdict, Verdict::Better);

    assert_eq!(review.exit.delta, d("10"));
    assert_eq!(review.exit.verdict, Verdict::Better);

    assert_eq!(review.profit.target_profit, d("2500"));
    assert_eq!(review.profit.actual_profit, d("3250"));
    assert_eq!(review.profit.delta, d("750"));
    assert_eq!(review.profit.verdict, Verdict::Better);
}

#[test]
fn test_missed_the_plan_on_both_sides() {
    let mut position = planned_position("100", "110", 10);
    execute(&mut position, Direction::Buy, 10, "102", 1);
    execute(&mut position, Direction::Sell, 10, "107", 2);

    let review = review(&position);
    assert_eq!(review.entry.verdict, Verdict::Worse);
    assert_eq!(review.exit.verdict, Verdict::Worse);
    // realized 50 vs target 100
    assert_eq!(review.profit.delta, d("-50"));
    assert_eq!(review.profit.verdict, Verdict::Worse);
}

#[test]
fn test_on_target_inside_the_cent_tolerance() {
    let mut position = planned_position("100", "110", 10);
    execute(&mut position, Direction::Buy, 10, "100.005", 1);
    execute(&mut position, Direction::Sell, 10, "109.995", 2);

    let review = review(&position);
    assert_eq!(review.entry.verdict, Verdict::OnTarget);
    assert_eq!(review.exit.verdict, Verdict::OnTarget);
    assert_eq!(review.profit.verdict, Verdict::OnTarget);
}

#[test]
fn test_scaled_entries_use_volume_weighted_actuals() {
    let mut position = planned_position("100", "120", 30);
    execute(&mut position, Direction::Buy, 10, "98", 1);
    execute(&mut position, Direction::Buy, 20, "101", 2);
    execute(&mut position, Direction::Sell, 30, "121", 3);

    let review = review(&position);
    // (98*10 + 101*20) / 30 = 100
    assert_eq!(review.entry.actual, d("100"));
    assert_eq!(review.entry.verdict, Verdict::OnTarget);
    assert_eq!(review.exit.verdict, Verdict::Better);
}

#[test]
fn test_zero_profit_plan_suppresses_percentage() {
    let mut position = planned_position("100", "100", 10);
    execute(&mut position, Direction::Buy, 10, "99", 1);
    execute(&mut position, Direction::Sell, 10, "101", 2);

    let review = review(&position);
    assert_eq!(review.profit.target_profit, Decimal::zero());
    assert_eq!(review.profit.delta_pct, None);
    assert_eq!(review.profit.verdict, Verdict::Better);
    assert_eq!(review.entry.delta_pct, Some(d("-1")));
}
