use tradebook::engine::{compute_status, process_fifo, PositionStatus};
use tradebook::{Decimal, Direction, PositionId, Symbol, TimeMs, Trade};

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn trade(position: PositionId, direction: Direction, qty: i64, px: &str, at: i64) -> Trade {
    Trade::new(position, direction, qty, d(px), TimeMs::new(at), Symbol::new("NVDA"))
}

fn buy(position: PositionId, qty: i64, px: &str, at: i64) -> Trade {
    trade(position, Direction::Buy, qty, px, at)
}

fn sell(position: PositionId, qty: i64, px: &str, at: i64) -> Trade {
    trade(position, Direction::Sell, qty, px, at)
}

#[test]
fn test_round_trip_realizes_profit_and_walks_the_lifecycle() {
    let position = PositionId::generate();
    let mut trades: Vec<Trade> = Vec::new();
    assert_eq!(compute_status(&trades), PositionStatus::Planned);

    trades.push(buy(position, 100, "50", 1));
    assert_eq!(compute_status(&trades), PositionStatus::Open);

    trades.push(sell(position, 100, "55", 2));
    assert_eq!(compute_status(&trades), PositionStatus::Closed);

    let report = process_fifo(&trades, d("55"));
    assert_eq!(report.realized_pnl, d("500"));
    assert_eq!(report.open_quantity, 0);
    assert_eq!(report.unrealized_pnl, Decimal::zero());
    assert!(report.fully_closed);
}

#[test]
fn test_exit_consumes_lots_oldest_first() {
    let position = PositionId::generate();
    let trades = vec![
        buy(position, 50, "100", 1),
        buy(position, 30, "105", 2),
        buy(position, 20, "110", 3),
        sell(position, 100, "120", 4),
    ];

    let report = process_fifo(&trades, d("120"));
    // (120-100)*50 + (120-105)*30 + (120-110)*20
    assert_eq!(report.realized_pnl, d("1650"));
    assert!(report.fully_closed);

    let exit = &report.per_trade[3];
    assert_eq!(exit.consumed_lots.len(), 3);
    assert_eq!(exit.consumed_lots[0].realized_pnl, d("1000"));
    assert_eq!(exit.consumed_lots[1].realized_pnl, d("450"));
    assert_eq!(exit.consumed_lots[2].realized_pnl, d("200"));
}

#[test]
fn test_partial_exit_leaves_newest_lot_open() {
    let position = PositionId::generate();
    let trades = vec![
        buy(position, 50, "100", 1),
        buy(position, 50, "110", 2),
        sell(position, 50, "120", 3),
    ];

    let report = process_fifo(&trades, d("120"));
    assert_eq!(report.realized_pnl, d("1000"));
    assert_eq!(report.open_quantity, 50);
    assert_eq!(report.avg_open_cost, d("110"));
    assert_eq!(report.unrealized_pnl, d("500"));
    assert_eq!(report.total_pnl, d("1500"));
    assert!(!report.fully_closed);
}

#[test]
fn test_status_depends_only_on_the_multiset() {
    let position = PositionId::generate();
    let mut trades = vec![
        buy(position, 50, "100", 1),
        buy(position, 30, "105", 2),
        sell(position, 60, "120", 3),
        buy(position, 20, "110", 4),
    ];
    let status = compute_status(&trades);

    trades.reverse();
    assert_eq!(compute_status(&trades), status);
    trades.swap(1, 3);
    assert_eq!(compute_status(&trades), status);
}

#[test]
fn test_matched_quantity_conservation() {
    let position = PositionId::generate();
    let trades = vec![
        buy(position, 50, "100", 1),
        buy(position, 30, "101", 2),
        sell(position, 60, "103", 3),
        buy(position, 20, "104", 4),
        sell(position, 25, "105", 5),
    ];
    let report = process_fifo(&trades, d("104"));

    let total_bought: i64 = trades
        .iter()
        .filter(|t| t.direction == Direction::Buy)
        .map(|t| t.quantity)
        .sum();
    let total_sold: i64 = trades
        .iter()
        .filter(|t| t.direction == Direction::Sell)
        .map(|t| t.quantity)
        .sum();
    let matched: i64 = report
        .per_trade
        .iter()
        .filter(|p| p.direction == Direction::Sell)
        .map(|p| p.matched_quantity)
        .sum();

    assert_eq!(matched, total_sold);
    assert_eq!(report.open_quantity + matched, total_bought);
}

#[test]
fn test_idempotent_over_identical_input() {
    let position = PositionId::generate();
    let trades = vec![
        buy(position, 50, "100", 1),
        sell(position, 20, "103", 2),
        buy(position, 10, "99", 3),
    ];
    let first = process_fifo(&trades, d("101"));
    let second = process_fifo(&trades, d("101"));
    assert_eq!(first, second);
}

#[test]
fn test_open_quantity_monotonicity() {
    let position = PositionId::generate();
    let mut trades = vec![buy(position, 50, "100", 1), sell(position, 20, "103", 2)];
    let before = process_fifo(&trades, d("100")).open_quantity;

    trades.push(buy(position, 5, "101", 3));
    let after_buy = process_fifo(&trades, d("100")).open_quantity;
    assert!(after_buy >= before);

    trades.push(sell(position, 10, "104", 4));
    let after_sell = process_fifo(&trades, d("100")).open_quantity;
    assert!(after_sell <= after_buy);
}

#[test]
fn test_expired_worthless_exit() {
    let position = PositionId::generate();
    let trades = vec![buy(position, 5, "300", 1), sell(position, 5, "0", 2)];
    let report = process_fifo(&trades, d("0"));
    assert_eq!(report.realized_pnl, d("-1500"));
    assert!(report.fully_closed);
}
