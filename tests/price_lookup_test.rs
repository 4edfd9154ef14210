use chrono::NaiveDate;
use std::sync::Arc;
use tempfile::TempDir;
use tradebook::db::init_db;
use tradebook::prices::{resolve_marks, MockPrices, PriceSource, StoredPrices};
use tradebook::{Decimal, Repository, Symbol};

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn date(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[tokio::test]
async fn test_mock_prices_resolve_known_symbols_only() {
    let prices = MockPrices::new()
        .with_close("SPY", d("450"))
        .with_close("QQQ", d("380"));

    let marks = resolve_marks(
        &prices,
        &["SPY".to_string(), "QQQ".to_string(), "IWM".to_string()],
        None,
    )
    .await
    .unwrap();

    assert_eq!(marks.get("SPY"), Some(&d("450")));
    assert_eq!(marks.get("QQQ"), Some(&d("380")));
    assert_eq!(marks.get("IWM"), None);
}

#[tokio::test]
async fn test_stored_prices_return_latest_close_at_or_before_date() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("test.db").to_string_lossy().to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let symbol = Symbol::new("SPY");
    repo.upsert_price(&symbol, date(2026, 1, 5), d("450"))
        .await
        .unwrap();
    repo.upsert_price(&symbol, date(2026, 1, 7), d("455"))
        .await
        .unwrap();

    let source = StoredPrices::new(repo.clone());

    // Latest overall.
    let close = source.latest_close(&symbol, None).await.unwrap();
    assert_eq!(close, Some(d("455")));

    // At-or-before an intermediate date.
    let close = source
        .latest_close(&symbol, Some(date(2026, 1, 6)))
        .await
        .unwrap();
    assert_eq!(close, Some(d("450")));

    // Before any history.
    let close = source
        .latest_close(&symbol, Some(date(2026, 1, 1)))
        .await
        .unwrap();
    assert_eq!(close, None);

    // Overwriting a day replaces the close.
    repo.upsert_price(&symbol, date(2026, 1, 7), d("456"))
        .await
        .unwrap();
    let close = source.latest_close(&symbol, None).await.unwrap();
    assert_eq!(close, Some(d("456")));

    // Unknown symbol has no price.
    let close = source
        .latest_close(&Symbol::new("IWM"), None)
        .await
        .unwrap();
    assert_eq!(close, None);
}
