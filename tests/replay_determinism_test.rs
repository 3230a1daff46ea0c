//! End-to-end determinism: the same tick sequence from a fresh strategy
//! must yield a byte-identical result log, whichever path delivers it.

use bookskew::config::StrategyConfig;
use bookskew::domain::{Decimal, RawMbp1};
use bookskew::feed::MockTickSource;
use bookskew::strategy::Strategy;
use chrono::NaiveDate;
use futures::stream;

fn es_config() -> StrategyConfig {
    StrategyConfig::new(
        0.1,
        Decimal::from_str_exact("50").unwrap(),
        Decimal::from_str_exact("0.39").unwrap(),
        Decimal::from_str_exact("0.05").unwrap(),
        10,
    )
    .unwrap()
}

fn day_ns(date: &str) -> i64 {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
        .timestamp_nanos_opt()
        .unwrap()
}

/// A mixed sequence: trends, reversals, balanced books, and skips.
fn fixture_rows() -> Vec<RawMbp1> {
    let base = day_ns("2023-08-25");
    let mut rows = Vec::new();
    for i in 0..120i64 {
        let (bid_sz, ask_sz) = match i % 7 {
            0 | 1 => (400, 20),
            2 => (20, 400),
            3 => (33, 33),
            4 => (0, 50),
            5 => (75, 15),
            _ => (15, 75),
        };
        rows.push(RawMbp1 {
            ts_recv: base + i * 1_000_000,
            bid_px: 4_500_000_000_000 + i * 250_000_000,
            ask_px: 4_500_250_000_000 + i * 250_000_000,
            bid_sz,
            ask_sz,
        });
    }
    rows
}

#[tokio::test]
async fn replay_from_fresh_state_is_identical() {
    let source = MockTickSource::new().with_ticks(fixture_rows());
    let date = NaiveDate::parse_from_str("2023-08-25", "%Y-%m-%d").unwrap();

    let mut first = Strategy::new(es_config());
    let first_summary = first
        .run_historical(&source, "ES.c.0", date, date)
        .await
        .unwrap();

    let mut second = Strategy::new(es_config());
    let second_summary = second
        .run_historical(&source, "ES.c.0", date, date)
        .await
        .unwrap();

    assert_eq!(first_summary, second_summary);
    assert_eq!(first.ledger().results(), second.ledger().results());
    assert!(first_summary.ticks_skipped > 0, "fixture must exercise skips");
    assert!(first_summary.trade_count > 0, "fixture must exercise trades");
}

#[tokio::test]
async fn live_stream_and_historical_replay_agree() {
    // Both paths share one normalization step, so the same rows delivered
    // either way must produce the same result log.
    let rows = fixture_rows();
    let source = MockTickSource::new().with_ticks(rows.clone());
    let date = NaiveDate::parse_from_str("2023-08-25", "%Y-%m-%d").unwrap();

    let mut historical = Strategy::new(es_config());
    historical
        .run_historical(&source, "ES.c.0", date, date)
        .await
        .unwrap();

    let mut live = Strategy::new(es_config());
    live.run_live(stream::iter(rows.into_iter().map(Ok)))
        .await
        .unwrap();

    assert_eq!(historical.ledger().results(), live.ledger().results());
}

#[tokio::test]
async fn serialized_result_log_is_deterministic() {
    let source = MockTickSource::new().with_ticks(fixture_rows());
    let date = NaiveDate::parse_from_str("2023-08-25", "%Y-%m-%d").unwrap();

    let mut render = Vec::new();
    for _ in 0..2 {
        let mut strategy = Strategy::new(es_config());
        strategy
            .run_historical(&source, "ES.c.0", date, date)
            .await
            .unwrap();
        let mut buf = Vec::new();
        bookskew::report::write_csv(strategy.ledger().results(), &mut buf).unwrap();
        render.push(buf);
    }

    assert_eq!(render[0], render[1]);
}
