use chrono::{DateTime, FixedOffset};
use optionchain_rs::prelude::*;
use std::cell::Cell;

struct StaticSource {
    snapshot: ChainSnapshot,
    reference_price: f64,
    fetches: Cell<u32>,
}

impl StaticSource {
    fn new(snapshot: ChainSnapshot, reference_price: f64) -> Self {
        Self {
            snapshot,
            reference_price,
            fetches: Cell::new(0),
        }
    }
}

impl ChainSource for StaticSource {
    fn fetch_chain(&self, _expiry_label: &str) -> Result<ChainSnapshot, ChainError> {
        self.fetches.set(self.fetches.get() + 1);
        Ok(self.snapshot.clone())
    }

    fn fetch_reference_price(&self) -> Result<f64, ChainError> {
        Ok(self.reference_price)
    }
}

struct FailingSource;

impl ChainSource for FailingSource {
    fn fetch_chain(&self, expiry_label: &str) -> Result<ChainSnapshot, ChainError> {
        Err(ChainError::DataUnavailable {
            message: format!("no chain for {expiry_label}"),
        })
    }

    fn fetch_reference_price(&self) -> Result<f64, ChainError> {
        Ok(1050.0)
    }
}

fn at(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap()
}

/// Monday 20 October 2025, mid-session.
fn monday() -> DateTime<FixedOffset> {
    at("2025-10-20T11:00:00+05:30")
}

fn pipeline() -> ChainPipeline {
    let config = ChainConfig::new().with_half_width(3);
    ChainPipeline::new(config, TradingCalendar::nse().unwrap()).unwrap()
}

/// Strikes 500..=1600 priced off a flat volatility around `forward`.
fn flat_snapshot(
    underlying: f64,
    forward: f64,
    vol: f64,
    expiry: &ExpiryMoment,
    now: &DateTime<FixedOffset>,
) -> ChainSnapshot {
    let t = expiry.time_to_expiry(now);
    let strikes = (5..=16)
        .map(|i| {
            let strike = i as f64 * 100.0;
            let call = Black76::price(&Black76Params::call(forward, strike, t), vol);
            let put = Black76::price(&Black76Params::put(forward, strike, t), vol);
            StrikeQuotes::new(
                strike,
                Some(OptionQuote {
                    open_interest: 1000.0,
                    volume: 50.0,
                    ..OptionQuote::with_last_price(call)
                }),
                Some(OptionQuote {
                    open_interest: 1500.0,
                    volume: 20.0,
                    ..OptionQuote::with_last_price(put)
                }),
            )
        })
        .collect();
    ChainSnapshot::new(underlying, strikes)
}

fn week_out() -> ExpiryMoment {
    pipeline().expiry_from_label("28-OCT-2025").unwrap()
}

#[test]
fn test_weekend_produces_no_rows_and_no_fetch() {
    let pipeline = pipeline();
    let saturday = at("2025-10-18T11:00:00+05:30");
    let source = StaticSource::new(flat_snapshot(1053.0, 1050.0, 1.2, &week_out(), &saturday), 1050.0);

    let outcome = pipeline.run(&saturday, &source).unwrap();
    match outcome {
        PipelineOutcome::SessionClosed(status) => {
            assert_eq!(status.to_string(), "Market closed - Saturday (Weekend)");
        }
        PipelineOutcome::Table(_) => panic!("closed market produced a table"),
    }
    assert_eq!(source.fetches.get(), 0);
}

#[test]
fn test_run_on_open_session() {
    let pipeline = pipeline();
    let now = monday();
    let expiry = pipeline.next_expiry(&now).unwrap();
    // Tuesday 21 October is a holiday
    assert_eq!(expiry.label(), "20-OCT-2025");

    let source = StaticSource::new(flat_snapshot(1053.0, 1050.0, 1.2, &expiry, &now), 1050.0);
    let outcome = pipeline.run(&now, &source).unwrap();
    let package = outcome.table().unwrap();

    assert_eq!(source.fetches.get(), 1);
    package.validate().unwrap();
    assert_eq!(package.metadata.atm.unwrap().strike, 1000.0);
    let atm_iv = package.metadata.atm_iv.unwrap();
    assert!((atm_iv - 120.0).abs() < 0.05, "atm iv {atm_iv}");
}

#[test]
fn test_marker_sits_between_bracketing_strikes() {
    let pipeline = pipeline();
    let now = monday();
    let expiry = week_out();
    let snapshot = flat_snapshot(1053.0, 1050.0, 1.2, &expiry, &now);

    let package = pipeline.build_table(&snapshot, 1053.0, &expiry, &now).unwrap();
    let records = package.table.records();
    let strike_column: Vec<&str> = records.iter().map(|cells| cells[5].as_str()).collect();

    assert_eq!(
        strike_column,
        vec!["800", "900", "1000", "1053.0", "1100", "1200", "1300", "1400", ""]
    );
    assert_eq!(records[3][7], "Expiry: 28-OCT-2025");
    assert_eq!(records[8][10], "Update Time");
    assert_eq!(records[8][11], "20-Oct 11:00");
}

#[test]
fn test_active_side_follows_forward() {
    let pipeline = pipeline();
    let now = monday();
    let expiry = week_out();
    let snapshot = flat_snapshot(1053.0, 1050.0, 1.2, &expiry, &now);

    let package = pipeline.build_table(&snapshot, 1050.0, &expiry, &now).unwrap();
    let forward = package.metadata.forward;
    assert_eq!(forward, 1050.0);

    for row in package.table.strike_rows() {
        let expected = if row.strike >= forward {
            OptionSide::Call
        } else {
            OptionSide::Put
        };
        assert_eq!(row.iv_side, Some(expected), "strike {}", row.strike);
        let iv = row.iv.unwrap();
        assert!((iv - 120.0).abs() < 0.05, "strike {} iv {}", row.strike, iv);
    }
}

#[test]
fn test_zero_premium_with_zero_epsilon_is_blank() {
    let config = ChainConfig::new()
        .with_half_width(3)
        .with_price_floor_epsilon(0.0);
    let pipeline = ChainPipeline::new(config, TradingCalendar::nse().unwrap()).unwrap();
    let now = monday();
    let expiry = week_out();

    let mut strikes = flat_snapshot(1053.0, 1050.0, 1.2, &expiry, &now).strikes().to_vec();
    for quotes in &mut strikes {
        if quotes.strike == 700.0 {
            quotes.put = Some(OptionQuote::default());
        }
    }
    let snapshot = ChainSnapshot::new(1053.0, strikes);

    let package = pipeline.build_table(&snapshot, 1050.0, &expiry, &now).unwrap();
    let rows: Vec<&StrikeRow> = package.table.strike_rows().collect();
    assert_eq!(rows[0].strike, 700.0);
    assert!(rows[0].iv.is_none());
    assert!(rows[1..].iter().all(|row| row.iv.is_some()));
    assert_eq!(package.table.records()[0][6], "");
}

#[test]
fn test_fetch_failure_aborts_run() {
    let result = pipeline().run(&monday(), &FailingSource);
    match result {
        Err(ChainError::DataUnavailable { message }) => {
            assert_eq!(message, "no chain for 20-OCT-2025");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn test_chain_without_step_strikes_is_unavailable() {
    let pipeline = pipeline();
    let snapshot = ChainSnapshot::new(
        1053.0,
        vec![
            StrikeQuotes::new(1025.0, None, None),
            StrikeQuotes::new(1075.0, None, None),
        ],
    );
    let result = pipeline.build_table(&snapshot, 1050.0, &week_out(), &monday());
    assert!(matches!(result, Err(ChainError::DataUnavailable { .. })));
}

#[test]
fn test_higher_premium_gives_higher_iv() {
    let pipeline = pipeline();
    let now = monday();
    let expiry = week_out();
    let base = flat_snapshot(1053.0, 1050.0, 1.2, &expiry, &now);

    let iv_at = |bump: f64| {
        let strikes: Vec<StrikeQuotes> = base
            .strikes()
            .iter()
            .cloned()
            .map(|mut quotes| {
                if quotes.strike == 1200.0 {
                    let call = quotes.call();
                    quotes.call = Some(OptionQuote::with_last_price(call.last_price + bump));
                }
                quotes
            })
            .collect();
        let snapshot = ChainSnapshot::new(1053.0, strikes);
        let package = pipeline.build_table(&snapshot, 1050.0, &expiry, &now).unwrap();
        package
            .table
            .strike_rows()
            .find(|row| row.strike == 1200.0)
            .and_then(|row| row.iv)
            .unwrap()
    };

    let low = iv_at(0.0);
    let high = iv_at(5.0);
    assert!(high > low, "{high} <= {low}");
}

#[test]
fn test_synthetic_anchor_moves_forward() {
    let config = ChainConfig::new()
        .with_half_width(3)
        .with_anchor(ForwardAnchor::SyntheticFuture);
    let pipeline = ChainPipeline::new(config, TradingCalendar::nse().unwrap()).unwrap();
    let now = monday();
    let expiry = week_out();
    let snapshot = flat_snapshot(1053.0, 1050.0, 1.2, &expiry, &now);

    let package = pipeline.build_table(&snapshot, 1040.0, &expiry, &now).unwrap();
    let atm = package.metadata.atm.unwrap();
    // parity forward of a flat surface at 1050
    assert_eq!(atm.strike, 1000.0);
    assert!((package.metadata.forward - 1050.0).abs() < 1e-6);
}

#[test]
fn test_summary_and_package_round_trip() {
    let pipeline = pipeline();
    let now = monday();
    let expiry = week_out();
    let snapshot = flat_snapshot(1053.0, 1050.0, 1.2, &expiry, &now);

    let package = pipeline.build_table(&snapshot, 1050.0, &expiry, &now).unwrap();
    let summary = package.table.summary();
    assert_eq!(summary.strikes, 7);
    assert_eq!(summary.solved, 7);
    assert_eq!(summary.total_call_oi, 7000.0);
    assert_eq!(summary.put_call_ratio, Some(1.5));

    let json = package.to_json().unwrap();
    let restored = ChainTablePackage::from_json(&json).unwrap();
    restored.validate().unwrap();
    assert_eq!(restored.run_id, package.run_id);
    assert_eq!(restored.into_table().unwrap(), package.table);
}

#[test]
fn test_atm_row_agrees_with_straddle_level() {
    let pipeline = ChainPipeline::nse().unwrap();
    let now = monday();
    let expiry = week_out();
    let t = expiry.time_to_expiry(&now);

    // ATM call quoted 30 rich against put-call parity at 24030
    let strikes = [23900.0, 24000.0, 24100.0]
        .into_iter()
        .map(|strike| {
            let (call, put) = if strike == 24000.0 {
                (210.0, 150.0)
            } else {
                (
                    Black76::price(&Black76Params::call(24030.0, strike, t), 0.12),
                    Black76::price(&Black76Params::put(24030.0, strike, t), 0.12),
                )
            };
            StrikeQuotes::new(
                strike,
                Some(OptionQuote::with_last_price(call)),
                Some(OptionQuote::with_last_price(put)),
            )
        })
        .collect();
    let snapshot = ChainSnapshot::new(24018.0, strikes);

    let package = pipeline.build_table(&snapshot, 24030.0, &expiry, &now).unwrap();
    let atm_iv = package.metadata.atm_iv.unwrap();
    let atm_row = package
        .table
        .strike_rows()
        .find(|row| row.strike == 24000.0)
        .unwrap();

    assert_eq!(atm_row.iv_side, Some(OptionSide::Put));
    assert_eq!(atm_row.iv, Some(atm_iv));
}
