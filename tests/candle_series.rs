use price_chart_tools::domain::market_data::{Candle, CandleSeries, SeriesUpdate, Symbol, TimeInterval};
use std::str::FromStr;

fn bar(time: i64, close: f64) -> Candle {
    Candle::new(time, close, close + 1.0, close - 1.0, close)
}

#[test]
fn amend_append_insert() {
    let mut series = CandleSeries::new(100);
    assert_eq!(series.add_candle(bar(60, 10.0)), SeriesUpdate::Appended);
    assert_eq!(series.add_candle(bar(180, 12.0)), SeriesUpdate::Appended);
    assert_eq!(series.add_candle(bar(180, 13.0)), SeriesUpdate::Amended);
    assert_eq!(series.add_candle(bar(120, 11.0)), SeriesUpdate::Inserted);

    let times: Vec<i64> = series.candles().iter().map(|c| c.time).collect();
    assert_eq!(times, vec![60, 120, 180]);
    assert_eq!(series.latest().map(|c| c.close), Some(13.0));
    assert_eq!(series.last_logical(), Some(2.0));
}

#[test]
fn capacity_drops_oldest() {
    let series = CandleSeries::from_candles((0..5).map(|i| bar(i * 60, 10.0 + i as f64)).collect(), 3);
    assert_eq!(series.len(), 3);
    assert_eq!(series.get(0), None);
    assert_eq!(series.get(2).map(|c| c.time), Some(120));
    assert_eq!(series.logical_range(), Some((2.0, 4.0)));
    assert_eq!(series.price_range(), Some((11.0, 15.0)));
}

#[test]
fn logical_indices_survive_trimming() {
    let mut series = CandleSeries::new(3);
    for i in 0..3 {
        series.add_candle(bar(i * 60, 10.0));
    }
    assert_eq!(series.logical_of(120), Some(2.0));

    series.add_candle(bar(180, 11.0));
    series.add_candle(bar(240, 12.0));
    assert_eq!(series.len(), 3);
    assert_eq!(series.logical_of(120), Some(2.0));
    assert_eq!(series.logical_of(240), Some(4.0));
    assert_eq!(series.last_logical(), Some(4.0));
    assert_eq!(series.logical_of(0), None);
    let logicals: Vec<f64> = series.iter_logical().map(|(l, _)| l).collect();
    assert_eq!(logicals, vec![2.0, 3.0, 4.0]);

    series.clear();
    series.add_candle(bar(600, 1.0));
    assert_eq!(series.first_logical(), Some(0.0));
}

#[test]
fn live_ticks_are_bucketed() {
    let mut series = CandleSeries::new(10);
    series.add_candle(bar(0, 10.0));
    assert_eq!(series.apply_live(bar(299, 11.0), TimeInterval::FiveMinutes), SeriesUpdate::Amended);
    assert_eq!(series.apply_live(bar(300, 12.0), TimeInterval::FiveMinutes), SeriesUpdate::Appended);
    assert_eq!(series.get(1).map(|c| c.time), Some(300));
    assert!(CandleSeries::default().last_logical().is_none());
}

#[test]
fn candle_checks() {
    let candle = Candle::new(0, 10.0, 12.0, 9.0, 11.0);
    assert!(candle.is_valid() && candle.is_bullish());
    assert!(candle.touches(12.0) && !candle.touches(12.5));
    assert!(!Candle::new(0, 10.0, 9.0, 8.0, 9.5).is_valid());
}

#[test]
fn interval_and_symbol_parsing() {
    assert_eq!(TimeInterval::from_str("15m"), Ok(TimeInterval::FifteenMinutes));
    assert_eq!(TimeInterval::OneHour.to_string(), "1h");
    assert_eq!(TimeInterval::OneMinute.bucket_start(-30), -60);
    assert_eq!(Symbol::from("ethusdt").value(), "ETHUSDT");
    assert!(Symbol::new("  ".to_string()).is_err());
}
