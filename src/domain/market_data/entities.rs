use super::value_objects::TimeInterval;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// OHLC bar keyed by its open time in unix seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self { time, open, high, low, close }
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_valid(&self) -> bool {
        self.high >= self.open.max(self.close) && self.low <= self.open.min(self.close)
    }

    /// Whether `price` lies inside `[low, high]`
    pub fn touches(&self, price: f64) -> bool {
        self.low <= price && price <= self.high
    }
}

/// What happened to the series when a live candle arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesUpdate {
    Amended,
    Appended,
    Inserted,
}

/// Ordered candle series.
///
/// The logical index of a candle is its position plus the number of candles
/// trimmed from the front, so indices stay put when capacity is reached.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    candles: VecDeque<Candle>,
    max_size: usize,
    trimmed: usize,
}

impl Default for CandleSeries {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl CandleSeries {
    pub fn new(max_size: usize) -> Self {
        Self { candles: VecDeque::new(), max_size, trimmed: 0 }
    }

    pub fn from_candles(candles: Vec<Candle>, max_size: usize) -> Self {
        let mut series = Self::new(max_size);
        for candle in candles {
            series.add_candle(candle);
        }
        series
    }

    /// Amend the last candle on an equal time, append newer, insert older
    pub fn add_candle(&mut self, candle: Candle) -> SeriesUpdate {
        if let Some(last) = self.candles.back_mut() {
            if last.time == candle.time {
                *last = candle;
                return SeriesUpdate::Amended;
            }
            if candle.time < last.time {
                self.insert_candle_sorted(candle);
                return SeriesUpdate::Inserted;
            }
        }

        self.candles.push_back(candle);
        self.trim();
        SeriesUpdate::Appended
    }

    /// Fold a live tick into its interval bucket
    pub fn apply_live(&mut self, candle: Candle, interval: TimeInterval) -> SeriesUpdate {
        let bucketed = Candle { time: interval.bucket_start(candle.time), ..candle };
        self.add_candle(bucketed)
    }

    fn insert_candle_sorted(&mut self, candle: Candle) {
        let insert_pos =
            self.candles.iter().position(|c| c.time >= candle.time).unwrap_or(self.candles.len());

        if insert_pos < self.candles.len() && self.candles[insert_pos].time == candle.time {
            self.candles[insert_pos] = candle;
        } else {
            self.candles.insert(insert_pos, candle);
        }
        self.trim();
    }

    fn trim(&mut self) {
        while self.candles.len() > self.max_size {
            self.candles.pop_front();
            self.trimmed += 1;
        }
    }

    pub fn candles(&self) -> &VecDeque<Candle> {
        &self.candles
    }

    pub fn latest(&self) -> Option<&Candle> {
        self.candles.back()
    }

    /// Logical index of the oldest retained candle
    pub fn first_logical(&self) -> Option<f64> {
        (!self.candles.is_empty()).then_some(self.trimmed as f64)
    }

    /// Logical index of the newest candle
    pub fn last_logical(&self) -> Option<f64> {
        self.candles.len().checked_sub(1).map(|i| (i + self.trimmed) as f64)
    }

    /// Logical span of the retained candles
    pub fn logical_range(&self) -> Option<(f64, f64)> {
        Some((self.first_logical()?, self.last_logical()?))
    }

    pub fn get(&self, logical: usize) -> Option<&Candle> {
        self.candles.get(logical.checked_sub(self.trimmed)?)
    }

    /// Logical index of the candle opened at `time`
    pub fn logical_of(&self, time: i64) -> Option<f64> {
        let position = self.candles.iter().position(|c| c.time == time)?;
        Some((position + self.trimmed) as f64)
    }

    /// Candles paired with their logical index
    pub fn iter_logical(&self) -> impl Iterator<Item = (f64, &Candle)> {
        self.candles.iter().enumerate().map(move |(i, c)| ((i + self.trimmed) as f64, c))
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn clear(&mut self) {
        self.candles.clear();
        self.trimmed = 0;
    }

    pub fn price_range(&self) -> Option<(f64, f64)> {
        let first = self.candles.front()?;
        Some(self.candles.iter().fold((first.low, first.high), |(lo, hi), c| (lo.min(c.low), hi.max(c.high))))
    }
}
