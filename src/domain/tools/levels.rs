//! Derived values shown next to tools: Fibonacci levels, range statistics,
//! position projections and pattern labels. Pure functions keyed by kind.

use crate::domain::mapping::DomainPoint;
use crate::domain::tools::kind::ToolKind;
use crate::domain::tools::options::FibLevel;
use crate::time_utils::format_duration;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelLine {
    pub coeff: f64,
    pub price: f64,
    pub color: String,
    pub label: String,
}

/// Retracement: `p2 - (p2 - p1) * coeff`
pub fn fib_retracement_levels(p1: &DomainPoint, p2: &DomainPoint, levels: &[FibLevel]) -> Vec<LevelLine> {
    levels
        .iter()
        .map(|level| {
            let price = p2.price - (p2.price - p1.price) * level.coeff;
            LevelLine {
                coeff: level.coeff,
                price,
                color: level.color.clone(),
                label: format!("{} ({:.2})", level.coeff, price),
            }
        })
        .collect()
}

/// Extension: projected from `p3` by the `p1 → p2` move
pub fn fib_extension_levels(
    p1: &DomainPoint,
    p2: &DomainPoint,
    p3: &DomainPoint,
    levels: &[FibLevel],
) -> Vec<LevelLine> {
    let delta = p2.price - p1.price;
    levels
        .iter()
        .map(|level| {
            let price = p3.price + delta * level.coeff;
            LevelLine {
                coeff: level.coeff,
                price,
                color: level.color.clone(),
                label: format!("{:.1}% ({:.2})", level.coeff * 100.0, price),
            }
        })
        .collect()
}

/// Statistics between two anchors
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeStats {
    pub price_delta: f64,
    pub percent: f64,
    pub bars: i64,
}

impl RangeStats {
    pub fn between(p1: &DomainPoint, p2: &DomainPoint) -> Self {
        let price_delta = p2.price - p1.price;
        let percent = if p1.price == 0.0 { 0.0 } else { price_delta / p1.price * 100.0 };
        let bars = (p2.logical - p1.logical).round().abs() as i64;
        Self { price_delta, percent, bars }
    }

    fn sign(&self) -> &'static str {
        if self.price_delta >= 0.0 { "+" } else { "-" }
    }

    pub fn price_label(&self) -> String {
        format!("{}{:.2} ({:.2}%)", self.sign(), self.price_delta.abs(), self.percent.abs())
    }

    pub fn signed_price_label(&self) -> String {
        let sign = self.sign();
        format!("{sign}{:.2} ({sign}{:.2}%)", self.price_delta.abs(), self.percent.abs())
    }

    pub fn bars_label(&self) -> String {
        format!("{} bars", self.bars)
    }

    /// Elapsed wall-clock time for `bar_seconds` long bars
    pub fn elapsed_label(&self, bar_seconds: i64) -> String {
        format_duration(self.bars * bar_seconds)
    }
}

/// Text lines of the floating label for a range or measure tool
pub fn range_labels(kind: ToolKind, p1: &DomainPoint, p2: &DomainPoint, bar_seconds: i64) -> Vec<String> {
    let stats = RangeStats::between(p1, p2);
    match kind {
        ToolKind::PriceRange => vec![stats.price_label()],
        ToolKind::DateRange => vec![stats.bars_label()],
        ToolKind::DatePriceRange => vec![stats.signed_price_label(), stats.bars_label()],
        ToolKind::Measure => vec![
            stats.signed_price_label(),
            format!("{}, {}", stats.bars_label(), stats.elapsed_label(bar_seconds)),
        ],
        _ => Vec::new(),
    }
}

/// Long/short projection derived from entry, stop and target
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionZones {
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
    pub profit_zone: (f64, f64),
    pub loss_zone: (f64, f64),
    pub risk_reward: f64,
}

impl PositionZones {
    pub fn from_points(points: &[DomainPoint]) -> Option<Self> {
        let (entry, stop, target) = (points.first()?.price, points.get(1)?.price, points.get(2)?.price);
        let risk = (entry - stop).abs();
        let reward = (target - entry).abs();
        Some(Self {
            entry,
            stop,
            target,
            profit_zone: (entry.min(target), entry.max(target)),
            loss_zone: (entry.min(stop), entry.max(stop)),
            risk_reward: if risk == 0.0 { 0.0 } else { reward / risk },
        })
    }

    pub fn labels(&self) -> Vec<String> {
        let pct = |price: f64| if self.entry == 0.0 { 0.0 } else { (price - self.entry) / self.entry * 100.0 };
        vec![
            format!("Target: {:.2} ({:.2}%)", self.target, pct(self.target)),
            format!("Stop: {:.2} ({:.2}%)", self.stop, pct(self.stop)),
            format!("Risk/Reward: {:.2}", self.risk_reward),
        ]
    }
}

/// Stop mirrored around the entry, as placed by the two-click flow
pub fn mirrored_stop(kind: ToolKind, entry: &DomainPoint, target: &DomainPoint) -> DomainPoint {
    let distance = target.price - entry.price;
    let price = match kind {
        ToolKind::ShortPosition => entry.price + (entry.price - target.price),
        _ => entry.price - distance,
    };
    DomainPoint::new(target.logical, price)
}

const IMPULSE_LABELS: [&str; 6] = ["(0)", "1", "2", "3", "4", "5"];
const CORRECTION_LABELS: [&str; 4] = ["(0)", "A", "B", "C"];

pub fn wave_labels(kind: ToolKind) -> &'static [&'static str] {
    match kind {
        ToolKind::ElliottImpulse => &IMPULSE_LABELS,
        ToolKind::ElliottCorrection => &CORRECTION_LABELS,
        _ => &[],
    }
}

pub fn head_and_shoulders_label(index: usize) -> Option<&'static str> {
    match index {
        1 => Some("Left Shoulder"),
        3 => Some("Head"),
        5 => Some("Right Shoulder"),
        _ => None,
    }
}

pub fn price_label_text(price: f64) -> String {
    format!("{:.2}", price)
}
