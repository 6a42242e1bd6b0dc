//! Domain ⇄ screen coordinate mapping.
//!
//! Tools store only [`DomainPoint`]s. Screen positions are derived on every
//! redraw through the chart's scales and may be unavailable.

use crate::domain::geometry::Point;
use serde::{Deserialize, Serialize};

/// Anchor in chart space: a logical bar index plus a price
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DomainPoint {
    pub logical: f64,
    pub price: f64,
}

impl DomainPoint {
    pub fn new(logical: f64, price: f64) -> Self {
        Self { logical, price }
    }

    pub fn offset(&self, d_logical: f64, d_price: f64) -> Self {
        Self::new(self.logical + d_logical, self.price + d_price)
    }
}

/// Derived screen position; `None` on either axis means off-scale
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl ScreenPoint {
    pub fn new(x: Option<f64>, y: Option<f64>) -> Self {
        Self { x, y }
    }

    /// Both coordinates, or nothing
    pub fn resolved(&self) -> Option<Point> {
        Some(Point::new(self.x?, self.y?))
    }
}

/// Horizontal scale of the chart
pub trait TimeScale {
    fn logical_to_coordinate(&self, logical: f64) -> Option<f64>;
    fn coordinate_to_logical(&self, x: f64) -> Option<f64>;
}

/// Vertical scale of the main series
pub trait PriceScale {
    fn price_to_coordinate(&self, price: f64) -> Option<f64>;
    fn coordinate_to_price(&self, y: f64) -> Option<f64>;
}

/// Both scales plus the pane geometry tools need for clipping
pub trait ChartScales: TimeScale + PriceScale {
    /// Pane size in CSS pixels
    fn pane_size(&self) -> (f64, f64);

    fn pixel_ratio(&self) -> f64 {
        1.0
    }
}

pub fn to_screen<T, P>(point: &DomainPoint, time: &T, price: &P) -> ScreenPoint
where
    T: TimeScale + ?Sized,
    P: PriceScale + ?Sized,
{
    ScreenPoint::new(time.logical_to_coordinate(point.logical), price.price_to_coordinate(point.price))
}

/// Order preserving; unconvertible points stay in place as `None`s
pub fn to_screen_batch<T, P>(points: &[DomainPoint], time: &T, price: &P) -> Vec<ScreenPoint>
where
    T: TimeScale + ?Sized,
    P: PriceScale + ?Sized,
{
    points.iter().map(|p| to_screen(p, time, price)).collect()
}

/// Resolve every point through `scales`, as needed by hit testing
pub fn resolve_all(points: &[DomainPoint], scales: &dyn ChartScales) -> Vec<Option<Point>> {
    points
        .iter()
        .map(|p| {
            Some(Point::new(
                scales.logical_to_coordinate(p.logical)?,
                scales.price_to_coordinate(p.price)?,
            ))
        })
        .collect()
}

/// Pointer position → domain point, used when interpreting input
pub fn to_domain(x: f64, y: f64, scales: &dyn ChartScales) -> Option<DomainPoint> {
    Some(DomainPoint::new(scales.coordinate_to_logical(x)?, scales.coordinate_to_price(y)?))
}

/// Linear scales over a visible logical range and price range.
///
/// Screen y grows downwards, so the price axis is inverted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearScales {
    pub from_logical: f64,
    pub to_logical: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Default for LinearScales {
    fn default() -> Self {
        Self {
            from_logical: 0.0,
            to_logical: 100.0,
            min_price: 0.0,
            max_price: 100.0,
            width: 800.0,
            height: 600.0,
            pixel_ratio: 1.0,
        }
    }
}

impl LinearScales {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, ..Default::default() }
    }

    pub fn with_ranges(mut self, logical: (f64, f64), price: (f64, f64)) -> Self {
        self.from_logical = logical.0;
        self.to_logical = logical.1;
        self.min_price = price.0;
        self.max_price = price.1;
        self
    }

    pub fn logical_span(&self) -> f64 {
        self.to_logical - self.from_logical
    }

    pub fn price_span(&self) -> f64 {
        self.max_price - self.min_price
    }

    pub fn set_visible_range(&mut self, from: f64, to: f64) {
        self.from_logical = from;
        self.to_logical = to;
    }

    /// Fit the price axis to `[low, high]` with a small margin
    pub fn fit_prices(&mut self, low: f64, high: f64) {
        let margin = ((high - low) * 0.1).max(f64::EPSILON);
        self.min_price = low - margin;
        self.max_price = high + margin;
    }
}

impl TimeScale for LinearScales {
    fn logical_to_coordinate(&self, logical: f64) -> Option<f64> {
        let span = self.logical_span();
        if span == 0.0 || !logical.is_finite() {
            return None;
        }
        Some((logical - self.from_logical) / span * self.width)
    }

    fn coordinate_to_logical(&self, x: f64) -> Option<f64> {
        if self.width == 0.0 || !x.is_finite() {
            return None;
        }
        Some(self.from_logical + x / self.width * self.logical_span())
    }
}

impl PriceScale for LinearScales {
    fn price_to_coordinate(&self, price: f64) -> Option<f64> {
        let span = self.price_span();
        if span == 0.0 || !price.is_finite() {
            return None;
        }
        Some(self.height * (1.0 - (price - self.min_price) / span))
    }

    fn coordinate_to_price(&self, y: f64) -> Option<f64> {
        if self.height == 0.0 || !y.is_finite() {
            return None;
        }
        Some(self.min_price + (1.0 - y / self.height) * self.price_span())
    }
}

impl ChartScales for LinearScales {
    fn pane_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }
}
