use crate::domain::config::ManagerConfig;
use crate::domain::geometry::{
    Point, Rect, clip_line_to_rect, distance_point_to_segment, point_in_circle, point_in_rect,
    point_in_triangle,
};
use crate::domain::mapping::{ChartScales, resolve_all};
use crate::domain::tools::kind::ToolKind;
use crate::domain::tools::tool::Tool;
use serde::Serialize;

/// Result of a successful hit test. Anchor hits win over strokes and fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "index", rename_all = "lowercase")]
pub enum ToolHit {
    Point(usize),
    Line,
    Shape,
}

/// Scales and tolerances for one hit-test pass
pub struct HitContext<'a> {
    pub scales: &'a dyn ChartScales,
    pub anchor_radius: f64,
    pub line_tolerance: f64,
    pub position_min_width: f64,
}

impl<'a> HitContext<'a> {
    pub fn new(scales: &'a dyn ChartScales, config: &ManagerConfig) -> Self {
        Self {
            scales,
            anchor_radius: config.anchor_hit_radius,
            line_tolerance: config.line_hit_tolerance,
            position_min_width: config.position_min_width,
        }
    }
}

/// Axis-line handles sit this far from the pane edge
const AXIS_HANDLE_INSET: f64 = 30.0;

fn anchor_hit(handles: &[Option<Point>], p: Point, radius: f64) -> Option<usize> {
    handles.iter().position(|h| h.is_some_and(|h| h.distance_to(p) < radius))
}

fn near_polyline(points: &[Option<Point>], p: Point, tolerance: f64) -> bool {
    points.windows(2).any(|w| match (w[0], w[1]) {
        (Some(a), Some(b)) => distance_point_to_segment(p, a, b) < tolerance,
        _ => false,
    })
}

/// The eight handles of a box: corners, mixed corners, edge midpoints
pub fn box_handles(a: Point, b: Point) -> [Point; 8] {
    let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
    [
        a,
        b,
        Point::new(a.x, b.y),
        Point::new(b.x, a.y),
        Point::new(mid.x, a.y),
        Point::new(mid.x, b.y),
        Point::new(a.x, mid.y),
        Point::new(b.x, mid.y),
    ]
}

/// Vertical screen offset from the p1→p2 line to p3
pub fn channel_offset(p1: Point, p2: Point, p3: Point) -> f64 {
    if p1.x == p2.x {
        return p3.y - p1.y;
    }
    let slope = (p2.y - p1.y) / (p2.x - p1.x);
    p3.y - (p1.y + slope * (p3.x - p1.x))
}

/// Approximate text box used before a canvas is available to measure
pub fn text_box(anchor: Point, text: &str, font_size: f64) -> Rect {
    let width = text.chars().count() as f64 * 0.6 * font_size;
    Rect::from_corners(
        Point::new(anchor.x, anchor.y - font_size / 2.0),
        Point::new(anchor.x + width, anchor.y + font_size / 2.0),
    )
}

pub fn callout_box(label: Point, text: &str, font_size: f64) -> Rect {
    let width = text.chars().count() as f64 * font_size * 0.6 + 20.0;
    let height = font_size * 1.2 + 10.0;
    Rect::from_corners(
        Point::new(label.x, label.y - height / 2.0),
        Point::new(label.x + width, label.y + height / 2.0),
    )
}

pub fn price_label_box(anchor: Point, text: &str, font_size: f64) -> Rect {
    let height = font_size + 12.0;
    let width = text.chars().count() as f64 * 8.0 + 16.0;
    let top_left = Point::new(anchor.x + 20.0, anchor.y - 20.0 - height);
    Rect::from_corners(top_left, Point::new(top_left.x + width, top_left.y + height))
}

/// Horizontal extent of a long/short box, widened to `min_width`
pub fn position_box(points: &[Point], min_width: f64) -> Option<Rect> {
    let first = points.first()?;
    let (mut min, mut max) = (*first, *first);
    for p in points {
        min = Point::new(min.x.min(p.x), min.y.min(p.y));
        max = Point::new(max.x.max(p.x), max.y.max(p.y));
    }
    let width = (max.x - min.x).max(min_width);
    Some(Rect::from_corners(min, Point::new(min.x + width, max.y)))
}

impl Tool {
    /// Hit test in CSS pixel space. Points that cannot be mapped are skipped.
    pub fn hit_test(&self, x: f64, y: f64, ctx: &HitContext<'_>) -> Option<ToolHit> {
        let p = Point::new(x, y);
        let screen = resolve_all(&self.points, ctx.scales);
        let (width, height) = ctx.scales.pane_size();
        let r = ctx.anchor_radius;
        let tol = ctx.line_tolerance;
        let first = screen.first().copied().flatten();
        let second = screen.get(1).copied().flatten();

        use ToolKind::*;
        match self.kind {
            TrendLine | Ray | ExtendedLine | Arrow => {
                if let Some(i) = anchor_hit(&screen, p, r) {
                    return Some(ToolHit::Point(i));
                }
                let (a, b) = (first?, second?);
                let (extend_left, extend_right) = self.options.extends();
                let seg = clip_line_to_rect(a, b, width, height, extend_left, extend_right)?;
                (distance_point_to_segment(p, seg.a, seg.b) < tol).then_some(ToolHit::Line)
            }
            HorizontalLine => {
                let y0 = ctx.scales.price_to_coordinate(self.points.first()?.price)?;
                if Point::new(width - AXIS_HANDLE_INSET, y0).distance_to(p) < r {
                    return Some(ToolHit::Point(0));
                }
                ((p.y - y0).abs() < tol).then_some(ToolHit::Line)
            }
            HorizontalRay => {
                let a = first?;
                if a.distance_to(p) < r {
                    return Some(ToolHit::Point(0));
                }
                (p.x >= a.x && (p.y - a.y).abs() < tol).then_some(ToolHit::Line)
            }
            VerticalLine => {
                let x0 = ctx.scales.logical_to_coordinate(self.points.first()?.logical)?;
                if Point::new(x0, height - AXIS_HANDLE_INSET).distance_to(p) < r {
                    return Some(ToolHit::Point(0));
                }
                ((p.x - x0).abs() < tol).then_some(ToolHit::Line)
            }
            CrossLine => {
                let a = first?;
                if a.distance_to(p) < r {
                    return Some(ToolHit::Point(0));
                }
                ((p.y - a.y).abs() < tol || (p.x - a.x).abs() < tol).then_some(ToolHit::Line)
            }
            Rectangle | PriceRange | DateRange | DatePriceRange | Measure => {
                let (a, b) = (first?, second?);
                if let Some(i) = anchor_hit(&box_handles(a, b).map(Some), p, r) {
                    return Some(ToolHit::Point(i));
                }
                point_in_rect(p, &Rect::from_corners(a, b)).then_some(ToolHit::Shape)
            }
            Circle => {
                if let Some(i) = anchor_hit(&screen, p, r) {
                    return Some(ToolHit::Point(i));
                }
                let (center, edge) = (first?, second?);
                point_in_circle(p, center, center.distance_to(edge)).then_some(ToolHit::Shape)
            }
            Triangle => {
                if let Some(i) = anchor_hit(&screen, p, r) {
                    return Some(ToolHit::Point(i));
                }
                let c = screen.get(2).copied().flatten()?;
                let (a, b) = (first?, second?);
                if point_in_triangle(p, a, b, c) {
                    return Some(ToolHit::Shape);
                }
                near_polyline(&[Some(a), Some(b), Some(c), Some(a)], p, tol).then_some(ToolHit::Line)
            }
            ParallelChannel => {
                let (a, b) = (first?, second?);
                let Some(c) = screen.get(2).copied().flatten() else {
                    return anchor_hit(&screen, p, r).map(ToolHit::Point);
                };
                let d = channel_offset(a, b, c);
                let (a2, b2) = (Point::new(a.x, a.y + d), Point::new(b.x, b.y + d));
                if let Some(i) = anchor_hit(&[Some(a), Some(b), Some(a2), Some(b2)], p, r) {
                    return Some(ToolHit::Point(i.min(2)));
                }
                if point_in_triangle(p, a, b, b2) || point_in_triangle(p, a, b2, a2) {
                    return Some(ToolHit::Shape);
                }
                (near_polyline(&[Some(a), Some(b)], p, tol) || near_polyline(&[Some(a2), Some(b2)], p, tol))
                    .then_some(ToolHit::Line)
            }
            FibRetracement => {
                if let Some(i) = anchor_hit(&screen, p, r) {
                    return Some(ToolHit::Point(i));
                }
                let (a, b) = (first?, second?);
                if distance_point_to_segment(p, a, b) < tol {
                    return Some(ToolHit::Line);
                }
                let (left, right) = (a.x.min(b.x), a.x.max(b.x));
                let (p1, p2) = (self.points[0], self.points[1]);
                let levels = self.options.levels.clone().unwrap_or_default();
                let on_level = levels.iter().any(|level| {
                    let price = p2.price - (p2.price - p1.price) * level.coeff;
                    ctx.scales
                        .price_to_coordinate(price)
                        .is_some_and(|ly| (p.y - ly).abs() < tol && p.x >= left && p.x <= right)
                });
                on_level.then_some(ToolHit::Line)
            }
            FibExtension => {
                if let Some(i) = anchor_hit(&screen, p, r) {
                    return Some(ToolHit::Point(i));
                }
                if near_polyline(&screen, p, tol) {
                    return Some(ToolHit::Line);
                }
                let xs: Vec<f64> = screen.iter().flatten().map(|s| s.x).collect();
                let left = xs.iter().copied().fold(f64::INFINITY, f64::min);
                let right = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let (p1, p2, p3) = (self.points.first()?, self.points.get(1)?, self.points.get(2)?);
                let levels = self.options.levels.clone().unwrap_or_default();
                let on_level = levels.iter().any(|level| {
                    let price = p3.price + (p2.price - p1.price) * level.coeff;
                    ctx.scales
                        .price_to_coordinate(price)
                        .is_some_and(|ly| (p.y - ly).abs() < tol && p.x >= left && p.x <= right)
                });
                on_level.then_some(ToolHit::Line)
            }
            Text => {
                let a = first?;
                let font_size = self.options.font_size_or(14.0);
                let inside = point_in_rect(p, &text_box(a, self.options.text_or_default(), font_size));
                (inside || a.distance_to(p) < r).then_some(ToolHit::Point(0))
            }
            Callout => {
                if let Some(i) = anchor_hit(&screen, p, r) {
                    return Some(ToolHit::Point(i));
                }
                let (anchor, label) = (first?, second?);
                let font_size = self.options.font_size_or(12.0);
                if point_in_rect(p, &callout_box(label, self.options.text_or_default(), font_size)) {
                    return Some(ToolHit::Point(1));
                }
                (distance_point_to_segment(p, anchor, label) < tol).then_some(ToolHit::Line)
            }
            PriceLabel => {
                let a = first?;
                if a.distance_to(p) < 10.0 {
                    return Some(ToolHit::Point(0));
                }
                let text = crate::domain::tools::levels::price_label_text(self.points[0].price);
                let font_size = self.options.font_size_or(12.0);
                point_in_rect(p, &price_label_box(a, &text, font_size)).then_some(ToolHit::Point(0))
            }
            Brush | Highlighter | Path => {
                if !self.options.is_smooth() {
                    if let Some(i) = anchor_hit(&screen, p, r) {
                        return Some(ToolHit::Point(i));
                    }
                }
                let stroke_tol = tol.max(self.options.stroke_width() / 2.0 + 2.0);
                near_polyline(&screen, p, stroke_tol).then_some(ToolHit::Line)
            }
            LongPosition | ShortPosition => {
                if let Some(i) = anchor_hit(&screen, p, r) {
                    return Some(ToolHit::Point(i));
                }
                let resolved: Vec<Point> = screen.iter().flatten().copied().collect();
                if resolved.len() < 3 {
                    return Option::None;
                }
                let area = position_box(&resolved, ctx.position_min_width)?;
                point_in_rect(p, &area).then_some(ToolHit::Shape)
            }
            ElliottImpulse | ElliottCorrection | HeadAndShoulders => {
                if let Some(i) = anchor_hit(&screen, p, r) {
                    return Some(ToolHit::Point(i));
                }
                near_polyline(&screen, p, tol).then_some(ToolHit::Line)
            }
            None | Eraser | UserPriceAlerts => Option::None,
        }
    }
}
