//! Screen-space geometry kernel.
//!
//! Everything here is a pure function over plain coordinate structs. Inputs
//! are taken by value or shared reference and never mutated.

use derive_more::{Add, Constructor, Sub};
use serde::{Deserialize, Serialize};

const EPSILON: f64 = 1e-6;

/// Screen-space point in CSS or bitmap pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Add, Sub, Constructor, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn scaled(&self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }

    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn normalized(&self) -> Point {
        let len = self.length();
        if len == 0.0 { Point::default() } else { self.scaled(1.0 / len) }
    }

    /// Perpendicular vector, rotated a quarter turn
    pub fn transposed(&self) -> Point {
        Point::new(-self.y, self.x)
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (*self - other).length()
    }

    pub fn approx_eq(&self, other: Point) -> bool {
        (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Constructor, Serialize, Deserialize)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

/// Axis-aligned rectangle with `min <= max` on both axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// Rectangle spanned by two arbitrary corners
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn from_size(width: f64, height: f64) -> Self {
        Self::from_corners(Point::default(), Point::new(width, height))
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }
}

/// Stroke dash style. Serialized as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LineStyle {
    #[default]
    Solid,
    Dotted,
    Dashed,
    LargeDashed,
    SparseDotted,
}

impl TryFrom<u8> for LineStyle {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(LineStyle::Solid),
            1 => Ok(LineStyle::Dotted),
            2 => Ok(LineStyle::Dashed),
            3 => Ok(LineStyle::LargeDashed),
            4 => Ok(LineStyle::SparseDotted),
            other => Err(format!("unknown line style {}", other)),
        }
    }
}

impl From<LineStyle> for u8 {
    fn from(style: LineStyle) -> Self {
        match style {
            LineStyle::Solid => 0,
            LineStyle::Dotted => 1,
            LineStyle::Dashed => 2,
            LineStyle::LargeDashed => 3,
            LineStyle::SparseDotted => 4,
        }
    }
}

/// Canvas `setLineDash` pattern for a style, in CSS pixels
pub fn dash_pattern(style: LineStyle) -> &'static [f64] {
    match style {
        LineStyle::Solid => &[],
        LineStyle::Dotted => &[2.0, 2.0],
        LineStyle::Dashed => &[6.0, 6.0],
        LineStyle::LargeDashed => &[10.0, 10.0],
        LineStyle::SparseDotted => &[2.0, 10.0],
    }
}

/// Dash pattern scaled to device pixels
pub fn scaled_dash_pattern(style: LineStyle, pixel_ratio: f64) -> Vec<f64> {
    dash_pattern(style).iter().map(|v| v * pixel_ratio).collect()
}

/// Snap a media coordinate onto the bitmap pixel grid
pub fn to_bitmap(value: f64, pixel_ratio: f64) -> f64 {
    (value * pixel_ratio).round()
}

pub fn point_to_bitmap(p: Point, horizontal_ratio: f64, vertical_ratio: f64) -> Point {
    Point::new(to_bitmap(p.x, horizontal_ratio), to_bitmap(p.y, vertical_ratio))
}

pub fn distance_point_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq == 0.0 {
        return p.distance_to(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance_to(a + ab.scaled(t))
}

pub fn point_in_rect(p: Point, rect: &Rect) -> bool {
    p.x >= rect.min.x && p.x <= rect.max.x && p.y >= rect.min.y && p.y <= rect.max.y
}

pub fn point_in_circle(p: Point, center: Point, radius: f64) -> bool {
    p.distance_to(center) <= radius
}

/// Barycentric containment; degenerate triangles contain nothing
pub fn point_in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let v0 = c - a;
    let v1 = b - a;
    let v2 = p - a;
    let dot00 = v0.dot(v0);
    let dot01 = v0.dot(v1);
    let dot02 = v0.dot(v2);
    let dot11 = v1.dot(v1);
    let dot12 = v1.dot(v2);
    let denom = dot00 * dot11 - dot01 * dot01;
    if denom.abs() < EPSILON {
        return false;
    }
    let inv = 1.0 / denom;
    let u = (dot11 * dot02 - dot01 * dot12) * inv;
    let v = (dot00 * dot12 - dot01 * dot02) * inv;
    u >= 0.0 && v >= 0.0 && u + v <= 1.0
}

/// Implicit line `a*x + b*y + c = 0` through two points
#[derive(Debug, Clone, Copy)]
struct Line {
    a: f64,
    b: f64,
    c: f64,
}

impl Line {
    fn through(p1: Point, p2: Point) -> Self {
        Self { a: p1.y - p2.y, b: p2.x - p1.x, c: p1.x * p2.y - p2.x * p1.y }
    }
}

fn push_unique(points: &mut Vec<Point>, p: Point) {
    if !points.iter().any(|q| q.approx_eq(p)) {
        points.push(p);
    }
}

fn intersect_line_with_rect(line: Line, rect: &Rect) -> Option<Segment> {
    if line.a.abs() < EPSILON {
        let y = -line.c / line.b;
        return (rect.min.y <= y && y <= rect.max.y)
            .then(|| Segment::new(Point::new(rect.min.x, y), Point::new(rect.max.x, y)));
    }
    if line.b.abs() < EPSILON {
        let x = -line.c / line.a;
        return (rect.min.x <= x && x <= rect.max.x)
            .then(|| Segment::new(Point::new(x, rect.min.y), Point::new(x, rect.max.y)));
    }

    let mut hits = Vec::with_capacity(4);
    let at_x = |x: f64, hits: &mut Vec<Point>| {
        let y = -(line.c + line.a * x) / line.b;
        if rect.min.y <= y && y <= rect.max.y {
            push_unique(hits, Point::new(x, y));
        }
    };
    at_x(rect.min.x, &mut hits);
    at_x(rect.max.x, &mut hits);
    let at_y = |y: f64, hits: &mut Vec<Point>| {
        let x = -(line.c + line.b * y) / line.a;
        if rect.min.x <= x && x <= rect.max.x {
            push_unique(hits, Point::new(x, y));
        }
    };
    at_y(rect.min.y, &mut hits);
    at_y(rect.max.y, &mut hits);

    match hits.as_slice() {
        [a, b] if !a.approx_eq(*b) => Some(Segment::new(*a, *b)),
        _ => None,
    }
}

/// Visible part of the ray from `origin` through `through`.
///
/// Liang-Barsky clipping over `t >= 0`: an origin inside the rect yields
/// origin to exit, an origin outside yields the entry to exit chord.
fn clip_ray_to_rect(origin: Point, through: Point, rect: &Rect) -> Option<Segment> {
    let dir = through - origin;
    let (mut t_enter, mut t_exit) = (0.0_f64, f64::INFINITY);
    let bounds = [
        (-dir.x, origin.x - rect.min.x),
        (dir.x, rect.max.x - origin.x),
        (-dir.y, origin.y - rect.min.y),
        (dir.y, rect.max.y - origin.y),
    ];
    for (p, q) in bounds {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else if p < 0.0 {
            t_enter = t_enter.max(q / p);
        } else {
            t_exit = t_exit.min(q / p);
        }
    }
    if !t_exit.is_finite() || t_enter > t_exit {
        return None;
    }
    let at = |t: f64| origin + dir.scaled(t);
    let (a, b) = (at(t_enter), at(t_exit));
    (!a.approx_eq(b)).then(|| Segment::new(a, b))
}

/// Clip a (possibly extended) line to the `width` x `height` canvas.
///
/// Without extension the segment is returned unchanged. With one flag the
/// line becomes a ray from the opposite anchor, cut to the part inside the
/// canvas even when that anchor lies off-screen; with both it is the
/// visible chord of the infinite line. `None` means nothing is visible or
/// the direction is undefined because both anchors coincide.
pub fn clip_line_to_rect(
    p1: Point,
    p2: Point,
    width: f64,
    height: f64,
    extend_left: bool,
    extend_right: bool,
) -> Option<Segment> {
    if !extend_left && !extend_right {
        return Some(Segment::new(p1, p2));
    }
    if p1.approx_eq(p2) {
        return None;
    }
    let rect = Rect::from_size(width, height);
    match (extend_left, extend_right) {
        (true, true) => intersect_line_with_rect(Line::through(p1, p2), &rect),
        (true, false) => clip_ray_to_rect(p2, p1, &rect),
        _ => clip_ray_to_rect(p1, p2, &rect),
    }
}

fn arrow_scale(stroke_width: f64) -> f64 {
    match stroke_width as u32 {
        1 => 3.5,
        2 => 2.0,
        3 => 1.5,
        4 => 1.25,
        _ => 1.0,
    }
}

/// Arrowhead strokes for a line ending at `tip`.
///
/// Returns the two barbs plus two short segments that square off the shaft
/// end. Nothing is returned when the head would not fit on the segment or
/// would be thinner than the stroke itself.
pub fn compute_arrow_head(tail: Point, tip: Point, stroke_width: f64) -> Vec<Segment> {
    let half_width = 0.5 * stroke_width;
    let sqrt2 = std::f64::consts::SQRT_2;
    let head_len = 5.0 * stroke_width * arrow_scale(stroke_width);
    let shaft_len = tip.distance_to(tail);
    if head_len * sqrt2 * 0.2 <= half_width || shaft_len < head_len {
        return Vec::new();
    }
    let dir = (tip - tail).normalized();

    let base = tip - dir.scaled(head_len);
    let normal = dir.transposed();
    let spread = normal.scaled(head_len);
    let left = base + spread;
    let right = base - spread;
    let left_end = tip + (left - tip).normalized().scaled(half_width);
    let right_end = tip + (right - tip).normalized().scaled(half_width);

    let offset = normal.scaled(half_width * (sqrt2 - 1.0));
    let back = dir.scaled((head_len - half_width / sqrt2).min(half_width * sqrt2));
    let shaft_a = tip - offset;
    let shaft_b = tip + offset;
    let shaft_end = tip - back;

    vec![
        Segment::new(left, left_end),
        Segment::new(right, right_end),
        Segment::new(shaft_a, shaft_end - offset),
        Segment::new(shaft_b, shaft_end + offset),
    ]
}

/// Points of a quadratic smoothing pass through a freehand polyline.
///
/// Each interior vertex becomes a control point and curve segments end on
/// midpoints, so the stroke passes through the first and last vertex.
pub fn smooth_polyline(points: &[Point]) -> Vec<(Point, Point)> {
    if points.len() < 3 {
        return points.iter().skip(1).map(|p| (*p, *p)).collect();
    }
    let mut curves = Vec::with_capacity(points.len());
    for window in points.windows(2).skip(1) {
        let (control, next) = (window[0], window[1]);
        let mid = Point::new((control.x + next.x) / 2.0, (control.y + next.y) / 2.0);
        curves.push((control, mid));
    }
    if let Some(last) = points.last() {
        curves.push((*last, *last));
    }
    curves
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_stops_at_first_edge() {
        let seg = clip_line_to_rect(
            Point::new(10.0, 50.0),
            Point::new(20.0, 50.0),
            100.0,
            100.0,
            false,
            true,
        )
        .unwrap();
        assert_eq!(seg.b, Point::new(100.0, 50.0));
    }

    #[test]
    fn arrow_head_skipped_on_short_lines() {
        assert!(compute_arrow_head(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 2.0).is_empty());
        assert!(compute_arrow_head(Point::new(0.0, 0.0), Point::new(0.0, 0.0), 0.0).is_empty());
        assert_eq!(compute_arrow_head(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 2.0).len(), 4);
    }

    #[test]
    fn line_style_codes() {
        assert_eq!(LineStyle::try_from(2), Ok(LineStyle::Dashed));
        assert!(LineStyle::try_from(9).is_err());
        assert_eq!(dash_pattern(LineStyle::SparseDotted), &[2.0, 10.0]);
    }
}
