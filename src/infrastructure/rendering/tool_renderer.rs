//! Canvas rendering of every tool kind.
//!
//! Geometry is derived from the tool's domain anchors on every call. All
//! coordinates are snapped to the bitmap grid of the current pixel ratio and
//! unmappable anchors are skipped.

use super::context::DrawingContext;
use crate::domain::geometry::{
    LineStyle, Point, Rect, clip_line_to_rect, compute_arrow_head, point_to_bitmap, scaled_dash_pattern,
    smooth_polyline,
};
use crate::domain::mapping::{ChartScales, resolve_all};
use crate::domain::tools::hit_test::{box_handles, callout_box, channel_offset, position_box, price_label_box};
use crate::domain::tools::levels::{
    PositionZones, fib_extension_levels, fib_retracement_levels, head_and_shoulders_label, price_label_text,
    range_labels, wave_labels,
};
use crate::domain::tools::{FibLevel, Tool, ToolKind};

/// Selection handle radius in CSS pixels
pub const HANDLE_RADIUS: f64 = 6.0;
const AXIS_HANDLE_INSET: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub pixel_ratio: f64,
    pub width: f64,
    pub height: f64,
    pub bar_seconds: i64,
    pub position_min_width: f64,
}

impl RenderParams {
    pub fn new(scales: &dyn ChartScales, bar_seconds: i64, position_min_width: f64) -> Self {
        let (width, height) = scales.pane_size();
        Self { pixel_ratio: scales.pixel_ratio(), width, height, bar_seconds, position_min_width }
    }
}

struct Painter<'a> {
    ctx: &'a mut dyn DrawingContext,
    ratio: f64,
}

impl Painter<'_> {
    fn px(&self, p: Point) -> Point {
        point_to_bitmap(p, self.ratio, self.ratio)
    }

    fn stroke_style(&mut self, color: &str, width: f64, style: LineStyle) {
        self.ctx.set_stroke_color(color);
        self.ctx.set_line_width((width * self.ratio).round().max(1.0));
        self.ctx.set_line_dash(&scaled_dash_pattern(style, self.ratio));
    }

    fn trace(&mut self, points: &[Point]) {
        self.ctx.begin_path();
        for (i, p) in points.iter().enumerate() {
            let b = self.px(*p);
            if i == 0 {
                self.ctx.move_to(b.x, b.y);
            } else {
                self.ctx.line_to(b.x, b.y);
            }
        }
    }

    fn polyline(&mut self, points: &[Point]) {
        if points.len() < 2 {
            return;
        }
        self.trace(points);
        self.ctx.stroke();
    }

    fn segment(&mut self, a: Point, b: Point) {
        self.polyline(&[a, b]);
    }

    fn polygon(&mut self, points: &[Point], fill: Option<&str>, stroke: bool) {
        if points.len() < 3 {
            return;
        }
        self.trace(points);
        self.ctx.close_path();
        if let Some(color) = fill {
            self.ctx.set_fill_color(color);
            self.ctx.fill();
        }
        if stroke {
            self.ctx.stroke();
        }
    }

    fn rect(&mut self, rect: &Rect, fill: Option<&str>, stroke: bool) {
        let (min, max) = (self.px(rect.min), self.px(rect.max));
        if let Some(color) = fill {
            self.ctx.set_fill_color(color);
            self.ctx.fill_rect(min.x, min.y, max.x - min.x, max.y - min.y);
        }
        if stroke {
            self.ctx.stroke_rect(min.x, min.y, max.x - min.x, max.y - min.y);
        }
    }

    fn text(&mut self, text: &str, at: Point, color: &str, font_size: f64, align: &str) {
        let b = self.px(at);
        self.ctx.set_font(&format!("{}px Arial", (font_size * self.ratio).round()));
        self.ctx.set_text_align(align);
        self.ctx.set_text_baseline("middle");
        self.ctx.set_fill_color(color);
        self.ctx.fill_text(text, b.x, b.y);
    }

    fn handle(&mut self, at: Point, color: &str) {
        let b = self.px(at);
        self.ctx.set_line_dash(&[]);
        self.ctx.set_line_width(self.ratio.round().max(1.0));
        self.ctx.begin_path();
        self.ctx.circle(b.x, b.y, HANDLE_RADIUS * self.ratio);
        self.ctx.set_fill_color("#FFFFFF");
        self.ctx.fill();
        self.ctx.set_stroke_color(color);
        self.ctx.stroke();
    }
}

fn level_span(points: &[Point]) -> (f64, f64) {
    points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)))
}

/// Paint every tool after clearing the pane
pub fn render_tools<'a>(
    ctx: &mut dyn DrawingContext,
    tools: impl IntoIterator<Item = &'a Tool>,
    scales: &dyn ChartScales,
    params: &RenderParams,
) {
    ctx.clear(params.width * params.pixel_ratio, params.height * params.pixel_ratio);
    for tool in tools {
        render_tool(ctx, tool, scales, params);
    }
}

pub fn render_tool(ctx: &mut dyn DrawingContext, tool: &Tool, scales: &dyn ChartScales, params: &RenderParams) {
    let screen = resolve_all(&tool.points, scales);
    let pts: Vec<Point> = screen.iter().flatten().copied().collect();
    let first = screen.first().copied().flatten();
    let second = screen.get(1).copied().flatten();
    let third = screen.get(2).copied().flatten();
    let (w, h) = (params.width, params.height);
    let o = &tool.options;
    let color = o.stroke_color().to_string();
    let width = o.stroke_width();

    ctx.save();
    let mut p = Painter { ctx, ratio: params.pixel_ratio };
    p.stroke_style(&color, width, o.style());

    let mut handles: Vec<Point> = pts.clone();

    use ToolKind::*;
    match tool.kind {
        TrendLine | Ray | ExtendedLine | Arrow => {
            if let (Some(a), Some(b)) = (first, second) {
                let (extend_left, extend_right) = o.extends();
                if let Some(seg) = clip_line_to_rect(a, b, w, h, extend_left, extend_right) {
                    p.segment(seg.a, seg.b);
                }
                p.ctx.set_line_dash(&[]);
                if o.right_end == Some(1) {
                    for s in compute_arrow_head(a, b, width) {
                        p.segment(s.a, s.b);
                    }
                }
                if o.left_end == Some(1) {
                    for s in compute_arrow_head(b, a, width) {
                        p.segment(s.a, s.b);
                    }
                }
            }
        }
        HorizontalLine => {
            if let Some(y) = tool.points.first().and_then(|pt| scales.price_to_coordinate(pt.price)) {
                p.segment(Point::new(0.0, y), Point::new(w, y));
                let label = price_label_text(tool.points[0].price);
                p.text(&label, Point::new(w - 4.0, y - 8.0), &color, 11.0, "right");
                handles = vec![Point::new(w - AXIS_HANDLE_INSET, y)];
            }
        }
        HorizontalRay => {
            if let Some(a) = first {
                p.segment(a, Point::new(w, a.y));
                let label = price_label_text(tool.points[0].price);
                p.text(&label, Point::new(w - 4.0, a.y - 8.0), &color, 11.0, "right");
            }
        }
        VerticalLine => {
            if let Some(x) = tool.points.first().and_then(|pt| scales.logical_to_coordinate(pt.logical)) {
                p.segment(Point::new(x, 0.0), Point::new(x, h));
                handles = vec![Point::new(x, h - AXIS_HANDLE_INSET)];
            }
        }
        CrossLine => {
            if let Some(a) = first {
                p.segment(Point::new(0.0, a.y), Point::new(w, a.y));
                p.segment(Point::new(a.x, 0.0), Point::new(a.x, h));
            }
        }
        Rectangle => {
            if let (Some(a), Some(b)) = (first, second) {
                p.rect(&Rect::from_corners(a, b), o.background_color.as_deref(), true);
                handles = box_handles(a, b).to_vec();
            }
        }
        Circle => {
            if let (Some(center), Some(edge)) = (first, second) {
                let c = p.px(center);
                p.ctx.begin_path();
                p.ctx.circle(c.x, c.y, (center.distance_to(edge) * p.ratio).round());
                if let Some(fill) = o.background_color.as_deref() {
                    p.ctx.set_fill_color(fill);
                    p.ctx.fill();
                }
                p.ctx.stroke();
            }
        }
        Triangle => {
            if pts.len() >= 3 {
                p.polygon(&pts, o.background_color.as_deref(), true);
            } else {
                p.polyline(&pts);
            }
        }
        ParallelChannel => {
            if let (Some(a), Some(b)) = (first, second) {
                match third {
                    Some(c) => {
                        let d = channel_offset(a, b, c);
                        let (a2, b2) = (Point::new(a.x, a.y + d), Point::new(b.x, b.y + d));
                        p.polygon(&[a, b, b2, a2], o.background_color.as_deref(), false);
                        p.segment(a, b);
                        p.segment(a2, b2);
                        if o.show_middle.unwrap_or(false) {
                            p.stroke_style(&color, width, LineStyle::Dashed);
                            p.segment(Point::new(a.x, a.y + d / 2.0), Point::new(b.x, b.y + d / 2.0));
                        }
                        handles = vec![a, b, a2, b2];
                    }
                    Option::None => p.segment(a, b),
                }
            }
        }
        FibRetracement => {
            if let (Some(a), Some(b)) = (first, second) {
                let defaults = FibLevel::retracement_defaults();
                let levels = o.levels.as_deref().unwrap_or(&defaults);
                let (left, right) = level_span(&[a, b]);
                for level in fib_retracement_levels(&tool.points[0], &tool.points[1], levels) {
                    let Some(y) = scales.price_to_coordinate(level.price) else { continue };
                    p.stroke_style(&level.color, width, LineStyle::Solid);
                    p.segment(Point::new(left, y), Point::new(right, y));
                    p.text(&level.label, Point::new(left + 4.0, y - 8.0), &level.color, 11.0, "left");
                }
                p.stroke_style("#787B86", 1.0, LineStyle::Dashed);
                p.segment(a, b);
            }
        }
        FibExtension => {
            p.stroke_style("#787B86", 1.0, LineStyle::Dashed);
            p.polyline(&pts);
            if let (Some(p1), Some(p2), Some(p3)) = (tool.points.first(), tool.points.get(1), tool.points.get(2)) {
                if pts.len() == 3 {
                    let defaults = FibLevel::extension_defaults();
                    let levels = o.levels.as_deref().unwrap_or(&defaults);
                    let (left, right) = level_span(&pts);
                    for level in fib_extension_levels(p1, p2, p3, levels) {
                        let Some(y) = scales.price_to_coordinate(level.price) else { continue };
                        p.stroke_style(&level.color, width, LineStyle::Solid);
                        p.segment(Point::new(left, y), Point::new(right, y));
                        p.text(&level.label, Point::new(right + 4.0, y), &level.color, 11.0, "left");
                    }
                }
            }
        }
        Text => {
            if let Some(a) = first {
                let text_color = o.color.as_deref().or(o.text_color.as_deref()).unwrap_or("#131722");
                p.text(o.text_or_default(), a, text_color, o.font_size_or(14.0), "left");
            }
        }
        Callout => {
            if let (Some(anchor), Some(label)) = (first, second) {
                p.segment(anchor, label);
                let font_size = o.font_size_or(12.0);
                let text = o.text_or_default();
                let area = callout_box(label, text, font_size);
                p.ctx.set_line_dash(&[]);
                p.rect(&area, o.background_color.as_deref(), true);
                let text_color = o.text_color.as_deref().unwrap_or("#131722");
                p.text(text, Point::new(area.min.x + 10.0, area.center().y), text_color, font_size, "left");
            }
        }
        PriceLabel => {
            if let Some(a) = first {
                let text = o.text.clone().unwrap_or_else(|| price_label_text(tool.points[0].price));
                let font_size = o.font_size_or(12.0);
                let area = price_label_box(a, &text, font_size);
                let background = o.background_color.as_deref().unwrap_or("#2962FF");
                p.stroke_style(background, 1.0, LineStyle::Solid);
                p.segment(a, Point::new(area.min.x, area.max.y));
                p.rect(&area, Some(background), false);
                let text_color = o.text_color.as_deref().unwrap_or("#FFFFFF");
                p.text(&text, area.center(), text_color, font_size, "center");
            }
        }
        Brush | Highlighter | Path => {
            p.ctx.set_global_alpha(o.opacity.unwrap_or(1.0));
            if o.is_smooth() && pts.len() >= 3 {
                p.trace(&pts[..1]);
                for (control, end) in smooth_polyline(&pts) {
                    let (c, e) = (p.px(control), p.px(end));
                    p.ctx.quadratic_curve_to(c.x, c.y, e.x, e.y);
                }
                p.ctx.stroke();
            } else {
                p.polyline(&pts);
            }
            p.ctx.set_global_alpha(1.0);
            if o.is_smooth() {
                handles.clear();
            }
        }
        LongPosition | ShortPosition => {
            if pts.len() == 3 {
                if let (Some(zones), Some(area)) =
                    (PositionZones::from_points(&tool.points), position_box(&pts, params.position_min_width))
                {
                    let (entry_y, stop_y, target_y) = (pts[0].y, pts[1].y, pts[2].y);
                    let (left, right) = (area.min.x, area.max.x);
                    let profit = Rect::from_corners(Point::new(left, entry_y), Point::new(right, target_y));
                    let loss = Rect::from_corners(Point::new(left, entry_y), Point::new(right, stop_y));
                    p.rect(&profit, o.profit_color.as_deref(), false);
                    p.rect(&loss, o.loss_color.as_deref(), false);
                    p.segment(Point::new(left, entry_y), Point::new(right, entry_y));

                    let text_color = o.text_color.as_deref().unwrap_or("#FFFFFF");
                    let labels = zones.labels();
                    let rows = [target_y, stop_y, entry_y];
                    for (label, y) in labels.iter().zip(rows) {
                        p.text(label, Point::new((left + right) / 2.0, y), text_color, 11.0, "center");
                    }
                }
            }
        }
        Measure | PriceRange | DateRange | DatePriceRange => {
            if let (Some(a), Some(b)) = (first, second) {
                let area = Rect::from_corners(a, b);
                let border = o.border_color.as_deref().unwrap_or(&color).to_string();
                p.stroke_style(&border, o.border_width.unwrap_or(1.0), LineStyle::Solid);
                p.rect(&area, o.background_color.as_deref(), true);
                let center = area.center();
                if matches!(tool.kind, PriceRange | DatePriceRange | Measure) {
                    p.segment(Point::new(center.x, a.y), Point::new(center.x, b.y));
                }
                if matches!(tool.kind, DateRange | DatePriceRange | Measure) {
                    p.segment(Point::new(a.x, center.y), Point::new(b.x, center.y));
                }
                let labels = range_labels(tool.kind, &tool.points[0], &tool.points[1], params.bar_seconds);
                let text_color = o.text_color.as_deref().unwrap_or("#FFFFFF");
                for (i, label) in labels.iter().enumerate() {
                    let at = Point::new(center.x, area.max.y + 14.0 + i as f64 * 14.0);
                    p.rect(
                        &Rect::from_corners(Point::new(at.x - 70.0, at.y - 7.0), Point::new(at.x + 70.0, at.y + 7.0)),
                        Some(&border),
                        false,
                    );
                    p.text(label, at, text_color, 11.0, "center");
                }
                handles = box_handles(a, b).to_vec();
            }
        }
        ElliottImpulse | ElliottCorrection => {
            p.polyline(&pts);
            let labels = wave_labels(tool.kind);
            let text_color = o.text_color.as_deref().unwrap_or(&color).to_string();
            for (point, label) in screen.iter().zip(labels) {
                if let Some(point) = point {
                    p.text(label, Point::new(point.x, point.y - 12.0), &text_color, 12.0, "center");
                }
            }
        }
        HeadAndShoulders => {
            if pts.len() >= 3 {
                p.polygon(&pts, o.fill_color.as_deref(), false);
            }
            p.polyline(&pts);
            let background = o.label_background_color.as_deref().unwrap_or(&color).to_string();
            let text_color = o.label_text_color.as_deref().unwrap_or("#FFFFFF").to_string();
            for (i, point) in screen.iter().enumerate() {
                let (Some(point), Some(label)) = (point, head_and_shoulders_label(i)) else { continue };
                let at = Point::new(point.x, point.y - 16.0);
                let half = label.chars().count() as f64 * 3.5 + 6.0;
                p.rect(
                    &Rect::from_corners(Point::new(at.x - half, at.y - 8.0), Point::new(at.x + half, at.y + 8.0)),
                    Some(&background),
                    false,
                );
                p.text(label, at, &text_color, 11.0, "center");
            }
        }
        None | Eraser | UserPriceAlerts => {}
    }

    if tool.selected {
        for handle in handles {
            p.handle(handle, &color);
        }
    }
    p.ctx.restore();
}
