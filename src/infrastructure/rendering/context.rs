use serde::Serialize;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// The subset of the 2D canvas API tools draw with. All coordinates are in
/// bitmap pixels.
pub trait DrawingContext {
    fn save(&mut self);
    fn restore(&mut self);
    fn clear(&mut self, width: f64, height: f64);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn quadratic_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64);
    /// Full circle
    fn circle(&mut self, x: f64, y: f64, radius: f64);
    fn close_path(&mut self);
    fn stroke(&mut self);
    fn fill(&mut self);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn set_stroke_color(&mut self, color: &str);
    fn set_fill_color(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_line_dash(&mut self, pattern: &[f64]);
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: &str);
    fn set_text_baseline(&mut self, baseline: &str);
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
    fn measure_text(&mut self, text: &str) -> f64;
}

#[allow(deprecated)]
impl DrawingContext for CanvasRenderingContext2d {
    fn save(&mut self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&mut self) {
        CanvasRenderingContext2d::restore(self);
    }

    fn clear(&mut self, width: f64, height: f64) {
        self.clear_rect(0.0, 0.0, width, height);
    }

    fn begin_path(&mut self) {
        CanvasRenderingContext2d::begin_path(self);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        CanvasRenderingContext2d::move_to(self, x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        CanvasRenderingContext2d::line_to(self, x, y);
    }

    fn quadratic_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        CanvasRenderingContext2d::quadratic_curve_to(self, cx, cy, x, y);
    }

    fn circle(&mut self, x: f64, y: f64, radius: f64) {
        let _ = self.arc(x, y, radius.max(0.0), 0.0, std::f64::consts::TAU);
    }

    fn close_path(&mut self) {
        CanvasRenderingContext2d::close_path(self);
    }

    fn stroke(&mut self) {
        CanvasRenderingContext2d::stroke(self);
    }

    fn fill(&mut self) {
        CanvasRenderingContext2d::fill(self);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        CanvasRenderingContext2d::fill_rect(self, x, y, width, height);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        CanvasRenderingContext2d::stroke_rect(self, x, y, width, height);
    }

    fn set_stroke_color(&mut self, color: &str) {
        self.set_stroke_style(&JsValue::from_str(color));
    }

    fn set_fill_color(&mut self, color: &str) {
        self.set_fill_style(&JsValue::from_str(color));
    }

    fn set_line_width(&mut self, width: f64) {
        CanvasRenderingContext2d::set_line_width(self, width);
    }

    fn set_line_dash(&mut self, pattern: &[f64]) {
        let segments: js_sys::Array = pattern.iter().map(|v| JsValue::from_f64(*v)).collect();
        let _ = CanvasRenderingContext2d::set_line_dash(self, &segments);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        CanvasRenderingContext2d::set_global_alpha(self, alpha);
    }

    fn set_font(&mut self, font: &str) {
        CanvasRenderingContext2d::set_font(self, font);
    }

    fn set_text_align(&mut self, align: &str) {
        CanvasRenderingContext2d::set_text_align(self, align);
    }

    fn set_text_baseline(&mut self, baseline: &str) {
        CanvasRenderingContext2d::set_text_baseline(self, baseline);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        let _ = CanvasRenderingContext2d::fill_text(self, text, x, y);
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        CanvasRenderingContext2d::measure_text(self, text).map(|m| m.width()).unwrap_or(0.0)
    }
}

/// Painted output captured by [`RecordingContext`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCommand {
    Clear,
    Stroke { color: String, width: f64, dash: Vec<f64>, path: Vec<PathOp> },
    Fill { color: String, alpha: f64, path: Vec<PathOp> },
    FillRect { color: String, x: f64, y: f64, width: f64, height: f64 },
    StrokeRect { color: String, x: f64, y: f64, width: f64, height: f64 },
    Text { text: String, x: f64, y: f64, color: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PathOp {
    Move { x: f64, y: f64 },
    Line { x: f64, y: f64 },
    Quad { cx: f64, cy: f64, x: f64, y: f64 },
    Circle { x: f64, y: f64, r: f64 },
    Close,
}

#[derive(Debug, Clone)]
struct PaintState {
    stroke: String,
    fill: String,
    width: f64,
    dash: Vec<f64>,
    alpha: f64,
}

impl Default for PaintState {
    fn default() -> Self {
        Self { stroke: "#000000".into(), fill: "#000000".into(), width: 1.0, dash: Vec::new(), alpha: 1.0 }
    }
}

/// Headless context that records paint operations, for tests and snapshots
#[derive(Debug, Clone, Default)]
pub struct RecordingContext {
    pub commands: Vec<DrawCommand>,
    path: Vec<PathOp>,
    state: PaintState,
    stack: Vec<PaintState>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strokes(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Stroke { .. }))
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DrawingContext for RecordingContext {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn clear(&mut self, _width: f64, _height: f64) {
        self.commands.push(DrawCommand::Clear);
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.push(PathOp::Move { x, y });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.path.push(PathOp::Line { x, y });
    }

    fn quadratic_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.path.push(PathOp::Quad { cx, cy, x, y });
    }

    fn circle(&mut self, x: f64, y: f64, radius: f64) {
        self.path.push(PathOp::Circle { x, y, r: radius });
    }

    fn close_path(&mut self) {
        self.path.push(PathOp::Close);
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke {
            color: self.state.stroke.clone(),
            width: self.state.width,
            dash: self.state.dash.clone(),
            path: self.path.clone(),
        });
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill {
            color: self.state.fill.clone(),
            alpha: self.state.alpha,
            path: self.path.clone(),
        });
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let color = self.state.fill.clone();
        self.commands.push(DrawCommand::FillRect { color, x, y, width, height });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let color = self.state.stroke.clone();
        self.commands.push(DrawCommand::StrokeRect { color, x, y, width, height });
    }

    fn set_stroke_color(&mut self, color: &str) {
        self.state.stroke = color.to_string();
    }

    fn set_fill_color(&mut self, color: &str) {
        self.state.fill = color.to_string();
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.width = width;
    }

    fn set_line_dash(&mut self, pattern: &[f64]) {
        self.state.dash = pattern.to_vec();
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.alpha = alpha;
    }

    fn set_font(&mut self, _font: &str) {}

    fn set_text_align(&mut self, _align: &str) {}

    fn set_text_baseline(&mut self, _baseline: &str) {}

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        let color = self.state.fill.clone();
        self.commands.push(DrawCommand::Text { text: text.to_string(), x, y, color });
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        text.chars().count() as f64 * 7.0
    }
}
