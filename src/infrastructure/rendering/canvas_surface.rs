use super::tool_renderer::{RenderParams, render_tools};
use crate::application::chart_surface::ChartSurface;
use crate::domain::errors::InfrastructureError;
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::mapping::{ChartScales, LinearScales, PriceScale, TimeScale};
use crate::domain::tools::{Tool, ToolId};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

struct SurfaceState {
    canvas_id: String,
    scales: LinearScales,
    attached: BTreeSet<ToolId>,
    interaction_enabled: bool,
    dirty: bool,
}

/// Overlay canvas laid over the host chart pane.
///
/// Cloning yields another handle to the same canvas, so the facade can keep
/// one for painting while the tool manager owns another. Scales are pushed
/// in by the host whenever the visible range changes; drawing is deferred
/// until [`CanvasChartSurface::render`] is called with the tools to paint.
#[derive(Clone)]
pub struct CanvasChartSurface {
    state: Rc<RefCell<SurfaceState>>,
}

impl CanvasChartSurface {
    pub fn new(canvas_id: impl Into<String>, scales: LinearScales) -> Self {
        Self {
            state: Rc::new(RefCell::new(SurfaceState {
                canvas_id: canvas_id.into(),
                scales,
                attached: BTreeSet::new(),
                interaction_enabled: true,
                dirty: true,
            })),
        }
    }

    pub fn canvas_id(&self) -> String {
        self.state.borrow().canvas_id.clone()
    }

    pub fn scales(&self) -> LinearScales {
        self.state.borrow().scales.clone()
    }

    /// Replace the scales and schedule a repaint
    pub fn set_scales(&self, scales: LinearScales) {
        let mut state = self.state.borrow_mut();
        state.scales = scales;
        state.dirty = true;
    }

    pub fn resize(&self, width: f64, height: f64, pixel_ratio: f64) {
        let mut state = self.state.borrow_mut();
        state.scales.width = width;
        state.scales.height = height;
        state.scales.pixel_ratio = pixel_ratio.max(1.0);
        state.dirty = true;
    }

    pub fn is_attached(&self, id: ToolId) -> bool {
        self.state.borrow().attached.contains(&id)
    }

    pub fn interaction_enabled(&self) -> bool {
        self.state.borrow().interaction_enabled
    }

    pub fn is_dirty(&self) -> bool {
        self.state.borrow().dirty
    }

    fn canvas_context(state: &SurfaceState) -> Result<CanvasRenderingContext2d, InfrastructureError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| InfrastructureError::BrowserApi("document not available".into()))?;
        let canvas = document
            .get_element_by_id(&state.canvas_id)
            .ok_or_else(|| InfrastructureError::Rendering(format!("canvas '{}' not found", state.canvas_id)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| InfrastructureError::Rendering(format!("'{}' is not a canvas", state.canvas_id)))?;

        let ratio = state.scales.pixel_ratio;
        canvas.set_width((state.scales.width * ratio).round() as u32);
        canvas.set_height((state.scales.height * ratio).round() as u32);

        canvas
            .get_context("2d")
            .map_err(|_| InfrastructureError::Rendering("failed to get 2D context".into()))?
            .ok_or_else(|| InfrastructureError::Rendering("2D context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| InfrastructureError::Rendering("failed to cast to 2D context".into()))
    }

    /// Paint the attached subset of `tools` and clear the dirty flag
    pub fn render<'a>(
        &self,
        tools: impl IntoIterator<Item = &'a Tool>,
        bar_seconds: i64,
        position_min_width: f64,
    ) -> Result<(), InfrastructureError> {
        let mut state = self.state.borrow_mut();
        let mut context = Self::canvas_context(&state)?;
        let params = RenderParams::new(&state.scales, bar_seconds, position_min_width);
        let visible: Vec<&Tool> = tools.into_iter().filter(|t| state.attached.contains(&t.id)).collect();
        render_tools(&mut context, visible.iter().copied(), &state.scales, &params);
        state.dirty = false;
        get_logger().trace(
            LogComponent::Infrastructure("CanvasSurface"),
            &format!("painted {} tools", visible.len()),
        );
        Ok(())
    }
}

impl TimeScale for CanvasChartSurface {
    fn logical_to_coordinate(&self, logical: f64) -> Option<f64> {
        self.state.borrow().scales.logical_to_coordinate(logical)
    }

    fn coordinate_to_logical(&self, x: f64) -> Option<f64> {
        self.state.borrow().scales.coordinate_to_logical(x)
    }
}

impl PriceScale for CanvasChartSurface {
    fn price_to_coordinate(&self, price: f64) -> Option<f64> {
        self.state.borrow().scales.price_to_coordinate(price)
    }

    fn coordinate_to_price(&self, y: f64) -> Option<f64> {
        self.state.borrow().scales.coordinate_to_price(y)
    }
}

impl ChartScales for CanvasChartSurface {
    fn pane_size(&self) -> (f64, f64) {
        self.state.borrow().scales.pane_size()
    }

    fn pixel_ratio(&self) -> f64 {
        self.state.borrow().scales.pixel_ratio
    }
}

impl ChartSurface for CanvasChartSurface {
    fn attach(&mut self, tool: ToolId) {
        let mut state = self.state.borrow_mut();
        state.attached.insert(tool);
        state.dirty = true;
    }

    fn detach(&mut self, tool: ToolId) {
        let mut state = self.state.borrow_mut();
        state.attached.remove(&tool);
        state.dirty = true;
    }

    fn set_interaction_enabled(&mut self, enabled: bool) {
        self.state.borrow_mut().interaction_enabled = enabled;
    }

    fn request_redraw(&mut self) {
        self.state.borrow_mut().dirty = true;
    }
}
