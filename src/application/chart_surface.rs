use crate::domain::mapping::{ChartScales, LinearScales, PriceScale, TimeScale};
use crate::domain::tools::ToolId;

/// Chart pane the tools are drawn on.
///
/// The manager only holds ids; the surface keeps whatever rendering handle it
/// needs per attached tool and drops it on `detach`.
pub trait ChartSurface: ChartScales {
    fn attach(&mut self, tool: ToolId);
    fn detach(&mut self, tool: ToolId);
    /// Chart pan/zoom on pointer drag and wheel
    fn set_interaction_enabled(&mut self, enabled: bool);
    fn request_redraw(&mut self);
}

impl<T: TimeScale + ?Sized> TimeScale for Box<T> {
    fn logical_to_coordinate(&self, logical: f64) -> Option<f64> {
        (**self).logical_to_coordinate(logical)
    }

    fn coordinate_to_logical(&self, x: f64) -> Option<f64> {
        (**self).coordinate_to_logical(x)
    }
}

impl<P: PriceScale + ?Sized> PriceScale for Box<P> {
    fn price_to_coordinate(&self, price: f64) -> Option<f64> {
        (**self).price_to_coordinate(price)
    }

    fn coordinate_to_price(&self, y: f64) -> Option<f64> {
        (**self).coordinate_to_price(y)
    }
}

impl<C: ChartScales + ?Sized> ChartScales for Box<C> {
    fn pane_size(&self) -> (f64, f64) {
        (**self).pane_size()
    }

    fn pixel_ratio(&self) -> f64 {
        (**self).pixel_ratio()
    }
}

impl<S: ChartSurface + ?Sized> ChartSurface for Box<S> {
    fn attach(&mut self, tool: ToolId) {
        (**self).attach(tool)
    }

    fn detach(&mut self, tool: ToolId) {
        (**self).detach(tool)
    }

    fn set_interaction_enabled(&mut self, enabled: bool) {
        (**self).set_interaction_enabled(enabled)
    }

    fn request_redraw(&mut self) {
        (**self).request_redraw()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceCall {
    Attach(ToolId),
    Detach(ToolId),
    Interaction(bool),
    Redraw,
}

/// Headless surface over linear scales that records every call
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub scales: LinearScales,
    pub calls: Vec<SurfaceCall>,
    pub attached: Vec<ToolId>,
    pub interaction_enabled: bool,
}

impl RecordingSurface {
    pub fn new(scales: LinearScales) -> Self {
        Self { scales, calls: Vec::new(), attached: Vec::new(), interaction_enabled: true }
    }

    pub fn redraw_count(&self) -> usize {
        self.calls.iter().filter(|c| **c == SurfaceCall::Redraw).count()
    }
}

impl TimeScale for RecordingSurface {
    fn logical_to_coordinate(&self, logical: f64) -> Option<f64> {
        self.scales.logical_to_coordinate(logical)
    }

    fn coordinate_to_logical(&self, x: f64) -> Option<f64> {
        self.scales.coordinate_to_logical(x)
    }
}

impl PriceScale for RecordingSurface {
    fn price_to_coordinate(&self, price: f64) -> Option<f64> {
        self.scales.price_to_coordinate(price)
    }

    fn coordinate_to_price(&self, y: f64) -> Option<f64> {
        self.scales.coordinate_to_price(y)
    }
}

impl ChartScales for RecordingSurface {
    fn pane_size(&self) -> (f64, f64) {
        self.scales.pane_size()
    }

    fn pixel_ratio(&self) -> f64 {
        self.scales.pixel_ratio
    }
}

impl ChartSurface for RecordingSurface {
    fn attach(&mut self, tool: ToolId) {
        if !self.attached.contains(&tool) {
            self.attached.push(tool);
        }
        self.calls.push(SurfaceCall::Attach(tool));
    }

    fn detach(&mut self, tool: ToolId) {
        self.attached.retain(|t| *t != tool);
        self.calls.push(SurfaceCall::Detach(tool));
    }

    fn set_interaction_enabled(&mut self, enabled: bool) {
        self.interaction_enabled = enabled;
        self.calls.push(SurfaceCall::Interaction(enabled));
    }

    fn request_redraw(&mut self) {
        self.calls.push(SurfaceCall::Redraw);
    }
}
