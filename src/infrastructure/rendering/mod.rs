//! Canvas 2D painting of drawing tools.

pub mod canvas_surface;
pub mod context;
pub mod tool_renderer;

pub use canvas_surface::CanvasChartSurface;
pub use context::{DrawCommand, DrawingContext, PathOp, RecordingContext};
pub use tool_renderer::{HANDLE_RADIUS, RenderParams, render_tool, render_tools};
