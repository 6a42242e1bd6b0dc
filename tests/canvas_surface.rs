#![cfg(feature = "render")]
use price_chart_tools::ChartTools;
use price_chart_tools::application::{ChartSurface, with_global_coordinator};
use price_chart_tools::domain::mapping::{DomainPoint, LinearScales};
use price_chart_tools::domain::tools::{Tool, ToolId, ToolKind};
use price_chart_tools::infrastructure::rendering::CanvasChartSurface;
use wasm_bindgen_test::*;

wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

fn mount_canvas(id: &str) {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document.create_element("canvas").unwrap();
    canvas.set_id(id);
    document.body().unwrap().append_child(&canvas).unwrap();
}

#[wasm_bindgen_test]
fn surface_paints_attached_tools() {
    mount_canvas("surface-paint");
    let mut surface = CanvasChartSurface::new("surface-paint", LinearScales::new(400.0, 300.0));
    let tool = Tool::new(
        ToolId::from(7),
        ToolKind::TrendLine,
        vec![DomainPoint::new(10.0, 20.0), DomainPoint::new(40.0, 80.0)],
        ToolKind::TrendLine.default_options(),
    );
    surface.attach(tool.id);
    assert!(surface.is_dirty());
    surface.render([&tool], 60, 50.0).unwrap();
    assert!(!surface.is_dirty());

    surface.resize(500.0, 300.0, 2.0);
    assert!(surface.is_dirty());
    assert_eq!(surface.scales().pixel_ratio, 2.0);
}

#[wasm_bindgen_test]
fn missing_canvas_is_an_error() {
    let surface = CanvasChartSurface::new("no-such-canvas", LinearScales::default());
    assert!(surface.render(std::iter::empty(), 60, 50.0).is_err());
    assert!(surface.is_dirty());
}

#[wasm_bindgen_test]
fn facade_places_a_trend_line() {
    mount_canvas("facade-canvas");
    let tools = ChartTools::new("facade-canvas".into(), 800.0, 600.0, 1.0, None);
    tools.set_scales(0.0, 100.0, 0.0, 100.0);
    tools.start_tool("TrendLine").unwrap();
    assert_eq!(tools.active_tool(), "TrendLine");
    assert!(!tools.chart_interaction_enabled());

    tools.click(80.0, 300.0, 0.0);
    tools.click(160.0, 240.0, 1000.0);
    assert_eq!(tools.active_tool(), "None");
    assert_eq!(with_global_coordinator(|c| c.manager().tools().len()), Some(1));

    assert!(tools.undo());
    assert_eq!(with_global_coordinator(|c| c.manager().tools().len()), Some(0));
    assert!(tools.start_tool("NotATool").is_err());
}
