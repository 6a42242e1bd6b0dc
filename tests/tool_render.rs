use price_chart_tools::domain::mapping::{ChartScales, DomainPoint, LinearScales};
use price_chart_tools::infrastructure::CanvasChartSurface;
use price_chart_tools::domain::tools::{Tool, ToolId, ToolKind};
use price_chart_tools::infrastructure::rendering::{
    DrawCommand, PathOp, RecordingContext, RenderParams, render_tool, render_tools,
};

fn tool(kind: ToolKind, points: &[(f64, f64)]) -> Tool {
    let points = points.iter().map(|&(l, p)| DomainPoint::new(l, p)).collect();
    Tool::new(ToolId::from(1), kind, points, kind.default_options())
}

fn paint(tool: &Tool, scales: &LinearScales, bar_seconds: i64) -> RecordingContext {
    let mut ctx = RecordingContext::new();
    render_tool(&mut ctx, tool, scales, &RenderParams::new(scales, bar_seconds, 50.0));
    ctx
}

#[test]
fn trend_line_is_a_single_stroke() {
    let ctx = paint(&tool(ToolKind::TrendLine, &[(10.0, 50.0), (20.0, 60.0)]), &LinearScales::default(), 60);
    let strokes: Vec<&DrawCommand> = ctx.strokes().collect();
    assert_eq!(strokes.len(), 1);
    assert_eq!(
        strokes[0],
        &DrawCommand::Stroke {
            color: "rgb(0, 0, 0)".into(),
            width: 2.0,
            dash: Vec::new(),
            path: vec![PathOp::Move { x: 80.0, y: 300.0 }, PathOp::Line { x: 160.0, y: 240.0 }],
        }
    );
}

#[test]
fn bitmap_coordinates_follow_pixel_ratio() {
    let mut scales = LinearScales::default();
    scales.pixel_ratio = 2.0;
    let ctx = paint(&tool(ToolKind::TrendLine, &[(10.0, 50.0), (20.0, 60.0)]), &scales, 60);
    match ctx.strokes().next() {
        Some(DrawCommand::Stroke { width, path, .. }) => {
            assert_eq!(*width, 4.0);
            assert_eq!(path[0], PathOp::Move { x: 160.0, y: 600.0 });
        }
        other => panic!("expected a stroke, got {:?}", other),
    }
}

#[test]
fn arrow_adds_head_strokes() {
    let ctx = paint(&tool(ToolKind::Arrow, &[(10.0, 50.0), (30.0, 50.0)]), &LinearScales::default(), 60);
    assert_eq!(ctx.strokes().count(), 5);
}

#[test]
fn selection_draws_handles() {
    let mut line = tool(ToolKind::TrendLine, &[(10.0, 50.0), (20.0, 60.0)]);
    line.selected = true;
    let ctx = paint(&line, &LinearScales::default(), 60);
    let handles = ctx
        .strokes()
        .filter(|c| matches!(c, DrawCommand::Stroke { path, .. } if matches!(path.first(), Some(PathOp::Circle { r, .. }) if *r == 6.0)))
        .count();
    assert_eq!(handles, 2);
}

#[test]
fn horizontal_line_spans_the_pane_with_a_price_label() {
    let ctx = paint(&tool(ToolKind::HorizontalLine, &[(10.0, 50.0)]), &LinearScales::default(), 60);
    match ctx.strokes().next() {
        Some(DrawCommand::Stroke { path, .. }) => {
            assert_eq!(path, &vec![PathOp::Move { x: 0.0, y: 300.0 }, PathOp::Line { x: 800.0, y: 300.0 }]);
        }
        other => panic!("expected a stroke, got {:?}", other),
    }
    assert_eq!(ctx.texts(), vec!["50.00"]);
}

#[test]
fn measure_labels_use_bar_duration() {
    let ctx = paint(&tool(ToolKind::Measure, &[(10.0, 40.0), (13.0, 44.0)]), &LinearScales::default(), 3600);
    assert_eq!(ctx.texts(), vec!["+4.00 (+10.00%)", "3 bars, 3h 0m"]);
}

#[test]
fn position_box_reports_risk_reward() {
    let long = tool(ToolKind::LongPosition, &[(10.0, 50.0), (20.0, 45.0), (20.0, 60.0)]);
    let ctx = paint(&long, &LinearScales::default(), 60);
    let texts = ctx.texts();
    assert_eq!(texts.len(), 3);
    assert_eq!(texts[2], "Risk/Reward: 2.00");
    assert!(ctx.commands.iter().any(|c| matches!(c, DrawCommand::FillRect { .. })));
}

#[test]
fn render_tools_clears_first() {
    let tools = vec![
        tool(ToolKind::TrendLine, &[(10.0, 50.0), (20.0, 60.0)]),
        tool(ToolKind::Text, &[(30.0, 30.0)]),
    ];
    let scales = LinearScales::default();
    let mut ctx = RecordingContext::new();
    render_tools(&mut ctx, &tools, &scales, &RenderParams::new(&scales, 60, 50.0));
    assert_eq!(ctx.commands.first(), Some(&DrawCommand::Clear));
    assert_eq!(ctx.texts(), vec!["Text"]);
}

#[test]
fn off_scale_points_are_skipped() {
    let flat = LinearScales::default().with_ranges((0.0, 0.0), (0.0, 100.0));
    let ctx = paint(&tool(ToolKind::TrendLine, &[(10.0, 50.0), (20.0, 60.0)]), &flat, 60);
    assert_eq!(ctx.strokes().count(), 0);
}

#[test]
fn horizontal_line_needs_only_the_price_scale() {
    let no_time = LinearScales::default().with_ranges((0.0, 0.0), (0.0, 100.0));
    let ctx = paint(&tool(ToolKind::HorizontalLine, &[(10.0, 50.0)]), &no_time, 60);
    assert_eq!(ctx.strokes().count(), 1);
    assert_eq!(ctx.texts(), vec!["50.00"]);
}

#[test]
fn off_screen_ray_still_reaches_the_edge() {
    let mut ray = tool(ToolKind::Ray, &[(-10.0, 50.0), (-5.0, 50.0)]);
    ray.options.extend_right = Some(true);
    let ctx = paint(&ray, &LinearScales::default(), 60);
    match ctx.strokes().next() {
        Some(DrawCommand::Stroke { path, .. }) => {
            assert_eq!(path, &vec![PathOp::Move { x: 0.0, y: 300.0 }, PathOp::Line { x: 800.0, y: 300.0 }]);
        }
        other => panic!("expected a stroke, got {:?}", other),
    }
}

#[test]
fn canvas_surface_is_exported_from_infrastructure() {
    let surface = CanvasChartSurface::new("overlay", LinearScales::default());
    assert_eq!(surface.canvas_id(), "overlay");
    assert!(surface.is_dirty());
    assert_eq!(surface.pane_size(), (800.0, 600.0));
}
