use price_chart_tools::domain::mapping::DomainPoint;
use price_chart_tools::domain::tools::{Tool, ToolId, ToolKind, ToolOptions};
use price_chart_tools::presentation::toolbar::{
    ChartRect, CollapsedIcon, ColorTarget, ToolbarSection, clamp_position, color_alpha, color_patch,
    current_color, expanded_sections, initial_position, opacity_patch, width_patch,
};

fn placed(kind: ToolKind) -> Tool {
    Tool::new(ToolId::from(7), kind, vec![DomainPoint::new(1.0, 1.0)], kind.default_options())
}

#[test]
fn trend_line_sections() {
    let sections = expanded_sections(&placed(ToolKind::TrendLine));
    assert_eq!(
        sections,
        vec![
            ToolbarSection::Templates,
            ToolbarSection::LineColor { color: "rgb(0, 0, 0)".into() },
            ToolbarSection::Width { current: 2.0 },
            ToolbarSection::Alert,
            ToolbarSection::Lock { locked: false },
            ToolbarSection::Delete,
        ]
    );
}

#[test]
fn fill_and_text_sections_follow_options() {
    let callout = expanded_sections(&placed(ToolKind::Callout));
    assert!(callout.contains(&ToolbarSection::FillColor { color: "rgba(255, 255, 255, 0.9)".into() }));
    assert!(callout.contains(&ToolbarSection::TextColor { color: "rgb(0, 0, 0)".into() }));
    assert!(!callout.contains(&ToolbarSection::Alert));

    let text = expanded_sections(&placed(ToolKind::Text));
    assert!(text.iter().any(|s| matches!(s, ToolbarSection::TextColor { .. })));
    assert!(!text.iter().any(|s| matches!(s, ToolbarSection::Width { .. })));
}

#[test]
fn line_color_falls_back_through_border_and_color() {
    let measure = ToolKind::Measure.default_options();
    assert_eq!(current_color(&measure, ColorTarget::Line), "rgb(41, 98, 255)");
    let text = ToolKind::Text.default_options();
    assert_eq!(current_color(&text, ColorTarget::Line), "rgb(0, 0, 0)");
    assert_eq!(current_color(&ToolOptions::default(), ColorTarget::Line), "#2962ff");
}

#[test]
fn line_color_patch_only_touches_present_fields() {
    let measure = ToolKind::Measure.default_options();
    let patch = color_patch(&measure, ColorTarget::Line, "#00ff00");
    assert_eq!(patch.border_color.as_deref(), Some("#00ff00"));
    assert!(patch.line_color.is_none());
    assert!(patch.text_color.is_none());

    let fill = color_patch(&ToolKind::Rectangle.default_options(), ColorTarget::Fill, "#00ff00");
    assert_eq!(fill.background_color.as_deref(), Some("rgba(0, 255, 0, 0.2)"));
}

#[test]
fn opacity_and_width_patches() {
    let rect = ToolKind::Rectangle.default_options();
    let patch = opacity_patch(&rect, ColorTarget::Line, 0.5);
    assert_eq!(patch.line_color.as_deref(), Some("rgba(41, 98, 255, 0.5)"));
    assert_eq!(color_alpha("rgba(41, 98, 255, 0.5)"), 0.5);
    assert_eq!(color_alpha("#123456"), 1.0);

    assert_eq!(width_patch(&rect, 4.0).line_width, Some(4.0));
    assert!(width_patch(&ToolKind::Text.default_options(), 4.0).line_width.is_none());
}

#[test]
fn collapsed_icons() {
    assert_eq!(CollapsedIcon::for_kind(ToolKind::Text), CollapsedIcon::Text);
    assert_eq!(CollapsedIcon::for_kind(ToolKind::UserPriceAlerts), CollapsedIcon::Alert);
    assert_eq!(CollapsedIcon::for_kind(ToolKind::Rectangle), CollapsedIcon::Brush);
}

#[test]
fn toolbar_stays_inside_the_chart() {
    let chart = Some(ChartRect { left: 100.0, top: 50.0, right: 900.0, bottom: 650.0 });
    let size = (420.0, 40.0);
    assert_eq!(clamp_position(0.0, 0.0, size, chart, (1200.0, 800.0)), (100.0, 50.0));
    assert_eq!(clamp_position(2000.0, 2000.0, size, chart, (1200.0, 800.0)), (480.0, 610.0));
    assert_eq!(initial_position(None, size, chart, (1200.0, 800.0)), (380.0, 65.0));
    assert_eq!(initial_position(Some((200.0, 200.0)), size, chart, (1200.0, 800.0)), (200.0, 200.0));
    assert_eq!(clamp_position(-5.0, -5.0, size, None, (1200.0, 800.0)), (10.0, 10.0));
}
