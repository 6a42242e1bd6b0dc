use price_chart_tools::application::{
    KeyInput, ManagerEvent, PointerButton, RecordingSurface, ToolManager, ToolbarMode,
};
use price_chart_tools::domain::config::ManagerConfig;
use price_chart_tools::domain::market_data::Candle;
use price_chart_tools::domain::mapping::LinearScales;
use price_chart_tools::domain::tools::{ToolId, ToolKind, ToolOptions};
use std::cell::RefCell;
use std::rc::Rc;

// Default scales: 800x600 px over logical 0..100 and price 0..100,
// so x = logical * 8 and y = 600 - price * 6.

fn manager() -> ToolManager<RecordingSurface> {
    ToolManager::new(RecordingSurface::new(LinearScales::default()), ManagerConfig::default())
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn place_two_click(m: &mut ToolManager<RecordingSurface>, kind: ToolKind, a: (f64, f64), b: (f64, f64)) -> ToolId {
    m.start_tool(kind);
    m.on_click(a.0, a.1, 0.0);
    m.on_click(b.0, b.1, 0.0);
    m.tools().last().expect("tool placed").id
}

fn place_horizontal_line(m: &mut ToolManager<RecordingSurface>, y: f64) -> ToolId {
    m.start_tool(ToolKind::HorizontalLine);
    m.on_click(100.0, y, 0.0);
    m.tools().last().expect("line placed").id
}

#[test]
fn trend_line_finalizes_on_second_click() {
    let mut m = manager();
    m.start_tool(ToolKind::TrendLine);
    m.on_click(80.0, 300.0, 0.0);
    assert!(m.is_placing());
    assert!(m.tools().is_empty());

    m.on_crosshair_move(120.0, 270.0);
    let preview = m.draft().expect("draft while placing");
    assert_eq!(preview.points.len(), 2);
    assert!(close(preview.points[1].logical, 15.0));

    m.on_click(160.0, 240.0, 0.0);
    assert!(!m.is_placing());
    assert_eq!(m.active_kind(), ToolKind::None);

    let tool = &m.tools()[0];
    assert!(close(tool.points[0].logical, 10.0) && close(tool.points[0].price, 50.0));
    assert!(close(tool.points[1].logical, 20.0) && close(tool.points[1].price, 60.0));
    assert_eq!(m.selected(), Some(tool.id));
    assert_eq!(m.history().undo_len(), 1);
}

#[test]
fn history_stays_linear_after_undo() {
    let mut m = manager();
    let a = place_two_click(&mut m, ToolKind::TrendLine, (80.0, 300.0), (160.0, 240.0));
    let b = place_two_click(&mut m, ToolKind::Rectangle, (200.0, 100.0), (300.0, 200.0));
    assert!(m.undo());
    assert!(m.tool(b).is_none());
    assert!(m.history().can_redo());

    let c = place_two_click(&mut m, ToolKind::Circle, (400.0, 300.0), (450.0, 300.0));
    let ids: Vec<ToolId> = m.tools().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![a, c]);
    assert!(!m.history().can_redo());
    assert!(!m.redo());
}

#[test]
fn undo_then_redo_restores_the_same_tool() {
    let mut m = manager();
    let id = place_two_click(&mut m, ToolKind::TrendLine, (80.0, 300.0), (160.0, 240.0));
    let before = m.tool(id).cloned().expect("placed");

    assert!(m.undo());
    assert!(m.tools().is_empty());
    assert!(!m.surface().attached.contains(&id));

    assert!(m.redo());
    let after = m.tool(id).expect("restored");
    assert_eq!(after.points, before.points);
    assert!(m.surface().attached.contains(&id));
}

#[test]
fn undo_redo_round_trips_a_mixed_history() {
    let mut m = manager();
    let line = place_two_click(&mut m, ToolKind::TrendLine, (80.0, 300.0), (160.0, 240.0));
    let rect = place_two_click(&mut m, ToolKind::Rectangle, (400.0, 100.0), (500.0, 200.0));
    m.select(Some(line));
    assert!(m.on_pointer_down(80.0, 300.0, PointerButton::Primary));
    m.on_pointer_move(120.0, 300.0);
    m.on_pointer_up();
    m.delete_tool(rect).expect("rectangle deleted");
    assert_eq!(m.history().undo_len(), 4);

    let contents = |m: &ToolManager<RecordingSurface>| {
        m.tools().iter().map(|t| (t.id, t.state())).collect::<Vec<_>>()
    };
    let after_all = contents(&m);

    for n in 1..=4 {
        for _ in 0..n {
            assert!(m.undo());
        }
        for _ in 0..n {
            assert!(m.redo());
        }
        assert_eq!(contents(&m), after_all, "after {n} undo/redo pairs");
        assert!(!m.history().can_redo());
    }

    for _ in 0..4 {
        assert!(m.undo());
    }
    assert!(m.tools().is_empty());
    assert!(!m.undo());
    for _ in 0..4 {
        assert!(m.redo());
    }
    assert_eq!(contents(&m), after_all);
    assert!(close(m.tool(line).expect("line").points[0].logical, 15.0));
    assert!(m.tool(rect).is_none());
}

#[test]
fn drag_records_history_only_when_changed() {
    let mut m = manager();
    let id = place_two_click(&mut m, ToolKind::TrendLine, (80.0, 300.0), (160.0, 240.0));

    assert!(m.on_pointer_down(80.0, 300.0, PointerButton::Primary));
    assert!(m.is_dragging());
    m.on_pointer_up();
    assert_eq!(m.history().undo_len(), 1);

    assert!(m.on_pointer_down(80.0, 300.0, PointerButton::Primary));
    m.on_pointer_move(120.0, 300.0);
    m.on_pointer_up();
    assert_eq!(m.history().undo_len(), 2);
    assert!(close(m.tool(id).expect("tool").points[0].logical, 15.0));

    assert!(m.undo());
    assert!(close(m.tool(id).expect("tool").points[0].logical, 10.0));
}

#[test]
fn body_drag_translates_both_anchors() {
    let mut m = manager();
    let id = place_two_click(&mut m, ToolKind::TrendLine, (80.0, 300.0), (240.0, 300.0));
    assert!(m.on_pointer_down(160.0, 301.0, PointerButton::Primary));
    m.on_pointer_move(160.0, 241.0);
    m.on_pointer_up();
    let tool = m.tool(id).expect("tool");
    assert!(close(tool.points[0].price, 60.0));
    assert!(close(tool.points[1].price, 60.0));
    assert!(close(tool.points[0].logical, 10.0));
}

#[test]
fn brush_decimates_jittery_input() {
    let mut m = manager();
    m.start_tool(ToolKind::Brush);
    assert!(m.on_pointer_down(100.0, 100.0, PointerButton::Primary));
    for i in 0..1000 {
        let jitter_x = (i % 3) as f64;
        let jitter_y = ((i / 3) % 3) as f64;
        m.on_pointer_move(100.0 + jitter_x, 100.0 + jitter_y);
    }
    m.on_pointer_up();

    assert_eq!(m.tools().len(), 1);
    assert!(m.tools()[0].points.len() < 5);
    assert_eq!(m.active_kind(), ToolKind::None);
}

#[test]
fn brush_records_points_past_threshold() {
    let mut m = manager();
    m.start_tool(ToolKind::Brush);
    m.on_pointer_down(100.0, 100.0, PointerButton::Primary);
    for step in 1..=5 {
        m.on_pointer_move(100.0 + step as f64 * 20.0, 100.0);
    }
    m.on_pointer_up();
    assert_eq!(m.tools()[0].points.len(), 6);
}

#[test]
fn locked_tool_cannot_be_deleted() {
    let mut m = manager();
    let id = place_horizontal_line(&mut m, 300.0);
    assert_eq!(m.toggle_lock(id), Ok(true));
    assert!(m.delete_tool(id).is_err());
    assert!(m.on_key(&KeyInput::new("Delete")));
    assert!(m.tool(id).is_some());

    assert_eq!(m.toggle_lock(id), Ok(false));
    assert!(m.on_key(&KeyInput::new("Delete")));
    assert!(m.tool(id).is_none());
}

#[test]
fn deleting_a_tool_drops_its_alert() {
    let mut m = manager();
    let id = place_horizontal_line(&mut m, 300.0);
    let alert_id = m.add_tool_alert(id, None).expect("horizontal lines take alerts");
    assert_eq!(m.tool(id).and_then(|t| t.alert_id.clone()), Some(alert_id));
    assert_eq!(m.alerts().len(), 1);

    m.delete_tool(id).expect("unlocked");
    assert!(m.alerts().is_empty());

    assert!(m.undo());
    assert!(m.tool(id).is_some());
    assert!(m.alerts().is_empty());
    assert_eq!(m.tool(id).and_then(|t| t.alert_id.clone()), None);
}

#[test]
fn tool_alert_fires_once() {
    let mut m = manager();
    let id = place_horizontal_line(&mut m, 300.0);
    m.add_tool_alert(id, None).expect("alert");

    let miss = Candle::new(0, 60.0, 62.0, 58.0, 61.0);
    assert!(m.check_alerts(&miss, 1.0).is_empty());

    let cross = Candle::new(60, 45.0, 55.0, 44.0, 52.0);
    let fired = m.check_alerts(&cross, 2.0);
    assert_eq!(fired.len(), 1);
    assert!(close(fired[0].alert_price, 50.0));
    assert_eq!(fired[0].time_label.len(), 8);
    assert!(m.tool(id).and_then(|t| t.alert_id.clone()).is_none());

    assert!(m.check_alerts(&cross, 2.0).is_empty());
}

#[test]
fn alerts_on_text_are_rejected() {
    let mut m = manager();
    m.start_tool(ToolKind::Text);
    m.on_click(100.0, 100.0, 0.0);
    let id = m.tools()[0].id;
    assert!(m.add_tool_alert(id, None).is_err());
}

#[test]
fn eraser_removes_hit_tool_and_stays_active() {
    let mut m = manager();
    let id = place_horizontal_line(&mut m, 300.0);
    m.start_tool(ToolKind::Eraser);
    m.on_click(400.0, 302.0, 0.0);
    assert!(m.tool(id).is_none());
    assert_eq!(m.active_kind(), ToolKind::Eraser);
}

#[test]
fn price_alert_mode_adds_alert_and_exits() {
    let mut m = manager();
    m.start_tool(ToolKind::UserPriceAlerts);
    m.on_click(100.0, 300.0, 0.0);
    let alerts = m.alerts().alerts();
    assert_eq!(alerts.len(), 1);
    assert!(close(alerts[0].price, 50.0));
    assert_eq!(m.active_kind(), ToolKind::None);
}

#[test]
fn path_finishes_on_double_click() {
    let mut m = manager();
    m.start_tool(ToolKind::Path);
    m.on_click(100.0, 100.0, 0.0);
    m.on_click(200.0, 200.0, 1000.0);
    m.on_click(300.0, 300.0, 2000.0);
    assert!(m.tools().is_empty());
    m.on_click(301.0, 301.0, 2100.0);

    assert_eq!(m.tools().len(), 1);
    assert_eq!(m.tools()[0].points.len(), 3);
}

#[test]
fn right_click_finishes_path_or_cancels() {
    let mut m = manager();
    m.start_tool(ToolKind::Path);
    m.on_click(100.0, 100.0, 0.0);
    m.on_click(200.0, 200.0, 1000.0);
    assert!(m.on_context_menu());
    assert_eq!(m.tools()[0].points.len(), 2);

    m.start_tool(ToolKind::TrendLine);
    m.on_click(100.0, 100.0, 0.0);
    assert!(m.on_context_menu());
    assert_eq!(m.tools().len(), 1);
    assert!(!m.is_placing());
    assert!(!m.on_context_menu());
}

#[test]
fn long_position_mirrors_stop_around_entry() {
    let mut m = manager();
    let id = place_two_click(&mut m, ToolKind::LongPosition, (100.0, 300.0), (200.0, 240.0));
    let points = &m.tool(id).expect("placed").points;
    assert_eq!(points.len(), 3);
    assert!(close(points[0].price, 50.0));
    assert!(close(points[1].price, 40.0));
    assert!(close(points[2].price, 60.0));
}

#[test]
fn measure_is_not_selected_after_placement() {
    let mut m = manager();
    place_two_click(&mut m, ToolKind::Measure, (100.0, 300.0), (200.0, 240.0));
    assert_eq!(m.selected(), None);
}

#[test]
fn toolbar_mode_follows_mode_and_selection() {
    let mut m = manager();
    m.start_tool(ToolKind::TrendLine);
    assert_eq!(m.snapshot().toolbar, ToolbarMode::Collapsed(ToolKind::TrendLine));
    m.on_click(80.0, 300.0, 0.0);
    m.on_click(160.0, 240.0, 0.0);
    let id = m.tools()[0].id;
    let snapshot = m.snapshot();
    assert_eq!(snapshot.toolbar, ToolbarMode::Expanded(id));
    assert_eq!(snapshot.selected_tool.map(|t| t.id), Some(id));

    m.start_tool(ToolKind::Eraser);
    assert_eq!(m.snapshot().toolbar, ToolbarMode::Hidden);
}

#[test]
fn chart_interaction_is_restored_after_placement() {
    let mut m = manager();
    m.start_tool(ToolKind::TrendLine);
    assert!(!m.surface().interaction_enabled);
    m.on_click(80.0, 300.0, 0.0);
    m.on_click(160.0, 240.0, 0.0);
    assert!(m.surface().interaction_enabled);

    m.start_tool(ToolKind::Callout);
    assert!(m.surface().interaction_enabled);
}

#[test]
fn keyboard_shortcuts_drive_history() {
    let mut m = manager();
    place_horizontal_line(&mut m, 300.0);
    assert!(m.on_key(&KeyInput::new("z").with_ctrl()));
    assert!(m.tools().is_empty());
    assert!(m.on_key(&KeyInput::new("z").with_ctrl().with_shift()));
    assert_eq!(m.tools().len(), 1);
    assert!(!m.on_key(&KeyInput::new("q")));
}

#[test]
fn unmappable_clicks_are_ignored() {
    let mut m = ToolManager::new(RecordingSurface::new(LinearScales::new(0.0, 0.0)), ManagerConfig::default());
    m.start_tool(ToolKind::TrendLine);
    m.on_click(10.0, 10.0, 0.0);
    assert!(!m.is_placing());
    assert!(m.tools().is_empty());
}

#[test]
fn toolbar_edits_become_sticky_for_the_kind() {
    let mut m = manager();
    let first = place_two_click(&mut m, ToolKind::TrendLine, (80.0, 300.0), (160.0, 240.0));
    let patch = ToolOptions { line_color: Some("#ff0000".into()), ..ToolOptions::default() };
    m.apply_tool_options(first, &patch, true).expect("known tool");
    assert_eq!(m.history().undo_len(), 1);

    let second = place_two_click(&mut m, ToolKind::TrendLine, (80.0, 100.0), (160.0, 140.0));
    assert_eq!(m.tool(second).and_then(|t| t.options.line_color.clone()), Some("#ff0000".into()));

    let other = place_two_click(&mut m, ToolKind::Rectangle, (300.0, 100.0), (400.0, 200.0));
    assert_ne!(m.tool(other).and_then(|t| t.options.line_color.clone()), Some("#ff0000".into()));
}

#[test]
fn events_report_additions_and_history() {
    let mut m = manager();
    let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _subscription = m.events().subscribe(move |event| {
        let label = match event {
            ManagerEvent::ToolAdded(_) => "added",
            ManagerEvent::HistoryChanged { .. } => "history",
            _ => return,
        };
        sink.borrow_mut().push(label.to_string());
    });
    place_horizontal_line(&mut m, 300.0);
    assert_eq!(*seen.borrow(), vec!["added".to_string(), "history".to_string()]);
}
