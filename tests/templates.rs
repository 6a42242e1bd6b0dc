use price_chart_tools::application::{ChartToolsCoordinator, RecordingSurface};
use price_chart_tools::domain::alerts::XorShiftRandom;
use price_chart_tools::domain::config::ManagerConfig;
use price_chart_tools::domain::errors::TemplateError;
use price_chart_tools::domain::mapping::LinearScales;
use price_chart_tools::domain::templates::{KeyValueStore, TEMPLATES_KEY, TemplateStore};
use price_chart_tools::domain::tools::{Tool, ToolId, ToolKind, ToolOptions};
use price_chart_tools::infrastructure::storage::InMemoryStore;

fn store(capacity: usize) -> TemplateStore<InMemoryStore> {
    TemplateStore::new(InMemoryStore::new(), Box::new(XorShiftRandom::seeded(11)), capacity)
}

fn red_wide() -> ToolOptions {
    ToolOptions {
        line_color: Some("#ff0000".into()),
        line_width: Some(4.0),
        text: Some("keep out of templates".into()),
        ..ToolOptions::default()
    }
}

#[test]
fn save_persists_style_subset() {
    let templates = store(20);
    let saved = templates.save("  Red  ", &red_wide()).expect("room left");
    assert_eq!(saved.name, "Red");
    assert_eq!(saved.styles.line_color.as_deref(), Some("#ff0000"));
    assert_eq!(saved.styles.line_width, Some(4.0));
    assert!(saved.styles.text.is_none());

    let raw = templates.storage().raw(TEMPLATES_KEY).expect("written");
    assert!(raw.contains("#ff0000"));
    assert!(!raw.contains("keep out"));
    assert_eq!(templates.list(), vec![saved]);
}

#[test]
fn template_ids_carry_time_and_suffix() {
    let templates = store(20);
    let saved = templates.save("a", &red_wide()).expect("saved");
    let parts: Vec<&str> = saved.id.split('_').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "template");
    assert_eq!(parts[1], saved.created.to_string());
    assert_eq!(parts[2].len(), 9);
    assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
}

#[test]
fn blank_names_are_numbered() {
    let templates = store(20);
    templates.save("first", &red_wide()).expect("saved");
    let unnamed = templates.save("   ", &red_wide()).expect("saved");
    assert_eq!(unnamed.name, "Template 2");
}

#[test]
fn capacity_is_enforced() {
    let templates = store(2);
    templates.save("a", &red_wide()).expect("saved");
    templates.save("b", &red_wide()).expect("saved");
    assert_eq!(templates.save("c", &red_wide()), Err(TemplateError::StoreFull { max: 2 }));
    assert_eq!(templates.list().len(), 2);
}

#[test]
fn corrupt_storage_reads_as_empty() {
    let templates = store(20);
    templates.storage().set(TEMPLATES_KEY, "{not json").expect("in-memory write");
    assert!(templates.list().is_empty());
    assert!(templates.save("fresh", &red_wide()).is_ok());
    assert_eq!(templates.list().len(), 1);
}

#[test]
fn delete_and_apply() {
    let templates = store(20);
    let saved = templates.save("red", &red_wide()).expect("saved");

    let mut tool = Tool::new(ToolId::from(1), ToolKind::TrendLine, Vec::new(), ToolOptions::default());
    assert!(templates.apply(&saved.id, &mut tool));
    assert_eq!(tool.options.line_color.as_deref(), Some("#ff0000"));
    assert!(tool.options.text.is_none());

    assert!(templates.delete(&saved.id));
    assert!(!templates.delete(&saved.id));
    assert!(!templates.apply(&saved.id, &mut tool));
}

#[test]
fn coordinator_applies_templates_outside_history() {
    let mut coordinator = ChartToolsCoordinator::new(
        Box::new(RecordingSurface::new(LinearScales::default())),
        Box::new(InMemoryStore::new()),
        Box::new(XorShiftRandom::seeded(3)),
        Box::new(XorShiftRandom::seeded(5)),
        ManagerConfig::default(),
    );
    assert!(coordinator.save_template("nothing selected").is_err());

    let manager = coordinator.manager_mut();
    manager.start_tool(ToolKind::TrendLine);
    manager.on_click(80.0, 300.0, 0.0);
    manager.on_click(160.0, 240.0, 0.0);
    let id = manager.selected().expect("selected after placement");
    manager.apply_tool_options(id, &red_wide(), false).expect("known tool");

    let template = coordinator.save_template("red").expect("saved");
    assert_eq!(coordinator.templates().len(), 1);

    let manager = coordinator.manager_mut();
    manager.apply_tool_options(id, &ToolOptions { line_color: Some("#00ff00".into()), ..ToolOptions::default() }, false)
        .expect("known tool");

    coordinator.apply_template(&template.id).expect("applied");
    let manager = coordinator.manager();
    assert_eq!(manager.tool(id).and_then(|t| t.options.line_color.clone()).as_deref(), Some("#ff0000"));
    assert_eq!(manager.history().undo_len(), 1);

    assert!(coordinator.apply_template("template_missing").is_err());
    assert!(coordinator.delete_template(&template.id));
}
