use crate::application::tool_manager::ManagerSnapshot;
use crate::domain::alerts::Alert;
use crate::domain::templates::StyleTemplate;
use crate::presentation::toolbar::ChartRect;
use leptos::*;
use once_cell::sync::OnceCell;

/// Reactive mirrors of the coordinator state read by the overlay components
pub struct Globals {
    pub snapshot: RwSignal<Option<ManagerSnapshot>>,
    pub templates: RwSignal<Vec<StyleTemplate>>,
    pub alerts: RwSignal<Vec<Alert>>,
    pub nav_visible: RwSignal<bool>,
    /// Dragged toolbar position, CSS pixels relative to the viewport
    pub toolbar_position: RwSignal<Option<(f64, f64)>>,
    pub chart_rect: RwSignal<Option<ChartRect>>,
}

static GLOBALS: OnceCell<Globals> = OnceCell::new();

pub fn globals() -> &'static Globals {
    GLOBALS.get_or_init(|| Globals {
        snapshot: create_rw_signal(None),
        templates: create_rw_signal(Vec::new()),
        alerts: create_rw_signal(Vec::new()),
        nav_visible: create_rw_signal(false),
        toolbar_position: create_rw_signal(None),
        chart_rect: create_rw_signal(None),
    })
}

crate::global_signals! {
    pub manager_snapshot => snapshot: Option<ManagerSnapshot>,
    pub style_templates => templates: Vec<StyleTemplate>,
    pub alert_list => alerts: Vec<Alert>,
}

crate::global_signal!(pub navigation_visible, nav_visible: bool);
