use crate::application::alert_service::{evaluate_alerts, refresh_tool_alert_prices};
use crate::application::chart_surface::ChartSurface;
use crate::domain::alerts::{AlertCondition, AlertRegistry, AlertSource, AlertTriggered, available_conditions};
use crate::domain::config::ManagerConfig;
use crate::domain::errors::{AlertError, AppError, DrawingError};
use crate::domain::events::{DomainEvent, EventDelegate};
use crate::domain::geometry::Point;
use crate::domain::history::{HistoryAction, HistoryManager};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::mapping::{ChartScales, DomainPoint, to_domain};
use crate::domain::market_data::Candle;
use crate::domain::templates::extract_styles;
use crate::domain::tools::levels::{mirrored_stop, price_label_text};
use crate::domain::tools::{
    HitContext, Placement, ShapeFamily, Tool, ToolHit, ToolId, ToolKind, ToolOptions, ToolState,
    initial_sticky_options,
};
use serde::Serialize;
use std::collections::HashMap;

/// Notifications for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum ManagerEvent {
    ActiveToolChanged(ToolKind),
    ToolAdded(ToolId),
    ToolRemoved(ToolId),
    ToolModified(ToolId),
    SelectionChanged(Option<ToolId>),
    HistoryChanged { can_undo: bool, can_redo: bool },
    AlertTriggered(AlertTriggered),
    AlertsChanged,
}

impl DomainEvent for ManagerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ManagerEvent::ActiveToolChanged(_) => "active_tool_changed",
            ManagerEvent::ToolAdded(_) => "tool_added",
            ManagerEvent::ToolRemoved(_) => "tool_removed",
            ManagerEvent::ToolModified(_) => "tool_modified",
            ManagerEvent::SelectionChanged(_) => "selection_changed",
            ManagerEvent::HistoryChanged { .. } => "history_changed",
            ManagerEvent::AlertTriggered(_) => "alert_triggered",
            ManagerEvent::AlertsChanged => "alerts_changed",
        }
    }
}

/// Keyboard input already decoded from the DOM event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl KeyInput {
    pub fn new(key: &str) -> Self {
        Self { key: key.to_string(), ..Self::default() }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other,
}

impl From<i16> for PointerButton {
    fn from(button: i16) -> Self {
        match button {
            0 => PointerButton::Primary,
            2 => PointerButton::Secondary,
            _ => PointerButton::Other,
        }
    }
}

/// What the floating toolbar should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "target", rename_all = "lowercase")]
pub enum ToolbarMode {
    Hidden,
    Collapsed(ToolKind),
    Expanded(ToolId),
}

/// Read-only view of the manager for chrome rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerSnapshot {
    pub active_kind: ToolKind,
    pub placing: bool,
    pub dragging: bool,
    pub selected: Option<ToolId>,
    pub selected_tool: Option<Tool>,
    pub toolbar: ToolbarMode,
    pub can_undo: bool,
    pub can_redo: bool,
    pub tool_count: usize,
    pub alert_count: usize,
}

/// In-progress placement; the tool is attached but not in the live list
#[derive(Debug, Clone)]
struct Draft {
    tool: Tool,
    clicks: Vec<DomainPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragTarget {
    Anchor(usize),
    Body,
}

#[derive(Debug, Clone)]
struct Drag {
    tool_id: ToolId,
    target: DragTarget,
    last: DomainPoint,
    prev_state: ToolState,
}

#[derive(Debug, Clone, Copy)]
struct LastClick {
    time_ms: f64,
    at: Point,
}

/// Drawing-tool state machine.
///
/// Owns the live tools, the in-progress draft, selection, drag and freehand
/// state, history, sticky style preferences and the alert registry. Every
/// invalid step (unmappable pointer, unknown id, empty history) is a no-op.
pub struct ToolManager<S: ChartSurface> {
    surface: S,
    config: ManagerConfig,
    tools: Vec<Tool>,
    next_id: u64,
    active_kind: ToolKind,
    draft: Option<Draft>,
    selected: Option<ToolId>,
    drag: Option<Drag>,
    stroke_last: Option<Point>,
    last_click: Option<LastClick>,
    history: HistoryManager,
    sticky: HashMap<ToolKind, ToolOptions>,
    alerts: AlertRegistry,
    bar_seconds: i64,
    events: EventDelegate<ManagerEvent>,
}

impl<S: ChartSurface + 'static> ToolManager<S> {
    pub fn new(surface: S, config: ManagerConfig) -> Self {
        Self::with_alerts(surface, config, AlertRegistry::default())
    }

    pub fn with_alerts(surface: S, config: ManagerConfig, alerts: AlertRegistry) -> Self {
        let history = HistoryManager::new(config.history_capacity);
        Self {
            surface,
            config,
            tools: Vec::new(),
            next_id: 1,
            active_kind: ToolKind::None,
            draft: None,
            selected: None,
            drag: None,
            stroke_last: None,
            last_click: None,
            history,
            sticky: HashMap::new(),
            alerts,
            bar_seconds: 60,
            events: EventDelegate::new(),
        }
    }

    // ---- accessors ----------------------------------------------------

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn events(&self) -> &EventDelegate<ManagerEvent> {
        &self.events
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn tool(&self, id: ToolId) -> Option<&Tool> {
        self.tools.iter().find(|t| t.id == id)
    }

    /// The tool being placed, if any
    pub fn draft(&self) -> Option<&Tool> {
        self.draft.as_ref().map(|d| &d.tool)
    }

    /// Live tools in paint order followed by the draft
    pub fn drawables(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter().chain(self.draft())
    }

    pub fn active_kind(&self) -> ToolKind {
        self.active_kind
    }

    pub fn selected(&self) -> Option<ToolId> {
        self.selected
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn alerts(&self) -> &AlertRegistry {
        &self.alerts
    }

    pub fn is_placing(&self) -> bool {
        self.draft.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn bar_seconds(&self) -> i64 {
        self.bar_seconds
    }

    pub fn set_bar_seconds(&mut self, seconds: i64) {
        self.bar_seconds = seconds.max(1);
    }

    /// Session preferences for `kind`
    pub fn sticky_options(&self, kind: ToolKind) -> ToolOptions {
        self.sticky.get(&kind).cloned().unwrap_or_else(initial_sticky_options)
    }

    pub fn snapshot(&self) -> ManagerSnapshot {
        let toolbar = if self.active_kind != ToolKind::None {
            if self.active_kind.shows_toolbar_on_start() {
                ToolbarMode::Collapsed(self.active_kind)
            } else {
                ToolbarMode::Hidden
            }
        } else {
            self.selected.map_or(ToolbarMode::Hidden, ToolbarMode::Expanded)
        };
        ManagerSnapshot {
            active_kind: self.active_kind,
            placing: self.draft.is_some(),
            dragging: self.drag.is_some(),
            selected: self.selected,
            selected_tool: self.selected.and_then(|id| self.tool(id)).cloned(),
            toolbar,
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            tool_count: self.tools.len(),
            alert_count: self.alerts.len(),
        }
    }

    // ---- internals ----------------------------------------------------

    fn tool_mut(&mut self, id: ToolId) -> Option<&mut Tool> {
        self.tools.iter_mut().find(|t| t.id == id)
    }

    fn allocate_id(&mut self) -> ToolId {
        let id = ToolId::from(self.next_id);
        self.next_id += 1;
        id
    }

    fn pointer_to_domain(&self, x: f64, y: f64) -> Option<DomainPoint> {
        let point = to_domain(x, y, &self.surface as &dyn ChartScales);
        if point.is_none() {
            get_logger().debug(
                LogComponent::Application("ToolManager"),
                &format!("pointer ({:.1}, {:.1}) is outside the plottable area", x, y),
            );
        }
        point
    }

    fn new_tool_options(&self, kind: ToolKind) -> ToolOptions {
        let preset_only = matches!(kind, ToolKind::Brush | ToolKind::Highlighter | ToolKind::Path)
            && !self.sticky.contains_key(&kind);
        let mut options = if preset_only {
            kind.default_options()
        } else {
            kind.default_options().merged(&self.sticky_options(kind))
        };
        if kind.is_freehand() {
            options.color = options.line_color.clone();
        }
        options
    }

    fn fire_history(&self) {
        self.events.fire(&ManagerEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn restore_interaction(&mut self) {
        let enabled = self.active_kind.keeps_chart_interaction();
        self.surface.set_interaction_enabled(enabled);
    }

    /// Topmost tool under the pointer; last added wins
    fn hit_topmost(&self, x: f64, y: f64) -> Option<(ToolId, ToolHit)> {
        let ctx = HitContext::new(&self.surface as &dyn ChartScales, &self.config);
        self.tools.iter().rev().find_map(|tool| tool.hit_test(x, y, &ctx).map(|hit| (tool.id, hit)))
    }

    /// Anchors shown while placing: confirmed clicks plus the cursor
    fn preview_points(kind: ToolKind, clicks: &[DomainPoint], cursor: DomainPoint) -> Vec<DomainPoint> {
        match kind {
            ToolKind::LongPosition | ToolKind::ShortPosition => {
                let entry = clicks.first().copied().unwrap_or(cursor);
                vec![entry, mirrored_stop(kind, &entry, &cursor), cursor]
            }
            _ => {
                let mut points = clicks.to_vec();
                match kind.placement() {
                    Placement::Clicks(n) if kind.family() != ShapeFamily::Polyline => {
                        points.resize(n.max(clicks.len()), cursor);
                    }
                    Placement::Clicks(n) => {
                        if points.len() < n {
                            points.push(cursor);
                        }
                    }
                    Placement::OpenPath => points.push(cursor),
                    _ => {}
                }
                points
            }
        }
    }

    // ---- mode control -------------------------------------------------

    /// Enter a drawing mode, abandoning any placement in progress
    pub fn start_tool(&mut self, kind: ToolKind) {
        self.discard_draft();
        self.set_selection(None);
        self.active_kind = kind;
        self.surface.set_interaction_enabled(kind.keeps_chart_interaction());
        get_logger().debug(LogComponent::Application("ToolManager"), &format!("active tool: {}", kind));
        self.events.fire(&ManagerEvent::ActiveToolChanged(kind));
        self.surface.request_redraw();
    }

    fn discard_draft(&mut self) {
        if let Some(draft) = self.draft.take() {
            self.surface.detach(draft.tool.id);
        }
        self.stroke_last = None;
        self.last_click = None;
    }

    /// Drop the in-progress tool and return to idle
    pub fn cancel(&mut self) {
        let was_active = self.active_kind != ToolKind::None || self.draft.is_some();
        self.discard_draft();
        self.active_kind = ToolKind::None;
        self.restore_interaction();
        if was_active {
            self.events.fire(&ManagerEvent::ActiveToolChanged(ToolKind::None));
        }
        self.surface.request_redraw();
    }

    pub fn select(&mut self, id: Option<ToolId>) {
        let id = id.filter(|id| self.tool(*id).is_some());
        self.set_selection(id);
        self.surface.request_redraw();
    }

    fn set_selection(&mut self, id: Option<ToolId>) {
        if self.selected == id {
            return;
        }
        for tool in &mut self.tools {
            tool.set_selected(Some(tool.id) == id);
        }
        self.selected = id;
        self.events.fire(&ManagerEvent::SelectionChanged(id));
    }

    // ---- placement ----------------------------------------------------

    /// Chart click at CSS pixel `(x, y)`; `time_ms` feeds double-click detection
    pub fn on_click(&mut self, x: f64, y: f64, time_ms: f64) {
        let kind = self.active_kind;
        match kind.placement() {
            Placement::Mode => self.on_mode_click(kind, x, y),
            Placement::Stroke => {}
            Placement::SingleClick => {
                let Some(point) = self.pointer_to_domain(x, y) else { return };
                self.place_single(kind, point);
            }
            Placement::Clicks(required) => {
                let Some(point) = self.pointer_to_domain(x, y) else { return };
                self.add_click(kind, point);
                let clicks = self.draft.as_ref().map_or(0, |d| d.clicks.len());
                if clicks >= required {
                    self.finalize();
                }
            }
            Placement::OpenPath => {
                let at = Point::new(x, y);
                let is_double = self.last_click.is_some_and(|last| {
                    time_ms - last.time_ms <= self.config.double_click_ms
                        && last.at.distance_to(at) < self.config.double_click_distance
                });
                let clicks = self.draft.as_ref().map_or(0, |d| d.clicks.len());
                if is_double && clicks >= 2 {
                    if let Some(draft) = self.draft.as_mut() {
                        draft.tool.points = draft.clicks.clone();
                    }
                    self.finalize();
                    return;
                }
                let Some(point) = self.pointer_to_domain(x, y) else { return };
                self.add_click(kind, point);
                self.last_click = Some(LastClick { time_ms, at });
            }
        }
    }

    fn on_mode_click(&mut self, kind: ToolKind, x: f64, y: f64) {
        match kind {
            ToolKind::Eraser => {
                if let Some((id, _)) = self.hit_topmost(x, y) {
                    if let Err(e) = self.delete_tool(id) {
                        get_logger().debug(LogComponent::Application("ToolManager"), &format!("eraser: {}", e));
                    }
                }
            }
            ToolKind::UserPriceAlerts => {
                let Some(point) = self.pointer_to_domain(x, y) else { return };
                self.add_price_alert(point.price, AlertCondition::Crossing);
                self.cancel();
            }
            _ => {
                let hit = self.hit_topmost(x, y).map(|(id, _)| id);
                self.select(hit);
            }
        }
    }

    fn place_single(&mut self, kind: ToolKind, point: DomainPoint) {
        let id = self.allocate_id();
        let mut options = self.new_tool_options(kind);
        let points = match kind {
            ToolKind::Callout => vec![point, point],
            ToolKind::PriceLabel => {
                options.text = Some(price_label_text(point.price));
                vec![point]
            }
            _ => vec![point],
        };
        self.surface.attach(id);
        self.draft = Some(Draft { tool: Tool::new(id, kind, points, options), clicks: vec![point] });
        self.finalize();
    }

    fn add_click(&mut self, kind: ToolKind, point: DomainPoint) {
        if self.draft.is_none() {
            let id = self.allocate_id();
            let options = self.new_tool_options(kind);
            self.surface.attach(id);
            self.draft = Some(Draft { tool: Tool::new(id, kind, Vec::new(), options), clicks: Vec::new() });
        }
        if let Some(draft) = self.draft.as_mut() {
            draft.clicks.push(point);
            draft.tool.points = Self::preview_points(kind, &draft.clicks, point);
        }
        self.surface.request_redraw();
    }

    /// Move the draft's live anchor to follow the cursor
    pub fn on_crosshair_move(&mut self, x: f64, y: f64) {
        if self.drag.is_some() || self.stroke_last.is_some() || self.draft.is_none() {
            return;
        }
        let Some(cursor) = self.pointer_to_domain(x, y) else { return };
        if let Some(draft) = self.draft.as_mut() {
            draft.tool.points = Self::preview_points(draft.tool.kind, &draft.clicks, cursor);
        }
        self.surface.request_redraw();
    }

    fn finalize(&mut self) {
        let Some(draft) = self.draft.take() else { return };
        let mut tool = draft.tool;
        if let Some(&last) = draft.clicks.last() {
            if matches!(tool.kind.placement(), Placement::Clicks(_)) {
                tool.points = Self::preview_points(tool.kind, &draft.clicks[..draft.clicks.len() - 1], last);
            }
        }
        let id = tool.id;
        let selects = tool.kind.selects_on_finalize();
        tool.set_selected(false);
        self.history.push(HistoryAction::Add { tool: tool.clone() });
        self.tools.push(tool);
        self.stroke_last = None;
        self.last_click = None;
        self.active_kind = ToolKind::None;
        self.restore_interaction();

        get_logger().debug(LogComponent::Application("ToolManager"), &format!("finalized tool {}", id));
        self.events.fire(&ManagerEvent::ToolAdded(id));
        self.events.fire(&ManagerEvent::ActiveToolChanged(ToolKind::None));
        self.fire_history();
        if selects {
            self.set_selection(Some(id));
        }
        self.surface.request_redraw();
    }

    /// Right-click: finishes an open path, otherwise cancels placement.
    /// Returns whether the event was consumed.
    pub fn on_context_menu(&mut self) -> bool {
        if let Some(draft) = self.draft.as_mut() {
            if draft.tool.kind == ToolKind::Path && draft.clicks.len() >= 2 {
                draft.tool.points = draft.clicks.clone();
                self.finalize();
                return true;
            }
        }
        if self.active_kind != ToolKind::None {
            self.cancel();
            return true;
        }
        false
    }

    // ---- drag and freehand --------------------------------------------

    /// Returns whether the pointer-down was consumed by a tool
    pub fn on_pointer_down(&mut self, x: f64, y: f64, button: PointerButton) -> bool {
        if button != PointerButton::Primary {
            return false;
        }
        if self.active_kind.is_freehand() {
            return self.begin_stroke(x, y);
        }
        if self.active_kind != ToolKind::None {
            return false;
        }
        let Some((id, hit)) = self.hit_topmost(x, y) else { return false };
        self.set_selection(Some(id));
        let Some(tool) = self.tool(id) else { return false };
        if tool.locked || !tool.kind.supports_drag() {
            self.surface.request_redraw();
            return true;
        }
        let Some(start) = self.pointer_to_domain(x, y) else { return true };
        let target = match hit {
            ToolHit::Point(i) => DragTarget::Anchor(i),
            ToolHit::Line | ToolHit::Shape => DragTarget::Body,
        };
        self.drag = Some(Drag { tool_id: id, target, last: start, prev_state: tool.state() });
        self.surface.set_interaction_enabled(false);
        self.surface.request_redraw();
        true
    }

    fn begin_stroke(&mut self, x: f64, y: f64) -> bool {
        let Some(point) = self.pointer_to_domain(x, y) else { return false };
        self.discard_draft();
        let kind = self.active_kind;
        let id = self.allocate_id();
        let options = self.new_tool_options(kind);
        self.surface.attach(id);
        self.draft = Some(Draft { tool: Tool::new(id, kind, vec![point], options), clicks: vec![point] });
        self.stroke_last = Some(Point::new(x, y));
        self.surface.request_redraw();
        true
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        if self.drag.is_some() {
            self.continue_drag(x, y);
        } else if self.stroke_last.is_some() {
            self.continue_stroke(x, y);
        } else {
            self.on_crosshair_move(x, y);
        }
    }

    fn continue_drag(&mut self, x: f64, y: f64) {
        let Some(point) = self.pointer_to_domain(x, y) else { return };
        let Some(drag) = self.drag.as_mut() else { return };
        let (tool_id, target, last) = (drag.tool_id, drag.target, drag.last);
        drag.last = point;
        let Some(tool) = self.tool_mut(tool_id) else { return };
        match target {
            DragTarget::Anchor(index) => {
                if let Err(e) = tool.update_point_by_index(index, point) {
                    get_logger().debug(LogComponent::Application("ToolManager"), &format!("drag: {}", e));
                }
            }
            DragTarget::Body => tool.translate(point.logical - last.logical, point.price - last.price),
        }
        self.surface.request_redraw();
    }

    fn continue_stroke(&mut self, x: f64, y: f64) {
        let Some(last) = self.stroke_last else { return };
        let at = Point::new(x, y);
        let device_distance = last.distance_to(at) * self.surface.pixel_ratio();
        if device_distance < self.config.freehand_min_distance {
            return;
        }
        let Some(point) = self.pointer_to_domain(x, y) else { return };
        if let Some(draft) = self.draft.as_mut() {
            draft.tool.points.push(point);
            draft.clicks.push(point);
            crate::log_trace!(
                LogComponent::Application("ToolManager"),
                "stroke point {} at ({:.1}, {:.1})",
                draft.tool.points.len(),
                at.x,
                at.y
            );
        }
        self.stroke_last = Some(at);
        self.surface.request_redraw();
    }

    pub fn on_pointer_up(&mut self) {
        if let Some(drag) = self.drag.take() {
            self.restore_interaction();
            if let Some(tool) = self.tool(drag.tool_id) {
                let new_state = tool.state();
                if new_state != drag.prev_state {
                    let kind = tool.kind;
                    self.history.push(HistoryAction::Modify {
                        tool_id: drag.tool_id,
                        kind,
                        prev_state: drag.prev_state,
                        new_state,
                    });
                    self.events.fire(&ManagerEvent::ToolModified(drag.tool_id));
                    self.fire_history();
                }
            }
            self.surface.request_redraw();
        } else if self.stroke_last.is_some() {
            self.finalize();
        }
    }

    /// Keyboard shortcuts. Returns whether the key was handled.
    pub fn on_key(&mut self, input: &KeyInput) -> bool {
        let key = input.key.to_ascii_lowercase();
        match key.as_str() {
            "escape" => {
                if self.draft.is_some() || self.active_kind != ToolKind::None {
                    self.cancel();
                } else {
                    self.select(None);
                }
                true
            }
            "delete" | "backspace" => match self.selected {
                Some(id) if self.draft.is_none() => {
                    if let Err(e) = self.delete_tool(id) {
                        get_logger().debug(LogComponent::Application("ToolManager"), &format!("delete: {}", e));
                    }
                    true
                }
                _ => false,
            },
            "z" if input.command() && input.shift => self.redo(),
            "z" if input.command() => self.undo(),
            "y" if input.command() => self.redo(),
            _ => false,
        }
    }

    // ---- editing ------------------------------------------------------

    pub fn delete_tool(&mut self, id: ToolId) -> Result<(), DrawingError> {
        let index = self.tools.iter().position(|t| t.id == id).ok_or(DrawingError::UnknownTool(id.value()))?;
        if self.tools[index].locked {
            return Err(DrawingError::ToolLocked(id.value()));
        }
        let mut tool = self.tools.remove(index);
        self.surface.detach(id);
        if let Some(alert_id) = tool.alert_id.take() {
            self.alerts.remove_alert(&alert_id);
            self.events.fire(&ManagerEvent::AlertsChanged);
        }
        if self.selected == Some(id) {
            self.set_selection(None);
        }
        tool.set_selected(false);
        self.history.push(HistoryAction::Delete { tool, index });
        self.events.fire(&ManagerEvent::ToolRemoved(id));
        self.fire_history();
        self.surface.request_redraw();
        Ok(())
    }

    /// Flip the lock flag; returns the new value
    pub fn toggle_lock(&mut self, id: ToolId) -> Result<bool, DrawingError> {
        let tool = self.tool_mut(id).ok_or(DrawingError::UnknownTool(id.value()))?;
        tool.locked = !tool.locked;
        let locked = tool.locked;
        self.events.fire(&ManagerEvent::ToolModified(id));
        self.surface.request_redraw();
        Ok(locked)
    }

    /// Merge `patch` into a tool's options. Color and width edits from the
    /// toolbar also become the sticky preference for the tool's kind.
    pub fn apply_tool_options(
        &mut self,
        id: ToolId,
        patch: &ToolOptions,
        remember: bool,
    ) -> Result<(), DrawingError> {
        let tool = self.tool_mut(id).ok_or(DrawingError::UnknownTool(id.value()))?;
        tool.apply_options(patch);
        let kind = tool.kind;
        if remember {
            let styles = extract_styles(patch);
            if !styles.is_empty() {
                self.sticky.entry(kind).or_insert_with(initial_sticky_options).merge(&styles);
            }
        }
        self.events.fire(&ManagerEvent::ToolModified(id));
        self.surface.request_redraw();
        Ok(())
    }

    /// Move one handle directly, outside of a pointer drag
    pub fn update_point(&mut self, id: ToolId, index: usize, point: DomainPoint) -> Result<(), DrawingError> {
        let tool = self.tool_mut(id).ok_or(DrawingError::UnknownTool(id.value()))?;
        if tool.locked {
            return Err(DrawingError::ToolLocked(id.value()));
        }
        tool.update_point_by_index(index, point)?;
        self.events.fire(&ManagerEvent::ToolModified(id));
        self.surface.request_redraw();
        Ok(())
    }

    // ---- history ------------------------------------------------------

    /// Returns whether anything was undone
    pub fn undo(&mut self) -> bool {
        let Some(action) = self.history.pop_undo() else { return false };
        match action {
            HistoryAction::Add { tool } => {
                if let Some(index) = self.tools.iter().position(|t| t.id == tool.id) {
                    let mut live = self.tools.remove(index);
                    live.set_selected(false);
                    self.surface.detach(live.id);
                    if self.selected == Some(live.id) {
                        self.set_selection(None);
                    }
                    self.events.fire(&ManagerEvent::ToolRemoved(live.id));
                    self.history.amend_redo_top(HistoryAction::Add { tool: live });
                }
            }
            HistoryAction::Delete { tool, index } => {
                let id = tool.id;
                let index = index.min(self.tools.len());
                self.tools.insert(index, tool);
                self.surface.attach(id);
                self.events.fire(&ManagerEvent::ToolAdded(id));
            }
            HistoryAction::Modify { tool_id, prev_state, .. } => {
                if let Some(tool) = self.tool_mut(tool_id) {
                    tool.restore(&prev_state);
                    self.events.fire(&ManagerEvent::ToolModified(tool_id));
                }
            }
        }
        self.fire_history();
        self.surface.request_redraw();
        true
    }

    /// Returns whether anything was redone
    pub fn redo(&mut self) -> bool {
        let Some(action) = self.history.pop_redo() else { return false };
        match action {
            HistoryAction::Add { tool } => {
                let id = tool.id;
                self.tools.push(tool);
                self.surface.attach(id);
                self.events.fire(&ManagerEvent::ToolAdded(id));
            }
            HistoryAction::Delete { tool, .. } => {
                if let Some(index) = self.tools.iter().position(|t| t.id == tool.id) {
                    self.tools.remove(index);
                    self.surface.detach(tool.id);
                    if self.selected == Some(tool.id) {
                        self.set_selection(None);
                    }
                    self.events.fire(&ManagerEvent::ToolRemoved(tool.id));
                }
            }
            HistoryAction::Modify { tool_id, new_state, .. } => {
                if let Some(tool) = self.tool_mut(tool_id) {
                    tool.restore(&new_state);
                    self.events.fire(&ManagerEvent::ToolModified(tool_id));
                }
            }
        }
        self.fire_history();
        self.surface.request_redraw();
        true
    }

    // ---- alerts -------------------------------------------------------

    /// Bind an alert to a tool, replacing any alert it already has
    pub fn add_tool_alert(&mut self, id: ToolId, condition: Option<AlertCondition>) -> Result<String, AppError> {
        let tool = self.tool(id).ok_or(DrawingError::UnknownTool(id.value()))?;
        let available = available_conditions(tool.kind);
        if available.is_empty() {
            return Err(DrawingError::AlertsUnsupported(tool.kind.to_string()).into());
        }
        let condition = condition.unwrap_or(available[0]);
        if !available.contains(&condition) {
            return Err(AlertError::UnsupportedCondition {
                kind: tool.kind.to_string(),
                condition: condition.to_string(),
            }
            .into());
        }
        let price = tool.reference_price().unwrap_or_default();
        let previous = tool.alert_id.clone();

        if let Some(old) = previous {
            self.alerts.remove_alert(&old);
        }
        let alert_id = self.alerts.add_alert_with_condition(price, condition, AlertSource::Tool(id));
        if let Some(tool) = self.tool_mut(id) {
            tool.alert_id = Some(alert_id.clone());
        }
        self.events.fire(&ManagerEvent::AlertsChanged);
        self.surface.request_redraw();
        Ok(alert_id)
    }

    pub fn add_price_alert(&mut self, price: f64, condition: AlertCondition) -> String {
        let id = self.alerts.add_alert_with_condition(price, condition, AlertSource::Price);
        self.events.fire(&ManagerEvent::AlertsChanged);
        id
    }

    pub fn remove_alert(&mut self, alert_id: &str) -> bool {
        if self.alerts.remove_alert(alert_id).is_none() {
            return false;
        }
        self.unlink_alert(alert_id);
        self.events.fire(&ManagerEvent::AlertsChanged);
        self.surface.request_redraw();
        true
    }

    fn unlink_alert(&mut self, alert_id: &str) {
        for tool in &mut self.tools {
            if tool.alert_id.as_deref() == Some(alert_id) {
                tool.alert_id = None;
            }
        }
    }

    /// Evaluate all alerts against a new or updated candle at `logical`
    pub fn check_alerts(&mut self, candle: &Candle, logical: f64) -> Vec<AlertTriggered> {
        let fired = evaluate_alerts(&mut self.alerts, &self.tools, candle, logical);
        for event in &fired {
            self.unlink_alert(&event.alert_id);
            self.events.fire(&ManagerEvent::AlertTriggered(event.clone()));
        }
        if !fired.is_empty() {
            self.events.fire(&ManagerEvent::AlertsChanged);
            self.surface.request_redraw();
        }
        fired
    }

    pub fn refresh_tool_alerts(&mut self, logical: f64) {
        refresh_tool_alert_prices(&mut self.alerts, &self.tools, logical);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chart_surface::RecordingSurface;
    use crate::domain::mapping::LinearScales;

    fn manager() -> ToolManager<RecordingSurface> {
        ToolManager::new(RecordingSurface::new(LinearScales::default()), ManagerConfig::default())
    }

    #[test]
    fn three_click_preview_pads_with_cursor() {
        let p0 = DomainPoint::new(1.0, 1.0);
        let cur = DomainPoint::new(5.0, 5.0);
        let points = ToolManager::<RecordingSurface>::preview_points(ToolKind::Triangle, &[p0], cur);
        assert_eq!(points, vec![p0, cur, cur]);
    }

    #[test]
    fn escape_while_idle_clears_selection() {
        let mut m = manager();
        m.start_tool(ToolKind::HorizontalLine);
        m.on_click(100.0, 300.0, 0.0);
        assert!(m.selected().is_some());
        assert!(m.on_key(&KeyInput::new("Escape")));
        assert!(m.selected().is_none());
    }
}
