use crate::application::coordinator::{
    ChartToolsCoordinator, clear_global_coordinator, install_global_coordinator, with_global_coordinator,
    with_global_coordinator_mut,
};
use crate::application::feed_session::FeedSession;
use crate::application::tool_manager::{KeyInput, PointerButton};
use crate::domain::alerts::{AlertCondition, AlertTriggered};
use crate::domain::config::ManagerConfig;
use crate::domain::errors::{AppError, PresentationError};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::mapping::{DomainPoint, LinearScales};
use crate::domain::market_data::{Candle, Symbol, TimeInterval};
use crate::domain::tools::{ToolId, ToolKind, ToolOptions};
use crate::global_state::globals;
use crate::infrastructure::{BrowserRandom, CanvasChartSurface, JsCandleFeed, LocalStore};
use crate::presentation::navigation::{LogicalRange, NavAction, NavigationController, NavigationOverlay};
use crate::presentation::{refresh_templates, refresh_view};
use crate::presentation::toolbar::{ChartRect, FloatingToolbar};
use gloo::utils::format::JsValueSerdeExt;
use js_sys::{Function, Promise};
use leptos::*;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

const DEFAULT_HISTORY_LIMIT: usize = 500;

impl From<AppError> for JsValue {
    fn from(error: AppError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

fn interop(msg: impl Into<String>) -> JsValue {
    AppError::from(PresentationError::JsInterop(msg.into())).into()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    JsValue::from_serde(value).map_err(|e| interop(e.to_string()))
}

/// Page-side state that is not part of the tool core
struct ChartHost {
    surface: CanvasChartSurface,
    navigation: NavigationController,
    feed: Option<JsCandleFeed>,
    session: Option<FeedSession>,
    on_alert: Option<Function>,
    on_change: Option<Function>,
    on_range_change: Option<Function>,
}

thread_local! {
    static CHART_HOST: RefCell<Option<ChartHost>> = const { RefCell::new(None) };
}

fn with_host<R>(f: impl FnOnce(&mut ChartHost) -> R) -> Option<R> {
    CHART_HOST.with(|host| host.try_borrow_mut().ok()?.as_mut().map(f))
}

fn coordinator_mut<R>(f: impl FnOnce(&mut ChartToolsCoordinator) -> R) -> Result<R, JsValue> {
    with_global_coordinator_mut(f).ok_or_else(|| interop("chart tools are not initialised"))
}

/// Run a manager input and refresh the view afterwards
fn input<R>(f: impl FnOnce(&mut ChartToolsCoordinator) -> R) -> Option<R> {
    let result = with_global_coordinator_mut(f);
    refresh_view();
    result
}

fn call_callback(callback: Option<Function>, payload: Result<JsValue, JsValue>) {
    let (Some(callback), Ok(payload)) = (callback, payload) else { return };
    if let Err(e) = callback.call1(&JsValue::NULL, &payload) {
        get_logger().warn(LogComponent::Presentation("ChartTools"), &format!("callback threw: {:?}", e));
    }
}

/// Paint the overlay canvas if anything changed since the last paint
pub(crate) fn repaint() {
    let Some(surface) = with_host(|host| host.surface.clone()) else { return };
    if !surface.is_dirty() {
        return;
    }
    let painted = with_global_coordinator(|coordinator| {
        let manager = coordinator.manager();
        surface.render(manager.drawables(), manager.bar_seconds(), manager.config().position_min_width)
    });
    if let Some(Err(e)) = painted {
        get_logger().error(LogComponent::Presentation("ChartTools"), &format!("repaint failed: {}", e));
    }
}

/// Notify the page after the published snapshot changed
pub(crate) fn notify_change() {
    let callback = with_host(|host| host.on_change.clone()).flatten();
    if callback.is_none() {
        return;
    }
    let payload = globals().snapshot.with_untracked(to_js);
    call_callback(callback, payload);
}

fn publish_alerts(fired: Vec<AlertTriggered>) {
    if fired.is_empty() {
        return;
    }
    let callback = with_host(|host| host.on_alert.clone()).flatten();
    for event in &fired {
        call_callback(callback.clone(), to_js(event));
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VisibleRangeChange {
    from: f64,
    to: f64,
    right_offset: Option<f64>,
    auto_scale: bool,
}

/// Lowest low and highest high of the candles inside `range`
fn visible_price_range(session: &FeedSession, range: LogicalRange) -> Option<(f64, f64)> {
    session.with_series(|series| {
        series
            .iter_logical()
            .filter(|(logical, _)| *logical >= range.from.floor() && *logical <= range.to.ceil())
            .map(|(_, c)| (c.low, c.high))
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
    })
}

/// Apply a navigation button to the visible range
pub(crate) fn navigate(action: NavAction) {
    let outcome = with_host(|host| {
        let mut scales = host.surface.scales();
        let current = LogicalRange::new(scales.from_logical, scales.to_logical);
        let content = host
            .session
            .as_ref()
            .and_then(|s| s.with_series(|series| series.logical_range()))
            .map(|(from, to)| LogicalRange::new(from, to));
        let step = host.navigation.step(action, current, content);
        scales.set_visible_range(step.range.from, step.range.to);
        if step.auto_scale {
            if let Some((low, high)) = host.session.as_ref().and_then(|s| visible_price_range(s, step.range)) {
                scales.fit_prices(low, high);
            }
        }
        host.surface.set_scales(scales);
        (step, host.on_range_change.clone())
    });
    let Some((step, callback)) = outcome else { return };
    get_logger().debug(
        LogComponent::Presentation("Navigation"),
        &format!("{} -> [{:.1}, {:.1}]", action, step.range.from, step.range.to),
    );
    call_callback(
        callback,
        to_js(&VisibleRangeChange {
            from: step.range.from,
            to: step.range.to,
            right_offset: step.right_offset,
            auto_scale: step.auto_scale,
        }),
    );
    repaint();
}

fn parse_condition(raw: Option<String>) -> Result<Option<AlertCondition>, JsValue> {
    raw.map(|c| AlertCondition::from_str(&c).map_err(|_| interop(format!("unknown alert condition '{}'", c))))
        .transpose()
}

/// Drawing tools over a host chart.
///
/// The page forwards pointer and keyboard input, pushes the chart's visible
/// ranges in through [`ChartTools::set_scales`] and receives snapshots, fired
/// alerts and navigation requests through the `on*` callbacks.
#[wasm_bindgen]
pub struct ChartTools {
    canvas_id: String,
}

#[wasm_bindgen]
impl ChartTools {
    /// `config` is an optional JSON object of tunables; malformed input
    /// falls back to the defaults
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: String, width: f64, height: f64, pixel_ratio: f64, config: Option<String>) -> ChartTools {
        let config = match config.as_deref().map(ManagerConfig::from_json) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                get_logger().warn(
                    LogComponent::Presentation("ChartTools"),
                    &format!("invalid config ({}), using defaults", e),
                );
                ManagerConfig::default()
            }
            None => ManagerConfig::default(),
        };

        let mut scales = LinearScales::new(width, height);
        scales.pixel_ratio = pixel_ratio.max(1.0);
        let surface = CanvasChartSurface::new(canvas_id.clone(), scales);
        let navigation = NavigationController::new(config.navigation.clone());
        install_global_coordinator(ChartToolsCoordinator::new(
            Box::new(surface.clone()),
            Box::new(LocalStore),
            Box::new(BrowserRandom),
            Box::new(BrowserRandom),
            config,
        ));
        CHART_HOST.with(|host| {
            *host.borrow_mut() = Some(ChartHost {
                surface,
                navigation,
                feed: None,
                session: None,
                on_alert: None,
                on_change: None,
                on_range_change: None,
            });
        });
        get_logger().info(LogComponent::Presentation("ChartTools"), &format!("attached to canvas #{}", canvas_id));
        refresh_view();
        refresh_templates();
        ChartTools { canvas_id }
    }

    #[wasm_bindgen(getter, js_name = canvasId)]
    pub fn canvas_id(&self) -> String {
        self.canvas_id.clone()
    }

    /// Mount the floating toolbar and navigation buttons into `container_id`
    #[wasm_bindgen(js_name = mountOverlays)]
    pub fn mount_overlays(&self, container_id: String) -> Result<(), JsValue> {
        let element = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(&container_id))
            .ok_or_else(|| AppError::from(PresentationError::ElementNotFound(container_id.clone())))?;
        let rect = element.get_bounding_client_rect();
        globals().chart_rect.set(Some(ChartRect {
            left: rect.left(),
            top: rect.top(),
            right: rect.right(),
            bottom: rect.bottom(),
        }));
        let parent = element
            .dyn_into::<web_sys::HtmlElement>()
            .map_err(|_| interop(format!("#{} is not an HTML element", container_id)))?;
        let config = with_global_coordinator(|c| c.manager().config().navigation.clone()).unwrap_or_default();
        mount_to(parent, move || {
            view! {
                <FloatingToolbar />
                <NavigationOverlay container_id=container_id config=config />
            }
        });
        Ok(())
    }

    /// Chart pane rectangle in viewport coordinates, used to place the toolbar
    #[wasm_bindgen(js_name = setChartRect)]
    pub fn set_chart_rect(&self, left: f64, top: f64, right: f64, bottom: f64) {
        globals().chart_rect.set(Some(ChartRect { left, top, right, bottom }));
    }

    /// Visible logical and price ranges of the host chart
    #[wasm_bindgen(js_name = setScales)]
    pub fn set_scales(&self, from_logical: f64, to_logical: f64, min_price: f64, max_price: f64) {
        let Some(surface) = with_host(|host| host.surface.clone()) else { return };
        let scales = surface.scales().with_ranges((from_logical, to_logical), (min_price, max_price));
        surface.set_scales(scales);
        repaint();
    }

    pub fn resize(&self, width: f64, height: f64, pixel_ratio: f64) {
        if let Some(surface) = with_host(|host| host.surface.clone()) {
            surface.resize(width, height, pixel_ratio);
            repaint();
        }
    }

    #[wasm_bindgen(js_name = setDefaultRange)]
    pub fn set_default_range(&self, from: f64, to: f64) {
        with_host(|host| host.navigation.set_default_range(Some(LogicalRange::new(from, to))));
    }

    /// `zoom_in`, `zoom_out`, `scroll_left`, `scroll_right` or `reset`
    pub fn navigate(&self, action: &str) -> Result<(), JsValue> {
        let action = NavAction::from_str(action).map_err(|_| interop(format!("unknown navigation '{}'", action)))?;
        navigate(action);
        Ok(())
    }

    /// Whether the host chart should pan and zoom on drag and wheel
    #[wasm_bindgen(js_name = chartInteractionEnabled)]
    pub fn chart_interaction_enabled(&self) -> bool {
        with_host(|host| host.surface.interaction_enabled()).unwrap_or(true)
    }

    // ---- tool modes -----------------------------------------------------

    #[wasm_bindgen(js_name = startTool)]
    pub fn start_tool(&self, kind: &str) -> Result<(), JsValue> {
        let kind = ToolKind::from_str(kind).map_err(|_| interop(format!("unknown tool '{}'", kind)))?;
        input(|c| c.manager_mut().start_tool(kind));
        Ok(())
    }

    #[wasm_bindgen(js_name = activeTool)]
    pub fn active_tool(&self) -> String {
        with_global_coordinator(|c| c.manager().active_kind()).unwrap_or_default().to_string()
    }

    pub fn cancel(&self) {
        input(|c| c.manager_mut().cancel());
    }

    // ---- pointer and keyboard -------------------------------------------

    pub fn click(&self, x: f64, y: f64, time_ms: f64) {
        input(|c| c.manager_mut().on_click(x, y, time_ms));
    }

    #[wasm_bindgen(js_name = crosshairMove)]
    pub fn crosshair_move(&self, x: f64, y: f64) {
        input(|c| c.manager_mut().on_crosshair_move(x, y));
    }

    /// Returns true when the event was consumed and the native menu should be suppressed
    #[wasm_bindgen(js_name = contextMenu)]
    pub fn context_menu(&self) -> bool {
        input(|c| c.manager_mut().on_context_menu()).unwrap_or(false)
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&self, x: f64, y: f64, button: i16) -> bool {
        input(|c| c.manager_mut().on_pointer_down(x, y, PointerButton::from(button))).unwrap_or(false)
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, x: f64, y: f64) {
        input(|c| c.manager_mut().on_pointer_move(x, y));
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&self) {
        input(|c| c.manager_mut().on_pointer_up());
    }

    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&self, key: &str, ctrl: bool, meta: bool, shift: bool) -> bool {
        let key = KeyInput { key: key.to_string(), ctrl, meta, shift };
        input(|c| c.manager_mut().on_key(&key)).unwrap_or(false)
    }

    // ---- editing ----------------------------------------------------------

    pub fn undo(&self) -> bool {
        input(|c| c.manager_mut().undo()).unwrap_or(false)
    }

    pub fn redo(&self) -> bool {
        input(|c| c.manager_mut().redo()).unwrap_or(false)
    }

    #[wasm_bindgen(js_name = selectTool)]
    pub fn select_tool(&self, id: Option<f64>) {
        input(|c| c.manager_mut().select(id.map(|id| ToolId::from(id as u64))));
    }

    #[wasm_bindgen(js_name = deleteTool)]
    pub fn delete_tool(&self, id: f64) -> Result<(), JsValue> {
        let result = coordinator_mut(|c| c.manager_mut().delete_tool(ToolId::from(id as u64)))?;
        refresh_view();
        result.map_err(|e| AppError::from(e).into())
    }

    #[wasm_bindgen(js_name = toggleLock)]
    pub fn toggle_lock(&self, id: f64) -> Result<bool, JsValue> {
        let result = coordinator_mut(|c| c.manager_mut().toggle_lock(ToolId::from(id as u64)))?;
        refresh_view();
        result.map_err(|e| AppError::from(e).into())
    }

    /// Merge a JSON options patch into a tool; `remember` also updates the
    /// sticky style of the tool's kind
    #[wasm_bindgen(js_name = applyOptions)]
    pub fn apply_options(&self, id: f64, patch: &str, remember: bool) -> Result<(), JsValue> {
        let patch: ToolOptions = serde_json::from_str(patch).map_err(|e| interop(e.to_string()))?;
        let result = coordinator_mut(|c| c.manager_mut().apply_tool_options(ToolId::from(id as u64), &patch, remember))?;
        refresh_view();
        result.map_err(|e| AppError::from(e).into())
    }

    #[wasm_bindgen(js_name = updatePoint)]
    pub fn update_point(&self, id: f64, index: usize, logical: f64, price: f64) -> Result<(), JsValue> {
        let point = DomainPoint::new(logical, price);
        let result = coordinator_mut(|c| c.manager_mut().update_point(ToolId::from(id as u64), index, point))?;
        refresh_view();
        result.map_err(|e| AppError::from(e).into())
    }

    // ---- templates --------------------------------------------------------

    pub fn templates(&self) -> Result<JsValue, JsValue> {
        to_js(&with_global_coordinator(|c| c.templates()).unwrap_or_default())
    }

    #[wasm_bindgen(js_name = saveTemplate)]
    pub fn save_template(&self, name: &str) -> Result<JsValue, JsValue> {
        let saved = coordinator_mut(|c| c.save_template(name))??;
        refresh_templates();
        to_js(&saved)
    }

    #[wasm_bindgen(js_name = applyTemplate)]
    pub fn apply_template(&self, template_id: &str) -> Result<(), JsValue> {
        coordinator_mut(|c| c.apply_template(template_id))??;
        refresh_view();
        Ok(())
    }

    #[wasm_bindgen(js_name = deleteTemplate)]
    pub fn delete_template(&self, template_id: &str) -> bool {
        let removed = with_global_coordinator_mut(|c| c.delete_template(template_id)).unwrap_or(false);
        refresh_templates();
        removed
    }

    // ---- alerts -----------------------------------------------------------

    /// Alert on a tool; `condition` defaults to the first one offered for its kind
    #[wasm_bindgen(js_name = addToolAlert)]
    pub fn add_tool_alert(&self, id: f64, condition: Option<String>) -> Result<String, JsValue> {
        let condition = parse_condition(condition)?;
        let alert_id = coordinator_mut(|c| c.manager_mut().add_tool_alert(ToolId::from(id as u64), condition))??;
        refresh_view();
        Ok(alert_id)
    }

    #[wasm_bindgen(js_name = addPriceAlert)]
    pub fn add_price_alert(&self, price: f64, condition: Option<String>) -> Result<String, JsValue> {
        let condition = parse_condition(condition)?.unwrap_or_default();
        let alert_id = coordinator_mut(|c| c.manager_mut().add_price_alert(price, condition))?;
        refresh_view();
        Ok(alert_id)
    }

    #[wasm_bindgen(js_name = removeAlert)]
    pub fn remove_alert(&self, alert_id: &str) -> bool {
        input(|c| c.manager_mut().remove_alert(alert_id)).unwrap_or(false)
    }

    pub fn alerts(&self) -> Result<JsValue, JsValue> {
        to_js(&with_global_coordinator(|c| c.manager().alerts().alerts()).unwrap_or_default())
    }

    /// Application-level price watch with a relative tolerance band
    #[wasm_bindgen(js_name = watchPrice)]
    pub fn watch_price(&self, price: f64) -> Result<String, JsValue> {
        coordinator_mut(|c| c.price_watch_mut().watch(price))
    }

    #[wasm_bindgen(js_name = unwatchPrice)]
    pub fn unwatch_price(&self, id: &str) -> bool {
        with_global_coordinator_mut(|c| c.price_watch_mut().unwatch(id)).unwrap_or(false)
    }

    // ---- state ------------------------------------------------------------

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let snapshot = with_global_coordinator(|c| c.manager().snapshot())
            .ok_or_else(|| interop("chart tools are not initialised"))?;
        to_js(&snapshot)
    }

    pub fn tools(&self) -> Result<JsValue, JsValue> {
        to_js(&with_global_coordinator(|c| c.manager().tools().to_vec()).unwrap_or_default())
    }

    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: Option<Function>) {
        with_host(|host| host.on_change = callback);
    }

    #[wasm_bindgen(js_name = onAlert)]
    pub fn on_alert(&self, callback: Option<Function>) {
        with_host(|host| host.on_alert = callback);
    }

    #[wasm_bindgen(js_name = onVisibleRangeChange)]
    pub fn on_visible_range_change(&self, callback: Option<Function>) {
        with_host(|host| host.on_range_change = callback);
    }

    pub fn repaint(&self) {
        repaint();
    }

    // ---- feed ---------------------------------------------------------------

    /// `fetcher(symbol, interval, limit)` must return a promise of candles
    #[wasm_bindgen(js_name = setFeed)]
    pub fn set_feed(&self, fetcher: Function) {
        let feed = JsCandleFeed::new(fetcher);
        let session = FeedSession::new(Rc::new(feed.clone()));
        session.set_on_update(|candle: &Candle, logical, _update| {
            let fired = with_global_coordinator_mut(|c| c.on_candle(candle, logical)).unwrap_or_default();
            publish_alerts(fired);
            refresh_view();
        });
        let previous = with_host(|host| {
            host.feed = Some(feed);
            host.session.replace(session)
        })
        .flatten();
        if let Some(previous) = previous {
            previous.dispose();
        }
    }

    /// Load history for `symbol`/`interval`; resolves to the candle count
    pub fn load(&self, symbol: &str, interval: &str, limit: Option<usize>) -> Result<Promise, JsValue> {
        let interval = TimeInterval::from_str(interval).map_err(|_| interop(format!("unknown interval '{}'", interval)))?;
        let session = with_host(|host| host.session.clone())
            .flatten()
            .ok_or_else(|| interop("no feed configured"))?;
        with_global_coordinator_mut(|c| c.set_interval(interval));
        let symbol = Symbol::from(symbol);
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        Ok(future_to_promise(async move {
            let count = session.load(symbol, interval, limit).await;
            refresh_view();
            Ok(JsValue::from_f64(count as f64))
        }))
    }

    /// Push a live candle `{time, open, high, low, close}` for `symbol`/`interval`
    #[wasm_bindgen(js_name = pushCandle)]
    pub fn push_candle(&self, symbol: &str, interval: &str, candle: JsValue) -> Result<(), JsValue> {
        let interval = TimeInterval::from_str(interval).map_err(|_| interop(format!("unknown interval '{}'", interval)))?;
        let candle: Candle = candle.into_serde().map_err(|e| interop(e.to_string()))?;
        let feed = with_host(|host| host.feed.clone()).flatten().ok_or_else(|| interop("no feed configured"))?;
        feed.push(Symbol::from(symbol), interval, candle);
        Ok(())
    }

    /// Drop the session, the coordinator and every callback
    pub fn dispose(&self) {
        let host = CHART_HOST.with(|host| host.borrow_mut().take());
        if let Some(session) = host.and_then(|h| h.session) {
            session.dispose();
        }
        clear_global_coordinator();
        get_logger().info(LogComponent::Presentation("ChartTools"), "disposed");
    }
}
