//! Floating toolbar: a pure view model derived from the selected tool, plus
//! the Leptos component that renders it.

use crate::domain::alerts::available_conditions;
use crate::domain::templates::StyleTemplate;
use crate::domain::tools::{Tool, ToolId, ToolKind, ToolOptions};
use crate::application::tool_manager::ToolbarMode;
use crate::event_utils::{ListenerHandle, window_event_listener_with_options, EventOptions};
use crate::global_state::globals;
use crate::domain::logging::{LogComponent, get_logger};
use crate::presentation::{refresh_templates, refresh_view};
use crate::application::coordinator::with_global_coordinator_mut;
use leptos::*;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

pub const DEFAULT_LINE_COLOR: &str = "#2962ff";
pub const DEFAULT_TEXT_COLOR: &str = "#131722";
pub const LINE_WIDTHS: [f64; 4] = [1.0, 2.0, 3.0, 4.0];
/// Gap kept between the toolbar and the chart's right edge when no position was saved
const DEFAULT_RIGHT_GAP: f64 = 100.0;
const DEFAULT_TOP_GAP: f64 = 15.0;

pub const PALETTE: [&str; 64] = [
    "#ffffff", "#e1e1e1", "#b2b5be", "#787b86", "#5d606b", "#434651", "#2a2e39", "#131722",
    "#f23645", "#ff9800", "#ffe600", "#4caf50", "#00bcd4", "#2962ff", "#673ab7", "#9c27b0",
    "#ef9a9a", "#ffe0b2", "#fff9c4", "#c8e6c9", "#b2ebf2", "#bbdefb", "#d1c4e9", "#e1bee7",
    "#e57373", "#ffcc80", "#fff59d", "#a5d6a7", "#80deea", "#90caf9", "#b39ddb", "#ce93d8",
    "#ef5350", "#ffb74d", "#fff176", "#81c784", "#4dd0e1", "#64b5f6", "#9575cd", "#ba68c8",
    "#e53935", "#ffa726", "#ffee58", "#66bb6a", "#26c6da", "#42a5f5", "#7e57c2", "#ab47bc",
    "#d32f2f", "#fb8c00", "#fdd835", "#43a047", "#00acc1", "#1e88e5", "#5e35b1", "#8e24aa",
    "#c62828", "#f57c00", "#fbc02d", "#388e3c", "#0097a7", "#1976d2", "#512da8", "#7b1fa2",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTarget {
    Line,
    Fill,
    Text,
}

/// Single icon shown while a kind is being placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollapsedIcon {
    Text,
    Alert,
    Eraser,
    Brush,
}

impl CollapsedIcon {
    pub fn for_kind(kind: ToolKind) -> Self {
        match kind {
            ToolKind::Text => CollapsedIcon::Text,
            ToolKind::UserPriceAlerts => CollapsedIcon::Alert,
            ToolKind::Eraser => CollapsedIcon::Eraser,
            _ => CollapsedIcon::Brush,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            CollapsedIcon::Text => "T",
            CollapsedIcon::Alert => "⏰",
            CollapsedIcon::Eraser => "⌫",
            CollapsedIcon::Brush => "✎",
        }
    }
}

/// One control group of the expanded toolbar, in display order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "section", rename_all = "camelCase")]
pub enum ToolbarSection {
    Templates,
    LineColor { color: String },
    FillColor { color: String },
    TextColor { color: String },
    Width { current: f64 },
    Alert,
    Lock { locked: bool },
    Delete,
}

/// Color currently shown for `target`
pub fn current_color(options: &ToolOptions, target: ColorTarget) -> String {
    let color = match target {
        ColorTarget::Line => options
            .line_color
            .as_deref()
            .or(options.border_color.as_deref())
            .or(options.color.as_deref())
            .unwrap_or(DEFAULT_LINE_COLOR),
        ColorTarget::Text => options.text_color.as_deref().unwrap_or(DEFAULT_TEXT_COLOR),
        ColorTarget::Fill => options.background_color.as_deref().unwrap_or(DEFAULT_LINE_COLOR),
    };
    color.to_string()
}

/// Expanded sections for a selected tool
pub fn expanded_sections(tool: &Tool) -> Vec<ToolbarSection> {
    let o = &tool.options;
    let mut sections = vec![
        ToolbarSection::Templates,
        ToolbarSection::LineColor { color: current_color(o, ColorTarget::Line) },
    ];
    if let Some(fill) = &o.background_color {
        sections.push(ToolbarSection::FillColor { color: fill.clone() });
    }
    if tool.kind == ToolKind::Text || (o.text_color.is_some() && o.background_color.is_some()) {
        sections.push(ToolbarSection::TextColor { color: current_color(o, ColorTarget::Text) });
    }
    if o.line_width.is_some() || o.width.is_some() {
        sections.push(ToolbarSection::Width { current: o.line_width.or(o.width).unwrap_or(1.0) });
    }
    if !available_conditions(tool.kind).is_empty() {
        sections.push(ToolbarSection::Alert);
    }
    sections.push(ToolbarSection::Lock { locked: tool.locked });
    sections.push(ToolbarSection::Delete);
    sections
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() < 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn parse_rgb(color: &str) -> Option<(Vec<String>, Option<f64>)> {
    let inner = color
        .strip_prefix("rgba(")
        .or_else(|| color.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<String> = inner.split(',').map(|p| p.trim().to_string()).collect();
    match parts.len() {
        3 => Some((parts, None)),
        4 => {
            let alpha = parts[3].parse::<f64>().ok();
            Some((parts[..3].to_vec(), alpha))
        }
        _ => None,
    }
}

/// Alpha of an `rgba(...)` color; opaque for everything else
pub fn color_alpha(color: &str) -> f64 {
    parse_rgb(color).and_then(|(_, alpha)| alpha).unwrap_or(1.0)
}

/// Rewrite a hex or rgb/rgba color as `rgba(r, g, b, opacity)`
pub fn apply_opacity(color: &str, opacity: f64) -> String {
    if let Some((r, g, b)) = parse_hex(color) {
        return format!("rgba({}, {}, {}, {})", r, g, b, opacity);
    }
    match parse_rgb(color) {
        Some((rgb, _)) => format!("rgba({}, {}, {}, {})", rgb[0], rgb[1], rgb[2], opacity),
        None => color.to_string(),
    }
}

/// Patch setting `color` on every option the target drives.
///
/// A hex pick over a translucent color keeps the existing alpha.
pub fn color_patch(options: &ToolOptions, target: ColorTarget, color: &str) -> ToolOptions {
    let existing = alpha_source(options, target);
    let alpha = color_alpha(&existing);
    let color = if alpha < 1.0 && color.starts_with('#') { apply_opacity(color, alpha) } else { color.to_string() };

    let mut patch = ToolOptions::default();
    match target {
        ColorTarget::Line => {
            if options.line_color.is_some() {
                patch.line_color = Some(color.clone());
            }
            if options.border_color.is_some() {
                patch.border_color = Some(color.clone());
            }
            if options.color.is_some() {
                patch.color = Some(color.clone());
            }
            if options.text_color.is_some() && options.background_color.is_none() {
                patch.text_color = Some(color);
            }
        }
        ColorTarget::Text => {
            if options.text_color.is_some() {
                patch.text_color = Some(color);
            }
        }
        ColorTarget::Fill => {
            if options.background_color.is_some() {
                patch.background_color = Some(color);
            }
        }
    }
    patch
}

fn alpha_source(options: &ToolOptions, target: ColorTarget) -> String {
    match target {
        ColorTarget::Text => current_color(options, ColorTarget::Line),
        other => current_color(options, other),
    }
}

/// Patch for the opacity slider, `opacity` in `0.0..=1.0`
pub fn opacity_patch(options: &ToolOptions, target: ColorTarget, opacity: f64) -> ToolOptions {
    let color = apply_opacity(&current_color(options, target), opacity.clamp(0.0, 1.0));
    color_patch(options, target, &color)
}

pub fn width_patch(options: &ToolOptions, width: f64) -> ToolOptions {
    let mut patch = ToolOptions::default();
    if options.line_width.is_some() {
        patch.line_width = Some(width);
    }
    if options.width.is_some() {
        patch.width = Some(width);
    }
    patch
}

/// Chart pane rectangle in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Clamp the toolbar's top-left corner so it stays inside the chart, or the
/// viewport minus a 10px margin when the chart rectangle is unknown
pub fn clamp_position(
    x: f64,
    y: f64,
    size: (f64, f64),
    chart: Option<ChartRect>,
    viewport: (f64, f64),
) -> (f64, f64) {
    let (min_x, min_y, max_x, max_y) = match chart {
        Some(rect) => (rect.left, rect.top, rect.right - size.0, rect.bottom - size.1),
        None => (10.0, 10.0, viewport.0 - size.0 - 10.0, viewport.1 - size.1 - 10.0),
    };
    (x.max(min_x).min(max_x), y.max(min_y).min(max_y))
}

/// Saved position if any, otherwise near the chart's top-right corner
pub fn initial_position(
    saved: Option<(f64, f64)>,
    size: (f64, f64),
    chart: Option<ChartRect>,
    viewport: (f64, f64),
) -> (f64, f64) {
    let (x, y) = saved.unwrap_or_else(|| match chart {
        Some(rect) => (rect.right - size.0 - DEFAULT_RIGHT_GAP, rect.top + DEFAULT_TOP_GAP),
        None => (viewport.0 - size.0 - DEFAULT_RIGHT_GAP, 100.0),
    });
    clamp_position(x, y, size, chart, viewport)
}

// ---- component --------------------------------------------------------

const TOOLBAR_SIZE: (f64, f64) = (420.0, 40.0);

fn viewport_size() -> (f64, f64) {
    web_sys::window()
        .map(|w| {
            let width = w.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            let height = w.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            (width, height)
        })
        .unwrap_or((0.0, 0.0))
}

/// Run an edit against the selected tool and republish the view
fn edit_selected(action: impl FnOnce(&mut crate::application::coordinator::ChartToolsCoordinator, ToolId)) {
    with_global_coordinator_mut(|coordinator| {
        if let Some(id) = coordinator.manager().selected() {
            action(coordinator, id);
        }
    });
    refresh_view();
}

fn selected_options() -> Option<ToolOptions> {
    globals().snapshot.with_untracked(|s| s.as_ref().and_then(|s| s.selected_tool.as_ref().map(|t| t.options.clone())))
}

fn apply_patch(patch: ToolOptions) {
    edit_selected(|coordinator, id| {
        if let Err(e) = coordinator.manager_mut().apply_tool_options(id, &patch, true) {
            get_logger().warn(LogComponent::Presentation("Toolbar"), &format!("style update failed: {}", e));
        }
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dropdown {
    Templates,
    Color(ColorTarget),
    Width,
}

#[component]
pub fn FloatingToolbar() -> impl IntoView {
    let g = globals();
    let dropdown = create_rw_signal::<Option<Dropdown>>(None);
    let drag_listeners: Rc<RefCell<Vec<ListenerHandle>>> = Rc::new(RefCell::new(Vec::new()));

    let mode = move || g.snapshot.with(|s| s.as_ref().map_or(ToolbarMode::Hidden, |s| s.toolbar));
    let position = move || initial_position(g.toolbar_position.get(), TOOLBAR_SIZE, g.chart_rect.get(), viewport_size());

    let toggle = move |which: Dropdown| dropdown.update(|d| *d = if *d == Some(which) { None } else { Some(which) });

    let start_drag = {
        let drag_listeners = Rc::clone(&drag_listeners);
        move |ev: web_sys::MouseEvent| {
            ev.prevent_default();
            let (origin_x, origin_y) = position();
            let (start_x, start_y) = (ev.client_x() as f64, ev.client_y() as f64);
            let options = EventOptions { passive: true, ..EventOptions::default() };
            let on_move = window_event_listener_with_options(ev::mousemove, &options, move |e: web_sys::MouseEvent| {
                let x = origin_x + e.client_x() as f64 - start_x;
                let y = origin_y + e.client_y() as f64 - start_y;
                let clamped = clamp_position(x, y, TOOLBAR_SIZE, g.chart_rect.get_untracked(), viewport_size());
                g.toolbar_position.set(Some(clamped));
            });
            let listeners = Rc::clone(&drag_listeners);
            let on_up = window_event_listener_with_options(ev::mouseup, &options, move |_| {
                // released on the next tick; a listener must not drop itself mid-call
                let listeners = Rc::clone(&listeners);
                gloo::timers::callback::Timeout::new(0, move || listeners.borrow_mut().clear()).forget();
            });
            let mut held = drag_listeners.borrow_mut();
            held.clear();
            held.extend(on_move.into_iter().chain(on_up));
        }
    };

    let collapsed = move |kind: ToolKind| {
        let icon = CollapsedIcon::for_kind(kind);
        view! { <button class="tool-btn active" title=kind.to_string()>{icon.glyph()}</button> }.into_view()
    };

    let expanded = move |tool: Tool| {
        expanded_sections(&tool)
            .into_iter()
            .map(|section| match section {
                ToolbarSection::Templates => view! {
                    <div class="tool-wrapper">
                        <button class="tool-btn" title="Templates" on:click=move |_| toggle(Dropdown::Templates)>"▦"</button>
                        <Show when=move || dropdown.get() == Some(Dropdown::Templates)>
                            <TemplateMenu />
                        </Show>
                    </div>
                }.into_view(),
                ToolbarSection::LineColor { color } => color_button(ColorTarget::Line, color, "Line Color", dropdown, toggle),
                ToolbarSection::FillColor { color } => color_button(ColorTarget::Fill, color, "Fill Color", dropdown, toggle),
                ToolbarSection::TextColor { color } => color_button(ColorTarget::Text, color, "Text Color", dropdown, toggle),
                ToolbarSection::Width { current } => view! {
                    <div class="tool-wrapper">
                        <div class="stroke-width-trigger" title="Line Width" on:click=move |_| toggle(Dropdown::Width)>
                            <div class="stroke-width-preview" style=format!("height: {}px", current.max(1.0))></div>
                            <span>{format!("{}px", current)}</span>
                        </div>
                        <Show when=move || dropdown.get() == Some(Dropdown::Width)>
                            <div class="tv-floating-toolbar__dropdown visible">
                                {LINE_WIDTHS.iter().map(|&w| view! {
                                    <div
                                        class="tv-width-picker__item"
                                        class:active=move || w == current
                                        on:click=move |_| {
                                            if let Some(options) = selected_options() {
                                                apply_patch(width_patch(&options, w));
                                            }
                                            dropdown.set(None);
                                        }
                                    >
                                        <div class="tv-width-picker__line" style=format!("height: {}px", w)></div>
                                        <div class="tv-width-picker__text">{format!("{}px", w)}</div>
                                    </div>
                                }).collect_view()}
                            </div>
                        </Show>
                    </div>
                }.into_view(),
                ToolbarSection::Alert => view! {
                    <button class="tool-btn" title="Add Alert" on:click=move |_| edit_selected(|coordinator, id| {
                        if let Err(e) = coordinator.manager_mut().add_tool_alert(id, None) {
                            get_logger().warn(LogComponent::Presentation("Toolbar"), &format!("alert not created: {}", e));
                        }
                    })>"⏰"</button>
                }.into_view(),
                ToolbarSection::Lock { locked } => view! {
                    <button class="tool-btn" class:active=locked title="Lock" on:click=move |_| edit_selected(|coordinator, id| {
                        let _ = coordinator.manager_mut().toggle_lock(id);
                    })>"🔒"</button>
                }.into_view(),
                ToolbarSection::Delete => view! {
                    <button class="tool-btn" title="Remove" on:click=move |_| edit_selected(|coordinator, id| {
                        if let Err(e) = coordinator.manager_mut().delete_tool(id) {
                            get_logger().debug(LogComponent::Presentation("Toolbar"), &format!("delete refused: {}", e));
                        }
                    })>"🗑"</button>
                }.into_view(),
            })
            .collect_view()
    };

    view! {
        <div
            class="tv-floating-toolbar"
            class:hidden=move || mode() == ToolbarMode::Hidden
            style:left=move || format!("{}px", position().0)
            style:top=move || format!("{}px", position().1)
        >
            <div class="drag-handle" on:mousedown=start_drag>"⠿"</div>
            {move || match mode() {
                ToolbarMode::Hidden => ().into_view(),
                ToolbarMode::Collapsed(kind) => collapsed(kind),
                ToolbarMode::Expanded(_) => g
                    .snapshot
                    .with(|s| s.as_ref().and_then(|s| s.selected_tool.clone()))
                    .map(expanded)
                    .into_view(),
            }}
        </div>
    }
}

fn color_button(
    target: ColorTarget,
    color: String,
    title: &'static str,
    dropdown: RwSignal<Option<Dropdown>>,
    toggle: impl Fn(Dropdown) + Copy + 'static,
) -> View {
    let which = Dropdown::Color(target);
    let current = color.clone();
    view! {
        <div class="tool-wrapper">
            <button class="tool-btn fill-btn" title=title on:click=move |_| toggle(which)>
                <div class="fill-btn-color" style=format!("background-color: {}", color)></div>
            </button>
            <Show when=move || dropdown.get() == Some(which)>
                <div class="tv-floating-toolbar__dropdown visible">
                    <div class="tv-color-picker__grid">
                        {PALETTE.iter().map(|&swatch| {
                            let active = current.to_lowercase().starts_with(swatch);
                            view! {
                                <div
                                    class="tv-color-picker__swatch"
                                    class:active=active
                                    style=format!("background-color: {}", swatch)
                                    on:click=move |_| {
                                        if let Some(options) = selected_options() {
                                            apply_patch(color_patch(&options, target, swatch));
                                        }
                                    }
                                ></div>
                            }
                        }).collect_view()}
                    </div>
                    <div class="tv-opacity-slider">
                        <div class="tv-opacity-slider__label">"Opacity"</div>
                        <input
                            type="range"
                            min="0"
                            max="100"
                            value=(color_alpha(&current) * 100.0).round().to_string()
                            on:input=move |ev| {
                                let percent = event_target_value(&ev).parse::<f64>().unwrap_or(100.0);
                                if let Some(options) = selected_options() {
                                    apply_patch(opacity_patch(&options, target, percent / 100.0));
                                }
                            }
                        />
                    </div>
                </div>
            </Show>
        </div>
    }
    .into_view()
}

#[component]
fn TemplateMenu() -> impl IntoView {
    let g = globals();

    let save = move |_| {
        let name = web_sys::window()
            .and_then(|w| w.prompt_with_message("Enter template name:").ok().flatten())
            .unwrap_or_default();
        if name.is_empty() {
            return;
        }
        with_global_coordinator_mut(|coordinator| {
            if let Err(e) = coordinator.save_template(&name) {
                get_logger().warn(LogComponent::Presentation("Toolbar"), &format!("template not saved: {}", e));
            }
        });
        refresh_templates();
    };

    let item = move |template: StyleTemplate| {
        let (apply_id, delete_id) = (template.id.clone(), template.id.clone());
        view! {
            <div class="tv-template-item">
                <span class="tv-template-item__name" on:click=move |_| {
                    with_global_coordinator_mut(|coordinator| {
                        if let Err(e) = coordinator.apply_template(&apply_id) {
                            get_logger().warn(LogComponent::Presentation("Toolbar"), &format!("template not applied: {}", e));
                        }
                    });
                    refresh_view();
                }>{template.name.clone()}</span>
                <button class="tv-template-item__delete" title="Delete template" on:click=move |ev| {
                    ev.stop_propagation();
                    with_global_coordinator_mut(|coordinator| coordinator.delete_template(&delete_id));
                    refresh_templates();
                }>"×"</button>
            </div>
        }
    };

    view! {
        <div class="tv-floating-toolbar__dropdown visible">
            <div class="tv-template-item" on:click=save>
                <span>"Save Drawing Template As..."</span>
            </div>
            <Show when=move || g.templates.with(|t| !t.is_empty())>
                <div class="tv-dropdown-separator"></div>
            </Show>
            <For each=move || g.templates.get() key=|t| t.id.clone() children=item />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_pick_keeps_translucent_alpha() {
        let options = ToolOptions { line_color: Some("rgba(41, 98, 255, 0.5)".into()), ..ToolOptions::default() };
        let patch = color_patch(&options, ColorTarget::Line, "#ff0000");
        assert_eq!(patch.line_color.as_deref(), Some("rgba(255, 0, 0, 0.5)"));
        assert!(patch.color.is_none());
    }

    #[test]
    fn opacity_rewrites_rgb_and_hex() {
        assert_eq!(apply_opacity("#2962ff", 0.25), "rgba(41, 98, 255, 0.25)");
        assert_eq!(apply_opacity("rgb(1, 2, 3)", 0.5), "rgba(1, 2, 3, 0.5)");
        assert_eq!(apply_opacity("rgba(1, 2, 3, 0.9)", 0.5), "rgba(1, 2, 3, 0.5)");
    }

    #[test]
    fn palette_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        assert!(PALETTE.iter().all(|c| seen.insert(*c)));
    }
}
