//! Zoom and scroll buttons over the bottom of the chart.
//!
//! The overlay never touches tools. It only moves the visible logical range
//! of the host chart through [`crate::presentation::wasm_api::navigate`].

use crate::domain::config::NavigationConfig;
use crate::domain::logging::{LogComponent, get_logger};
use crate::event_utils::{EventOptions, ListenerHandle, event_listener_with_options};
use crate::global_state::navigation_visible;
use crate::presentation::wasm_api::navigate;
use gloo::timers::callback::{Interval, Timeout};
use leptos::*;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Visible window of the time axis in logical bar indices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogicalRange {
    pub from: f64,
    pub to: f64,
}

impl LogicalRange {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    pub fn span(&self) -> f64 {
        self.to - self.from
    }

    pub fn center(&self) -> f64 {
        (self.from + self.to) / 2.0
    }

    /// Scale the span by `factor` keeping the centre fixed
    pub fn zoomed(&self, factor: f64) -> Self {
        let half = self.span() * factor / 2.0;
        let center = self.center();
        Self::new(center - half, center + half)
    }

    pub fn shifted(&self, bars: f64) -> Self {
        Self::new(self.from + bars, self.to + bars)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum NavAction {
    ZoomOut,
    ZoomIn,
    ScrollLeft,
    ScrollRight,
    Reset,
}

impl NavAction {
    /// Held scroll buttons keep firing
    pub fn repeats(&self) -> bool {
        matches!(self, Self::ScrollLeft | Self::ScrollRight)
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Self::ZoomOut => "−",
            Self::ZoomIn => "+",
            Self::ScrollLeft => "‹",
            Self::ScrollRight => "›",
            Self::Reset => "⟲",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::ZoomOut => "Zoom out",
            Self::ZoomIn => "Zoom in",
            Self::ScrollLeft => "Scroll left",
            Self::ScrollRight => "Scroll right",
            Self::Reset => "Reset chart",
        }
    }
}

/// Result of one navigation action
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationStep {
    pub range: LogicalRange,
    /// Empty bars kept right of the last candle, if the host should apply it
    pub right_offset: Option<f64>,
    /// Re-fit the price axis to the visible data
    pub auto_scale: bool,
}

/// Pointer inside the bottom strip of the pane, away from the price axis
pub fn pointer_in_hot_zone(config: &NavigationConfig, x: f64, y: f64, width: f64, height: f64) -> bool {
    y > height - config.hot_zone_height && x < width - config.right_exclusion
}

/// Maps button presses to new visible ranges
#[derive(Debug, Clone, Default)]
pub struct NavigationController {
    config: NavigationConfig,
    default_range: Option<LogicalRange>,
}

impl NavigationController {
    pub fn new(config: NavigationConfig) -> Self {
        Self { config, default_range: None }
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Range restored by reset; usually captured after the first load
    pub fn set_default_range(&mut self, range: Option<LogicalRange>) {
        self.default_range = range;
    }

    pub fn default_range(&self) -> Option<LogicalRange> {
        self.default_range
    }

    /// `content` is the logical span of the loaded candles, if any
    pub fn step(&self, action: NavAction, current: LogicalRange, content: Option<LogicalRange>) -> NavigationStep {
        let keep = |range| NavigationStep { range, right_offset: None, auto_scale: false };
        match action {
            NavAction::ZoomIn => keep(current.zoomed(self.config.zoom_in_factor)),
            NavAction::ZoomOut => keep(current.zoomed(self.config.zoom_out_factor)),
            NavAction::ScrollLeft => keep(current.shifted(-1.0)),
            NavAction::ScrollRight => keep(current.shifted(1.0)),
            NavAction::Reset => match self.default_range {
                Some(range) => NavigationStep {
                    range,
                    right_offset: Some(self.config.right_offset),
                    auto_scale: true,
                },
                None => match content {
                    Some(range) => NavigationStep { range, right_offset: None, auto_scale: true },
                    None => keep(current),
                },
            },
        }
    }
}

type Shared<T> = Rc<RefCell<Option<T>>>;

/// Floating zoom/scroll buttons for the chart container `container_id`
#[component]
pub fn NavigationOverlay(container_id: String, config: NavigationConfig) -> impl IntoView {
    let visible = navigation_visible();
    let hovering = create_rw_signal(false);
    let hide_timer: Shared<Timeout> = Rc::new(RefCell::new(None));
    let repeat_delay: Shared<Timeout> = Rc::new(RefCell::new(None));
    let repeat: Shared<Interval> = Rc::new(RefCell::new(None));
    let listeners: Rc<RefCell<Vec<ListenerHandle>>> = Rc::new(RefCell::new(Vec::new()));

    let schedule_hide = {
        let hide_timer = Rc::clone(&hide_timer);
        let delay = config.hide_delay_ms;
        move || {
            if hide_timer.borrow().is_some() || !visible.get_untracked() {
                return;
            }
            let slot = Rc::clone(&hide_timer);
            let timeout = Timeout::new(delay, move || {
                slot.borrow_mut().take();
                if !hovering.get_untracked() {
                    visible.set(false);
                }
            });
            *hide_timer.borrow_mut() = Some(timeout);
        }
    };

    let show = {
        let hide_timer = Rc::clone(&hide_timer);
        move || {
            // dropping a gloo timeout cancels it
            hide_timer.borrow_mut().take();
            if !visible.get_untracked() {
                visible.set(true);
            }
        }
    };

    let container = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(&container_id));
    match container {
        Some(element) => {
            let target: &web_sys::EventTarget = element.as_ref();
            let on_move = {
                let element = element.clone();
                let (show, schedule_hide) = (show.clone(), schedule_hide.clone());
                let config = config.clone();
                move |e: web_sys::MouseEvent| {
                    let rect = element.get_bounding_client_rect();
                    let x = e.client_x() as f64 - rect.left();
                    let y = e.client_y() as f64 - rect.top();
                    if pointer_in_hot_zone(&config, x, y, rect.width(), rect.height()) {
                        show();
                    } else if !hovering.get_untracked() {
                        schedule_hide();
                    }
                }
            };
            let on_leave = {
                let schedule_hide = schedule_hide.clone();
                move |_: web_sys::MouseEvent| {
                    if !hovering.get_untracked() {
                        schedule_hide();
                    }
                }
            };
            let options = EventOptions::default();
            let mut held = listeners.borrow_mut();
            held.push(event_listener_with_options(target, ev::mousemove, &options, on_move));
            held.push(event_listener_with_options(target, ev::mouseleave, &options, on_leave));
        }
        None => get_logger().warn(
            LogComponent::Presentation("NavigationOverlay"),
            &format!("container #{} not found; overlay stays hidden", container_id),
        ),
    }

    let stop_repeat = {
        let (repeat_delay, repeat) = (Rc::clone(&repeat_delay), Rc::clone(&repeat));
        move || {
            repeat_delay.borrow_mut().take();
            repeat.borrow_mut().take();
        }
    };

    let press = {
        let (repeat_delay, repeat) = (Rc::clone(&repeat_delay), Rc::clone(&repeat));
        let stop_repeat = stop_repeat.clone();
        let (delay, interval) = (config.repeat_delay_ms, config.repeat_interval_ms);
        move |action: NavAction| {
            stop_repeat();
            navigate(action);
            if !action.repeats() {
                return;
            }
            let repeat = Rc::clone(&repeat);
            let timeout = Timeout::new(delay, move || {
                *repeat.borrow_mut() = Some(Interval::new(interval, move || navigate(action)));
            });
            *repeat_delay.borrow_mut() = Some(timeout);
        }
    };

    {
        let stop_repeat = stop_repeat.clone();
        on_cleanup(move || {
            stop_repeat();
            hide_timer.borrow_mut().take();
            listeners.borrow_mut().clear();
        });
    }

    let button = move |action: NavAction| {
        let (press, release, leave) = (press.clone(), stop_repeat.clone(), stop_repeat.clone());
        view! {
            <button
                class="nav-btn"
                title=action.title()
                on:mousedown=move |e: web_sys::MouseEvent| {
                    if e.button() == 0 {
                        press(action);
                    }
                }
                on:mouseup=move |_| release()
                on:mouseleave=move |_| leave()
            >
                {action.glyph()}
            </button>
        }
    };

    let on_enter = {
        let show = show.clone();
        move |_| {
            hovering.set(true);
            show();
        }
    };
    let on_leave = move |_| {
        hovering.set(false);
        schedule_hide();
    };

    view! {
        <div class="chart-navigation" class:visible=move || visible.get() on:mouseenter=on_enter on:mouseleave=on_leave>
            {button(NavAction::ZoomOut)}
            {button(NavAction::ZoomIn)}
            {button(NavAction::ScrollLeft)}
            {button(NavAction::ScrollRight)}
            {button(NavAction::Reset)}
        </div>
    }
}
