//! Browser-facing layer: the `ChartTools` facade and the leptos overlays.

pub mod navigation;
pub mod toolbar;
pub mod wasm_api;

use crate::application::coordinator::with_global_coordinator;
use crate::global_state::{alert_list, manager_snapshot, style_templates};
use leptos::*;

fn set_if_changed<T: PartialEq + 'static>(signal: RwSignal<T>, value: T) -> bool {
    if signal.with_untracked(|current| current == &value) {
        return false;
    }
    signal.set(value);
    true
}

/// Publish the coordinator state to the overlay signals and repaint.
///
/// Called after every input that may have changed tools, selection or alerts.
pub fn refresh_view() {
    let state = with_global_coordinator(|c| (c.manager().snapshot(), c.manager().alerts().alerts()));
    if let Some((snapshot, alerts)) = state {
        let changed = set_if_changed(manager_snapshot(), Some(snapshot));
        set_if_changed(alert_list(), alerts);
        if changed {
            wasm_api::notify_change();
        }
    }
    wasm_api::repaint();
}

/// Re-read the saved templates; they live in storage, so only after template edits
pub fn refresh_templates() {
    if let Some(templates) = with_global_coordinator(|c| c.templates()) {
        set_if_changed(style_templates(), templates);
    }
}
