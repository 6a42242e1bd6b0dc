use serde::{Deserialize, Serialize};

/// Tunables shared by the tool manager, alerts, templates and overlays.
///
/// Distances are CSS pixels unless stated otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManagerConfig {
    /// Anchor handle hit radius
    pub anchor_hit_radius: f64,
    /// Stroke hit tolerance for line-like tools
    pub line_hit_tolerance: f64,
    pub history_capacity: usize,
    /// Minimum travel between recorded freehand points, in device pixels
    pub freehand_min_distance: f64,
    pub double_click_ms: f64,
    pub double_click_distance: f64,
    pub template_capacity: usize,
    /// Minimum width of the long/short projection box, in device pixels
    pub position_min_width: f64,
    /// Relative band used by the application-level price watch
    pub price_alert_band: f64,
    pub navigation: NavigationConfig,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            anchor_hit_radius: 8.0,
            line_hit_tolerance: 5.0,
            history_capacity: 20,
            freehand_min_distance: 10.0,
            double_click_ms: 300.0,
            double_click_distance: 10.0,
            template_capacity: 20,
            position_min_width: 50.0,
            price_alert_band: 0.001,
            navigation: NavigationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavigationConfig {
    pub hot_zone_height: f64,
    pub right_exclusion: f64,
    pub hide_delay_ms: u32,
    pub repeat_delay_ms: u32,
    pub repeat_interval_ms: u32,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
    pub right_offset: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            hot_zone_height: 150.0,
            right_exclusion: 70.0,
            hide_delay_ms: 100,
            repeat_delay_ms: 400,
            repeat_interval_ms: 100,
            zoom_in_factor: 0.8,
            zoom_out_factor: 1.25,
            right_offset: 10.0,
        }
    }
}

impl ManagerConfig {
    /// Parse a JSON override. Missing fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
