use crate::domain::geometry::LineStyle;
use serde::{Deserialize, Serialize};

/// One Fibonacci level: coefficient and stroke color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibLevel {
    pub coeff: f64,
    pub color: String,
}

impl FibLevel {
    pub fn new(coeff: f64, color: &str) -> Self {
        Self { coeff, color: color.to_string() }
    }

    pub fn retracement_defaults() -> Vec<FibLevel> {
        vec![
            FibLevel::new(0.0, "#787b86"),
            FibLevel::new(0.236, "#f44336"),
            FibLevel::new(0.382, "#81c784"),
            FibLevel::new(0.5, "#4caf50"),
            FibLevel::new(0.618, "#009688"),
            FibLevel::new(0.786, "#64b5f6"),
            FibLevel::new(1.0, "#787b86"),
            FibLevel::new(1.618, "#2962ff"),
        ]
    }

    pub fn extension_defaults() -> Vec<FibLevel> {
        vec![
            FibLevel::new(0.0, "#787b86"),
            FibLevel::new(0.618, "#f44336"),
            FibLevel::new(1.0, "#4caf50"),
            FibLevel::new(1.618, "#2962ff"),
            FibLevel::new(2.618, "#9c27b0"),
            FibLevel::new(4.236, "#ff9800"),
        ]
    }
}

/// Style options of a tool.
///
/// Every field is optional: a tool only carries the properties its kind
/// uses, and a partial update only touches the fields it sets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_style: Option<LineStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extend_left: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extend_right: Option<bool>,
    /// Arrowhead at the first anchor when non-zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_end: Option<u8>,
    /// Arrowhead at the second anchor when non-zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_end: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_middle: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_label: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit_line_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_line_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smooth: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<FibLevel>>,
}

macro_rules! merge_fields {
    ($target:ident, $source:ident; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$source.$field {
                $target.$field = Some(value.clone());
            }
        )+
    };
}

impl ToolOptions {
    /// Shallow merge: fields set in `patch` overwrite, the rest stay
    pub fn merge(&mut self, patch: &ToolOptions) {
        merge_fields!(self, patch;
            line_color, color, line_width, width, line_style, background_color,
            border_color, border_width, text_color, text, font_size, font_family,
            extend_left, extend_right, left_end, right_end, show_middle, show_label,
            label_background_color, label_text_color, fill_color, profit_color,
            loss_color, profit_line_color, loss_line_color, zone_opacity, opacity,
            smooth, levels,
        );
    }

    pub fn merged(mut self, patch: &ToolOptions) -> Self {
        self.merge(patch);
        self
    }

    /// Primary stroke color with the fallbacks used across kinds
    pub fn stroke_color(&self) -> &str {
        self.line_color
            .as_deref()
            .or(self.border_color.as_deref())
            .or(self.color.as_deref())
            .unwrap_or("#2962FF")
    }

    pub fn stroke_width(&self) -> f64 {
        self.line_width.or(self.width).or(self.border_width).unwrap_or(1.0)
    }

    pub fn style(&self) -> LineStyle {
        self.line_style.unwrap_or_default()
    }

    pub fn font_size_or(&self, fallback: f64) -> f64 {
        self.font_size.unwrap_or(fallback)
    }

    pub fn text_or_default(&self) -> &str {
        self.text.as_deref().unwrap_or("Text")
    }

    pub fn extends(&self) -> (bool, bool) {
        (self.extend_left.unwrap_or(false), self.extend_right.unwrap_or(false))
    }

    pub fn is_smooth(&self) -> bool {
        self.smooth.unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        *self == ToolOptions::default()
    }
}
