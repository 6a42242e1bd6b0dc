//! Price and tool alerts: registry, crossing evaluation and tolerance policies.

pub mod evaluator;
pub mod registry;

pub use evaluator::*;
pub use registry::*;

use crate::domain::tools::{ToolId, ToolKind};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, StrumDisplay, EnumIter, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertCondition {
    #[default]
    Crossing,
    CrossingUp,
    CrossingDown,
    Entering,
    Exiting,
    Inside,
    Outside,
}

impl AlertCondition {
    pub fn is_zone(&self) -> bool {
        matches!(self, Self::Entering | Self::Exiting | Self::Inside | Self::Outside)
    }
}

/// What the alert price is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "toolId", rename_all = "lowercase")]
pub enum AlertSource {
    /// Static price level
    Price,
    /// Recomputed from the live tool geometry on every candle
    Tool(ToolId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub price: f64,
    pub condition: AlertCondition,
    pub source: AlertSource,
}

impl Alert {
    pub fn tool_id(&self) -> Option<ToolId> {
        match self.source {
            AlertSource::Tool(id) => Some(id),
            AlertSource::Price => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossDirection {
    Up,
    Down,
}

/// Notification emitted when a one-shot alert fires
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertTriggered {
    pub alert_id: String,
    pub alert_price: f64,
    pub crossing_price: f64,
    pub direction: CrossDirection,
    pub condition: AlertCondition,
    /// Milliseconds since the epoch
    pub timestamp: u64,
    /// `HH:MM:SS`, UTC
    pub time_label: String,
}

/// Conditions offered for a tool kind; the first one is the default
pub fn available_conditions(kind: ToolKind) -> &'static [AlertCondition] {
    use AlertCondition::*;
    if kind == ToolKind::VerticalLine {
        &[Crossing]
    } else if kind.is_zone() {
        &[Entering, Exiting, Inside, Outside]
    } else if kind.supports_alert() {
        &[Crossing, CrossingUp, CrossingDown]
    } else {
        &[]
    }
}
