use crate::domain::alerts::{
    Alert, AlertCondition, AlertRegistry, AlertSource, AlertTriggered, CrossDirection, TolerancePolicy,
    alert_fires,
};
use crate::domain::logging::{LogComponent, get_logger, get_time_provider};
use crate::domain::market_data::Candle;
use crate::domain::tools::{Tool, ToolId, ToolKind};
use crate::time_utils::format_hms_utc;

/// Level the candle was measured against when an alert fired
fn crossing_price(alert: &Alert, tool: Option<&Tool>, candle: &Candle, logical: f64) -> f64 {
    let Some(tool) = tool else {
        return alert.price;
    };
    match tool.kind {
        ToolKind::VerticalLine => candle.close,
        ToolKind::Rectangle | ToolKind::ParallelChannel => match tool.zone_at_logical(logical) {
            Some((_, hi)) if candle.close >= hi => hi,
            Some((lo, _)) => lo,
            None => alert.price,
        },
        _ => tool.price_at_logical(logical).unwrap_or(alert.price),
    }
}

fn triggered(alert: &Alert, level: f64, candle: &Candle) -> AlertTriggered {
    let timestamp = get_time_provider().current_timestamp();
    AlertTriggered {
        alert_id: alert.id.clone(),
        alert_price: alert.price,
        crossing_price: level,
        direction: if candle.close >= level { CrossDirection::Up } else { CrossDirection::Down },
        condition: alert.condition,
        timestamp,
        time_label: format_hms_utc(timestamp),
    }
}

/// Evaluate every registered alert against `candle` at `logical`.
///
/// Tool alerts read the live geometry from `tools`. Fired alerts are removed
/// from the registry and returned in firing order.
pub fn evaluate_alerts(
    registry: &mut AlertRegistry,
    tools: &[Tool],
    candle: &Candle,
    logical: f64,
) -> Vec<AlertTriggered> {
    let lookup = |id: ToolId| tools.iter().find(|t| t.id == id);
    let fired: Vec<AlertTriggered> = registry
        .alerts()
        .iter()
        .filter(|alert| alert_fires(alert, lookup, candle, logical, TolerancePolicy::ExactContainment))
        .map(|alert| {
            let tool = alert.tool_id().and_then(lookup);
            triggered(alert, crossing_price(alert, tool, candle, logical), candle)
        })
        .collect();

    for event in &fired {
        registry.remove_alert(&event.alert_id);
        get_logger().info(
            LogComponent::Application("AlertService"),
            &format!("alert {} fired at {:.2} ({})", event.alert_id, event.crossing_price, event.condition),
        );
    }
    fired
}

/// Keep tool alert prices in step with the tool geometry for display
pub fn refresh_tool_alert_prices(registry: &mut AlertRegistry, tools: &[Tool], logical: f64) {
    let updates: Vec<(String, f64)> = registry
        .alerts()
        .iter()
        .filter_map(|alert| match alert.source {
            AlertSource::Tool(id) => {
                let tool = tools.iter().find(|t| t.id == id)?;
                let price = tool
                    .price_at_logical(logical)
                    .or_else(|| tool.zone_at_logical(logical).map(|(lo, _)| lo))
                    .or_else(|| tool.reference_price())?;
                (price != alert.price).then(|| (alert.id.clone(), price))
            }
            AlertSource::Price => None,
        })
        .collect();
    for (id, price) in updates {
        let _ = registry.update_alert_price(&id, price);
    }
}

/// Application-level price watch: one-shot targets matched within a
/// relative band of the latest close.
#[derive(Debug, Clone)]
pub struct PriceWatch {
    targets: Vec<Alert>,
    policy: TolerancePolicy,
    next_id: u64,
}

impl PriceWatch {
    pub fn new(band: f64) -> Self {
        Self { targets: Vec::new(), policy: TolerancePolicy::RelativeBand(band), next_id: 1 }
    }

    pub fn watch(&mut self, price: f64) -> String {
        let id = format!("watch_{}", self.next_id);
        self.next_id += 1;
        self.targets.push(Alert {
            id: id.clone(),
            price,
            condition: AlertCondition::Crossing,
            source: AlertSource::Price,
        });
        id
    }

    pub fn unwatch(&mut self, id: &str) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| t.id != id);
        before != self.targets.len()
    }

    pub fn targets(&self) -> &[Alert] {
        &self.targets
    }

    pub fn check(&mut self, candle: &Candle) -> Vec<AlertTriggered> {
        let policy = self.policy;
        let (hit, kept): (Vec<Alert>, Vec<Alert>) =
            self.targets.drain(..).partition(|t| policy.touches(candle, t.price));
        self.targets = kept;
        hit.iter().map(|t| triggered(t, t.price, candle)).collect()
    }
}
