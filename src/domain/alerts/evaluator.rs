use crate::domain::alerts::{Alert, AlertCondition, AlertSource};
use crate::domain::market_data::Candle;
use crate::domain::tools::{Tool, ToolKind};

/// How close a candle must come to an alert level to count as a touch.
///
/// Tool and registry alerts use exact containment in `[low, high]`; the
/// application-level price watch uses a relative band around the target.
/// The two are kept apart on purpose and selected explicitly by callers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TolerancePolicy {
    ExactContainment,
    /// `|close - target| <= target * band`
    RelativeBand(f64),
}

impl TolerancePolicy {
    pub fn touches(&self, candle: &Candle, price: f64) -> bool {
        match self {
            TolerancePolicy::ExactContainment => candle.touches(price),
            TolerancePolicy::RelativeBand(band) => (candle.close - price).abs() <= price.abs() * band,
        }
    }
}

/// Crossing test of a single price level
pub fn line_crossed(price: f64, candle: &Candle, condition: AlertCondition, policy: TolerancePolicy) -> bool {
    if !policy.touches(candle, price) {
        return false;
    }
    match condition {
        AlertCondition::Crossing => true,
        AlertCondition::CrossingUp => candle.close >= price,
        AlertCondition::CrossingDown => candle.close <= price,
        _ => false,
    }
}

/// Zone test against `[lo, hi]` using the candle's open and close
pub fn zone_condition(zone: (f64, f64), candle: &Candle, condition: AlertCondition) -> bool {
    let inside = |v: f64| zone.0 <= v && v <= zone.1;
    let (open_in, close_in) = (inside(candle.open), inside(candle.close));
    match condition {
        AlertCondition::Inside => close_in,
        AlertCondition::Outside => !close_in,
        AlertCondition::Entering => close_in && !open_in,
        AlertCondition::Exiting => open_in && !close_in,
        _ => false,
    }
}

/// Evaluate a tool-bound alert against the tool's current geometry
pub fn tool_alert_fires(
    alert: &Alert,
    tool: &Tool,
    candle: &Candle,
    logical: f64,
    policy: TolerancePolicy,
) -> bool {
    match tool.kind {
        ToolKind::VerticalLine => {
            alert.condition == AlertCondition::Crossing
                && tool.points.first().is_some_and(|p| logical.round() == p.logical.round())
        }
        ToolKind::Rectangle => match tool.zone_at_logical(logical) {
            Some(zone) => zone_condition(zone, candle, alert.condition),
            None => alert.condition == AlertCondition::Outside,
        },
        ToolKind::ParallelChannel => {
            tool.zone_at_logical(logical).is_some_and(|zone| zone_condition(zone, candle, alert.condition))
        }
        _ => tool
            .price_at_logical(logical)
            .is_some_and(|price| line_crossed(price, candle, alert.condition, policy)),
    }
}

/// Evaluate any alert; tool alerts whose tool is gone never fire
pub fn alert_fires<'a>(
    alert: &Alert,
    lookup: impl Fn(crate::domain::tools::ToolId) -> Option<&'a Tool>,
    candle: &Candle,
    logical: f64,
    policy: TolerancePolicy,
) -> bool {
    match alert.source {
        AlertSource::Price => line_crossed(alert.price, candle, alert.condition, policy),
        AlertSource::Tool(id) => {
            lookup(id).is_some_and(|tool| tool_alert_fires(alert, tool, candle, logical, policy))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_policy_is_relative() {
        let candle = Candle::new(0, 100.0, 101.0, 99.0, 100.05);
        assert!(TolerancePolicy::RelativeBand(0.001).touches(&candle, 100.0));
        assert!(!TolerancePolicy::RelativeBand(0.001).touches(&candle, 101.0));
        assert!(TolerancePolicy::ExactContainment.touches(&candle, 101.0));
    }

    #[test]
    fn entering_requires_open_outside() {
        let candle = Candle::new(0, 90.0, 120.0, 85.0, 110.0);
        assert!(zone_condition((100.0, 150.0), &candle, AlertCondition::Entering));
        assert!(!zone_condition((80.0, 150.0), &candle, AlertCondition::Entering));
    }
}
