use crate::domain::alerts::{Alert, AlertCondition, AlertSource};
use crate::domain::errors::AlertError;
use crate::domain::events::{DomainEvent, EventDelegate};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::tools::ToolId;
use std::cell::Cell;

/// Uniform source in `[0, 1)`, injectable for deterministic ids
pub trait RandomSource {
    fn next_f64(&self) -> f64;
}

/// Small xorshift generator; the browser build swaps in `Math.random`
pub struct XorShiftRandom {
    state: Cell<u64>,
}

impl XorShiftRandom {
    pub fn seeded(seed: u64) -> Self {
        Self { state: Cell::new(seed.max(1)) }
    }
}

impl Default for XorShiftRandom {
    fn default() -> Self {
        Self::seeded(0x9E37_79B9_7F4A_7C15)
    }
}

impl RandomSource for XorShiftRandom {
    fn next_f64(&self) -> f64 {
        let mut x = self.state.get();
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state.set(x);
        (x >> 11) as f64 / (1u64 << 53) as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    Added(Alert),
    Removed(String),
    Changed(Alert),
    ListChanged(usize),
}

impl DomainEvent for RegistryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RegistryEvent::Added(_) => "alert_added",
            RegistryEvent::Removed(_) => "alert_removed",
            RegistryEvent::Changed(_) => "alert_changed",
            RegistryEvent::ListChanged(_) => "alerts_changed",
        }
    }
}

/// Live alert set keyed by short random hex ids
pub struct AlertRegistry {
    alerts: Vec<Alert>,
    random: Box<dyn RandomSource>,
    events: EventDelegate<RegistryEvent>,
}

impl Default for AlertRegistry {
    fn default() -> Self {
        Self::new(Box::new(XorShiftRandom::default()))
    }
}

impl AlertRegistry {
    pub fn new(random: Box<dyn RandomSource>) -> Self {
        Self { alerts: Vec::new(), random, events: EventDelegate::new() }
    }

    pub fn events(&self) -> &EventDelegate<RegistryEvent> {
        &self.events
    }

    fn generate_id(&self) -> String {
        loop {
            let id = format!("{:x}", (self.random.next_f64() * 1_000_000.0).round() as u64);
            if !self.alerts.iter().any(|a| a.id == id) {
                return id;
            }
            get_logger().debug(LogComponent::Domain("AlertRegistry"), "alert id collision, regenerating");
        }
    }

    /// Static price alert with the default crossing condition
    pub fn add_alert(&mut self, price: f64) -> String {
        self.add_alert_with_condition(price, AlertCondition::Crossing, AlertSource::Price)
    }

    pub fn add_alert_with_condition(
        &mut self,
        price: f64,
        condition: AlertCondition,
        source: AlertSource,
    ) -> String {
        let alert = Alert { id: self.generate_id(), price, condition, source };
        let id = alert.id.clone();
        self.alerts.push(alert.clone());
        self.events.fire(&RegistryEvent::Added(alert));
        self.fire_list_changed();
        id
    }

    pub fn remove_alert(&mut self, id: &str) -> Option<Alert> {
        let index = self.alerts.iter().position(|a| a.id == id)?;
        let removed = self.alerts.remove(index);
        self.events.fire(&RegistryEvent::Removed(removed.id.clone()));
        self.fire_list_changed();
        Some(removed)
    }

    pub fn update_alert_price(&mut self, id: &str, price: f64) -> Result<(), AlertError> {
        self.update_alert(id, |alert| alert.price = price)
    }

    pub fn update_alert(&mut self, id: &str, edit: impl FnOnce(&mut Alert)) -> Result<(), AlertError> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AlertError::UnknownAlert(id.to_string()))?;
        edit(alert);
        let changed = alert.clone();
        self.events.fire(&RegistryEvent::Changed(changed));
        self.fire_list_changed();
        Ok(())
    }

    /// Snapshot sorted by descending price
    pub fn alerts(&self) -> Vec<Alert> {
        let mut alerts = self.alerts.clone();
        alerts.sort_by(|a, b| b.price.total_cmp(&a.price));
        alerts
    }

    pub fn get(&self, id: &str) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    pub fn alerts_for_tool(&self, tool_id: ToolId) -> Vec<&Alert> {
        self.alerts.iter().filter(|a| a.source == AlertSource::Tool(tool_id)).collect()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    fn fire_list_changed(&self) {
        self.events.fire(&RegistryEvent::ListChanged(self.alerts.len()));
    }
}
