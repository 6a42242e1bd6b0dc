use crate::application::alert_service::PriceWatch;
use crate::application::chart_surface::ChartSurface;
use crate::application::tool_manager::ToolManager;
use crate::domain::alerts::{AlertRegistry, AlertTriggered, RandomSource};
use crate::domain::config::ManagerConfig;
use crate::domain::errors::{AppError, DrawingError, TemplateError};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{Candle, TimeInterval};
use crate::domain::templates::{KeyValueStore, StyleTemplate, TemplateStore};
use std::cell::RefCell;

/// Ties the tool manager to templates and the application price watch
pub struct ChartToolsCoordinator {
    manager: ToolManager<Box<dyn ChartSurface>>,
    templates: TemplateStore<Box<dyn KeyValueStore>>,
    price_watch: PriceWatch,
}

impl ChartToolsCoordinator {
    pub fn new(
        surface: Box<dyn ChartSurface>,
        storage: Box<dyn KeyValueStore>,
        alert_random: Box<dyn RandomSource>,
        template_random: Box<dyn RandomSource>,
        config: ManagerConfig,
    ) -> Self {
        get_logger().info(LogComponent::Application("ChartToolsCoordinator"), "creating chart tools coordinator");
        let templates = TemplateStore::new(storage, template_random, config.template_capacity);
        let price_watch = PriceWatch::new(config.price_alert_band);
        let manager = ToolManager::with_alerts(surface, config, AlertRegistry::new(alert_random));
        Self { manager, templates, price_watch }
    }

    pub fn manager(&self) -> &ToolManager<Box<dyn ChartSurface>> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ToolManager<Box<dyn ChartSurface>> {
        &mut self.manager
    }

    pub fn price_watch(&self) -> &PriceWatch {
        &self.price_watch
    }

    pub fn price_watch_mut(&mut self) -> &mut PriceWatch {
        &mut self.price_watch
    }

    pub fn set_interval(&mut self, interval: TimeInterval) {
        self.manager.set_bar_seconds(interval.seconds());
    }

    /// Run every alert check for a new or amended candle
    pub fn on_candle(&mut self, candle: &Candle, logical: f64) -> Vec<AlertTriggered> {
        let mut fired = self.manager.check_alerts(candle, logical);
        fired.extend(self.price_watch.check(candle));
        self.manager.refresh_tool_alerts(logical);
        fired
    }

    // ---- templates ----------------------------------------------------

    pub fn templates(&self) -> Vec<StyleTemplate> {
        self.templates.list()
    }

    /// Save the selected tool's style
    pub fn save_template(&mut self, name: &str) -> Result<StyleTemplate, AppError> {
        let id = self.manager.selected().ok_or(DrawingError::UnknownTool(0))?;
        let tool = self.manager.tool(id).ok_or(DrawingError::UnknownTool(id.value()))?;
        Ok(self.templates.save(name, &tool.options)?)
    }

    /// Merge a template into the selected tool
    pub fn apply_template(&mut self, template_id: &str) -> Result<(), AppError> {
        let id = self.manager.selected().ok_or(DrawingError::UnknownTool(0))?;
        let template = self
            .templates
            .get(template_id)
            .ok_or_else(|| TemplateError::NotFound(template_id.to_string()))?;
        self.manager.apply_tool_options(id, &template.styles, false)?;
        Ok(())
    }

    pub fn delete_template(&mut self, template_id: &str) -> bool {
        self.templates.delete(template_id)
    }
}

thread_local! {
    pub static GLOBAL_COORDINATOR: RefCell<Option<ChartToolsCoordinator>> = const { RefCell::new(None) };
}

pub fn install_global_coordinator(coordinator: ChartToolsCoordinator) {
    GLOBAL_COORDINATOR.with(|global| {
        *global.borrow_mut() = Some(coordinator);
    });
}

pub fn clear_global_coordinator() {
    GLOBAL_COORDINATOR.with(|global| global.borrow_mut().take());
}

pub fn with_global_coordinator<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&ChartToolsCoordinator) -> R,
{
    GLOBAL_COORDINATOR.with(|global| global.try_borrow().ok()?.as_ref().map(f))
}

/// Mutable access; `None` when missing or already borrowed further up the stack
pub fn with_global_coordinator_mut<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut ChartToolsCoordinator) -> R,
{
    GLOBAL_COORDINATOR.with(|global| global.try_borrow_mut().ok()?.as_mut().map(f))
}
