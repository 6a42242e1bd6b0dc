pub mod alert_service;
pub mod chart_surface;
pub mod coordinator;
pub mod feed_session;
pub mod tool_manager;

pub use alert_service::*;
pub use chart_surface::*;
pub use coordinator::*;
pub use feed_session::*;
pub use tool_manager::*;
