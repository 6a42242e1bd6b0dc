//! Pure drawing-tool core: geometry, mapping, tools, history, alerts and
//! templates. Nothing here touches the DOM.

pub mod alerts;
pub mod config;
pub mod errors;
pub mod events;
pub mod geometry;
pub mod history;
pub mod logging;
pub mod mapping;
pub mod market_data;
pub mod templates;
pub mod tools;
