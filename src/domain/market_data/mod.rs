//! Market data consumed by the drawing core: candles, series and the feed contract.

pub mod entities;
pub mod repositories;
pub mod value_objects;

pub use entities::*;
pub use repositories::*;
pub use value_objects::*;
