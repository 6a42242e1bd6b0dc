//! Browser adapters: console logging, clocks, storage, the JS candle feed
//! and canvas rendering.

pub mod feed;
pub mod rendering;
pub mod services;
pub mod storage;

pub use feed::{JsCandleFeed, LiveCandle};
pub use rendering::CanvasChartSurface;
pub use services::{BrowserRandom, BrowserTimeProvider, ConsoleLogger};
pub use storage::{InMemoryStore, LocalStore};
