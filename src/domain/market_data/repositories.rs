use crate::domain::errors::FeedError;
use crate::domain::events::Subscription;
use crate::domain::market_data::{Candle, Symbol, TimeInterval};
use futures::future::LocalBoxFuture;

/// Source of price series. Implemented outside the core (REST, fixtures).
pub trait CandleFeed {
    /// Candles ascending by time
    fn get_series(
        &self,
        symbol: &Symbol,
        interval: TimeInterval,
        limit: usize,
    ) -> LocalBoxFuture<'static, Result<Vec<Candle>, FeedError>>;

    /// Live updates; each delivery amends the last bar or opens a new one
    fn on_candle(
        &self,
        symbol: &Symbol,
        interval: TimeInterval,
        callback: Box<dyn Fn(Candle)>,
    ) -> Subscription;
}
