use crate::domain::errors::FeedError;
use crate::domain::events::{EventDelegate, Subscription};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{Candle, CandleFeed, Symbol, TimeInterval};
use futures::future::LocalBoxFuture;
use gloo::utils::format::JsValueSerdeExt;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// A pushed live candle and the series it belongs to
#[derive(Debug, Clone)]
pub struct LiveCandle {
    pub symbol: Symbol,
    pub interval: TimeInterval,
    pub candle: Candle,
}

/// Feed backed by the host page.
///
/// History comes from a JS function `(symbol, interval, limit) => Promise<Candle[]>`;
/// live candles are pushed in through [`JsCandleFeed::push`].
#[derive(Clone)]
pub struct JsCandleFeed {
    fetcher: js_sys::Function,
    live: Rc<EventDelegate<LiveCandle>>,
}

impl JsCandleFeed {
    pub fn new(fetcher: js_sys::Function) -> Self {
        Self { fetcher, live: Rc::new(EventDelegate::new()) }
    }

    pub fn push(&self, symbol: Symbol, interval: TimeInterval, candle: Candle) {
        if !candle.is_valid() {
            get_logger().warn(
                LogComponent::Infrastructure("JsCandleFeed"),
                &format!("ignoring malformed candle at {}", candle.time),
            );
            return;
        }
        self.live.fire(&LiveCandle { symbol, interval, candle });
    }

    fn request(&self, symbol: &Symbol, interval: TimeInterval, limit: usize) -> Result<js_sys::Promise, FeedError> {
        let returned = self
            .fetcher
            .call3(
                &JsValue::NULL,
                &JsValue::from_str(symbol.value()),
                &JsValue::from_str(interval.as_ref()),
                &JsValue::from_f64(limit as f64),
            )
            .map_err(|e| FeedError::Network(format!("{:?}", e)))?;
        returned.dyn_into::<js_sys::Promise>().map_err(|_| FeedError::Parse("fetcher did not return a Promise".into()))
    }
}

impl CandleFeed for JsCandleFeed {
    fn get_series(
        &self,
        symbol: &Symbol,
        interval: TimeInterval,
        limit: usize,
    ) -> LocalBoxFuture<'static, Result<Vec<Candle>, FeedError>> {
        let promise = self.request(symbol, interval, limit);
        Box::pin(async move {
            let value = JsFuture::from(promise?).await.map_err(|e| FeedError::Network(format!("{:?}", e)))?;
            let mut candles: Vec<Candle> =
                value.into_serde().map_err(|e| FeedError::Parse(e.to_string()))?;
            candles.retain(Candle::is_valid);
            candles.sort_by_key(|c| c.time);
            Ok(candles)
        })
    }

    fn on_candle(&self, symbol: &Symbol, interval: TimeInterval, callback: Box<dyn Fn(Candle)>) -> Subscription {
        let symbol = symbol.clone();
        self.live.subscribe(move |live| {
            if live.symbol == symbol && live.interval == interval {
                callback(live.candle);
            }
        })
    }
}
