use crate::domain::errors::FeedError;
use crate::domain::events::Subscription;
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{Candle, CandleFeed, CandleSeries, SeriesUpdate, Symbol, TimeInterval};
use futures::future::{AbortHandle, Abortable};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Called for every live candle after it has been folded into the series,
/// with the candle's logical index
pub type UpdateCallback = Rc<dyn Fn(&Candle, f64, SeriesUpdate)>;

const SERIES_CAPACITY: usize = 10_000;

#[derive(Default)]
struct SessionState {
    current: Option<(Symbol, TimeInterval)>,
    series: CandleSeries,
    abort: Option<AbortHandle>,
    /// Flag of the active load; set once the load is superseded
    disposed: Option<Rc<Cell<bool>>>,
    live: Option<Subscription>,
    on_update: Option<UpdateCallback>,
}

/// Tracks the series of the current symbol/interval.
///
/// Switching aborts the in-flight fetch, and every async continuation checks
/// its own disposed flag so late data for an old symbol is dropped.
#[derive(Clone)]
pub struct FeedSession {
    feed: Rc<dyn CandleFeed>,
    state: Rc<RefCell<SessionState>>,
}

impl FeedSession {
    pub fn new(feed: Rc<dyn CandleFeed>) -> Self {
        Self { feed, state: Rc::new(RefCell::new(SessionState::default())) }
    }

    pub fn set_on_update(&self, callback: impl Fn(&Candle, f64, SeriesUpdate) + 'static) {
        self.state.borrow_mut().on_update = Some(Rc::new(callback));
    }

    pub fn current(&self) -> Option<(Symbol, TimeInterval)> {
        self.state.borrow().current.clone()
    }

    pub fn series(&self) -> CandleSeries {
        self.state.borrow().series.clone()
    }

    pub fn with_series<R>(&self, f: impl FnOnce(&CandleSeries) -> R) -> R {
        f(&self.state.borrow().series)
    }

    /// Abort the in-flight fetch and drop the live subscription
    pub fn dispose(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(flag) = state.disposed.take() {
            flag.set(true);
        }
        if let Some(handle) = state.abort.take() {
            handle.abort();
        }
        state.live = None;
    }

    /// Load `limit` candles for `symbol`/`interval` and subscribe to updates.
    ///
    /// Returns the number of candles applied; superseded loads return 0.
    pub async fn load(&self, symbol: Symbol, interval: TimeInterval, limit: usize) -> usize {
        self.dispose();
        let (handle, registration) = AbortHandle::new_pair();
        let disposed = Rc::new(Cell::new(false));
        {
            let mut state = self.state.borrow_mut();
            state.current = Some((symbol.clone(), interval));
            state.series.clear();
            state.abort = Some(handle);
            state.disposed = Some(Rc::clone(&disposed));
        }

        let request = self.feed.get_series(&symbol, interval, limit);
        let candles = match Abortable::new(request, registration).await {
            Err(_) | Ok(Err(FeedError::Aborted)) => {
                get_logger().debug(LogComponent::Application("FeedSession"), &format!("load of {} aborted", symbol));
                return 0;
            }
            Ok(Err(e)) => {
                get_logger().warn(
                    LogComponent::Application("FeedSession"),
                    &format!("failed to load {} {}: {}", symbol, interval, e),
                );
                Vec::new()
            }
            Ok(Ok(candles)) => candles,
        };

        if disposed.get() {
            get_logger().debug(
                LogComponent::Application("FeedSession"),
                &format!("dropping late data for {}", symbol),
            );
            return 0;
        }

        let count = candles.len();
        let weak = Rc::downgrade(&self.state);
        let live_flag = Rc::clone(&disposed);
        let subscription = self.feed.on_candle(
            &symbol,
            interval,
            Box::new(move |candle| {
                if !live_flag.get() {
                    Self::apply_to(&weak, candle, interval);
                }
            }),
        );

        let mut state = self.state.borrow_mut();
        state.series = CandleSeries::from_candles(candles, SERIES_CAPACITY);
        state.abort = None;
        state.live = Some(subscription);
        get_logger().info(
            LogComponent::Application("FeedSession"),
            &format!("loaded {} candles for {} {}", count, symbol, interval),
        );
        count
    }

    /// Fold a live candle into the current series
    pub fn apply_live(&self, candle: Candle) {
        let Some((_, interval)) = self.current() else { return };
        Self::apply_to(&Rc::downgrade(&self.state), candle, interval);
    }

    fn apply_to(state: &Weak<RefCell<SessionState>>, candle: Candle, interval: TimeInterval) {
        let Some(state) = state.upgrade() else { return };
        let (update, applied, logical, callback) = {
            let mut state = state.borrow_mut();
            let update = state.series.apply_live(candle, interval);
            let bucket = interval.bucket_start(candle.time);
            let Some(logical) = state.series.logical_of(bucket) else { return };
            let Some(applied) = state.series.get(logical as usize).copied() else { return };
            (update, applied, logical, state.on_update.clone())
        };
        if let Some(callback) = callback {
            callback(&applied, logical, update);
        }
    }
}
