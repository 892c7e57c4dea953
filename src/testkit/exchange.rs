//! Scripted exchange for broker and contract tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{Fill, MarketOrder, OrderBook, OrderId, OrderSide, Pair, Volume};
use crate::error::{ExchangeError, Result};
use crate::exchange::Exchange;

/// An [`Exchange`] whose responses are scripted up front.
///
/// Each call to [`get_order_book`](Exchange::get_order_book) or
/// [`execute_market_order`](Exchange::execute_market_order) replays the
/// configured response; executions are also recorded so tests can assert on
/// exactly what was placed where.
#[derive(Debug)]
pub struct StaticExchange {
    name: String,
    pairs: Vec<Pair>,
    // Scripted responses hold ExchangeError so they stay cloneable per replay
    book: Option<std::result::Result<OrderBook, ExchangeError>>,
    execution: Option<std::result::Result<MarketOrder, ExchangeError>>,
    executed: Mutex<Vec<(Pair, Volume, OrderSide)>>,
    book_calls: AtomicUsize,
    execute_calls: AtomicUsize,
}

impl StaticExchange {
    /// Creates a venue with the given display name and no behavior scripted.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pairs: Vec::new(),
            book: None,
            execution: None,
            executed: Mutex::new(Vec::new()),
            book_calls: AtomicUsize::new(0),
            execute_calls: AtomicUsize::new(0),
        }
    }

    /// Adds a pair to the venue's catalog.
    #[must_use]
    pub fn with_pair(mut self, pair: Pair) -> Self {
        self.pairs.push(pair);
        self
    }

    /// Scripts the order book returned by every `get_order_book` call.
    #[must_use]
    pub fn with_book(mut self, book: OrderBook) -> Self {
        self.book = Some(Ok(book));
        self
    }

    /// Scripts `get_order_book` to fail.
    #[must_use]
    pub fn with_book_error(mut self, error: ExchangeError) -> Self {
        self.book = Some(Err(error));
        self
    }

    /// Scripts the result of every `execute_market_order` call.
    #[must_use]
    pub fn with_execution(mut self, order: MarketOrder) -> Self {
        self.execution = Some(Ok(order));
        self
    }

    /// Scripts `execute_market_order` to fail.
    #[must_use]
    pub fn with_execution_error(mut self, error: ExchangeError) -> Self {
        self.execution = Some(Err(error));
        self
    }

    /// How many times `get_order_book` was called.
    pub fn book_call_count(&self) -> usize {
        self.book_calls.load(Ordering::SeqCst)
    }

    /// How many times `execute_market_order` was called.
    pub fn execute_call_count(&self) -> usize {
        self.execute_calls.load(Ordering::SeqCst)
    }

    /// Every `(pair, size, side)` passed to `execute_market_order`.
    pub fn executed_orders(&self) -> Vec<(Pair, Volume, OrderSide)> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Exchange for StaticExchange {
    fn name(&self) -> &str {
        &self.name
    }

    fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    async fn load_pairs(&self) -> Result<Vec<Pair>> {
        Ok(self.pairs.clone())
    }

    async fn get_order_book(&self, _pair: &Pair) -> Result<OrderBook> {
        self.book_calls.fetch_add(1, Ordering::SeqCst);
        match &self.book {
            Some(Ok(book)) => Ok(book.clone()),
            Some(Err(error)) => Err(error.clone().into()),
            None => panic!("StaticExchange '{}' has no order book scripted", self.name),
        }
    }

    async fn execute_market_order(
        &self,
        pair: &Pair,
        size: Volume,
        side: OrderSide,
    ) -> Result<MarketOrder> {
        self.execute_calls.fetch_add(1, Ordering::SeqCst);
        self.executed
            .lock()
            .unwrap()
            .push((pair.clone(), size, side));

        match &self.execution {
            Some(Ok(order)) => Ok(order.clone()),
            Some(Err(error)) => Err(error.clone().into()),
            None => panic!("StaticExchange '{}' has no execution scripted", self.name),
        }
    }
}

/// A scripted execution result for `pair`: a single fill of the full size at
/// `price`.
pub fn full_fill(pair: &Pair, size: Volume, price: rust_decimal::Decimal) -> MarketOrder {
    MarketOrder::try_new(
        OrderId::new("test-order"),
        pair.clone(),
        OrderSide::Buy,
        size,
        vec![Fill::new(price, size)],
    )
    .expect("scripted order is valid")
}
