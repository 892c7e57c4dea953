//! Wire types for the Kraken Futures derivatives v3 API.

use serde::Deserialize;

/// Every endpoint wraps its payload in this envelope: `result` is "success"
/// on the happy path, `error` carries a venue error code otherwise.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub result: Option<String>,
    pub error: Option<String>,
}

/// `GET /tickers` response.
#[derive(Debug, Deserialize)]
pub struct Tickers {
    pub tickers: Vec<Ticker>,
}

#[derive(Debug, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    /// "XBT:USD" style base:quote identity, absent on index tickers.
    #[serde(default)]
    pub pair: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

/// `GET /orderbook` response. Levels arrive as `[price, size]` number pairs,
/// best levels first on both sides.
#[derive(Debug, Deserialize)]
pub struct OrderBookResponse {
    #[serde(rename = "orderBook")]
    pub order_book: RawOrderBook,
}

#[derive(Debug, Deserialize)]
pub struct RawOrderBook {
    pub bids: Vec<(f64, f64)>,
    pub asks: Vec<(f64, f64)>,
}

/// `POST /sendorder` response.
#[derive(Debug, Deserialize)]
pub struct SendOrderResponse {
    #[serde(rename = "sendStatus")]
    pub send_status: SendStatus,
}

#[derive(Debug, Deserialize)]
pub struct SendStatus {
    pub order_id: String,
    pub status: String,
    #[serde(rename = "orderEvents", default)]
    pub order_events: Vec<OrderEvent>,
}

#[derive(Debug, Deserialize)]
pub struct OrderEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub amount: Option<f64>,
}
