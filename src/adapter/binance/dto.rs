//! Wire types for the Binance spot v3 API.

use serde::Deserialize;

/// Subset of `GET /exchangeInfo` the catalog needs.
#[derive(Debug, Deserialize)]
pub struct ExchangeInfo {
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
}

/// `GET /depth` response. Levels arrive as `["price", "quantity"]` string
/// pairs, best levels first on both sides.
#[derive(Debug, Deserialize)]
pub struct Depth {
    pub bids: Vec<(String, String)>,
    pub asks: Vec<(String, String)>,
}

/// `POST /order` response (FULL response type for market orders).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: u64,
    pub side: String,
    pub orig_qty: String,
    #[serde(default)]
    pub fills: Vec<OrderFill>,
}

#[derive(Debug, Deserialize)]
pub struct OrderFill {
    pub price: String,
    pub qty: String,
}

/// Error envelope the venue returns alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: i64,
    pub msg: String,
}
