//! Binance spot REST client.
//!
//! Uses the public spot v3 API: `exchangeInfo` for the pair catalog, `depth`
//! for order books, and the signed `order` endpoint for market orders.
//! Authenticated requests carry the `X-MBX-APIKEY` header and an HMAC-SHA256
//! signature over the query string, timestamp included.
//!
//! Binance does not quote USD directly; pairs quoted in the configured
//! stablecoin (USDT, USDC, ...) are additionally exposed with a `USD` quote
//! so they line up with venues that do.

mod dto;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client as HttpClient, StatusCode};
use rust_decimal::Decimal;
use sha2::Sha256;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::BinanceConfig;
use crate::domain::{Fill, MarketOrder, OrderBook, OrderId, OrderSide, Pair, PriceLevel, Volume};
use crate::error::{Error, ExchangeError, Result};
use crate::exchange::Exchange;

use dto::{ApiError, Depth, ExchangeInfo, OrderResponse};

type HmacSha256 = Hmac<Sha256>;

/// Depth levels requested per order-book fetch. The venue accepts 1..=5000.
const DEPTH_LIMIT: u32 = 1000;

/// Binance spot exchange client.
#[derive(Debug)]
pub struct Binance {
    http: HttpClient,
    api_url: String,
    api_key: String,
    api_secret: String,
    usd_stablecoin: String,
    retry_max_attempts: u32,
    retry_backoff_ms: u64,
    pairs: Vec<Pair>,
}

impl Binance {
    pub const NAME: &'static str = "Binance";

    const PROD_API_URL: &'static str = "https://api.binance.com/api/v3/";
    const TESTNET_API_URL: &'static str = "https://testnet.binance.vision/api/v3/";

    /// Connects to the venue and loads its pair catalog.
    pub async fn connect(config: &BinanceConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.http.timeout_ms))
            .connect_timeout(Duration::from_millis(config.http.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        let mut client = Self {
            http,
            api_url: if config.testnet {
                Self::TESTNET_API_URL.into()
            } else {
                Self::PROD_API_URL.into()
            },
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            usd_stablecoin: config.usd_stablecoin.clone(),
            retry_max_attempts: config.http.retry_max_attempts,
            retry_backoff_ms: config.http.retry_backoff_ms,
            pairs: Vec::new(),
        };

        client.pairs = client.fetch_pairs().await?;
        info!(
            exchange = Self::NAME,
            pairs = client.pairs.len(),
            "Loaded exchange pairs"
        );
        Ok(client)
    }

    async fn fetch_pairs(&self) -> Result<Vec<Pair>> {
        debug!(exchange = Self::NAME, "Loading exchange pairs");
        let info: ExchangeInfo = self
            .get_with_retry(&format!("{}exchangeInfo", self.api_url))
            .await?;

        let mut pairs = Vec::with_capacity(info.symbols.len());
        for symbol in info.symbols {
            match Pair::try_new(&symbol.base_asset, &symbol.quote_asset, &symbol.symbol) {
                Ok(pair) => pairs.push(pair),
                Err(err) => {
                    warn!(symbol = %symbol.symbol, error = %err, "Skipping unparseable listing");
                    continue;
                }
            }

            // Expose stablecoin-quoted pairs under a USD quote as well, so
            // this venue competes with exchanges that quote USD directly.
            if symbol.quote_asset == self.usd_stablecoin && symbol.quote_asset != "USD" {
                if let Ok(pair) = Pair::try_new(&symbol.base_asset, "USD", &symbol.symbol) {
                    pairs.push(pair);
                }
            }
        }
        Ok(pairs)
    }

    /// GET with bounded retry on transport failures. Only idempotent reads go
    /// through here; order placement is never retried.
    async fn get_with_retry<T>(&self, url: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut attempt = 0;
        let max_attempts = self.retry_max_attempts.max(1);

        loop {
            attempt += 1;
            let response = match self.http.get(url).send().await {
                Ok(response) => response,
                Err(err) => {
                    if attempt >= max_attempts || !should_retry(&err) {
                        return Err(ExchangeError::bad_response(err.to_string()).into());
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                    continue;
                }
            };

            return handle_response(response).await;
        }
    }

    async fn backoff(&self, attempt: u32, max_attempts: u32, err: &reqwest::Error) {
        warn!(
            exchange = Self::NAME,
            attempt,
            max_attempts,
            error = %err,
            "HTTP request failed, retrying"
        );
        if self.retry_backoff_ms > 0 {
            sleep(Duration::from_millis(self.retry_backoff_ms)).await;
        }
    }

    /// Appends the timestamp and the HMAC-SHA256 signature the signed
    /// endpoints require. The signature covers the exact query string sent.
    fn signed_query(&self, params: &[(&str, String)]) -> Result<String> {
        let timestamp = Utc::now().timestamp_millis();
        let mut query = params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str(&format!("timestamp={timestamp}"));

        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes()).map_err(|_| {
            Error::from(ExchangeError::Authentication {
                reason: "API secret is not a valid HMAC key".into(),
            })
        })?;
        mac.update(query.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{query}&signature={signature}"))
    }
}

#[async_trait]
impl Exchange for Binance {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    async fn load_pairs(&self) -> Result<Vec<Pair>> {
        self.fetch_pairs().await
    }

    async fn get_order_book(&self, pair: &Pair) -> Result<OrderBook> {
        let url = format!(
            "{}depth?symbol={}&limit={}",
            self.api_url,
            pair.exchange_symbol(),
            DEPTH_LIMIT
        );
        let depth: Depth = self.get_with_retry(&url).await?;

        let parse_side = |levels: Vec<(String, String)>| -> Result<Vec<PriceLevel>> {
            levels
                .into_iter()
                .map(|(price, quantity)| {
                    Ok(PriceLevel::new(
                        parse_decimal(&price)?,
                        parse_decimal(&quantity)?,
                    ))
                })
                .collect()
        };

        let book = OrderBook::try_new(
            pair.clone(),
            parse_side(depth.bids)?,
            parse_side(depth.asks)?,
            Utc::now(),
        )?;
        Ok(book)
    }

    async fn execute_market_order(
        &self,
        pair: &Pair,
        size: Volume,
        side: OrderSide,
    ) -> Result<MarketOrder> {
        info!(
            exchange = Self::NAME,
            symbol = pair.exchange_symbol(),
            size = %size,
            side = %side,
            "Executing market order"
        );

        let query = self.signed_query(&[
            ("symbol", pair.exchange_symbol().to_string()),
            ("side", side.as_str().to_string()),
            ("type", "MARKET".to_string()),
            ("quantity", size.to_string()),
        ])?;

        let response = self
            .http
            .post(format!("{}order?{}", self.api_url, query))
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(|err| ExchangeError::bad_response(err.to_string()))?;

        let order: OrderResponse = handle_response(response).await?;

        let fills = order
            .fills
            .iter()
            .map(|fill| Ok(Fill::new(parse_decimal(&fill.price)?, parse_decimal(&fill.qty)?)))
            .collect::<Result<Vec<_>>>()?;

        let requested = parse_decimal(&order.orig_qty)?;
        let side = if order.side == "SELL" {
            OrderSide::Sell
        } else {
            OrderSide::Buy
        };

        let order = MarketOrder::try_new(
            OrderId::new(order.order_id.to_string()),
            pair.clone(),
            side,
            requested,
            fills,
        )?;
        Ok(order)
    }
}

fn parse_decimal(raw: &str) -> Result<Decimal> {
    raw.parse().map_err(|_| {
        ExchangeError::bad_response(format!("unparseable decimal value '{raw}'")).into()
    })
}

fn should_retry(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

/// Maps an HTTP response onto the error taxonomy: rate-limit statuses to
/// `RateLimitExceeded`, auth statuses and venue auth codes to
/// `Authentication`, balance codes to `InsufficientFunds`, everything else
/// unexpected to `BadResponse`.
async fn handle_response<T>(response: reqwest::Response) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| ExchangeError::bad_response(err.to_string()))?;

    if !status.is_success() {
        return Err(classify_failure(status, &body).into());
    }

    serde_json::from_str(&body).map_err(|err| {
        ExchangeError::bad_response(format!("unexpected response body: {err}")).into()
    })
}

fn classify_failure(status: StatusCode, body: &str) -> ExchangeError {
    let api_error: Option<ApiError> = serde_json::from_str(body).ok();
    let message = api_error
        .as_ref()
        .map(|e| e.msg.clone())
        .unwrap_or_else(|| body.to_string());

    // https://binance-docs.github.io/apidocs/spot/en/#error-codes
    match api_error.map(|e| e.code) {
        Some(-1003) => return ExchangeError::RateLimitExceeded,
        Some(-2010) | Some(-2019) if message.to_lowercase().contains("insufficient") => {
            return ExchangeError::InsufficientFunds
        }
        _ => {}
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => ExchangeError::RateLimitExceeded,
        // 418 is the venue's auto-ban escalation of 429
        StatusCode::IM_A_TEAPOT => ExchangeError::RateLimitExceeded,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ExchangeError::Authentication {
            reason: message,
        },
        _ => ExchangeError::bad_response(format!("HTTP {status}: {message}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_statuses_map_to_rate_limit_errors() {
        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, "{}");
        assert!(matches!(err, ExchangeError::RateLimitExceeded));

        let err = classify_failure(StatusCode::IM_A_TEAPOT, "{}");
        assert!(matches!(err, ExchangeError::RateLimitExceeded));
    }

    #[test]
    fn venue_error_codes_take_precedence_over_status() {
        let body = r#"{"code": -2010, "msg": "Account has insufficient balance for requested action."}"#;
        let err = classify_failure(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, ExchangeError::InsufficientFunds));

        let body = r#"{"code": -1003, "msg": "Too many requests queued."}"#;
        let err = classify_failure(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, ExchangeError::RateLimitExceeded));
    }

    #[test]
    fn auth_statuses_map_to_authentication_errors() {
        let body = r#"{"code": -2014, "msg": "API-key format invalid."}"#;
        let err = classify_failure(StatusCode::UNAUTHORIZED, body);
        match err {
            ExchangeError::Authentication { reason } => {
                assert_eq!(reason, "API-key format invalid.")
            }
            other => panic!("expected Authentication, got {other}"),
        }
    }

    #[test]
    fn unexpected_statuses_fall_back_to_bad_response() {
        let err = classify_failure(StatusCode::BAD_GATEWAY, "upstream unavailable");
        match err {
            ExchangeError::BadResponse { reason } => {
                assert!(reason.contains("502"));
                assert!(reason.contains("upstream unavailable"));
            }
            other => panic!("expected BadResponse, got {other}"),
        }
    }

    #[test]
    fn parse_decimal_rejects_garbage() {
        assert!(parse_decimal("0.54810000").is_ok());
        assert!(parse_decimal("not-a-number").is_err());
    }
}

// -------------------------------------------------------------------------
// Integration tests (behind feature flag, network access required)
// -------------------------------------------------------------------------
