//! Kraken Futures REST client.
//!
//! Uses the derivatives v3 API: `tickers` for the pair catalog, `orderbook`
//! for depth, and the signed `sendorder` endpoint for market orders. Only
//! Perpetual Linear Multi-Collateral contracts (`PF_` symbols) are exposed.
//!
//! The venue reports most failures inside a 200 response: an `error` code in
//! the body, mapped onto the error taxonomy through a fixed table.
//! Authenticated requests carry `APIKey`, `Nonce`, and an `Authent` header:
//! base64(HMAC-SHA512(base64-decoded secret, SHA-256(post data + nonce +
//! endpoint path))).
//!
//! Orders are sized in contracts, not the base asset, and market orders are
//! slippage-protected by the venue: an order that would walk too far through
//! the book is rejected rather than filled.

mod dto;

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client as HttpClient;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256, Sha512};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::KrakenFuturesConfig;
use crate::domain::{Fill, MarketOrder, OrderBook, OrderId, OrderSide, Pair, PriceLevel, Volume};
use crate::error::{ExchangeError, Result};
use crate::exchange::Exchange;

use dto::{Envelope, OrderBookResponse, SendOrderResponse, Tickers};

type HmacSha512 = Hmac<Sha512>;

/// Kraken Futures exchange client.
#[derive(Debug)]
pub struct KrakenFutures {
    http: HttpClient,
    api_url: String,
    api_key: String,
    api_secret: String,
    retry_max_attempts: u32,
    retry_backoff_ms: u64,
    pairs: Vec<Pair>,
}

impl KrakenFutures {
    pub const NAME: &'static str = "Kraken Futures";

    const PROD_API_URL: &'static str = "https://futures.kraken.com/derivatives/api/v3/";
    const DEMO_API_URL: &'static str = "https://demo-futures.kraken.com/derivatives/api/v3/";

    /// Connects to the venue and loads its pair catalog.
    pub async fn connect(config: &KrakenFuturesConfig) -> Result<Self> {
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
                Self::DEMO_API_URL.into()
            } else {
                Self::PROD_API_URL.into()
            },
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
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
        warn!(
            "Kraken Futures executes orders in contracts, not the base asset, \
             and only Perpetual Linear Multi-Collateral contracts are supported"
        );
        Ok(client)
    }

    async fn fetch_pairs(&self) -> Result<Vec<Pair>> {
        debug!(exchange = Self::NAME, "Loading exchange pairs");
        let tickers: Tickers = self
            .get_with_retry(&format!("{}tickers", self.api_url))
            .await?;

        let mut pairs = Vec::new();
        for ticker in tickers.tickers {
            if ticker.tag.as_deref() != Some("perpetual") || !ticker.symbol.starts_with("PF_") {
                continue;
            }
            let Some((base, quote)) = ticker.pair.as_deref().and_then(|p| p.split_once(':')) else {
                warn!(symbol = %ticker.symbol, "Ticker without a base:quote pair, skipping");
                continue;
            };

            match Pair::try_new(base, quote, &ticker.symbol) {
                Ok(pair) => pairs.push(pair),
                Err(err) => {
                    warn!(symbol = %ticker.symbol, error = %err, "Skipping unparseable listing");
                    continue;
                }
            }

            // The venue still lists BTC under its legacy XBT code
            if base == "XBT" {
                if let Ok(pair) = Pair::try_new("BTC", quote, &ticker.symbol) {
                    pairs.push(pair);
                }
            }
        }
        Ok(pairs)
    }

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

    /// Builds the `Authent` signature for an authenticated endpoint.
    ///
    /// See the venue's API introduction: the signed message is
    /// `post data + nonce + endpoint path`, hashed with SHA-256 and signed
    /// with HMAC-SHA512 keyed by the base64-decoded API secret.
    fn authent(&self, post_data: &str, nonce: &str, endpoint_path: &str) -> Result<String> {
        let secret = BASE64.decode(&self.api_secret).map_err(|_| {
            ExchangeError::Authentication {
                reason: "API secret is not valid base64".into(),
            }
        })?;

        let message = Sha256::digest(format!("{post_data}{nonce}{endpoint_path}").as_bytes());

        let mut mac = HmacSha512::new_from_slice(&secret).map_err(|_| {
            ExchangeError::Authentication {
                reason: "API secret is not a valid HMAC key".into(),
            }
        })?;
        mac.update(&message);

        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}

#[async_trait]
impl Exchange for KrakenFutures {
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
        let url = format!("{}orderbook?symbol={}", self.api_url, pair.exchange_symbol());
        let response: OrderBookResponse = self.get_with_retry(&url).await?;

        let parse_side = |levels: Vec<(f64, f64)>| -> Result<Vec<PriceLevel>> {
            levels
                .into_iter()
                .map(|(price, size)| {
                    Ok(PriceLevel::new(parse_decimal(price)?, parse_decimal(size)?))
                })
                .collect()
        };

        let book = OrderBook::try_new(
            pair.clone(),
            parse_side(response.order_book.bids)?,
            parse_side(response.order_book.asks)?,
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

        let post_data = format!(
            "orderType=mkt&side={}&size={}&symbol={}",
            side.as_str().to_lowercase(),
            size,
            pair.exchange_symbol()
        );
        // Milliseconds since epoch: always incrementing, as the docs recommend
        let nonce = Utc::now().timestamp_millis().to_string();
        let authent = self.authent(&post_data, &nonce, "/api/v3/sendorder")?;

        let response = self
            .http
            .post(format!("{}sendorder?{}", self.api_url, post_data))
            .header("APIKey", &self.api_key)
            .header("Nonce", &nonce)
            .header("Authent", &authent)
            .send()
            .await
            .map_err(|err| ExchangeError::bad_response(err.to_string()))?;

        let order: SendOrderResponse = handle_response(response).await?;
        let status = order.send_status;

        let fills: Vec<Fill> = status
            .order_events
            .iter()
            .filter(|event| event.event_type == "EXECUTION")
            .map(|event| {
                let (Some(price), Some(amount)) = (event.price, event.amount) else {
                    return Err(ExchangeError::bad_response(
                        "execution event without price or amount",
                    )
                    .into());
                };
                Ok(Fill::new(parse_decimal(price)?, parse_decimal(amount)?))
            })
            .collect::<Result<_>>()?;

        // No executions means the order never crossed: either the account
        // could not fund it or the slippage protection rejected it.
        if fills.is_empty() {
            return Err(match status.status.as_str() {
                "insufficientAvailableFunds" => ExchangeError::InsufficientFunds,
                _ => ExchangeError::InsufficientLiquidity,
            }
            .into());
        }

        let order = MarketOrder::try_new(
            OrderId::new(status.order_id),
            pair.clone(),
            side,
            size,
            fills,
        )?;
        Ok(order)
    }
}

fn parse_decimal(raw: f64) -> Result<Decimal> {
    Decimal::from_f64_retain(raw).ok_or_else(|| {
        ExchangeError::bad_response(format!("unrepresentable decimal value '{raw}'")).into()
    })
}

fn should_retry(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

/// Unwraps the venue's response envelope.
///
/// Failures mostly arrive as an `error` code inside a 200 body; a missing
/// `result` field means the response is not the shape any endpoint returns.
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
        return Err(ExchangeError::bad_response(format!("HTTP {status}: {body}")).into());
    }

    let envelope: Envelope = serde_json::from_str(&body)
        .map_err(|err| ExchangeError::bad_response(format!("unexpected response body: {err}")))?;

    if let Some(code) = envelope.error {
        return Err(map_error_code(&code).into());
    }
    if envelope.result.is_none() {
        return Err(ExchangeError::bad_response(format!("no result in response: {body}")).into());
    }

    serde_json::from_str(&body).map_err(|err| {
        ExchangeError::bad_response(format!("unexpected response body: {err}")).into()
    })
}

/// The venue's error codes, mapped onto the taxonomy.
fn map_error_code(code: &str) -> ExchangeError {
    match code {
        "apiLimitExceeded" => ExchangeError::RateLimitExceeded,
        "authenticationError" | "nonceBelowThreshold" => ExchangeError::Authentication {
            reason: code.to_string(),
        },
        "insufficientFunds" => ExchangeError::InsufficientFunds,
        _ => ExchangeError::bad_response(code.to_string()),
    }
}


// -------------------------------------------------------------------------
// Integration tests (behind feature flag, network access required)
// -------------------------------------------------------------------------
