//! HTTP client for the exchange's futures REST endpoints.
//!
//! The engine consumes exactly three endpoints: server time, place order,
//! and position risk. [`ExchangeApi`] is the seam the engine depends on;
//! [`BinanceFuturesClient`] is the production implementation.

use crate::error::ExchangeError;
use ordex_core::Position;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// A canonical query string plus its signature, ready for transmission.
///
/// Built by the submitter; the client appends the signature and never
/// re-orders or re-signs.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub query: String,
    pub signature: String,
}

impl SignedRequest {
    /// Wire form: `{query}&signature={signature}`.
    pub fn body(&self) -> String {
        format!("{}&signature={}", self.query, self.signature)
    }
}

/// Response of the server time endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTimeResponse {
    pub server_time: u64,
}

/// Acknowledgment of a placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAck {
    pub order_id: u64,
    pub status: String,
    #[serde(default)]
    pub client_order_id: Option<String>,
}

/// One entry of the position risk endpoint. Decimal fields arrive as strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRisk {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub position_amt: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub entry_price: Decimal,
}

impl PositionRisk {
    pub fn into_position(self) -> Position {
        Position::new(self.symbol, self.position_amt, self.entry_price)
    }
}

/// Coded error body the exchange attaches to rejections.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    msg: String,
}

/// The three endpoints the engine consumes.
///
/// Dyn-compatible so tests can inject scripted implementations.
pub trait ExchangeApi: Send + Sync {
    /// `GET /fapi/v1/time`: server time in integer milliseconds.
    fn server_time(&self) -> BoxFuture<'_, Result<u64, ExchangeError>>;

    /// `POST /fapi/v1/order`: place a signed order.
    fn place_order(&self, request: SignedRequest) -> BoxFuture<'_, Result<OrderAck, ExchangeError>>;

    /// `GET /fapi/v2/positionRisk`: signed position snapshot query.
    fn position_risk(
        &self,
        request: SignedRequest,
    ) -> BoxFuture<'_, Result<Vec<PositionRisk>, ExchangeError>>;
}

/// reqwest-based client for the futures REST API.
pub struct BinanceFuturesClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl BinanceFuturesClient {
    /// Create a new client.
    ///
    /// The per-request timeout doubles as the ambiguity boundary: an elapsed
    /// timeout means the request may or may not have reached the exchange.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ExchangeError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExchangeError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    async fn get_server_time(&self) -> Result<u64, ExchangeError> {
        let url = format!("{}/fapi/v1/time", self.base_url);
        debug!(url = %url, "fetching server time");

        let response = self.http.get(&url).send().await.map_err(from_reqwest)?;
        let body = read_success_body(response).await?;

        let parsed: ServerTimeResponse =
            serde_json::from_str(&body).map_err(|e| ExchangeError::Parse(e.to_string()))?;
        Ok(parsed.server_time)
    }

    async fn post_order(&self, request: SignedRequest) -> Result<OrderAck, ExchangeError> {
        let url = format!("{}/fapi/v1/order", self.base_url);
        debug!(url = %url, "submitting order");

        let response = self
            .http
            .post(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(request.body())
            .send()
            .await
            .map_err(from_reqwest)?;
        let body = read_success_body(response).await?;

        serde_json::from_str(&body).map_err(|e| ExchangeError::Parse(e.to_string()))
    }

    async fn get_position_risk(
        &self,
        request: SignedRequest,
    ) -> Result<Vec<PositionRisk>, ExchangeError> {
        let url = format!("{}/fapi/v2/positionRisk?{}", self.base_url, request.body());
        debug!("fetching position risk");

        let response = self
            .http
            .get(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(from_reqwest)?;
        let body = read_success_body(response).await?;

        serde_json::from_str(&body).map_err(|e| ExchangeError::Parse(e.to_string()))
    }
}

impl ExchangeApi for BinanceFuturesClient {
    fn server_time(&self) -> BoxFuture<'_, Result<u64, ExchangeError>> {
        Box::pin(self.get_server_time())
    }

    fn place_order(&self, request: SignedRequest) -> BoxFuture<'_, Result<OrderAck, ExchangeError>> {
        Box::pin(self.post_order(request))
    }

    fn position_risk(
        &self,
        request: SignedRequest,
    ) -> BoxFuture<'_, Result<Vec<PositionRisk>, ExchangeError>> {
        Box::pin(self.get_position_risk(request))
    }
}

/// Maps transport-level reqwest failures onto the retry taxonomy.
fn from_reqwest(e: reqwest::Error) -> ExchangeError {
    if e.is_timeout() {
        ExchangeError::Timeout
    } else {
        ExchangeError::Network(e.to_string())
    }
}

/// Returns the body of a successful response, or the mapped error.
async fn read_success_body(response: reqwest::Response) -> Result<String, ExchangeError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(from_reqwest)?;

    if (200..300).contains(&status) {
        Ok(body)
    } else {
        Err(error_from_response(status, &body))
    }
}

/// Maps a non-success HTTP response onto the retry taxonomy.
///
/// The exchange attaches a `{code, msg}` body to most rejections; when
/// present it carries the authoritative classification, so it wins over the
/// HTTP status.
fn error_from_response(status: u16, body: &str) -> ExchangeError {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        return ExchangeError::Rejected {
            code: parsed.code,
            message: parsed.msg,
        };
    }

    match status {
        429 | 418 => ExchangeError::RateLimited { status },
        500..=599 => ExchangeError::Server {
            status,
            body: body.to_string(),
        },
        _ => ExchangeError::Http(format!("HTTP {status}: {body}")),
    }
}

/// Scripted [`ExchangeApi`] for tests.
///
/// Order outcomes are queued in advance; every placed order is recorded for
/// verification. An empty script leaves the caller pending forever, which
/// lets cancellation and deadline paths be exercised.
#[derive(Default)]
pub struct ScriptedExchangeApi {
    server_time_ms: std::sync::atomic::AtomicU64,
    time_calls: std::sync::atomic::AtomicU32,
    recorded_orders: std::sync::Mutex<Vec<SignedRequest>>,
    order_script: std::sync::Mutex<std::collections::VecDeque<Result<OrderAck, ExchangeError>>>,
    positions: std::sync::Mutex<Vec<PositionRisk>>,
}

impl ScriptedExchangeApi {
    pub fn new(server_time_ms: u64) -> Self {
        let api = Self::default();
        api.server_time_ms
            .store(server_time_ms, std::sync::atomic::Ordering::Release);
        api
    }

    /// Queue the outcome of the next order placement.
    pub fn push_order_result(&self, result: Result<OrderAck, ExchangeError>) {
        self.order_script.lock().unwrap().push_back(result);
    }

    pub fn set_positions(&self, positions: Vec<PositionRisk>) {
        *self.positions.lock().unwrap() = positions;
    }

    /// All signed order requests placed so far.
    pub fn recorded_orders(&self) -> Vec<SignedRequest> {
        self.recorded_orders.lock().unwrap().clone()
    }

    /// Number of server time fetches performed.
    pub fn time_calls(&self) -> u32 {
        self.time_calls.load(std::sync::atomic::Ordering::Acquire)
    }
}

impl ExchangeApi for ScriptedExchangeApi {
    fn server_time(&self) -> BoxFuture<'_, Result<u64, ExchangeError>> {
        Box::pin(async move {
            self.time_calls
                .fetch_add(1, std::sync::atomic::Ordering::AcqRel);
            Ok(self
                .server_time_ms
                .load(std::sync::atomic::Ordering::Acquire))
        })
    }

    fn place_order(&self, request: SignedRequest) -> BoxFuture<'_, Result<OrderAck, ExchangeError>> {
        Box::pin(async move {
            self.recorded_orders.lock().unwrap().push(request);
            let next = self.order_script.lock().unwrap().pop_front();
            match next {
                Some(result) => result,
                None => std::future::pending().await,
            }
        })
    }

    fn position_risk(
        &self,
        _request: SignedRequest,
    ) -> BoxFuture<'_, Result<Vec<PositionRisk>, ExchangeError>> {
        Box::pin(async move { Ok(self.positions.lock().unwrap().clone()) })
    }
}
