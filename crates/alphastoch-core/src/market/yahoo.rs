use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use super::{PriceSource, SourceError};
use crate::circuit_breaker::CircuitBreaker;
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::retry::RetryConfig;
use crate::{MarketSnapshot, Symbol, UtcDateTime, ValidationError};

const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Daily close history from Yahoo Finance's chart endpoint.
///
/// Without a transport (the default) the source serves a deterministic
/// synthetic series per symbol so offline runs and tests stay reproducible.
#[derive(Clone)]
pub struct YahooPriceSource {
    transport: Option<Arc<dyn HttpClient>>,
    circuit_breaker: Arc<CircuitBreaker>,
    retry: RetryConfig,
    range: &'static str,
}

impl Default for YahooPriceSource {
    fn default() -> Self {
        Self::offline()
    }
}

impl YahooPriceSource {
    /// Source that never touches the network.
    pub fn offline() -> Self {
        Self {
            transport: None,
            circuit_breaker: Arc::new(CircuitBreaker::default()),
            retry: RetryConfig::default(),
            range: "1y",
        }
    }

    /// Source backed by a live reqwest transport.
    pub fn real() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            transport: Some(http_client),
            ..Self::offline()
        }
    }

    pub fn is_offline(&self) -> bool {
        self.transport.is_none()
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    fn chart_url(&self, symbol: &Symbol) -> String {
        format!(
            "{CHART_ENDPOINT}/{}?range={}&interval=1d",
            urlencoding::encode(symbol.as_str()),
            self.range
        )
    }

    async fn fetch_real_snapshot(
        &self,
        transport: &dyn HttpClient,
        symbol: &Symbol,
    ) -> Result<MarketSnapshot, SourceError> {
        let body = self.fetch_with_retry(transport, &self.chart_url(symbol)).await?;
        parse_chart(symbol, &body)
    }

    async fn fetch_with_retry(
        &self,
        transport: &dyn HttpClient,
        url: &str,
    ) -> Result<String, SourceError> {
        let attempts = self.retry.max_attempts();
        let mut last_error = SourceError::unavailable("yahoo request was not attempted");

        for attempt in 0..attempts {
            if !self.circuit_breaker.allow_request() {
                return Err(SourceError::unavailable(
                    "yahoo circuit breaker is open; skipping upstream call",
                ));
            }

            let retry_this = match transport.execute(HttpRequest::get(url)).await {
                Ok(response) if response.is_success() => {
                    self.circuit_breaker.record_success();
                    return Ok(response.body);
                }
                Ok(response) => {
                    self.circuit_breaker.record_failure();
                    last_error = if response.status == 429 {
                        SourceError::rate_limited("yahoo rate limited the chart request")
                    } else if response.status == 404 {
                        SourceError::no_data(format!("yahoo has no chart for {url}"))
                    } else {
                        SourceError::unavailable(format!(
                            "yahoo upstream returned status {}",
                            response.status
                        ))
                    };
                    self.retry.should_retry_status(response.status)
                }
                Err(error) => {
                    self.circuit_breaker.record_failure();
                    last_error = if error.retryable() {
                        SourceError::unavailable(format!("yahoo transport error: {error}"))
                    } else {
                        SourceError::internal(format!("yahoo transport error: {error}"))
                    };
                    self.retry.should_retry_error(&error)
                }
            };

            if !retry_this || attempt + 1 == attempts {
                break;
            }

            let delay = self.retry.delay_for_attempt(attempt);
            warn!(
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                error = %last_error,
                "retrying yahoo chart request"
            );
            tokio::time::sleep(delay).await;
        }

        Err(last_error)
    }

    fn fake_snapshot(&self, symbol: &Symbol) -> Result<MarketSnapshot, SourceError> {
        let closes = synthetic_closes(symbol, 365);
        MarketSnapshot::from_closes(symbol.clone(), &closes, UtcDateTime::now())
            .map_err(validation_to_error)
    }
}

impl PriceSource for YahooPriceSource {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn snapshot<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<MarketSnapshot, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            debug!(symbol = %symbol, offline = self.is_offline(), "fetching yahoo snapshot");
            match &self.transport {
                Some(transport) => self.fetch_real_snapshot(transport.as_ref(), symbol).await,
                None => self.fake_snapshot(symbol),
            }
        })
    }
}

fn parse_chart(symbol: &Symbol, body: &str) -> Result<MarketSnapshot, SourceError> {
    let response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = response.chart.error {
        return Err(SourceError::no_data(format!(
            "yahoo chart API error {}: {}",
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SourceError::no_data(format!("no chart data for {symbol}")))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let raw_closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|quote| quote.close)
        .unwrap_or_default();

    let mut closes = Vec::with_capacity(raw_closes.len());
    let mut last_ts = None;
    for (index, close) in raw_closes.into_iter().enumerate() {
        if let Some(close) = close.filter(|c| c.is_finite() && *c > 0.0) {
            closes.push(close);
            last_ts = timestamps.get(index).copied();
        }
    }

    if closes.is_empty() {
        return Err(SourceError::no_data(format!("yahoo returned no closes for {symbol}")));
    }

    let as_of = last_ts
        .and_then(|seconds| UtcDateTime::from_unix_seconds(seconds).ok())
        .unwrap_or_else(UtcDateTime::now);

    MarketSnapshot::from_closes(symbol.clone(), &closes, as_of).map_err(validation_to_error)
}

/// Deterministic, strictly positive daily series seeded by the symbol text.
fn synthetic_closes(symbol: &Symbol, len: usize) -> Vec<f64> {
    let seed = symbol
        .as_str()
        .bytes()
        .fold(0_u64, |acc, byte| acc.wrapping_mul(31).wrapping_add(u64::from(byte)));
    let base = 100.0 + (seed % 900) as f64;

    (0..len as u64)
        .map(|index| {
            let wiggle = ((seed.wrapping_add(index * 7)) % 21) as f64 - 10.0;
            base * (1.0 + wiggle / 1_000.0)
        })
        .collect()
}

fn validation_to_error(error: ValidationError) -> SourceError {
    SourceError::no_data(error.to_string())
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Deserialize)]
struct YahooChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooChartIndicators {
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}
