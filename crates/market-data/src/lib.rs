//! HTTP client for the quote-summary market-data provider.
//!
//! Supplies the seven raw per-ticker fields the engine consumes. Fields
//! the provider omits come back as `Missing`; only transport-level
//! problems (network, auth, malformed JSON) surface as errors, and the
//! pipeline absorbs those into an all-`Missing` record per ticker.

use analysis_core::{AnalysisError, Metric, MetricsProvider, RawStockMetrics};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const DEFAULT_BASE_URL: &str = "https://api.quotesummary.io";

/// Sliding-window rate limiter: at most `max_requests` per `window`.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests,
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            // Drop timestamps that have fallen out of the window
            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }

            let wait_until = match ts.front().and_then(|f| f.checked_add(self.window)) {
                Some(t) => t,
                None => now + self.window,
            };
            let sleep_dur = wait_until.duration_since(now) + Duration::from_millis(50);
            drop(ts);
            tracing::debug!(
                "Rate limiter: waiting {:.1}s for provider slot",
                sleep_dur.as_secs_f64()
            );
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

/// Per-ticker quote summary as returned by the provider. Every metric
/// field is optional; absent means the provider has no figure.
#[derive(Debug, Deserialize)]
struct QuoteSummary {
    #[allow(dead_code)]
    ticker: Option<String>,
    current_price: Option<f64>,
    market_cap: Option<f64>,
    revenue_growth: Option<f64>,
    beta: Option<f64>,
    pe_ratio: Option<f64>,
    free_cash_flow: Option<f64>,
    dividend_rate: Option<f64>,
}

/// Base wait after the first 429; doubles on each further attempt.
const RETRY_BASE_WAIT: Duration = Duration::from_secs(5);
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Wait before retry number `attempt` (0-based): 5s, 10s, 20s, ...
fn retry_backoff(attempt: u32) -> Duration {
    RETRY_BASE_WAIT * 2u32.saturating_pow(attempt)
}

#[derive(Clone)]
pub struct QuoteClient {
    api_key: String,
    base_url: String,
    client: Client,
    rate_limiter: RateLimiter,
    max_retries: u32,
}

impl QuoteClient {
    pub fn new(api_key: String) -> Self {
        // Default 120 req/min; free-tier users should set QUOTE_RATE_LIMIT=5.
        let rate_limit: usize = std::env::var("QUOTE_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);

        let max_retries: u32 = std::env::var("QUOTE_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_RETRIES);

        let base_url =
            std::env::var("QUOTE_API_BASE").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            base_url,
            client,
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
            max_retries,
        }
    }

    /// Send a request through the rate limiter, retrying 429 responses
    /// with an exponentially growing wait up to the retry budget.
    async fn send_request(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, AnalysisError> {
        let request = builder
            .build()
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        let mut attempt = 0u32;
        loop {
            self.rate_limiter.acquire().await;
            let req_clone = request
                .try_clone()
                .ok_or_else(|| AnalysisError::ApiError("Cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req_clone)
                .await
                .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

            if response.status().as_u16() != 429 {
                return Ok(response);
            }
            if attempt >= self.max_retries {
                return Err(AnalysisError::ApiError(format!(
                    "Rate limited by provider after {} retries",
                    self.max_retries
                )));
            }

            let wait = retry_backoff(attempt);
            attempt += 1;
            tracing::warn!(
                "Provider 429 rate limited, waiting {}s before retry {}/{}",
                wait.as_secs(),
                attempt,
                self.max_retries
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Fetch the raw metric set for one ticker.
    pub async fn fetch_metrics(&self, ticker: &str) -> Result<RawStockMetrics, AnalysisError> {
        let url = format!("{}/v1/quote-summary/{}", self.base_url, ticker);

        let response = self
            .send_request(self.client.get(&url).query(&[("apiKey", &self.api_key)]))
            .await?;

        if !response.status().is_success() {
            return Err(AnalysisError::ApiError(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let summary: QuoteSummary = response
            .json()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        Ok(summary.into_metrics(ticker))
    }
}

impl QuoteSummary {
    fn into_metrics(self, ticker: &str) -> RawStockMetrics {
        RawStockMetrics {
            ticker: ticker.to_string(),
            current_price: Metric::from_option(self.current_price),
            market_cap: Metric::from_option(self.market_cap),
            revenue_growth: Metric::from_option(self.revenue_growth),
            beta: Metric::from_option(self.beta),
            pe_ratio: Metric::from_option(self.pe_ratio),
            free_cash_flow: Metric::from_option(self.free_cash_flow),
            dividend_rate: Metric::from_option(self.dividend_rate),
        }
    }
}

#[async_trait]
impl MetricsProvider for QuoteClient {
    async fn get_metrics(&self, ticker: &str) -> Result<RawStockMetrics, AnalysisError> {
        self.fetch_metrics(ticker).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_maps_absent_fields_to_missing() {
        let summary: QuoteSummary = serde_json::from_str(
            r#"{"ticker":"AAPL","current_price":187.5,"beta":1.2}"#,
        )
        .unwrap();
        let raw = summary.into_metrics("AAPL");
        assert_eq!(raw.ticker, "AAPL");
        assert_eq!(raw.current_price, Metric::Present(187.5));
        assert_eq!(raw.beta, Metric::Present(1.2));
        assert!(raw.market_cap.is_missing());
        assert!(raw.revenue_growth.is_missing());
        assert!(raw.pe_ratio.is_missing());
        assert!(raw.free_cash_flow.is_missing());
        assert!(raw.dividend_rate.is_missing());
    }

    #[test]
    fn test_summary_all_fields() {
        let summary: QuoteSummary = serde_json::from_str(
            r#"{
                "ticker": "MSFT",
                "current_price": 410.0,
                "market_cap": 3.0e12,
                "revenue_growth": 0.12,
                "beta": 0.9,
                "pe_ratio": 35.1,
                "free_cash_flow": 6.0e10,
                "dividend_rate": 3.0
            }"#,
        )
        .unwrap();
        let raw = summary.into_metrics("MSFT");
        assert!(raw.current_price.is_present());
        assert!(raw.market_cap.is_present());
        assert!(raw.revenue_growth.is_present());
        assert!(raw.beta.is_present());
        assert!(raw.pe_ratio.is_present());
        assert!(raw.free_cash_flow.is_present());
        assert!(raw.dividend_rate.is_present());
    }

    #[test]
    fn test_retry_backoff_doubles() {
        assert_eq!(retry_backoff(0), Duration::from_secs(5));
        assert_eq!(retry_backoff(1), Duration::from_secs(10));
        assert_eq!(retry_backoff(2), Duration::from_secs(20));
    }

    #[tokio::test]
    async fn test_rate_limiter_allows_burst_within_window() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
