//! HTTP fetch strategies for the exchange connectors.
//!
//! An [`ExchangeClient`] executes [`Task`]s: simple one-shot GETs for
//! binance, backward pagination for bybit kline requests larger than one
//! page. Fetch failures degrade to `None` so a failing endpoint costs one
//! series, never the run.

use std::time::Duration;

use candela_types::{CollectorConfig, DataType};
use rand::seq::IndexedRandom;
use serde_json::{json, Value};
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{error, warn};

use crate::{Exchange, ExchangeEndpoints, Task};

/// Bybit caps kline responses at 1000 rows per request.
pub const BYBIT_MAX_PAGE_SIZE: u32 = 1000;

/// Browser user agents rotated across requests. Both exchanges throttle
/// or reject obviously non-browser clients on the public data endpoints.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:126.0) Gecko/20100101 Firefox/126.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
];

/// Rate-limited HTTP client shared by every task of a collection run.
#[derive(Debug, Clone)]
pub struct ExchangeClient {
    http: reqwest::Client,
    endpoints: ExchangeEndpoints,
    request_timeout: Duration,
    request_delay: Duration,
}

impl ExchangeClient {
    /// Build a client against the production exchange endpoints.
    #[must_use]
    pub fn new(config: &CollectorConfig) -> Self {
        Self::with_endpoints(config, ExchangeEndpoints::default())
    }

    /// Build a client against custom base URLs (tests point this at a mock
    /// server).
    #[must_use]
    pub fn with_endpoints(config: &CollectorConfig, endpoints: ExchangeEndpoints) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoints,
            request_timeout: config.request_timeout,
            request_delay: config.request_delay,
        }
    }

    /// The endpoint set this client resolves URLs against.
    #[must_use]
    pub fn endpoints(&self) -> &ExchangeEndpoints {
        &self.endpoints
    }

    /// Execute one task, holding a permit from `gate` for its whole
    /// duration (all pages of a paginated fetch count as one slot).
    ///
    /// Returns `None` on any network, HTTP, or pagination failure; the
    /// failure is logged here and the caller treats the series as missing.
    pub async fn fetch_task(&self, task: &Task, gate: &Semaphore) -> Option<Value> {
        let _permit = gate.acquire().await.ok()?;

        if task.exchange.paginates()
            && task.data_type == DataType::Klines
            && task.limit > BYBIT_MAX_PAGE_SIZE
        {
            self.fetch_paginated(task).await
        } else {
            self.fetch_simple(task).await
        }
    }

    /// One-shot GET. Bybit kline URLs are built without a page size, so it
    /// is appended here, clamped to the exchange maximum.
    async fn fetch_simple(&self, task: &Task) -> Option<Value> {
        let url = if task.exchange == Exchange::Bybit && task.data_type == DataType::Klines {
            let limit = task.limit.min(BYBIT_MAX_PAGE_SIZE);
            format!("{}&limit={limit}", task.url)
        } else {
            task.url.clone()
        };

        sleep(self.request_delay).await;
        self.get_json(&url, task.exchange).await
    }

    /// Backward pagination for bybit klines beyond one page: each page's
    /// oldest row becomes the `end` bound of the next request. Pages are
    /// re-wrapped in the V5 envelope so the parser sees one payload.
    async fn fetch_paginated(&self, task: &Task) -> Option<Value> {
        let mut rows: Vec<Value> = Vec::with_capacity(task.limit as usize);
        let mut remaining = task.limit;
        let mut end_ts: Option<i64> = None;

        while remaining > 0 {
            let page = remaining.min(BYBIT_MAX_PAGE_SIZE);
            let url = match end_ts {
                Some(end) => format!("{}&limit={page}&end={end}", task.url),
                None => format!("{}&limit={page}", task.url),
            };

            sleep(self.request_delay).await;
            // A failed page keeps whatever was already collected.
            let Some(payload) = self.get_json(&url, task.exchange).await else {
                break;
            };
            let page_rows = payload
                .get("result")
                .and_then(|r| r.get("list"))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            if page_rows.is_empty() {
                break;
            }

            let got = page_rows.len() as u32;
            // Rows come newest-first; the last row is the oldest and bounds
            // the next page.
            let oldest = page_rows
                .last()
                .and_then(|row| row.get(0))
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<i64>().ok());
            rows.extend(page_rows);

            if got < page {
                break;
            }
            remaining = remaining.saturating_sub(got);
            if remaining == 0 {
                break;
            }
            match oldest {
                // The next page ends just before the oldest row seen.
                Some(ts) => end_ts = Some(ts - 1),
                None => {
                    warn!(
                        symbol = %task.symbol,
                        url = %task.url,
                        "pagination stopped: page had no parsable start timestamp"
                    );
                    break;
                }
            }
        }

        if rows.is_empty() {
            return None;
        }
        Some(json!({ "result": { "list": rows } }))
    }

    async fn get_json(&self, url: &str, exchange: Exchange) -> Option<Value> {
        let user_agent = USER_AGENTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);

        let response = self
            .http
            .get(url)
            .timeout(self.request_timeout)
            .header("Accept", "application/json")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("User-Agent", user_agent)
            .header("Referer", exchange.web_origin())
            .header("Origin", exchange.web_origin())
            .send()
            .await;

        let response = match response {
            Ok(resp) => resp,
            Err(err) if err.is_timeout() => {
                warn!(%url, "request timed out");
                return None;
            }
            Err(err) => {
                error!(%url, error = %err, "request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            error!(%url, status = %response.status(), "request rejected");
            return None;
        }

        match response.json::<Value>().await {
            Ok(payload) => Some(payload),
            Err(err) => {
                error!(%url, error = %err, "response body was not valid JSON");
                None
            }
        }
    }
}
