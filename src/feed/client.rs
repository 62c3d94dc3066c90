use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use crate::api::health::HealthState;
use crate::api::latency::FeedLatency;
use crate::config::{Config, FEED_PAGE_SIZE, FEED_SUCCESS_MARKER};
use crate::error::Result;
use crate::feed::{normalizer, parser};
use crate::types::{Transaction, YearMonth};

/// Raw upstream reply.
#[derive(Debug, Clone)]
pub struct FeedResponse {
    pub status: u16,
    pub body: String,
}

impl FeedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound GET. The production impl is [`HttpTransport`]; tests plug in
/// canned payloads.
pub trait FeedTransport: Send + Sync {
    fn get<'a>(
        &'a self,
        url: &'a str,
        query: &'a [(&'a str, String)],
    ) -> BoxFuture<'a, Result<FeedResponse>>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl FeedTransport for HttpTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
        query: &'a [(&'a str, String)],
    ) -> BoxFuture<'a, Result<FeedResponse>> {
        Box::pin(async move {
            let resp = self.client.get(url).query(query).send().await?;
            let status = resp.status().as_u16();
            let body = resp.text().await?;
            Ok(FeedResponse { status, body })
        })
    }
}

/// Result of a diagnostic probe against the feed.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub status: String,
    pub body: String,
}

/// Client for the MOLIT apartment trade feed.
///
/// Every failure (missing credential, transport error, non-2xx status,
/// missing success marker) degrades to "no data" for that (region, month).
/// There are no retries.
pub struct FeedClient {
    transport: Arc<dyn FeedTransport>,
    api_key: Option<String>,
    url: String,
    health: Arc<HealthState>,
    latency: Arc<FeedLatency>,
}

impl FeedClient {
    pub fn new(cfg: &Config, transport: Arc<dyn FeedTransport>) -> Self {
        Self {
            transport,
            api_key: cfg.api_key.clone(),
            url: cfg.feed_url.clone(),
            health: Arc::new(HealthState::new()),
            latency: Arc::new(FeedLatency::new()),
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn health(&self) -> &Arc<HealthState> {
        &self.health
    }

    pub fn latency(&self) -> &Arc<FeedLatency> {
        &self.latency
    }

    fn query(&self, key: &str, region: &str, ym: YearMonth, rows: u32) -> Vec<(&'static str, String)> {
        vec![
            ("serviceKey", key.to_string()),
            ("LAWD_CD", region.to_string()),
            ("DEAL_YMD", ym.deal_ymd()),
            ("pageNo", "1".to_string()),
            ("numOfRows", rows.to_string()),
        ]
    }

    /// Fetch the raw payload for one (region, month). None on any failure.
    pub async fn fetch_feed(&self, region: &str, ym: YearMonth) -> Option<String> {
        let Some(key) = self.api_key.as_deref() else {
            debug!(region, deal_ym = %ym.deal_ymd(), "no MOLIT_API_KEY configured, skipping fetch");
            return None;
        };

        let query = self.query(key, region, ym, FEED_PAGE_SIZE);
        let started = Instant::now();
        let result = self.transport.get(&self.url, &query).await;
        self.latency.record_since(started);

        let resp = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(region, deal_ym = %ym.deal_ymd(), "[FEED] request failed: {e}");
                self.health.record_failure();
                return None;
            }
        };

        if !resp.is_success() {
            warn!(region, deal_ym = %ym.deal_ymd(), status = resp.status, "[FEED] HTTP {}", resp.status);
            self.health.record_failure();
            return None;
        }

        if !resp.body.contains(FEED_SUCCESS_MARKER) {
            warn!(
                region,
                deal_ym = %ym.deal_ymd(),
                "[FEED] API error: {}",
                preview(&resp.body, 300),
            );
            self.health.record_failure();
            return None;
        }

        if let Some(total) = parser::header_value(&resp.body, "totalCount")
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|&n| n > FEED_PAGE_SIZE)
        {
            warn!(
                region,
                deal_ym = %ym.deal_ymd(),
                total,
                page_size = FEED_PAGE_SIZE,
                "[FEED] only the first page is read; {} deals truncated",
                total - FEED_PAGE_SIZE,
            );
        }

        self.health.record_success(now_secs());
        Some(resp.body)
    }

    /// Fetch → parse → normalize for one (region, month).
    pub async fn fetch_trades(&self, region: &str, ym: YearMonth) -> Vec<Transaction> {
        let Some(raw) = self.fetch_feed(region, ym).await else {
            return Vec::new();
        };
        let trades = normalizer::normalize_all(&parser::parse_records(&raw));
        debug!(region, deal_ym = %ym.deal_ymd(), count = trades.len(), "[FEED] month fetched");
        trades
    }

    /// Small live request used by the diagnostic endpoint. Never fails.
    pub async fn probe(&self, region: &str, ym: YearMonth) -> ProbeResult {
        let key = self.api_key.as_deref().unwrap_or("");
        let query = self.query(key, region, ym, 5);
        match self.transport.get(&self.url, &query).await {
            Ok(resp) => ProbeResult {
                status: resp.status.to_string(),
                body: preview(&resp.body, 500).to_string(),
            },
            Err(e) => ProbeResult {
                status: "FETCH_ERROR".to_string(),
                body: e.to_string(),
            },
        }
    }
}

/// First `max_chars` characters of `s`.
pub fn preview(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
