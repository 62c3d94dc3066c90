use crate::error::{AppError, Result};

/// MOLIT apartment trade feed (국토교통부 아파트 매매 실거래가).
pub const FEED_URL: &str =
    "https://apis.data.go.kr/1613000/RTMSDataSvcAptTrade/getRTMSDataSvcAptTrade";

/// Rows requested per (region, month). Only the first page is read, so a
/// region-month with more deals than this is truncated.
pub const FEED_PAGE_SIZE: u32 = 500;

/// The feed reports success with this exact element.
pub const FEED_SUCCESS_MARKER: &str = "<resultCode>000</resultCode>";

/// Square metres per pyeong.
pub const M2_PER_PYEONG: f64 = 3.3058;

/// Window bounds for multi-month queries.
pub const MIN_MONTHS: i64 = 1;
pub const MAX_MONTHS: i64 = 12;
pub const DEFAULT_MONTHS: i64 = 6;

/// Heatmap and complex search always look back this far.
pub const SHORT_WINDOW_MONTHS: i64 = 3;

/// Korea Standard Time offset; feed months are KST calendar months.
pub const KST_OFFSET_HOURS: i64 = 9;

/// Response list caps.
pub mod limits {
    pub const TRADES: usize = 100;
    pub const COMPLEXES: usize = 30;
    pub const SEARCH_RESULTS: usize = 20;
    pub const TREND_DEFAULT_REGIONS: usize = 6;
    /// Fewer transactions than this and the position analysis is omitted.
    pub const ANALYSIS_MIN_TRADES: usize = 3;
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Feed credential (MOLIT_API_KEY). None degrades every fetch to empty.
    pub api_key: Option<String>,
    pub feed_url: String,
    pub log_level: String,
    pub api_port: u16,
    /// Max concurrent outbound feed requests (FEED_CONCURRENCY)
    pub feed_concurrency: usize,
    /// Per-request transport timeout (FEED_TIMEOUT_SECS)
    pub feed_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_key: std::env::var("MOLIT_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            feed_url: std::env::var("MOLIT_API_URL").unwrap_or_else(|_| FEED_URL.to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            feed_concurrency: std::env::var("FEED_CONCURRENCY")
                .unwrap_or_else(|_| "3".to_string())
                .parse::<usize>()
                .unwrap_or(3)
                .max(1),
            feed_timeout_secs: std::env::var("FEED_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<u64>()
                .unwrap_or(10),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            feed_url: FEED_URL.to_string(),
            log_level: "info".to_string(),
            api_port: 3000,
            feed_concurrency: 3,
            feed_timeout_secs: 10,
        }
    }
}
