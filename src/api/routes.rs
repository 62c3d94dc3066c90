use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregator::{aggregate_region, clamp_months, today_kst};
use crate::api::latency::LatencySnapshot;
use crate::config::{limits, Config, DEFAULT_MONTHS, SHORT_WINDOW_MONTHS};
use crate::error::AppError;
use crate::feed::client::preview;
use crate::feed::FeedClient;
use crate::regions::{self, POPULAR_REGIONS, SEOUL};
use crate::scheduler::run_bounded;
use crate::stats::{self, Assessment};
use crate::types::{AreaBucket, ComplexCount, MonthlyBucket, PriceSummary, RegionStats, Transaction, YearMonth};

/// Region and month used by the diagnostic probe.
const PROBE_REGION: &str = "11710";

/// Month concurrency inside one region when regions already fan out under
/// `feed_concurrency`. Must stay 1 or in-flight requests multiply.
const FAN_OUT_MONTH_LIMIT: usize = 1;

#[derive(Clone)]
pub struct ApiState {
    pub feed: Arc<FeedClient>,
    pub cfg: Arc<Config>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/api/trades", get(get_trades))
        .route("/api/heatmap", get(get_heatmap))
        .route("/api/trend", get(get_trend))
        .route("/api/apt-search", get(get_apt_search))
        .route("/api/search", get(get_search))
        .route("/api/debug", get(get_debug))
        .route("/api/stats/latency", get(get_stats_latency))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------
//
// Everything arrives as text so a malformed number falls back to its default
// instead of failing extraction.

#[derive(Deserialize, Default)]
pub struct TradesQuery {
    pub code: Option<String>,
    pub region: Option<String>,
    pub apt: Option<String>,
    pub months: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct HeatmapQuery {
    pub sido: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct TrendQuery {
    pub codes: Option<String>,
    pub months: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct AptSearchQuery {
    pub code: Option<String>,
    pub q: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradesResponse {
    pub region: String,
    pub region_code: String,
    pub apt_filter: Option<String>,
    pub months: u32,
    #[serde(flatten)]
    pub stats: RegionStats,
    pub trades: Vec<Transaction>,
    pub areas: Vec<AreaBucket>,
    pub analysis: Option<Assessment>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapRegion {
    pub code: &'static str,
    pub name: String,
    pub avg_price_per_pyeong: i64,
    pub trade_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapResponse {
    pub sido: String,
    pub sido_name: Option<&'static str>,
    pub regions: Vec<HeatmapRegion>,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct TrendRegion {
    pub code: &'static str,
    pub name: String,
    #[serde(flatten)]
    pub summary: PriceSummary,
    pub monthly: Vec<MonthlyBucket>,
}

#[derive(Serialize)]
pub struct TrendResponse {
    pub regions: Vec<TrendRegion>,
    pub months: u32,
}

#[derive(Serialize)]
pub struct AptSearchResponse {
    pub apartments: Vec<ComplexCount>,
}

#[derive(Serialize)]
pub struct RegionHit {
    pub code: &'static str,
    pub name: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub results: Vec<RegionHit>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugResponse {
    pub has_key: bool,
    pub key_len: usize,
    pub key_preview: String,
    pub api_status: String,
    pub api_body: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub has_key: bool,
    pub feed_successes: u64,
    pub feed_failures: u64,
    pub last_success_at: Option<u64>,
}


// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn parse_months(raw: Option<&str>) -> u32 {
    let months = raw
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_MONTHS);
    clamp_months(months)
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

async fn get_trades(
    State(state): State<ApiState>,
    Query(params): Query<TradesQuery>,
) -> Result<Json<TradesResponse>, AppError> {
    let code = match non_empty(params.code.as_deref()) {
        Some(code) => Some(code),
        None => non_empty(params.region.as_deref()).and_then(regions::code_for_name),
    };
    let region = code.and_then(regions::lookup).ok_or(AppError::InvalidRegion)?;
    let months = parse_months(params.months.as_deref());
    let apt = non_empty(params.apt.as_deref());

    let trades = aggregate_region(
        &state.feed,
        region.code,
        months as i64,
        today_kst(),
        state.cfg.feed_concurrency,
    )
    .await;
    let filtered = stats::filter_by_complex(trades, apt.unwrap_or(""));

    let mut region_stats = stats::region_stats(&filtered);
    region_stats.complexes.truncate(limits::COMPLEXES);
    let areas = stats::area_buckets(&filtered);
    let analysis = (filtered.len() >= limits::ANALYSIS_MIN_TRADES)
        .then(|| stats::assess(&filtered, &region_stats.summary));

    info!(
        region = region.code,
        months,
        apt = apt.unwrap_or(""),
        total = region_stats.summary.total,
        "trades served"
    );

    Ok(Json(TradesResponse {
        region: region.display_name(),
        region_code: region.code.to_string(),
        apt_filter: apt.map(str::to_string),
        months,
        stats: region_stats,
        trades: filtered.into_iter().take(limits::TRADES).collect(),
        areas,
        analysis,
    }))
}

async fn get_heatmap(
    State(state): State<ApiState>,
    Query(params): Query<HeatmapQuery>,
) -> Json<HeatmapResponse> {
    let sido_code = non_empty(params.sido.as_deref()).unwrap_or(SEOUL).to_string();
    let updated_at = chrono::Utc::now().to_rfc3339();

    let Some(sido) = regions::find_sido(&sido_code) else {
        return Json(HeatmapResponse {
            sido: sido_code,
            sido_name: None,
            regions: Vec::new(),
            updated_at,
        });
    };

    let today = today_kst();
    let feed = state.feed.as_ref();
    let tasks: Vec<_> = regions::all()
        .filter(|r| r.sido == sido.code)
        .map(|region| {
            move || async move {
                let trades =
                    aggregate_region(feed, region.code, SHORT_WINDOW_MONTHS, today, FAN_OUT_MONTH_LIMIT).await;
                HeatmapRegion {
                    code: region.code,
                    name: region.display_name(),
                    avg_price_per_pyeong: stats::mean_price_per_pyeong(&trades),
                    trade_count: trades.len(),
                }
            }
        })
        .collect();

    let results = run_bounded(tasks, state.cfg.feed_concurrency).await;
    let regions: Vec<_> = results.into_iter().filter(|r| r.trade_count > 0).collect();
    info!(sido = %sido_code, regions = regions.len(), "heatmap served");

    Json(HeatmapResponse {
        sido: sido_code,
        sido_name: Some(sido.name),
        regions,
        updated_at,
    })
}

async fn get_trend(
    State(state): State<ApiState>,
    Query(params): Query<TrendQuery>,
) -> Json<TrendResponse> {
    let months = parse_months(params.months.as_deref());

    let selected: Vec<regions::Region> = match non_empty(params.codes.as_deref()) {
        Some(codes) => codes
            .split(',')
            .filter_map(|c| regions::lookup(c.trim()))
            .collect(),
        None => POPULAR_REGIONS
            .iter()
            .take(limits::TREND_DEFAULT_REGIONS)
            .filter_map(|c| regions::lookup(c))
            .collect(),
    };

    let today = today_kst();
    let feed = state.feed.as_ref();
    let tasks: Vec<_> = selected
        .into_iter()
        .map(|region| {
            move || async move {
                let trades =
                    aggregate_region(feed, region.code, months as i64, today, FAN_OUT_MONTH_LIMIT).await;
                TrendRegion {
                    code: region.code,
                    name: region.display_name(),
                    summary: stats::summarize(&trades),
                    monthly: stats::monthly_buckets(&trades),
                }
            }
        })
        .collect();

    let regions = run_bounded(tasks, state.cfg.feed_concurrency).await;
    info!(months, regions = regions.len(), "trend served");

    Json(TrendResponse { regions, months })
}

async fn get_apt_search(
    State(state): State<ApiState>,
    Query(params): Query<AptSearchQuery>,
) -> Json<AptSearchResponse> {
    let Some(region) = non_empty(params.code.as_deref()).and_then(regions::lookup) else {
        return Json(AptSearchResponse { apartments: Vec::new() });
    };

    let trades = aggregate_region(
        &state.feed,
        region.code,
        SHORT_WINDOW_MONTHS,
        today_kst(),
        state.cfg.feed_concurrency,
    )
    .await;

    let query = non_empty(params.q.as_deref()).unwrap_or("");
    let apartments = stats::complex_counts(&trades)
        .into_iter()
        .filter(|c| !c.name.is_empty() && c.name.contains(query))
        .take(limits::SEARCH_RESULTS)
        .collect();

    Json(AptSearchResponse { apartments })
}

async fn get_search(Query(params): Query<SearchQuery>) -> Json<SearchResponse> {
    let results = regions::search(params.q.as_deref().unwrap_or(""), limits::SEARCH_RESULTS)
        .into_iter()
        .map(|r| RegionHit { code: r.code, name: r.display_name() })
        .collect();
    Json(SearchResponse { results })
}

async fn get_debug(State(state): State<ApiState>) -> Json<DebugResponse> {
    let key = state.feed.api_key().unwrap_or("");
    let probe_month = YearMonth::from_date(today_kst()).months_back(1);
    let probe = state.feed.probe(PROBE_REGION, probe_month).await;

    Json(DebugResponse {
        has_key: !key.is_empty(),
        key_len: key.chars().count(),
        key_preview: if key.is_empty() {
            "(empty)".to_string()
        } else {
            format!("{}...", preview(key, 6))
        },
        api_status: probe.status,
        api_body: probe.body,
    })
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let health = state.feed.health();
    Json(HealthResponse {
        status: "ok",
        has_key: state.feed.api_key().is_some(),
        feed_successes: health.success_count(),
        feed_failures: health.failure_count(),
        last_success_at: health.last_success_at(),
    })
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencySnapshot> {
    Json(state.feed.latency().snapshot())
}
