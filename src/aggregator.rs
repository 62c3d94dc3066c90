//! Trailing-window aggregation of one region's transactions.

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::config::{KST_OFFSET_HOURS, MAX_MONTHS, MIN_MONTHS};
use crate::feed::FeedClient;
use crate::scheduler::run_bounded;
use crate::types::{Transaction, YearMonth};

/// Today's date in Korea Standard Time.
pub fn today_kst() -> NaiveDate {
    (Utc::now() + chrono::Duration::hours(KST_OFFSET_HOURS)).date_naive()
}

/// Clamp a requested window to the supported 1..=12 months.
pub fn clamp_months(months: i64) -> u32 {
    months.clamp(MIN_MONTHS, MAX_MONTHS) as u32
}

/// The `count` calendar months ending at `today`'s month, newest first.
pub fn trailing_months(today: NaiveDate, count: u32) -> Vec<YearMonth> {
    let current = YearMonth::from_date(today);
    (0..count).map(|i| current.months_back(i)).collect()
}

/// Every transaction for `region` over the trailing `months` (clamped to
/// 1..=12), sorted newest first.
///
/// Months are fetched independently under the bounded scheduler with at
/// most `limit` requests in flight; a month that fails contributes nothing.
pub async fn aggregate_region(
    client: &FeedClient,
    region: &str,
    months: i64,
    today: NaiveDate,
    limit: usize,
) -> Vec<Transaction> {
    let window = trailing_months(today, clamp_months(months));

    let tasks: Vec<_> = window
        .iter()
        .map(|&ym| move || client.fetch_trades(region, ym))
        .collect();

    let mut all: Vec<Transaction> = run_bounded(tasks, limit)
        .await
        .into_iter()
        .flatten()
        .collect();

    sort_newest_first(&mut all);
    debug!(region, months = window.len(), count = all.len(), "region aggregated");
    all
}

/// Descending by the zero-padded date string.
pub fn sort_newest_first(trades: &mut [Transaction]) {
    trades.sort_by(|a, b| b.date.cmp(&a.date));
}
