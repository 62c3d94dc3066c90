//! "Is now a good time to buy?" position analysis.
//!
//! Three signals feed one verdict:
//! - where the recent price sits in the observed [min, max] range,
//! - price momentum between the newer and older half of the deals,
//! - volume momentum between the two latest months.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{PriceSummary, Transaction};

/// Deals averaged for the "recent price" reference.
pub const RECENT_REFERENCE_DEALS: usize = 3;

/// Display bounds so the marker never sits flush against either end.
pub const DISPLAY_MIN_PCT: i64 = 2;
pub const DISPLAY_MAX_PCT: i64 = 98;

/// Month-over-month volume change beyond ±20% counts as a move.
pub const VOLUME_UP_RATIO: f64 = 1.2;
pub const VOLUME_DOWN_RATIO: f64 = 0.8;

/// Price momentum thresholds (percent) used by the verdict table.
pub const FALLING_MOMENTUM_PCT: f64 = -3.0;
pub const RISING_MOMENTUM_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeTrend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Bottom of the range and still falling.
    BottomFalling,
    NearBottom,
    BelowAverage,
    /// Middle of the range with volume picking up.
    AverageActive,
    Average,
    AboveAverage,
    /// Top of the range and still rising.
    TopRising,
    NearTop,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::BottomFalling => "저점 매수 구간",
            Verdict::NearBottom => "저점 근처",
            Verdict::BelowAverage => "평균 이하",
            Verdict::AverageActive => "평균 수준 · 거래 활발",
            Verdict::Average => "평균 수준",
            Verdict::AboveAverage => "평균 이상",
            Verdict::TopRising => "고점 · 상승 중",
            Verdict::NearTop => "고점 근처",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Verdict::BottomFalling => {
                "가격이 낮고 하락 추세. 추가 하락 가능성도 있지만 저가 매수 기회"
            }
            Verdict::NearBottom => "최근 거래 범위에서 낮은 가격대. 상대적 매수 매력 있음",
            Verdict::BelowAverage => "평균보다 낮은 가격대. 괜찮은 진입 시점일 수 있음",
            Verdict::AverageActive => "평균 가격대이며 거래가 늘고 있어 시장 관심 높음",
            Verdict::Average => "최근 거래 범위의 중간. 급하지 않다면 관망도 방법",
            Verdict::AboveAverage => "평균보다 높은 가격대. 신중한 접근 필요",
            Verdict::TopRising => "고점이지만 아직 오르는 중. 추격 매수 위험 있음",
            Verdict::NearTop => "최근 거래 범위에서 높은 가격대. 매수 시 주의 필요",
        }
    }
}

/// Inputs to the verdict table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signals {
    /// Unclamped position in the range, 0..=100.
    pub position_pct: i64,
    pub price_momentum_pct: f64,
    pub volume: VolumeTrend,
}

struct Rule {
    applies: fn(&Signals) -> bool,
    verdict: Verdict,
}

/// Evaluated top to bottom; the first match wins. Position bands come first;
/// inside the low and high bands price momentum overrides the generic label,
/// inside the middle band volume momentum does.
const RULES: &[Rule] = &[
    Rule {
        applies: |s| s.position_pct <= 25 && s.price_momentum_pct < FALLING_MOMENTUM_PCT,
        verdict: Verdict::BottomFalling,
    },
    Rule { applies: |s| s.position_pct <= 25, verdict: Verdict::NearBottom },
    Rule { applies: |s| s.position_pct <= 45, verdict: Verdict::BelowAverage },
    Rule {
        applies: |s| s.position_pct <= 55 && s.volume == VolumeTrend::Up,
        verdict: Verdict::AverageActive,
    },
    Rule { applies: |s| s.position_pct <= 55, verdict: Verdict::Average },
    Rule { applies: |s| s.position_pct <= 75, verdict: Verdict::AboveAverage },
    Rule {
        applies: |s| s.price_momentum_pct > RISING_MOMENTUM_PCT,
        verdict: Verdict::TopRising,
    },
    Rule { applies: |_| true, verdict: Verdict::NearTop },
];

pub fn verdict(signals: &Signals) -> Verdict {
    RULES
        .iter()
        .find(|rule| (rule.applies)(signals))
        .map(|rule| rule.verdict)
        .unwrap_or(Verdict::NearTop)
}

/// Full position analysis for the dashboard gauge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    /// Mean of the most recent deals.
    pub recent_price: i64,
    pub position_pct: i64,
    /// `position_pct` clamped to [2, 98].
    pub display_pct: i64,
    /// Where the overall mean sits, clamped to [2, 98].
    pub average_pct: f64,
    pub price_momentum_pct: f64,
    pub volume_trend: VolumeTrend,
    pub verdict: Verdict,
    pub label: &'static str,
    pub description: &'static str,
}

/// Analyse `trades` (any order) against their own price `summary`.
pub fn assess(trades: &[Transaction], summary: &PriceSummary) -> Assessment {
    let mut newest_first: Vec<&Transaction> = trades.iter().collect();
    newest_first.sort_by(|a, b| b.date.cmp(&a.date));

    let recent_price = recent_reference(&newest_first);
    let position_pct = position_pct(recent_price, summary.min, summary.max);
    let signals = Signals {
        position_pct,
        price_momentum_pct: price_momentum(&newest_first),
        volume: volume_trend(trades),
    };
    let verdict = verdict(&signals);

    Assessment {
        recent_price,
        position_pct,
        display_pct: position_pct.clamp(DISPLAY_MIN_PCT, DISPLAY_MAX_PCT),
        average_pct: average_pct(summary),
        price_momentum_pct: signals.price_momentum_pct,
        volume_trend: signals.volume,
        verdict,
        label: verdict.label(),
        description: verdict.description(),
    }
}

/// Rounded mean of the newest [`RECENT_REFERENCE_DEALS`] prices.
fn recent_reference(newest_first: &[&Transaction]) -> i64 {
    let recent = &newest_first[..newest_first.len().min(RECENT_REFERENCE_DEALS)];
    if recent.is_empty() {
        return 0;
    }
    let sum: i64 = recent.iter().map(|t| t.price).sum();
    (sum as f64 / recent.len() as f64).round() as i64
}

/// Rounded position of `reference` in [min, max] as a percentage; 50 when
/// the range is empty.
pub fn position_pct(reference: i64, min: i64, max: i64) -> i64 {
    let range = max - min;
    if range <= 0 {
        return 50;
    }
    ((reference - min) as f64 / range as f64 * 100.0).round() as i64
}

fn average_pct(summary: &PriceSummary) -> f64 {
    let range = summary.max - summary.min;
    if range <= 0 {
        return 50.0;
    }
    let pct = (summary.mean - summary.min) as f64 / range as f64 * 100.0;
    pct.clamp(DISPLAY_MIN_PCT as f64, DISPLAY_MAX_PCT as f64)
}

/// Percent change of the newer half's mean over the older half's. The older
/// half takes the extra deal on odd counts. Zero when either half is empty.
pub fn price_momentum(newest_first: &[&Transaction]) -> f64 {
    let half = newest_first.len() / 2;
    let (recent, older) = newest_first.split_at(half);
    if recent.is_empty() || older.is_empty() {
        return 0.0;
    }
    let mean = |ts: &[&Transaction]| ts.iter().map(|t| t.price as f64).sum::<f64>() / ts.len() as f64;
    let older_mean = mean(older);
    if older_mean <= 0.0 {
        return 0.0;
    }
    (mean(recent) - older_mean) / older_mean * 100.0
}

/// Compare deal counts of the two latest months present in `trades`.
pub fn volume_trend(trades: &[Transaction]) -> VolumeTrend {
    let mut per_month: BTreeMap<&str, usize> = BTreeMap::new();
    for t in trades {
        *per_month.entry(t.month_key()).or_default() += 1;
    }

    let mut latest = per_month.values().rev();
    let (Some(&last), Some(&prev)) = (latest.next(), latest.next()) else {
        return VolumeTrend::Stable;
    };

    let (last, prev) = (last as f64, prev as f64);
    if last > prev * VOLUME_UP_RATIO {
        VolumeTrend::Up
    } else if last < prev * VOLUME_DOWN_RATIO {
        VolumeTrend::Down
    } else {
        VolumeTrend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::summary::summarize;
    use crate::stats::summary::tests::trade;

    fn signals(position_pct: i64, price_momentum_pct: f64, volume: VolumeTrend) -> Signals {
        Signals { position_pct, price_momentum_pct, volume }
    }

    #[test]
    fn three_rising_deals_sit_mid_range() {
        let trades = vec![
            trade("2024-01-05", 50_000),
            trade("2024-02-10", 55_000),
            trade("2024-03-01", 60_000),
        ];
        let summary = summarize(&trades);
        let a = assess(&trades, &summary);

        assert_eq!(a.recent_price, 55_000);
        assert_eq!(a.position_pct, 50);
        assert_eq!(a.display_pct, 50);
        // newest half [60000] vs older half [55000, 50000]
        assert!(a.price_momentum_pct > 0.0);
        assert!((a.price_momentum_pct - (60_000.0 - 52_500.0) / 52_500.0 * 100.0).abs() < 1e-9);
        assert_eq!(a.volume_trend, VolumeTrend::Stable);
        assert_eq!(a.verdict, Verdict::Average);
        assert_ne!(a.verdict, Verdict::BottomFalling);
    }

    #[test]
    fn position_is_monotonic_in_reference() {
        let (min, max) = (40_000, 90_000);
        let mut last = i64::MIN;
        for reference in (min..=max).step_by(250) {
            let pct = position_pct(reference, min, max);
            assert!(pct >= last);
            assert!(pct.clamp(DISPLAY_MIN_PCT, DISPLAY_MAX_PCT) >= last.clamp(DISPLAY_MIN_PCT, DISPLAY_MAX_PCT));
            last = pct;
        }
        assert_eq!(position_pct(min, min, max), 0);
        assert_eq!(position_pct(max, min, max), 100);
    }

    #[test]
    fn zero_range_is_midpoint() {
        assert_eq!(position_pct(70_000, 70_000, 70_000), 50);
        let trades = vec![trade("2024-01-01", 70_000), trade("2024-01-02", 70_000)];
        let a = assess(&trades, &summarize(&trades));
        assert_eq!(a.position_pct, 50);
        assert_eq!(a.average_pct, 50.0);
    }

    #[test]
    fn display_is_clamped() {
        let trades = vec![
            trade("2024-01-01", 90_000),
            trade("2024-01-02", 10_000),
            trade("2024-01-03", 10_000),
            trade("2024-01-04", 10_000),
        ];
        let a = assess(&trades, &summarize(&trades));
        assert_eq!(a.position_pct, 0);
        assert_eq!(a.display_pct, DISPLAY_MIN_PCT);
    }

    #[test]
    fn single_deal_has_no_momentum() {
        let t = trade("2024-01-01", 50_000);
        assert_eq!(price_momentum(&[&t]), 0.0);
        assert_eq!(price_momentum(&[]), 0.0);
    }

    #[test]
    fn volume_trend_uses_twenty_percent_band() {
        let month = |m: &str, n: usize| -> Vec<Transaction> {
            (0..n).map(|d| trade(&format!("2024-{m}-{:02}", d + 1), 1)).collect()
        };
        let up = [month("01", 5), month("02", 7)].concat();
        let down = [month("01", 5), month("02", 3)].concat();
        let edge = [month("01", 5), month("02", 6)].concat();
        assert_eq!(volume_trend(&up), VolumeTrend::Up);
        assert_eq!(volume_trend(&down), VolumeTrend::Down);
        assert_eq!(volume_trend(&edge), VolumeTrend::Stable);
        assert_eq!(volume_trend(&month("01", 4)), VolumeTrend::Stable);
    }

    #[test]
    fn verdict_table_precedence() {
        use VolumeTrend::*;
        let cases = [
            (signals(10, -5.0, Up), Verdict::BottomFalling),
            (signals(25, -3.0, Up), Verdict::NearBottom),
            (signals(25, 20.0, Down), Verdict::NearBottom),
            (signals(30, -10.0, Stable), Verdict::BelowAverage),
            (signals(45, 0.0, Up), Verdict::BelowAverage),
            (signals(50, -10.0, Up), Verdict::AverageActive),
            (signals(55, 10.0, Stable), Verdict::Average),
            (signals(56, 10.0, Up), Verdict::AboveAverage),
            (signals(75, -10.0, Down), Verdict::AboveAverage),
            (signals(76, 5.1, Down), Verdict::TopRising),
            (signals(100, 5.0, Up), Verdict::NearTop),
        ];
        for (s, expected) in cases {
            assert_eq!(verdict(&s), expected, "{s:?}");
        }
    }

    #[test]
    fn empty_input_is_neutral() {
        let a = assess(&[], &summarize(&[]));
        assert_eq!(a.recent_price, 0);
        assert_eq!(a.position_pct, 50);
        assert_eq!(a.price_momentum_pct, 0.0);
        assert_eq!(a.volume_trend, VolumeTrend::Stable);
    }
}
