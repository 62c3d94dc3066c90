use std::collections::{BTreeMap, HashMap};

use crate::config::M2_PER_PYEONG;
use crate::types::{AreaBucket, ComplexCount, MonthlyBucket, PriceSummary, RegionStats, Transaction};

/// Mean/min/max/count of `price`. All zero for an empty list.
pub fn summarize(trades: &[Transaction]) -> PriceSummary {
    let Some(first) = trades.first() else {
        return PriceSummary::default();
    };

    let (mut sum, mut min, mut max) = (0i64, first.price, first.price);
    for t in trades {
        sum += t.price;
        min = min.min(t.price);
        max = max.max(t.price);
    }

    PriceSummary {
        total: trades.len(),
        mean: rounded_mean(sum, trades.len()),
        min,
        max,
    }
}

/// Per-month mean price and count, ascending by `YYYY-MM`.
pub fn monthly_buckets(trades: &[Transaction]) -> Vec<MonthlyBucket> {
    let mut months: BTreeMap<&str, (i64, usize)> = BTreeMap::new();
    for t in trades {
        let entry = months.entry(t.month_key()).or_default();
        entry.0 += t.price;
        entry.1 += 1;
    }

    months
        .into_iter()
        .map(|(month, (sum, count))| MonthlyBucket {
            month: month.to_string(),
            mean_price: rounded_mean(sum, count),
            count,
        })
        .collect()
}

/// Per-size mean price and count, ascending by whole pyeong.
pub fn area_buckets(trades: &[Transaction]) -> Vec<AreaBucket> {
    let mut sizes: BTreeMap<i64, (i64, usize)> = BTreeMap::new();
    for t in trades {
        let entry = sizes.entry(pyeong_bucket(t.area_m2)).or_default();
        entry.0 += t.price;
        entry.1 += 1;
    }

    sizes
        .into_iter()
        .map(|(pyeong, (sum, count))| AreaBucket {
            pyeong,
            mean_price: rounded_mean(sum, count),
            count,
        })
        .collect()
}

/// Area in pyeong to one decimal, as shown on listings.
pub fn m2_to_pyeong(area_m2: f64) -> f64 {
    (area_m2 / M2_PER_PYEONG * 10.0).round() / 10.0
}

/// Nearest whole pyeong of the one-decimal display value.
pub fn pyeong_bucket(area_m2: f64) -> i64 {
    let p = m2_to_pyeong(area_m2);
    if p.is_finite() { p.round() as i64 } else { 0 }
}

/// Transactions per complex, most traded first. Ties keep first-seen order.
/// Deals without a complex name are grouped under `""`; name searches drop
/// that group.
pub fn complex_counts(trades: &[Transaction]) -> Vec<ComplexCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<ComplexCount> = Vec::new();

    for t in trades {
        match index.get(t.complex_name.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(&t.complex_name, counts.len());
                counts.push(ComplexCount { name: t.complex_name.clone(), count: 1 });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Mean price-per-pyeong over transactions that have one.
pub fn mean_price_per_pyeong(trades: &[Transaction]) -> i64 {
    let (sum, count) = trades
        .iter()
        .filter(|t| t.price_per_pyeong > 0)
        .fold((0i64, 0usize), |(s, c), t| (s + t.price_per_pyeong, c + 1));
    rounded_mean(sum, count)
}

/// Keep transactions whose complex name contains `needle`.
pub fn filter_by_complex(trades: Vec<Transaction>, needle: &str) -> Vec<Transaction> {
    if needle.is_empty() {
        return trades;
    }
    trades
        .into_iter()
        .filter(|t| t.complex_name.contains(needle))
        .collect()
}

pub fn region_stats(trades: &[Transaction]) -> RegionStats {
    RegionStats {
        summary: summarize(trades),
        monthly: monthly_buckets(trades),
        complexes: complex_counts(trades),
    }
}

fn rounded_mean(sum: i64, count: usize) -> i64 {
    if count == 0 {
        0
    } else {
        (sum as f64 / count as f64).round() as i64
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn trade(date: &str, price: i64) -> Transaction {
        Transaction {
            date: date.to_string(),
            price,
            area_m2: 84.9,
            floor: 7,
            deal_type: "중개거래".to_string(),
            complex_name: "래미안".to_string(),
            neighborhood: "잠실동".to_string(),
            build_year: 2008,
            price_per_pyeong: 0,
        }
    }

    fn named(date: &str, price: i64, name: &str, area: f64) -> Transaction {
        Transaction {
            complex_name: name.to_string(),
            area_m2: area,
            ..trade(date, price)
        }
    }

    #[test]
    fn empty_list_is_all_zero() {
        let s = summarize(&[]);
        assert_eq!(s, PriceSummary { total: 0, mean: 0, min: 0, max: 0 });
        assert!(monthly_buckets(&[]).is_empty());
        assert!(area_buckets(&[]).is_empty());
        assert_eq!(mean_price_per_pyeong(&[]), 0);
    }

    #[test]
    fn mean_lies_within_range() {
        let lists = [
            vec![trade("2024-01-01", 1)],
            vec![trade("2024-01-01", 1), trade("2024-01-02", 2)],
            vec![trade("2024-01-01", 99_999), trade("2024-02-01", 1), trade("2024-03-01", 50_000)],
        ];
        for list in &lists {
            let s = summarize(list);
            assert!(s.min <= s.mean && s.mean <= s.max, "{s:?}");
            assert_eq!(s.total, list.len());
        }
        let s = summarize(&lists[1]);
        assert_eq!((s.mean, s.min, s.max), (2, 1, 2));
    }

    #[test]
    fn monthly_buckets_ascend_without_duplicates() {
        let trades = vec![
            trade("2024-03-10", 60_000),
            trade("2024-01-05", 50_000),
            trade("2024-03-01", 62_000),
            trade("2023-12-20", 40_000),
            trade("2024-01-25", 52_000),
        ];
        let buckets = monthly_buckets(&trades);
        let keys: Vec<_> = buckets.iter().map(|b| b.month.as_str()).collect();
        assert_eq!(keys, vec!["2023-12", "2024-01", "2024-03"]);
        assert_eq!(buckets[1].mean_price, 51_000);
        assert_eq!(buckets[2].count, 2);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn area_buckets_group_by_whole_pyeong() {
        let trades = vec![
            named("2024-01-01", 100_000, "A", 84.97), // 25.7 → 26
            named("2024-01-02", 110_000, "A", 84.5),  // 25.6 → 26
            named("2024-01-03", 70_000, "A", 59.9),   // 18.1 → 18
        ];
        let buckets = area_buckets(&trades);
        assert_eq!(
            buckets,
            vec![
                AreaBucket { pyeong: 18, mean_price: 70_000, count: 1 },
                AreaBucket { pyeong: 26, mean_price: 105_000, count: 2 },
            ]
        );
    }

    #[test]
    fn complexes_sorted_by_count() {
        let trades = vec![
            named("2024-01-01", 1, "B", 50.0),
            named("2024-01-01", 1, "A", 50.0),
            named("2024-01-01", 1, "A", 50.0),
            named("2024-01-01", 1, "", 50.0),
            named("2024-01-01", 1, "C", 50.0),
        ];
        let counts = complex_counts(&trades);
        let pairs: Vec<_> = counts.iter().map(|c| (c.name.as_str(), c.count)).collect();
        assert_eq!(pairs, vec![("A", 2), ("B", 1), ("", 1), ("C", 1)]);
    }

    #[test]
    fn unit_price_mean_skips_zero() {
        let mut a = trade("2024-01-01", 1);
        a.price_per_pyeong = 3000;
        let mut b = trade("2024-01-02", 1);
        b.price_per_pyeong = 4001;
        let c = trade("2024-01-03", 1);
        assert_eq!(mean_price_per_pyeong(&[a, b, c]), 3501);
    }

    #[test]
    fn filter_matches_substring() {
        let trades = vec![
            named("2024-01-01", 1, "잠실엘스", 50.0),
            named("2024-01-01", 1, "리센츠", 50.0),
        ];
        assert_eq!(filter_by_complex(trades.clone(), "엘스").len(), 1);
        assert_eq!(filter_by_complex(trades, "").len(), 2);
    }
}
