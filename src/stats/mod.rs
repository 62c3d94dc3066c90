//! Pure statistics over transaction lists. No I/O, no failure modes.

pub mod assessment;
pub mod summary;

pub use assessment::{assess, Assessment};
pub use summary::{
    area_buckets, complex_counts, filter_by_complex, mean_price_per_pyeong, monthly_buckets,
    region_stats, summarize,
};
