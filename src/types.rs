use serde::Serialize;

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// One reported apartment sale. Built only by the normalizer, never for a
/// cancelled deal.
///
/// Serialized field names follow the dashboard contract (`apartment`, `dong`,
/// `price_per_pyeong`, ...) rather than the Rust field names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// `YYYY-MM-DD`, zero-padded, so lexicographic order is date order.
    pub date: String,
    /// Price in 만원 (ten-thousand won).
    pub price: i64,
    pub area_m2: f64,
    pub floor: i32,
    #[serde(rename = "type")]
    pub deal_type: String,
    #[serde(rename = "apartment")]
    pub complex_name: String,
    #[serde(rename = "dong")]
    pub neighborhood: String,
    pub build_year: i32,
    pub price_per_pyeong: i64,
}

impl Transaction {
    /// `YYYY-MM` prefix of the deal date.
    pub fn month_key(&self) -> &str {
        self.date.get(..7).unwrap_or(&self.date)
    }
}

// ---------------------------------------------------------------------------
// Calendar months
// ---------------------------------------------------------------------------

/// A calendar month as the feed addresses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month: month.clamp(1, 12) }
    }

    pub fn from_date(date: chrono::NaiveDate) -> Self {
        use chrono::Datelike;
        Self::new(date.year(), date.month())
    }

    /// The month `n` months before this one. Day-of-month never matters.
    pub fn months_back(self, n: u32) -> Self {
        let index = self.year as i64 * 12 + (self.month as i64 - 1) - n as i64;
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// `YYYYMM`, the feed's `DEAL_YMD` parameter.
    pub fn deal_ymd(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }
}

// ---------------------------------------------------------------------------
// Derived statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBucket {
    pub month: String,
    #[serde(rename = "avg")]
    pub mean_price: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaBucket {
    pub pyeong: i64,
    #[serde(rename = "avgPrice")]
    pub mean_price: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplexCount {
    pub name: String,
    pub count: usize,
}

/// Central tendency of a transaction list. All zero for an empty list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSummary {
    pub total: usize,
    #[serde(rename = "avgPrice")]
    pub mean: i64,
    #[serde(rename = "minPrice")]
    pub min: i64,
    #[serde(rename = "maxPrice")]
    pub max: i64,
}

/// Everything the dashboard shows for one region. Recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStats {
    #[serde(flatten)]
    pub summary: PriceSummary,
    pub monthly: Vec<MonthlyBucket>,
    pub complexes: Vec<ComplexCount>,
}
