//! Raw feed record → [`Transaction`].
//!
//! All type coercion for feed fields happens here. Feed field names do not
//! appear anywhere past this module.

use crate::config::M2_PER_PYEONG;
use crate::feed::parser::RawRecord;
use crate::types::Transaction;

mod field {
    pub const CANCEL_TYPE: &str = "cdealType";
    pub const AMOUNT: &str = "dealAmount";
    pub const YEAR: &str = "dealYear";
    pub const MONTH: &str = "dealMonth";
    pub const DAY: &str = "dealDay";
    pub const AREA: &str = "excluUseAr";
    pub const FLOOR: &str = "floor";
    pub const DEALING_TYPE: &str = "dealingGbn";
    pub const COMPLEX: &str = "aptNm";
    pub const NEIGHBORHOOD: &str = "umdNm";
    pub const BUILD_YEAR: &str = "buildYear";
}

/// Map one record to a transaction. Returns None only for cancelled deals;
/// unparseable numbers become zero.
pub fn normalize(record: &RawRecord) -> Option<Transaction> {
    let text = |key: &str| record.get(key).map(|v| v.trim()).unwrap_or("");

    if !text(field::CANCEL_TYPE).is_empty() {
        return None;
    }

    let price = lenient_int(&text(field::AMOUNT).replace(',', "")).max(0);
    let area_m2 = lenient_float(text(field::AREA));

    let date = format!(
        "{}-{:02}-{:02}",
        lenient_int(text(field::YEAR)),
        lenient_int(text(field::MONTH)),
        lenient_int(text(field::DAY)),
    );

    Some(Transaction {
        date,
        price,
        area_m2,
        floor: lenient_i32(text(field::FLOOR)),
        deal_type: text(field::DEALING_TYPE).to_string(),
        complex_name: text(field::COMPLEX).to_string(),
        neighborhood: text(field::NEIGHBORHOOD).to_string(),
        build_year: lenient_i32(text(field::BUILD_YEAR)),
        price_per_pyeong: price_per_pyeong(price, area_m2),
    })
}

/// Normalize a batch, dropping cancelled deals.
pub fn normalize_all(records: &[RawRecord]) -> Vec<Transaction> {
    records.iter().filter_map(normalize).collect()
}

/// round(price / pyeong); zero when the area is zero or not finite.
pub fn price_per_pyeong(price: i64, area_m2: f64) -> i64 {
    let pyeong = area_m2 / M2_PER_PYEONG;
    if pyeong > 0.0 && pyeong.is_finite() {
        (price as f64 / pyeong).round() as i64
    } else {
        0
    }
}

/// Parse the leading integer of `s` (`"12층"` → 12). Zero when there is none.
pub fn lenient_int(s: &str) -> i64 {
    let s = s.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

/// [`lenient_int`] narrowed to `i32`; out-of-range values become zero.
pub fn lenient_i32(s: &str) -> i32 {
    i32::try_from(lenient_int(s)).unwrap_or(0)
}

/// Parse the leading decimal number of `s`. Zero when there is none.
pub fn lenient_float(s: &str) -> f64 {
    let s = s.trim();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '0'..='9' => end = i + 1,
            '.' if !seen_dot => seen_dot = true,
            '-' | '+' if i == 0 => {}
            _ => break,
        }
    }
    s[..end].parse::<f64>().ok().filter(|f| f.is_finite()).unwrap_or(0.0)
}
