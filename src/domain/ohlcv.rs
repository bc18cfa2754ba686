//! Daily price bar representation.

/// One trading day. `date` is an opaque, chronologically ordered label; the
/// only thing ever read out of it is the leading four-digit year.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: i64,
}

impl PriceBar {
    /// Calendar year from the first four characters of the date label.
    pub fn year(&self) -> Option<i32> {
        year_of(&self.date)
    }
}

/// Closing prices, index-aligned with `bars`.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

pub fn year_of(label: &str) -> Option<i32> {
    let prefix = label.get(..4)?;
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}
