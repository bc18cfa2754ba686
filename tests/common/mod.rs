#![allow(dead_code)]

use backtester::domain::error::BacktesterError;
pub use backtester::domain::ohlcv::PriceBar;
use backtester::ports::data_port::DataPort;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, source: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(source.to_string(), bars);
        self
    }

    pub fn with_error(mut self, source: &str, reason: &str) -> Self {
        self.errors.insert(source.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, source: &str) -> Result<Vec<PriceBar>, BacktesterError> {
        if let Some(reason) = self.errors.get(source) {
            return Err(BacktesterError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(source).cloned().unwrap_or_default())
    }
}

/// `YYYY-MM-DD` label `offset` calendar days after 2020-01-01.
pub fn date_label(offset: usize) -> String {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    (start + Duration::days(offset as i64))
        .format("%Y-%m-%d")
        .to_string()
}

pub fn make_bar(date: &str, open: f64, close: f64) -> PriceBar {
    PriceBar {
        date: date.to_string(),
        open,
        high: open.max(close),
        low: open.min(close),
        close,
        adj_close: close,
        volume: 1_000_000,
    }
}

/// Bars whose open equals the close, one calendar day apart.
pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(&date_label(i), c, c))
        .collect()
}

/// Bars with independent opens and closes.
pub fn bars_from_opens_closes(opens: &[f64], closes: &[f64]) -> Vec<PriceBar> {
    assert_eq!(opens.len(), closes.len());
    opens
        .iter()
        .zip(closes)
        .enumerate()
        .map(|(i, (&o, &c))| make_bar(&date_label(i), o, c))
        .collect()
}

pub fn flat_bars(count: usize, price: f64) -> Vec<PriceBar> {
    bars_from_closes(&vec![price; count])
}

/// `start`, `start + step`, `start + 2 * step`, ...
pub fn rising_bars(count: usize, start: f64, step: f64) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
    bars_from_closes(&closes)
}

/// `flat_len` bars at `price`, then one unit higher per bar up to `count`.
pub fn flat_then_rising(flat_len: usize, count: usize, price: f64) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            if i < flat_len {
                price
            } else {
                price + (i + 1 - flat_len) as f64
            }
        })
        .collect();
    bars_from_closes(&closes)
}

/// Daily rows in the on-disk CSV layout, header included.
pub fn csv_content(bars: &[PriceBar]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.adj_close, b.volume
        ));
    }
    out
}
