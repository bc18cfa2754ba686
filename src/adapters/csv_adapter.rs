//! CSV file data adapter.
//!
//! Expects a header line followed by `Date,Open,High,Low,Close,Adj Close,Volume`
//! rows. Parsing is permissive: fields are trimmed, missing or malformed
//! numbers (including bytes that are not UTF-8) read as 0, and rows are kept
//! in file order.

use crate::domain::error::BacktesterError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;
use csv::{ByteRecord, ReaderBuilder, Trim};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// `source` is joined onto the base path; absolute sources replace it.
    fn csv_path(&self, source: &str) -> PathBuf {
        self.base_path.join(source)
    }

    pub fn parse(content: &[u8]) -> Result<Vec<PriceBar>, BacktesterError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(content);

        let mut bars = Vec::new();
        for result in rdr.byte_records() {
            let record = result.map_err(|e| BacktesterError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;
            if record.iter().all(<[u8]>::is_empty) {
                continue;
            }
            bars.push(parse_record(&record));
        }
        Ok(bars)
    }
}

/// Field `index` as text; missing or non-UTF-8 fields read as `None`.
fn field(record: &ByteRecord, index: usize) -> Option<&str> {
    record.get(index).and_then(|raw| std::str::from_utf8(raw).ok())
}

fn parse_price(record: &ByteRecord, index: usize) -> f64 {
    field(record, index)
        .and_then(|text| text.parse().ok())
        .unwrap_or(0.0)
}

fn parse_volume(record: &ByteRecord, index: usize) -> i64 {
    let Some(text) = field(record, index) else {
        return 0;
    };
    text.parse::<i64>()
        .ok()
        .or_else(|| {
            text.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v as i64)
        })
        .unwrap_or(0)
}

fn parse_record(record: &ByteRecord) -> PriceBar {
    PriceBar {
        date: String::from_utf8_lossy(record.get(0).unwrap_or_default()).into_owned(),
        open: parse_price(record, 1),
        high: parse_price(record, 2),
        low: parse_price(record, 3),
        close: parse_price(record, 4),
        adj_close: parse_price(record, 5),
        volume: parse_volume(record, 6),
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, source: &str) -> Result<Vec<PriceBar>, BacktesterError> {
        let path = self.csv_path(source);
        let content = fs::read(&path).map_err(|e| BacktesterError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = "Date,Open,High,Low,Close,Adj Close,Volume\n";

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = format!(
            "{HEADER}\
            2024-01-15,100.0,110.0,90.0,105.0,104.5,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,109.5,60000\n\
            2024-01-17,110.0,120.0,105.0,115.0,114.5,55000\n"
        );
        fs::write(path.join("AAPL.csv"), csv_content).unwrap();
        fs::write(path.join("EMPTY.csv"), HEADER).unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_bars_returns_correct_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_bars("AAPL.csv").unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, "2024-01-15");
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].adj_close, 104.5);
        assert_eq!(bars[0].volume, 50000);
        assert_eq!(bars[2].date, "2024-01-17");
    }

    #[test]
    fn fetch_bars_accepts_absolute_source() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(PathBuf::from("/nonexistent"));
        let absolute = path.join("AAPL.csv");

        let bars = adapter.fetch_bars(absolute.to_str().unwrap()).unwrap();
        assert_eq!(bars.len(), 3);
    }

    #[test]
    fn fetch_bars_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let result = adapter.fetch_bars("XYZ.csv");
        assert!(matches!(result, Err(BacktesterError::DataSource { .. })));
    }

    #[test]
    fn header_only_file_is_empty() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(adapter.fetch_bars("EMPTY.csv").unwrap().is_empty());
        assert_eq!(adapter.data_range("EMPTY.csv").unwrap(), None);
    }

    #[test]
    fn data_range_reports_first_last_and_count() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert_eq!(
            adapter.data_range("AAPL.csv").unwrap(),
            Some(("2024-01-15".to_string(), "2024-01-17".to_string(), 3))
        );
    }

    #[test]
    fn malformed_numbers_read_as_zero() {
        let content = format!("{HEADER}2024-01-15,abc,,90.0,105.0,x,lots\n");
        let bars = CsvAdapter::parse(content.as_bytes()).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].open, 0.0);
        assert_eq!(bars[0].high, 0.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].adj_close, 0.0);
        assert_eq!(bars[0].volume, 0);
    }

    #[test]
    fn missing_trailing_columns_read_as_zero() {
        let content = format!("{HEADER}2024-01-15,100.0,110.0\n");
        let bars = CsvAdapter::parse(content.as_bytes()).unwrap();
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].close, 0.0);
        assert_eq!(bars[0].volume, 0);
    }

    #[test]
    fn fields_are_trimmed() {
        let content = format!("{HEADER} 2024-01-15 , 100.5 ,101,99,100, 100 , 1200 \n");
        let bars = CsvAdapter::parse(content.as_bytes()).unwrap();
        assert_eq!(bars[0].date, "2024-01-15");
        assert_eq!(bars[0].open, 100.5);
        assert_eq!(bars[0].volume, 1200);
    }

    #[test]
    fn float_volume_is_truncated() {
        let content = format!("{HEADER}2024-01-15,1,1,1,1,1,1234.0\n");
        let bars = CsvAdapter::parse(content.as_bytes()).unwrap();
        assert_eq!(bars[0].volume, 1234);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let content = format!("{HEADER}2024-01-15,1,1,1,1,1,1\n\n2024-01-16,2,2,2,2,2,2\n");
        let bars = CsvAdapter::parse(content.as_bytes()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].date, "2024-01-16");
    }

    #[test]
    fn file_order_is_preserved() {
        let content = format!("{HEADER}2024-01-17,1,1,1,1,1,1\n2024-01-15,2,2,2,2,2,2\n");
        let bars = CsvAdapter::parse(content.as_bytes()).unwrap();
        assert_eq!(bars[0].date, "2024-01-17");
        assert_eq!(bars[1].date, "2024-01-15");
    }

    #[test]
    fn non_utf8_field_reads_as_zero() {
        let mut content = HEADER.as_bytes().to_vec();
        content.extend_from_slice(b"2024-01-15,1,1,1,1,1,100\n");
        content.extend_from_slice(b"2024-01-16,2,2,2,2,2,\xFF\xFE\n");
        content.extend_from_slice(b"2024-01-17,3,3,3,\xFF,3,300\n");
        let bars = CsvAdapter::parse(&content).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[1].close, 2.0);
        assert_eq!(bars[1].volume, 0);
        assert_eq!(bars[2].close, 0.0);
        assert_eq!(bars[2].volume, 300);
    }

    #[test]
    fn fetch_bars_loads_file_with_non_utf8_bytes() {
        let dir = TempDir::new().unwrap();
        let mut content = HEADER.as_bytes().to_vec();
        content.extend_from_slice(b"2024-01-15,1,1,1,1,1,100\n");
        content.extend_from_slice(b"2024-01-16,2,2,2,2,2,\xFF\xFE\n");
        content.extend_from_slice(b"2024-\xFF-17,3,3,3,3,3,300\n");
        fs::write(dir.path().join("X.csv"), content).unwrap();

        let bars = CsvAdapter::new(dir.path().to_path_buf())
            .fetch_bars("X.csv")
            .unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[1].volume, 0);
        assert_eq!(bars[2].date, "2024-\u{FFFD}-17");
        assert_eq!(bars[2].close, 3.0);
    }
}
