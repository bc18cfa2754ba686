//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of the MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! The line is differenced element-wise including warm-up zeros, so between
//! `fast - 1` and `slow - 2` it equals the fast EMA alone. The signal EMA is
//! seeded from that raw line and inherits those values.

use crate::domain::indicator::calculate_ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn calculate_macd(
    prices: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdSeries {
    let ema_fast = calculate_ema(prices, fast);
    let ema_slow = calculate_ema(prices, slow);

    let macd: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();

    let signal = calculate_ema(&macd, signal_period);

    let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

    MacdSeries {
        macd,
        signal,
        histogram,
    }
}

pub fn calculate_macd_default(prices: &[f64]) -> MacdSeries {
    calculate_macd(prices, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising(count: usize) -> Vec<f64> {
        (0..count).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn macd_series_lengths_match_input() {
        let prices = rising(40);
        let result = calculate_macd_default(&prices);
        assert_eq!(result.macd.len(), 40);
        assert_eq!(result.signal.len(), 40);
        assert_eq!(result.histogram.len(), 40);
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal() {
        let prices = rising(40);
        let result = calculate_macd_default(&prices);

        for i in 0..prices.len() {
            let expected = result.macd[i] - result.signal[i];
            assert!((result.histogram[i] - expected).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn macd_line_is_ema_fast_minus_ema_slow() {
        let prices = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
        let result = calculate_macd(&prices, 3, 5, 2);

        let ema_fast = calculate_ema(&prices, 3);
        let ema_slow = calculate_ema(&prices, 5);

        for i in 0..prices.len() {
            let expected = ema_fast[i] - ema_slow[i];
            assert!(
                (result.macd[i] - expected).abs() < f64::EPSILON,
                "MACD line mismatch at index {}",
                i
            );
        }
    }

    #[test]
    fn macd_line_carries_fast_ema_before_slow_warmup() {
        let prices = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0];
        let result = calculate_macd(&prices, 2, 5, 2);
        let ema_fast = calculate_ema(&prices, 2);

        assert_eq!(result.macd[0], 0.0);
        for i in 1..4 {
            assert!((result.macd[i] - ema_fast[i]).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn macd_signal_is_ema_of_line() {
        let prices = rising(30);
        let result = calculate_macd(&prices, 3, 6, 4);
        assert_eq!(result.signal, calculate_ema(&result.macd, 4));
    }

    #[test]
    fn macd_insufficient_data_is_all_zero() {
        let prices = rising(5);
        let result = calculate_macd_default(&prices);
        assert!(result.macd.iter().all(|&v| v == 0.0));
        assert!(result.signal.iter().all(|&v| v == 0.0));
        assert!(result.histogram.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn macd_empty_prices() {
        let result = calculate_macd_default(&[]);
        assert!(result.macd.is_empty());
        assert!(result.histogram.is_empty());
    }

    #[test]
    fn macd_default_constants() {
        assert_eq!(DEFAULT_FAST, 12);
        assert_eq!(DEFAULT_SLOW, 26);
        assert_eq!(DEFAULT_SIGNAL, 9);
    }

    #[test]
    fn macd_positive_histogram_on_accelerating_trend() {
        let prices: Vec<f64> = (0..120).map(|i| 100.0 + (i * i) as f64 * 0.05).collect();
        let result = calculate_macd_default(&prices);
        assert!(result.histogram[119] > 0.0);
    }
}
