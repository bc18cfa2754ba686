//! Simple Moving Average.
//!
//! Running sum over a sliding window: add the newest price, drop the oldest.
//! Defined from index `period - 1`; earlier indices are 0.0. A series shorter
//! than `period` comes back as all zeros, never an error.

pub fn calculate_sma(prices: &[f64], period: usize) -> Vec<f64> {
    let mut sma = vec![0.0; prices.len()];
    if period == 0 || prices.len() < period {
        return sma;
    }

    let mut sum: f64 = prices[..period].iter().sum();
    sma[period - 1] = sum / period as f64;

    for i in period..prices.len() {
        sum = sum - prices[i - period] + prices[i];
        sma[i] = sum / period as f64;
    }

    sma
}
