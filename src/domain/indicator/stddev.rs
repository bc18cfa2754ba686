//! Standard Deviation indicator.
//!
//! Population standard deviation over n prices around the SMA.
//! STDDEV(n)[i] = sqrt(sum((P[i-j] - SMA(n)[i])^2 for j in 0..n) / n)
//! Warmup: first (n-1) values are 0.0.

use crate::domain::indicator::calculate_sma;

pub fn calculate_stddev(prices: &[f64], period: usize) -> Vec<f64> {
    let mut stddev = vec![0.0; prices.len()];
    if period == 0 || prices.len() < period {
        return stddev;
    }

    let sma = calculate_sma(prices, period);

    for i in (period - 1)..prices.len() {
        let window = &prices[i + 1 - period..=i];
        let variance: f64 = window
            .iter()
            .map(|p| {
                let diff = p - sma[i];
                diff * diff
            })
            .sum::<f64>()
            / period as f64;
        stddev[i] = variance.sqrt();
    }

    stddev
}
