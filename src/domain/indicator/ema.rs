//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with the SMA of the first n prices at index n-1, then
//! EMA[i] = (P[i] - EMA[i-1]) * k + EMA[i-1].
//! Warmup: first (n-1) values are 0.0; fewer than n prices gives all zeros.

pub fn calculate_ema(prices: &[f64], period: usize) -> Vec<f64> {
    let mut ema = vec![0.0; prices.len()];
    if period == 0 || prices.len() < period {
        return ema;
    }

    let seed: f64 = prices[..period].iter().sum::<f64>() / period as f64;
    ema[period - 1] = seed;

    let k = 2.0 / (period as f64 + 1.0);
    for i in period..prices.len() {
        ema[i] = (prices[i] - ema[i - 1]) * k + ema[i - 1];
    }

    ema
}
