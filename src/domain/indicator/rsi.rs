//! RSI (Relative Strength Index) with Wilder's smoothing.
//!
//! - First average: simple mean of gains/losses over the first n price changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! RS = avg_gain / avg_loss, taken as 100 when avg_loss == 0.
//! RSI = 100 - 100 / (1 + RS)
//!
//! Warmup: indices 0..n hold the neutral 50.0; first value lands on index n.

pub const DEFAULT_PERIOD: usize = 14;
pub const NEUTRAL: f64 = 50.0;

pub fn calculate_rsi(prices: &[f64], period: usize) -> Vec<f64> {
    let mut rsi = vec![NEUTRAL; prices.len()];
    if period == 0 || prices.len() < period + 1 {
        return rsi;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    rsi[period] = rsi_value(avg_gain, avg_loss);

    let n = period as f64;
    for i in (period + 1)..prices.len() {
        let change = prices[i] - prices[i - 1];
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        avg_gain = (avg_gain * (n - 1.0) + gain) / n;
        avg_loss = (avg_loss * (n - 1.0) + loss) / n;
        rsi[i] = rsi_value(avg_gain, avg_loss);
    }

    rsi
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    let rs = if avg_loss == 0.0 {
        100.0
    } else {
        avg_gain / avg_loss
    };
    100.0 - (100.0 / (1.0 + rs))
}
