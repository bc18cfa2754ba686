//! Bollinger Bands indicator.
//!
//! - Middle: SMA over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the population deviation. Default parameters: period=20,
//! multiplier=2.0. Warmup bands are 0.0.

use crate::domain::indicator::{calculate_sma, calculate_stddev};

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn calculate_bollinger(prices: &[f64], period: usize, multiplier: f64) -> BollingerBands {
    let middle = calculate_sma(prices, period);
    let stddev = calculate_stddev(prices, period);

    let upper = middle
        .iter()
        .zip(&stddev)
        .map(|(m, s)| m + multiplier * s)
        .collect();
    let lower = middle
        .iter()
        .zip(&stddev)
        .map(|(m, s)| m - multiplier * s)
        .collect();

    BollingerBands {
        upper,
        middle,
        lower,
    }
}
