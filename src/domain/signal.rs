//! Crossover signal evaluation.
//!
//! All series are computed once up front over the full close series and
//! indexed by bar. Entry is a golden cross of the fast leg over the slow leg,
//! exit is a death cross. Enabled filters can veto an entry but never an exit.

use super::indicator::{
    bollinger, calculate_bollinger, calculate_ema, calculate_macd_default, calculate_rsi,
    calculate_sma, rsi, BollingerBands, MacdSeries,
};
use super::strategy::StrategyConfig;

/// RSI at or above this vetoes an entry.
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Precomputed series for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub fast: Vec<f64>,
    pub slow: Vec<f64>,
    pub rsi: Option<Vec<f64>>,
    pub macd: Option<MacdSeries>,
    pub bollinger: Option<BollingerBands>,
}

impl IndicatorSet {
    pub fn compute(closes: &[f64], config: &StrategyConfig) -> Self {
        let moving_average = if config.use_ema {
            calculate_ema
        } else {
            calculate_sma
        };

        IndicatorSet {
            fast: moving_average(closes, config.short_period),
            slow: moving_average(closes, config.long_period),
            rsi: config
                .use_rsi
                .then(|| calculate_rsi(closes, rsi::DEFAULT_PERIOD)),
            macd: config.use_macd.then(|| calculate_macd_default(closes)),
            bollinger: config.use_bollinger.then(|| {
                calculate_bollinger(
                    closes,
                    bollinger::DEFAULT_PERIOD,
                    bollinger::DEFAULT_MULTIPLIER,
                )
            }),
        }
    }

    fn fast_above(&self, i: usize) -> bool {
        self.fast[i] > self.slow[i]
    }

    /// Fast strictly above slow at `i` and not strictly above at `i - 1`.
    pub fn golden_cross(&self, i: usize) -> bool {
        i > 0 && i < self.fast.len() && self.fast_above(i) && !self.fast_above(i - 1)
    }

    /// Fast no longer above slow at `i` after being strictly above at `i - 1`.
    pub fn death_cross(&self, i: usize) -> bool {
        i > 0 && i < self.fast.len() && !self.fast_above(i) && self.fast_above(i - 1)
    }

    /// Whether the enabled filters allow an entry at `i`.
    pub fn entry_allowed(&self, closes: &[f64], i: usize) -> bool {
        if let Some(rsi) = &self.rsi {
            if rsi[i] >= RSI_OVERBOUGHT {
                return false;
            }
        }
        if let Some(macd) = &self.macd {
            if macd.histogram[i] <= 0.0 {
                return false;
            }
        }
        if let Some(bands) = &self.bollinger {
            if closes[i] > bands.upper[i] {
                return false;
            }
        }
        true
    }

    /// Filtered entry and raw exit crossovers at `i`.
    pub fn crossover_signals(&self, closes: &[f64], i: usize) -> (bool, bool) {
        let entry = self.golden_cross(i) && self.entry_allowed(closes, i);
        (entry, self.death_cross(i))
    }
}
