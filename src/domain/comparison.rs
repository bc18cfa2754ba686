//! Preset crossover comparison.
//!
//! Runs a fixed set of fast/slow period pairs over the same bars, each as an
//! independent single-strategy simulation, and tabulates the metrics.

use tracing::warn;

use super::backtest::Backtester;
use super::metrics::Metrics;
use super::ohlcv::PriceBar;
use super::strategy::StrategyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub short_period: usize,
    pub long_period: usize,
}

pub const PRESETS: [Preset; 4] = [
    Preset {
        name: "Aggressive",
        short_period: 10,
        long_period: 30,
    },
    Preset {
        name: "Medium-Fast",
        short_period: 20,
        long_period: 50,
    },
    Preset {
        name: "Golden Cross",
        short_period: 50,
        long_period: 200,
    },
    Preset {
        name: "Conservative",
        short_period: 100,
        long_period: 300,
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub preset: Preset,
    pub metrics: Metrics,
    /// False when the bars were too few for this preset.
    pub completed: bool,
}

/// Run every preset with default options and `initial_capital`.
pub fn compare_presets(bars: &[PriceBar], initial_capital: f64) -> Vec<ComparisonRow> {
    PRESETS
        .iter()
        .map(|preset| {
            let config =
                StrategyConfig::new(preset.short_period, preset.long_period, initial_capital);
            let mut backtester = Backtester::new(bars.to_vec(), config);
            let completed = match backtester.run() {
                Ok(()) => true,
                Err(e) => {
                    warn!(preset = preset.name, error = %e, "preset skipped");
                    false
                }
            };
            ComparisonRow {
                preset: *preset,
                metrics: backtester.metrics(),
                completed,
            }
        })
        .collect()
}
