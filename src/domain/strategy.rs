//! Strategy configuration.

use crate::domain::indicator::{bollinger, macd, rsi, IndicatorType};

pub const DEFAULT_SHORT_PERIOD: usize = 50;
pub const DEFAULT_LONG_PERIOD: usize = 200;
pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;
pub const DEFAULT_COMMISSION_RATE: f64 = 0.001;

/// Flat option set accepted by the engine. Only the bar count against
/// `long_period` is checked at run time; range checks belong to
/// `config_validation`.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub short_period: usize,
    pub long_period: usize,
    pub initial_capital: f64,
    pub use_rsi: bool,
    pub use_ema: bool,
    pub use_macd: bool,
    pub use_bollinger: bool,
    pub use_kelly: bool,
    /// Fraction, e.g. 0.05 for 5%. `<= 0` disables.
    pub stop_loss_pct: f64,
    /// Fraction, e.g. 0.15 for 15%. `<= 0` disables.
    pub take_profit_pct: f64,
    /// Applied to gross value on entry and exit. 0 disables.
    pub commission_rate: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            short_period: DEFAULT_SHORT_PERIOD,
            long_period: DEFAULT_LONG_PERIOD,
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            use_rsi: false,
            use_ema: false,
            use_macd: false,
            use_bollinger: false,
            use_kelly: false,
            stop_loss_pct: 0.0,
            take_profit_pct: 0.0,
            commission_rate: DEFAULT_COMMISSION_RATE,
        }
    }
}

impl StrategyConfig {
    pub fn new(short_period: usize, long_period: usize, initial_capital: f64) -> Self {
        StrategyConfig {
            short_period,
            long_period,
            initial_capital,
            ..Default::default()
        }
    }

    /// Fewest bars a run accepts.
    pub fn min_bars(&self) -> usize {
        self.long_period + 1
    }

    /// The fast and slow crossover legs.
    pub fn crossover_legs(&self) -> (IndicatorType, IndicatorType) {
        if self.use_ema {
            (
                IndicatorType::Ema(self.short_period),
                IndicatorType::Ema(self.long_period),
            )
        } else {
            (
                IndicatorType::Sma(self.short_period),
                IndicatorType::Sma(self.long_period),
            )
        }
    }

    /// Entry filters that are switched on.
    pub fn filters(&self) -> Vec<IndicatorType> {
        let mut filters = Vec::new();
        if self.use_rsi {
            filters.push(IndicatorType::Rsi(rsi::DEFAULT_PERIOD));
        }
        if self.use_macd {
            filters.push(IndicatorType::Macd {
                fast: macd::DEFAULT_FAST,
                slow: macd::DEFAULT_SLOW,
                signal: macd::DEFAULT_SIGNAL,
            });
        }
        if self.use_bollinger {
            filters.push(IndicatorType::Bollinger {
                period: bollinger::DEFAULT_PERIOD,
                stddev_mult_x100: (bollinger::DEFAULT_MULTIPLIER * 100.0) as u32,
            });
        }
        filters
    }

    /// One-line description, e.g. `SMA(50)/SMA(200) crossover`.
    pub fn describe(&self) -> String {
        let (fast, slow) = self.crossover_legs();
        let mut text = format!("{}/{} crossover", fast, slow);
        let filters = self.filters();
        if !filters.is_empty() {
            let names: Vec<String> = filters.iter().map(|f| f.to_string()).collect();
            text.push_str(&format!(" [filters: {}]", names.join(", ")));
        }
        text
    }
}
