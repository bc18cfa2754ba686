//! Backtest engine and event loop.
//!
//! One forward pass over the bars from `long_period` to the last index. Each
//! bar produces a [`Signals`] value, [`transition`] turns it into an
//! [`Action`], and the engine applies that action to its ledger and trade
//! log. A position still open after the last bar is closed there.

use tracing::{debug, info, warn};

use super::error::BacktesterError;
use super::execution::{self, EntryResult};
use super::metrics::Metrics;
use super::ohlcv::{closes, PriceBar};
use super::portfolio::Ledger;
use super::position::{transition, Action, ExitReason, Signals, Trade};
use super::signal::IndicatorSet;
use super::sizing;
use super::strategy::StrategyConfig;

/// Snapshot of a run handed to report sinks.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub config: StrategyConfig,
    pub trades: Vec<Trade>,
    pub bar_count: usize,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Owns one price series, its ledger and its trade log.
#[derive(Debug, Clone)]
pub struct Backtester {
    bars: Vec<PriceBar>,
    config: StrategyConfig,
    ledger: Ledger,
    trades: Vec<Trade>,
}

impl Backtester {
    pub fn new(bars: Vec<PriceBar>, config: StrategyConfig) -> Self {
        let ledger = Ledger::new(config.initial_capital);
        Backtester {
            bars,
            config,
            ledger,
            trades: Vec::new(),
        }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn metrics(&self) -> Metrics {
        Metrics::compute(&self.config, &self.bars, &self.trades, &self.ledger)
    }

    pub fn result(&self) -> BacktestResult {
        BacktestResult {
            config: self.config.clone(),
            trades: self.trades.clone(),
            bar_count: self.bars.len(),
            start_date: self.bars.first().map(|b| b.date.clone()),
            end_date: self.bars.last().map(|b| b.date.clone()),
        }
    }

    pub fn run(&mut self) -> Result<(), BacktesterError> {
        self.run_with_observer(|_, _| {})
    }

    /// Run the simulation, calling `observe` with the ledger after each bar
    /// has been processed (and once more if the final bar forces a close).
    ///
    /// With fewer than `long_period + 1` bars nothing is touched and
    /// [`BacktesterError::InsufficientData`] is returned.
    pub fn run_with_observer<F>(&mut self, mut observe: F) -> Result<(), BacktesterError>
    where
        F: FnMut(usize, &Ledger),
    {
        let minimum = self.config.min_bars();
        if self.bars.len() < minimum {
            warn!(
                bars = self.bars.len(),
                minimum, "insufficient data for backtesting"
            );
            return Err(BacktesterError::InsufficientData {
                bars: self.bars.len(),
                minimum,
            });
        }

        self.ledger = Ledger::new(self.config.initial_capital);
        self.trades.clear();

        let closes = closes(&self.bars);
        let indicators = IndicatorSet::compute(&closes, &self.config);
        let last = self.bars.len() - 1;

        for i in self.config.long_period..=last {
            let signals = self.evaluate(&closes, &indicators, i);
            match transition(&self.ledger.state, &signals) {
                Action::Hold => {}
                Action::Enter => self.enter(i),
                Action::Exit(reason) => self.exit(i, reason),
            }
            observe(i, &self.ledger);
        }

        if self.ledger.in_position() {
            self.exit(last, ExitReason::EndOfData);
            observe(last, &self.ledger);
        }

        info!(
            strategy = %self.config.describe(),
            bars = self.bars.len(),
            trades = self.trades.len(),
            cash = self.ledger.cash,
            "backtest complete"
        );
        Ok(())
    }

    fn evaluate(&self, closes: &[f64], indicators: &IndicatorSet, i: usize) -> Signals {
        let close = closes[i];
        let (stop_loss, take_profit) = match self.ledger.open_position() {
            Some(position) => (
                position.should_stop_loss(close, self.config.stop_loss_pct),
                position.should_take_profit(close, self.config.take_profit_pct),
            ),
            None => (false, false),
        };

        if stop_loss || take_profit {
            return Signals {
                stop_loss,
                take_profit,
                ..Default::default()
            };
        }

        let (entry, exit) = indicators.crossover_signals(closes, i);
        Signals {
            stop_loss,
            take_profit,
            entry,
            exit,
        }
    }

    fn enter(&mut self, i: usize) {
        let fraction = sizing::position_fraction(&self.config, &self.trades);
        match execution::enter_long(
            &mut self.ledger,
            &self.bars,
            i,
            fraction,
            self.config.commission_rate,
        ) {
            EntryResult::Entered(position) => debug!(
                index = i,
                date = %position.entry_date,
                price = position.entry_price,
                shares = position.shares,
                fraction,
                "entered long"
            ),
            EntryResult::InvalidPrice { price } => warn!(
                index = i,
                price, "skipping entry: fill price is not positive"
            ),
            EntryResult::AlreadyInPosition => {}
        }
    }

    fn exit(&mut self, i: usize, reason: ExitReason) {
        if let Some(trade) = execution::exit_position(
            &mut self.ledger,
            &self.bars,
            i,
            self.config.commission_rate,
            reason,
        ) {
            debug!(
                index = i,
                date = %trade.exit_date,
                price = trade.exit_price,
                pnl = trade.pnl,
                reason = %trade.exit_reason,
                "exited position"
            );
            self.trades.push(trade);
        }
    }
}
