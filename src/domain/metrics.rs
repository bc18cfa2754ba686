//! Performance metrics and statistics.
//!
//! Computed once after a run as a pure function of the configuration, the
//! bars, the trade log and the final ledger. Percent-valued fields are
//! expressed in percent (12.5 means 12.5%), currency fields in account units.

use super::ohlcv::PriceBar;
use super::portfolio::Ledger;
use super::position::Trade;
use super::strategy::StrategyConfig;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Profit factor reported when there are winning trades and no losses.
pub const PROFIT_FACTOR_CAP: f64 = 999.99;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub cagr: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub num_trades: usize,
    pub winning_trades: usize,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub profit_factor: f64,
}

impl Metrics {
    pub fn compute(
        config: &StrategyConfig,
        bars: &[PriceBar],
        trades: &[Trade],
        ledger: &Ledger,
    ) -> Self {
        let initial_capital = config.initial_capital;
        let final_value = match bars.last() {
            Some(last) => ledger.market_value(last.close),
            None => ledger.cash,
        };

        let total_return = if initial_capital > 0.0 {
            (final_value - initial_capital) / initial_capital * 100.0
        } else {
            0.0
        };

        let cagr = if initial_capital > 0.0 {
            let years = span_years(bars);
            ((final_value / initial_capital).powf(1.0 / years) - 1.0) * 100.0
        } else {
            0.0
        };

        let mut winning_trades = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        for trade in trades {
            if trade.is_win() {
                winning_trades += 1;
                total_wins += trade.pnl;
            } else {
                total_losses += -trade.pnl;
            }
        }

        let num_trades = trades.len();
        let losing_trades = num_trades - winning_trades;

        let win_rate = if num_trades > 0 {
            winning_trades as f64 * 100.0 / num_trades as f64
        } else {
            0.0
        };
        let avg_win = if winning_trades > 0 {
            total_wins / winning_trades as f64
        } else {
            0.0
        };
        let avg_loss = if losing_trades > 0 {
            total_losses / losing_trades as f64
        } else {
            0.0
        };
        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            PROFIT_FACTOR_CAP
        } else {
            0.0
        };

        Metrics {
            initial_capital,
            final_value,
            total_return,
            cagr,
            max_drawdown: compute_max_drawdown(config, bars, trades),
            sharpe_ratio: compute_sharpe(trades, bars.len()),
            num_trades,
            winning_trades,
            win_rate,
            avg_win,
            avg_loss,
            profit_factor,
        }
    }
}

/// Whole calendar years between the first and last bar, never less than 1.
pub fn span_years(bars: &[PriceBar]) -> f64 {
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return 1.0;
    };
    match (first.year(), last.year()) {
        (Some(start), Some(end)) if end > start => (end - start) as f64,
        _ => 1.0,
    }
}

/// Largest peak-to-trough equity decline, in percent.
///
/// Equity is replayed from `long_period` onward by walking the trade log
/// with one forward pointer and matching entry/exit bar indices. While
/// flat the equity keeps its last value, starting from initial capital.
pub fn compute_max_drawdown(config: &StrategyConfig, bars: &[PriceBar], trades: &[Trade]) -> f64 {
    let mut peak = config.initial_capital;
    let mut equity = config.initial_capital;
    let mut max_dd = 0.0_f64;

    let mut next_trade = 0usize;
    let mut holding = false;

    for (i, bar) in bars.iter().enumerate().skip(config.long_period) {
        if let Some(trade) = trades.get(next_trade) {
            if !holding && i == trade.entry_index {
                holding = true;
            }
            if holding {
                equity = trade.shares * bar.close;
                if i == trade.exit_index {
                    holding = false;
                    equity = trade.shares * trade.exit_price;
                    next_trade += 1;
                }
            }
        }

        if equity > peak {
            peak = equity;
        }
        if peak > 0.0 {
            let dd = (peak - equity) / peak * 100.0;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

/// Per-trade Sharpe ratio annualised by the average bars per trade.
///
/// Uses the population standard deviation of trade returns (as fractions).
/// Zero when there are no trades or the returns have no spread.
pub fn compute_sharpe(trades: &[Trade], num_bars: usize) -> f64 {
    if trades.is_empty() || num_bars == 0 {
        return 0.0;
    }

    let n = trades.len() as f64;
    let returns: Vec<f64> = trades.iter().map(|t| t.return_pct / 100.0).collect();
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if std_dev == 0.0 {
        return 0.0;
    }

    let bars_per_trade = num_bars as f64 / n;
    mean / std_dev * (TRADING_DAYS_PER_YEAR / bars_per_trade).sqrt()
}
