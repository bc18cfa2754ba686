//! Position sizing.
//!
//! Without Kelly sizing every entry commits the full post-commission
//! balance. With Kelly sizing the fraction comes from a half-Kelly estimate
//! over the completed trades so far.

use super::position::Trade;
use super::strategy::StrategyConfig;

/// Fewer completed trades than this always size at 1.0.
pub const MIN_KELLY_TRADES: usize = 5;
pub const KELLY_SCALE: f64 = 0.5;

/// Half-Kelly fraction from the trade history, clamped to `[0, 1]`.
///
/// Win probability is the share of trades with positive PnL, the payoff
/// ratio is mean winning return over mean losing magnitude. Degenerate
/// histories (all wins, all losses, zero mean loss) fall back to 1.0.
pub fn kelly_fraction(trades: &[Trade]) -> f64 {
    if trades.len() < MIN_KELLY_TRADES {
        return 1.0;
    }

    let (wins, losses): (Vec<&Trade>, Vec<&Trade>) = trades.iter().partition(|t| t.is_win());
    if wins.is_empty() || losses.is_empty() {
        return 1.0;
    }

    let avg_win = wins.iter().map(|t| t.return_pct).sum::<f64>() / wins.len() as f64;
    let avg_loss = losses.iter().map(|t| -t.return_pct).sum::<f64>() / losses.len() as f64;
    if avg_loss == 0.0 {
        return 1.0;
    }

    let win_prob = wins.len() as f64 / trades.len() as f64;
    let kelly = win_prob - (1.0 - win_prob) / (avg_win / avg_loss);

    (kelly * KELLY_SCALE).clamp(0.0, 1.0)
}

/// Fraction of available cash to commit on the next entry.
pub fn position_fraction(config: &StrategyConfig, trades: &[Trade]) -> f64 {
    if config.use_kelly {
        kelly_fraction(trades)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::ExitReason;

    fn trade(return_pct: f64) -> Trade {
        Trade {
            entry_index: 0,
            entry_date: "2024-01-01".into(),
            entry_price: 100.0,
            shares: 10.0,
            exit_index: 1,
            exit_date: "2024-01-02".into(),
            exit_price: 100.0 * (1.0 + return_pct / 100.0),
            pnl: 10.0 * return_pct,
            return_pct,
            commission: 0.0,
            exit_reason: ExitReason::Crossover,
        }
    }

    #[test]
    fn too_few_trades_is_full_size() {
        let trades: Vec<Trade> = [-5.0, -5.0, -5.0, -5.0].iter().map(|&r| trade(r)).collect();
        assert_eq!(kelly_fraction(&trades), 1.0);
    }

    #[test]
    fn all_wins_is_full_size() {
        let trades: Vec<Trade> = (0..6).map(|_| trade(3.0)).collect();
        assert_eq!(kelly_fraction(&trades), 1.0);
    }

    #[test]
    fn all_losses_is_full_size() {
        let trades: Vec<Trade> = (0..6).map(|_| trade(-3.0)).collect();
        assert_eq!(kelly_fraction(&trades), 1.0);
    }

    #[test]
    fn zero_average_loss_is_full_size() {
        let trades: Vec<Trade> = [4.0, 4.0, 0.0, 0.0, 0.0].iter().map(|&r| trade(r)).collect();
        assert_eq!(kelly_fraction(&trades), 1.0);
    }

    #[test]
    fn half_kelly_for_mixed_history() {
        // p = 0.6, b = 10 / 5 = 2, kelly = 0.6 - 0.4 / 2 = 0.4, half = 0.2
        let trades: Vec<Trade> = [10.0, 10.0, 10.0, -5.0, -5.0]
            .iter()
            .map(|&r| trade(r))
            .collect();
        assert!((kelly_fraction(&trades) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn kelly_is_win_rate_less_loss_rate_over_payoff() {
        // p = 2/3, b = 8 / 4 = 2, kelly = 2/3 - (1/3) / 2 = 0.5, half = 0.25
        let trades: Vec<Trade> = [8.0, -4.0, 8.0, 8.0, -4.0, 8.0]
            .iter()
            .map(|&r| trade(r))
            .collect();
        let (p, b) = (4.0 / 6.0, 2.0);
        let expected = KELLY_SCALE * (p - (1.0 - p) / b);
        assert!((kelly_fraction(&trades) - expected).abs() < 1e-12);
        assert!((kelly_fraction(&trades) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn negative_edge_clamps_to_zero() {
        // p = 0.2, b = 1, kelly = 0.2 - 0.8 / 1 < 0
        let trades: Vec<Trade> = [5.0, -5.0, -5.0, -5.0, -5.0]
            .iter()
            .map(|&r| trade(r))
            .collect();
        assert_eq!(kelly_fraction(&trades), 0.0);
    }

    #[test]
    fn position_fraction_ignores_history_without_kelly() {
        let trades: Vec<Trade> = [5.0, -5.0, -5.0, -5.0, -5.0]
            .iter()
            .map(|&r| trade(r))
            .collect();
        let mut config = StrategyConfig::default();
        assert_eq!(position_fraction(&config, &trades), 1.0);
        config.use_kelly = true;
        assert_eq!(position_fraction(&config, &trades), 0.0);
    }
}
