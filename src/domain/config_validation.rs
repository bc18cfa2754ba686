//! Configuration validation.
//!
//! Validates a merged strategy configuration before a run.

use crate::domain::error::BacktesterError;
use crate::domain::strategy::StrategyConfig;

pub fn validate_strategy_config(config: &StrategyConfig) -> Result<(), BacktesterError> {
    validate_periods(config)?;
    validate_initial_capital(config)?;
    validate_stop_loss(config)?;
    validate_take_profit(config)?;
    validate_commission(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> BacktesterError {
    BacktesterError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_periods(config: &StrategyConfig) -> Result<(), BacktesterError> {
    if config.short_period == 0 {
        return Err(invalid(
            "strategy",
            "short_period",
            "short_period must be positive",
        ));
    }
    if config.long_period == 0 {
        return Err(invalid(
            "strategy",
            "long_period",
            "long_period must be positive",
        ));
    }
    Ok(())
}

fn validate_initial_capital(config: &StrategyConfig) -> Result<(), BacktesterError> {
    if !config.initial_capital.is_finite() || config.initial_capital <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_stop_loss(config: &StrategyConfig) -> Result<(), BacktesterError> {
    if config.stop_loss_pct < 0.0 {
        return Err(invalid(
            "strategy",
            "stop_loss",
            "stop_loss must be non-negative",
        ));
    }
    Ok(())
}

fn validate_take_profit(config: &StrategyConfig) -> Result<(), BacktesterError> {
    if config.take_profit_pct < 0.0 {
        return Err(invalid(
            "strategy",
            "take_profit",
            "take_profit must be non-negative",
        ));
    }
    Ok(())
}

fn validate_commission(config: &StrategyConfig) -> Result<(), BacktesterError> {
    if !(0.0..1.0).contains(&config.commission_rate) {
        return Err(invalid(
            "backtest",
            "commission",
            "commission must be between 0 and 1",
        ));
    }
    Ok(())
}
