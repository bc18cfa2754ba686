//! Position state machine and trade records.
//!
//! The engine is always in one of two states, [`PositionState::Flat`] or
//! [`PositionState::Long`]. [`transition`] maps the current state plus the
//! signals observed on a bar to the single [`Action`] the engine applies to
//! the ledger and trade log.

use std::fmt;

/// Entry data of the position currently held.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub entry_index: usize,
    pub entry_date: String,
    pub entry_price: f64,
    pub shares: f64,
    pub entry_commission: f64,
}

impl OpenPosition {
    /// Fractional return of `price` against the entry fill.
    pub fn return_at(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price
    }

    pub fn should_stop_loss(&self, price: f64, stop_loss_pct: f64) -> bool {
        if stop_loss_pct <= 0.0 {
            return false;
        }
        self.return_at(price) <= -stop_loss_pct
    }

    pub fn should_take_profit(&self, price: f64, take_profit_pct: f64) -> bool {
        if take_profit_pct <= 0.0 {
            return false;
        }
        self.return_at(price) >= take_profit_pct
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Crossover,
    StopLoss,
    TakeProfit,
    EndOfData,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExitReason::Crossover => "crossover",
            ExitReason::StopLoss => "stop-loss",
            ExitReason::TakeProfit => "take-profit",
            ExitReason::EndOfData => "end-of-data",
        };
        f.write_str(label)
    }
}

/// A finished round trip. Dates are the labels of the bars on which the
/// entry and exit were decided; the indices locate those bars.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_index: usize,
    pub entry_date: String,
    pub entry_price: f64,
    pub shares: f64,
    pub exit_index: usize,
    pub exit_date: String,
    pub exit_price: f64,
    pub pnl: f64,
    pub return_pct: f64,
    pub commission: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn cost_basis(&self) -> f64 {
        self.shares * self.entry_price
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long(OpenPosition),
}

/// Everything the engine observed on one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    pub stop_loss: bool,
    pub take_profit: bool,
    pub entry: bool,
    pub exit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Hold,
    Enter,
    Exit(ExitReason),
}

/// Risk exits outrank the crossover exit; stop-loss outranks take-profit.
/// Entries are only taken when flat, exits only when long.
pub fn transition(state: &PositionState, signals: &Signals) -> Action {
    match state {
        PositionState::Flat if signals.entry => Action::Enter,
        PositionState::Flat => Action::Hold,
        PositionState::Long(_) if signals.stop_loss => Action::Exit(ExitReason::StopLoss),
        PositionState::Long(_) if signals.take_profit => Action::Exit(ExitReason::TakeProfit),
        PositionState::Long(_) if signals.exit => Action::Exit(ExitReason::Crossover),
        PositionState::Long(_) => Action::Hold,
    }
}
