//! Single-instrument cash/position ledger.

use super::position::{OpenPosition, PositionState};

/// Cash and shares are never both non-zero: entering commits all cash,
/// exiting converts all shares back to cash.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    pub cash: f64,
    pub shares: f64,
    pub state: PositionState,
}

impl Ledger {
    pub fn new(initial_capital: f64) -> Self {
        Ledger {
            cash: initial_capital,
            shares: 0.0,
            state: PositionState::Flat,
        }
    }

    pub fn in_position(&self) -> bool {
        matches!(self.state, PositionState::Long(_))
    }

    pub fn open_position(&self) -> Option<&OpenPosition> {
        match &self.state {
            PositionState::Long(position) => Some(position),
            PositionState::Flat => None,
        }
    }

    /// Commit the whole cash balance to `position`.
    pub fn open(&mut self, position: OpenPosition) {
        self.shares = position.shares;
        self.cash = 0.0;
        self.state = PositionState::Long(position);
    }

    /// Liquidate into `proceeds`, returning the position that was held.
    pub fn close(&mut self, proceeds: f64) -> Option<OpenPosition> {
        match std::mem::take(&mut self.state) {
            PositionState::Long(position) => {
                self.cash = proceeds;
                self.shares = 0.0;
                Some(position)
            }
            PositionState::Flat => None,
        }
    }

    /// Cash plus shares marked at `price`.
    pub fn market_value(&self, price: f64) -> f64 {
        if self.in_position() {
            self.cash + self.shares * price
        } else {
            self.cash
        }
    }
}
