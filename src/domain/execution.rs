//! Trade execution and fill simulation.
//!
//! Signals are decided on the close of bar `i`; orders fill at the open of
//! bar `i + 1` when that bar exists and has a positive open, otherwise at the
//! close of bar `i`. Commission is charged on gross value on both legs.

use super::ohlcv::PriceBar;
use super::portfolio::Ledger;
use super::position::{ExitReason, OpenPosition, Trade};

/// Fill price for a decision taken on `bars[index]`.
pub fn fill_price(bars: &[PriceBar], index: usize) -> f64 {
    match bars.get(index + 1) {
        Some(next) if next.open > 0.0 => next.open,
        _ => bars.get(index).map_or(0.0, |bar| bar.close),
    }
}

/// Commission on a trade of `trade_value` at `rate` (a fraction).
pub fn calculate_commission(trade_value: f64, rate: f64) -> f64 {
    trade_value * rate
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered(OpenPosition),
    AlreadyInPosition,
    InvalidPrice { price: f64 },
}

/// Enter a long position with `fraction` of the cash left after commission.
///
/// 1. Resolve the fill price; a non-positive fill aborts the entry
/// 2. Charge commission on the whole cash balance
/// 3. Buy `available * fraction / price` (fractional) shares
/// 4. Zero the cash balance; any unallocated remainder is not retained
pub fn enter_long(
    ledger: &mut Ledger,
    bars: &[PriceBar],
    index: usize,
    fraction: f64,
    commission_rate: f64,
) -> EntryResult {
    if ledger.in_position() {
        return EntryResult::AlreadyInPosition;
    }

    let entry_price = fill_price(bars, index);
    if entry_price <= 0.0 || !entry_price.is_finite() {
        return EntryResult::InvalidPrice { price: entry_price };
    }

    let entry_commission = calculate_commission(ledger.cash, commission_rate);
    let available = ledger.cash - entry_commission;
    let shares = available * fraction / entry_price;

    let position = OpenPosition {
        entry_index: index,
        entry_date: bars.get(index).map(|b| b.date.clone()).unwrap_or_default(),
        entry_price,
        shares,
        entry_commission,
    };
    ledger.open(position.clone());

    EntryResult::Entered(position)
}

/// Liquidate the open position, returning the finished trade.
///
/// Proceeds are `shares * fill - commission`. PnL is measured against the
/// shares' cost at the entry fill, so it carries the exit commission but not
/// the entry commission (that was paid out of cash before sizing).
pub fn exit_position(
    ledger: &mut Ledger,
    bars: &[PriceBar],
    index: usize,
    commission_rate: f64,
    exit_reason: ExitReason,
) -> Option<Trade> {
    let shares = ledger.open_position()?.shares;

    let exit_price = fill_price(bars, index);
    let gross = shares * exit_price;
    let exit_commission = calculate_commission(gross, commission_rate);
    let proceeds = gross - exit_commission;

    let position = ledger.close(proceeds)?;

    let cost_basis = position.shares * position.entry_price;
    let pnl = proceeds - cost_basis;
    let return_pct = if cost_basis != 0.0 {
        pnl / cost_basis * 100.0
    } else {
        0.0
    };

    Some(Trade {
        entry_index: position.entry_index,
        entry_date: position.entry_date,
        entry_price: position.entry_price,
        shares: position.shares,
        exit_index: index,
        exit_date: bars.get(index).map(|b| b.date.clone()).unwrap_or_default(),
        exit_price,
        pnl,
        return_pct,
        commission: position.entry_commission + exit_commission,
        exit_reason,
    })
}
