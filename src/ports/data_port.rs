//! Data access port trait.

use crate::domain::error::BacktesterError;
use crate::domain::ohlcv::PriceBar;

pub trait DataPort {
    /// All bars from `source`, in source order.
    fn fetch_bars(&self, source: &str) -> Result<Vec<PriceBar>, BacktesterError>;

    /// First date, last date and bar count, or `None` for an empty source.
    fn data_range(
        &self,
        source: &str,
    ) -> Result<Option<(String, String, usize)>, BacktesterError> {
        let bars = self.fetch_bars(source)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date.clone(), last.date.clone(), bars.len())),
            _ => None,
        })
    }
}
