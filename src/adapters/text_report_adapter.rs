//! Plain-text report adapter implementing ReportPort.
//!
//! Writes a comma-separated summary block followed by the trade log.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BacktesterError;
use crate::domain::metrics::Metrics;
use crate::ports::report_port::ReportPort;

pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(result: &BacktestResult, metrics: &Metrics) -> String {
        let mut out = String::new();
        Self::format_report(&mut out, result, metrics).ok();
        out
    }

    fn format_report(
        out: &mut String,
        result: &BacktestResult,
        metrics: &Metrics,
    ) -> std::fmt::Result {
        writeln!(out, "BACKTEST SUMMARY")?;
        writeln!(out, "================")?;
        writeln!(out)?;
        writeln!(out, "Strategy,{}", result.config.describe())?;
        if let (Some(start), Some(end)) = (&result.start_date, &result.end_date) {
            writeln!(out, "Period,{} to {}", start, end)?;
        }
        writeln!(out, "Bars,{}", result.bar_count)?;
        writeln!(out, "Initial Capital,${:.2}", metrics.initial_capital)?;
        writeln!(out, "Final Value,${:.2}", metrics.final_value)?;
        writeln!(out, "Total Return,{:.2}%", metrics.total_return)?;
        writeln!(out, "CAGR,{:.2}%", metrics.cagr)?;
        writeln!(out, "Max Drawdown,{:.2}%", metrics.max_drawdown)?;
        writeln!(out, "Sharpe Ratio,{:.3}", metrics.sharpe_ratio)?;
        writeln!(out, "Number of Trades,{}", metrics.num_trades)?;
        writeln!(out, "Winning Trades,{}", metrics.winning_trades)?;
        writeln!(out, "Win Rate,{:.2}%", metrics.win_rate)?;
        writeln!(out, "Average Win,${:.2}", metrics.avg_win)?;
        writeln!(out, "Average Loss,${:.2}", metrics.avg_loss)?;
        writeln!(out, "Profit Factor,{:.2}", metrics.profit_factor)?;
        writeln!(out)?;

        writeln!(out, "TRADE LOG")?;
        writeln!(out, "=========")?;
        writeln!(
            out,
            "Entry Date,Exit Date,Entry Price,Exit Price,Shares,P&L,Return %,Commission,Exit Reason"
        )?;
        for t in &result.trades {
            writeln!(
                out,
                "{},{},{:.2},{:.2},{:.4},{:.2},{:.2}%,{:.2},{}",
                t.entry_date,
                t.exit_date,
                t.entry_price,
                t.exit_price,
                t.shares,
                t.pnl,
                t.return_pct,
                t.commission,
                t.exit_reason
            )?;
        }
        Ok(())
    }
}

impl Default for TextReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        output_path: &str,
    ) -> Result<(), BacktesterError> {
        let text = Self::render(result, metrics);

        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(BacktesterError::Io)?;
        }
        fs::write(path, text).map_err(BacktesterError::Io)?;

        Ok(())
    }
}
