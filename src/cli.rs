//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::backtest::Backtester;
use crate::domain::comparison::{compare_presets, ComparisonRow};
use crate::domain::config_validation::validate_strategy_config;
use crate::domain::error::BacktesterError;
use crate::domain::metrics::Metrics;
use crate::domain::strategy::{StrategyConfig, DEFAULT_INITIAL_CAPITAL};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_OUTPUT: &str = "results/results.csv";

#[derive(Parser, Debug)]
#[command(name = "backtester", about = "Moving-average crossover backtester")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        /// CSV file of daily bars
        data: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        overrides: StrategyArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare preset crossover periods
    Compare {
        data: PathBuf,
        #[arg(long)]
        capital: Option<f64>,
    },
    /// Show data range for a file
    Info { data: PathBuf },
}

/// Command-line strategy options; each overrides the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct StrategyArgs {
    /// Fast moving-average period
    #[arg(long = "short")]
    pub short_period: Option<usize>,
    /// Slow moving-average period
    #[arg(long = "long")]
    pub long_period: Option<usize>,
    #[arg(long)]
    pub capital: Option<f64>,
    /// Veto entries when RSI(14) >= 70
    #[arg(long)]
    pub rsi: bool,
    /// Use EMA legs instead of SMA
    #[arg(long)]
    pub ema: bool,
    /// Require a positive MACD histogram to enter
    #[arg(long)]
    pub macd: bool,
    /// Veto entries above the upper Bollinger band
    #[arg(long)]
    pub bollinger: bool,
    /// Size entries with half-Kelly
    #[arg(long)]
    pub kelly: bool,
    /// Stop-loss as a fraction, e.g. 0.05
    #[arg(long = "stop-loss")]
    pub stop_loss: Option<f64>,
    /// Take-profit as a fraction, e.g. 0.15
    #[arg(long = "take-profit")]
    pub take_profit: Option<f64>,
    /// Commission rate per side, e.g. 0.001
    #[arg(long)]
    pub commission: Option<f64>,
}

pub fn run(cli: Cli) -> ExitCode {
    init_tracing(cli.verbose);

    match cli.command {
        Command::Backtest {
            data,
            config,
            overrides,
            output,
        } => run_backtest(&data, config.as_ref(), &overrides, output.as_ref()),
        Command::Compare { data, capital } => run_compare(&data, capital),
        Command::Info { data } => run_info(&data),
    }
}

/// `RUST_LOG` wins; otherwise `warn`, or `debug` with `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        debug!(error = %err, "tracing subscriber already installed");
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn read_period(
    adapter: &dyn ConfigPort,
    key: &str,
    default: usize,
) -> Result<usize, BacktesterError> {
    let value = adapter.get_int("strategy", key, default as i64);
    usize::try_from(value).map_err(|_| BacktesterError::ConfigInvalid {
        section: "strategy".into(),
        key: key.into(),
        reason: format!("{key} must be positive"),
    })
}

/// Layer INI values over `base`. Missing keys keep the base value.
pub fn strategy_from_config(
    adapter: &dyn ConfigPort,
    base: StrategyConfig,
) -> Result<StrategyConfig, BacktesterError> {
    Ok(StrategyConfig {
        short_period: read_period(adapter, "short_period", base.short_period)?,
        long_period: read_period(adapter, "long_period", base.long_period)?,
        initial_capital: adapter.get_double("backtest", "initial_capital", base.initial_capital),
        use_rsi: adapter.get_bool("strategy", "use_rsi", base.use_rsi),
        use_ema: adapter.get_bool("strategy", "use_ema", base.use_ema),
        use_macd: adapter.get_bool("strategy", "use_macd", base.use_macd),
        use_bollinger: adapter.get_bool("strategy", "use_bollinger", base.use_bollinger),
        use_kelly: adapter.get_bool("strategy", "use_kelly", base.use_kelly),
        stop_loss_pct: adapter.get_double("strategy", "stop_loss", base.stop_loss_pct),
        take_profit_pct: adapter.get_double("strategy", "take_profit", base.take_profit_pct),
        commission_rate: adapter.get_double("backtest", "commission", base.commission_rate),
    })
}

/// Layer command-line options over `config`. Flags only switch features on.
pub fn apply_overrides(config: &mut StrategyConfig, args: &StrategyArgs) {
    if let Some(v) = args.short_period {
        config.short_period = v;
    }
    if let Some(v) = args.long_period {
        config.long_period = v;
    }
    if let Some(v) = args.capital {
        config.initial_capital = v;
    }
    config.use_rsi |= args.rsi;
    config.use_ema |= args.ema;
    config.use_macd |= args.macd;
    config.use_bollinger |= args.bollinger;
    config.use_kelly |= args.kelly;
    if let Some(v) = args.stop_loss {
        config.stop_loss_pct = v;
    }
    if let Some(v) = args.take_profit {
        config.take_profit_pct = v;
    }
    if let Some(v) = args.commission {
        config.commission_rate = v;
    }
}

/// Defaults, then the INI file if given, then command-line options.
pub fn resolve_strategy_config(
    adapter: Option<&dyn ConfigPort>,
    args: &StrategyArgs,
) -> Result<StrategyConfig, BacktesterError> {
    let mut config = match adapter {
        Some(a) => strategy_from_config(a, StrategyConfig::default())?,
        None => StrategyConfig::default(),
    };
    apply_overrides(&mut config, args);
    validate_strategy_config(&config)?;
    Ok(config)
}

pub fn resolve_output(cli_output: Option<&PathBuf>, adapter: Option<&dyn ConfigPort>) -> PathBuf {
    cli_output
        .cloned()
        .or_else(|| {
            adapter
                .and_then(|a| a.get_string("report", "output"))
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
}

fn data_source(path: &Path) -> (CsvAdapter, String) {
    (
        CsvAdapter::new(PathBuf::new()),
        path.to_string_lossy().into_owned(),
    )
}

fn run_backtest(
    data_path: &Path,
    config_path: Option<&PathBuf>,
    overrides: &StrategyArgs,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: Load config
    let adapter = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            match load_config(path) {
                Ok(a) => Some(a),
                Err(code) => return code,
            }
        }
        None => None,
    };
    let port = adapter.as_ref().map(|a| a as &dyn ConfigPort);

    // Stage 2: Merge and validate
    let config = match resolve_strategy_config(port, overrides) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let output = resolve_output(output_path, port);

    // Stages 3-6: Load, simulate, summarise, report
    let (data_port, source) = data_source(data_path);
    match run_backtest_pipeline(
        &data_port,
        &TextReportAdapter::new(),
        &source,
        config,
        &output.to_string_lossy(),
    ) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    source: &str,
    config: StrategyConfig,
    output_path: &str,
) -> Result<Metrics, BacktesterError> {
    eprintln!("Loading data from {}", source);
    let bars = data_port.fetch_bars(source)?;
    eprintln!("Loaded {} trading days", bars.len());
    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        eprintln!("  Period: {} to {}", first.date, last.date);
    }

    eprintln!("Running backtest: {}", config.describe());
    let mut backtester = Backtester::new(bars, config);
    backtester.run()?;

    let metrics = backtester.metrics();
    eprint!("{}", format_summary(backtester.config(), &metrics));

    report_port.write(&backtester.result(), &metrics, output_path)?;
    eprintln!("\nResults exported to: {}", output_path);

    Ok(metrics)
}

pub fn format_summary(config: &StrategyConfig, metrics: &Metrics) -> String {
    let mut lines = vec![
        String::new(),
        "=== Backtest Results ===".to_string(),
        format!("Strategy:         {}", config.describe()),
        format!("Initial Capital:  ${:.2}", metrics.initial_capital),
        format!("Final Value:      ${:.2}", metrics.final_value),
        format!("Total Return:     {:.2}%", metrics.total_return),
        format!("CAGR:             {:.2}%", metrics.cagr),
        format!("Max Drawdown:     -{:.2}%", metrics.max_drawdown),
        format!("Sharpe Ratio:     {:.3}", metrics.sharpe_ratio),
        format!(
            "Trades:           {} ({} wins, {:.1}% win rate)",
            metrics.num_trades, metrics.winning_trades, metrics.win_rate
        ),
        format!("Profit Factor:    {:.2}", metrics.profit_factor),
    ];
    if config.stop_loss_pct > 0.0 || config.take_profit_pct > 0.0 {
        lines.push(format!(
            "Risk Rules:       stop-loss {:.1}%, take-profit {:.1}%",
            config.stop_loss_pct * 100.0,
            config.take_profit_pct * 100.0
        ));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn format_comparison(rows: &[ComparisonRow]) -> String {
    let mut out = format!(
        "{:<20}{:>8}{:>12}{:>10}{:>10}{:>12}\n",
        "Strategy", "Periods", "Return %", "Trades", "Sharpe", "Max DD %"
    );
    out.push_str(&"-".repeat(72));
    out.push('\n');
    for row in rows {
        let periods = format!("{}/{}", row.preset.short_period, row.preset.long_period);
        let marker = if row.completed { "" } else { "  (insufficient data)" };
        out.push_str(&format!(
            "{:<20}{:>8}{:>12.1}{:>10}{:>10.2}{:>12.1}{}\n",
            row.preset.name,
            periods,
            row.metrics.total_return,
            row.metrics.num_trades,
            row.metrics.sharpe_ratio,
            row.metrics.max_drawdown,
            marker
        ));
    }
    out
}

fn run_compare(data_path: &Path, capital: Option<f64>) -> ExitCode {
    let capital = capital.unwrap_or(DEFAULT_INITIAL_CAPITAL);
    let check = StrategyConfig {
        initial_capital: capital,
        ..Default::default()
    };
    if let Err(e) = validate_strategy_config(&check) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let (data_port, source) = data_source(data_path);
    let bars = match data_port.fetch_bars(&source) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Loaded {} trading days from {}", bars.len(), source);
    eprintln!("\n=== Strategy Comparison ===");

    let rows = compare_presets(&bars, capital);
    print!("{}", format_comparison(&rows));
    ExitCode::SUCCESS
}

/// Calendar days between two `YYYY-MM-DD` labels.
pub fn calendar_span_days(first: &str, last: &str) -> Option<i64> {
    let start = NaiveDate::parse_from_str(first, "%Y-%m-%d").ok()?;
    let end = NaiveDate::parse_from_str(last, "%Y-%m-%d").ok()?;
    Some((end - start).num_days())
}

fn run_info(data_path: &Path) -> ExitCode {
    let (data_port, source) = data_source(data_path);
    match data_port.data_range(&source) {
        Ok(Some((first, last, count))) => {
            println!("{}: {} bars, {} to {}", source, count, first, last);
            if let Some(days) = calendar_span_days(&first, &last) {
                println!("  span: {} calendar days", days);
            }
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("{}: no data found", source);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
