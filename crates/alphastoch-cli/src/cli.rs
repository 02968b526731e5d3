//! CLI argument definitions for alphastoch.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `simulate` | Simulate from a given start price, no market data |
//! | `advise` | Fetch the latest price for a symbol and simulate from it |
//! | `presets` | List risk-appetite presets and interactive ranges |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, ndjson, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings and errors as failures |
//! | `--stream` | `false` | Emit NDJSON phase events |
//! | `-v` | off | Log verbosity (repeat for more) |
//!
//! # Examples
//!
//! ```bash
//! # Offline run with a fixed seed
//! alphastoch simulate --start-price 100 --appetite aggressive --seed 42
//!
//! # Live price, table output
//! alphastoch advise ETH-USD --days 60 --paths 500 --format table
//!
//! # Watch a symbol once a minute; later runs within the TTL hit the cache
//! alphastoch advise AAPL --repeat 5 --interval-secs 60 --cache-ttl-secs 300
//!
//! # Negative drift needs no quoting
//! alphastoch simulate --drift -0.1 --volatility 0.5
//! ```

use alphastoch_core::{CacheMode, RiskAppetite, DEFAULT_PLOT_SAMPLE, DEFAULT_SYMBOL};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Monte Carlo price paths and a Kelly-sized recommendation for one asset.
#[derive(Debug, Parser)]
#[command(
    name = "alphastoch",
    author,
    version,
    about = "GBM price-path simulation and risk advisory",
    long_about = "alphastoch samples Geometric Brownian Motion price paths for a single \
asset and reduces them to an expected return, a 95% value at risk, a Kelly allocation \
fraction and a recommendation.\n\
\n\
Use 'alphastoch <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Emit the run's phases (snapshot, generated, summary) as NDJSON events.
    #[arg(long, global = true, default_value_t = false)]
    pub stream: bool,

    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace).
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    Table,
    /// Single JSON object output.
    Json,
    /// Newline-delimited JSON (one object per line).
    Ndjson,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Simulate from an explicit start price.
    ///
    /// # Examples
    ///
    ///   alphastoch simulate --start-price 250 --drift 0.3 --volatility 0.9
    ///   alphastoch simulate --appetite conservative --days 90 --paths 1000 --seed 7
    Simulate(SimulateArgs),

    /// Fetch the latest daily close for SYMBOL and simulate from it.
    ///
    /// # Examples
    ///
    ///   alphastoch advise
    ///   alphastoch advise AAPL --appetite balanced
    ///   alphastoch advise BTC-USD --mock --seed 1
    Advise(AdviseArgs),

    /// List risk-appetite presets and the interactive control ranges.
    Presets,
}

/// Model knobs shared by `simulate` and `advise`.
#[derive(Debug, Clone, Args)]
pub struct ModelArgs {
    /// Preset for drift and volatility (conservative, balanced, aggressive).
    ///
    /// Explicit --drift/--volatility override the preset.
    #[arg(long)]
    pub appetite: Option<RiskAppetite>,

    /// Annualized drift (expected return), e.g. 0.15.
    #[arg(long, allow_negative_numbers = true)]
    pub drift: Option<f64>,

    /// Annualized volatility, e.g. 0.65.
    #[arg(long, allow_negative_numbers = true)]
    pub volatility: Option<f64>,

    /// Horizon in days.
    #[arg(long, default_value_t = 30)]
    pub days: usize,

    /// Number of simulated paths.
    #[arg(long, default_value_t = 100)]
    pub paths: usize,

    /// Seed for reproducible runs; random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Individual paths included in the output for plotting.
    #[arg(long, default_value_t = DEFAULT_PLOT_SAMPLE)]
    pub sample_paths: usize,

    /// Report this Kelly fraction instead of failing when volatility is zero.
    #[arg(long)]
    pub kelly_cap: Option<f64>,
}

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Price at step zero.
    #[arg(long, default_value_t = 100.0)]
    pub start_price: f64,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Debug, Args)]
pub struct AdviseArgs {
    /// Ticker to fetch (Yahoo Finance notation).
    #[arg(env = "ALPHASTOCH_SYMBOL", default_value = DEFAULT_SYMBOL)]
    pub symbol: String,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Snapshot cache policy.
    #[arg(long, value_enum, default_value_t = CacheModeArg::Use)]
    pub cache_mode: CacheModeArg,

    /// Snapshot cache lifetime in seconds.
    #[arg(long, default_value_t = 60)]
    pub cache_ttl_secs: u64,

    /// Use a deterministic synthetic price series instead of the network.
    #[arg(long, default_value_t = false)]
    pub mock: bool,

    /// Re-run the advisory this many times against the same snapshot cache.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=1_000))]
    pub repeat: u32,

    /// Seconds to wait between repeated runs.
    #[arg(long, default_value_t = 0)]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheModeArg {
    Use,
    Refresh,
    Bypass,
}

impl From<CacheModeArg> for CacheMode {
    fn from(value: CacheModeArg) -> Self {
        match value {
            CacheModeArg::Use => Self::Use,
            CacheModeArg::Refresh => Self::Refresh,
            CacheModeArg::Bypass => Self::Bypass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simulate_with_negative_drift() {
        let cli = Cli::try_parse_from([
            "alphastoch",
            "simulate",
            "--drift",
            "-0.1",
            "--volatility",
            "0.5",
            "--seed",
            "9",
        ])
        .expect("parses");

        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.model.drift, Some(-0.1));
        assert_eq!(args.model.seed, Some(9));
        assert_eq!(args.start_price, 100.0);
    }

    #[test]
    fn advise_defaults_to_btc() {
        let cli = Cli::try_parse_from(["alphastoch", "advise", "--appetite", "aggressive"])
            .expect("parses");

        let Command::Advise(args) = cli.command else {
            panic!("expected advise");
        };
        if std::env::var_os("ALPHASTOCH_SYMBOL").is_none() {
            assert_eq!(args.symbol, "BTC-USD");
        }
        assert_eq!(args.model.appetite, Some(RiskAppetite::Aggressive));
        assert_eq!(args.cache_mode, CacheModeArg::Use);
        assert_eq!((args.repeat, args.interval_secs), (1, 0));
    }

    #[test]
    fn repeat_must_be_positive() {
        let cli = Cli::try_parse_from(["alphastoch", "advise", "--repeat", "4", "--interval-secs", "2"])
            .expect("parses");
        let Command::Advise(args) = cli.command else {
            panic!("expected advise");
        };
        assert_eq!((args.repeat, args.interval_secs), (4, 2));

        assert!(Cli::try_parse_from(["alphastoch", "advise", "--repeat", "0"]).is_err());
    }

    #[test]
    fn kelly_cap_accepts_float_spellings_for_later_validation() {
        let cli = Cli::try_parse_from(["alphastoch", "simulate", "--kelly-cap", "inf"])
            .expect("parses");
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.model.kelly_cap, Some(f64::INFINITY));
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["alphastoch", "presets", "--format", "table", "-vv"])
            .expect("parses");
        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn rejects_unknown_appetite() {
        assert!(Cli::try_parse_from(["alphastoch", "simulate", "--appetite", "yolo"]).is_err());
    }
}
