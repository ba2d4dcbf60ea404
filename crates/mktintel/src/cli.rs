use clap::{Parser, Subcommand, ValueEnum};
use mktintel_snapshot::{Asset, Lookback, RollingBasis};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing
    #[arg(long, default_value = "INFO", ignore_case = true)]
    pub trace: TraceLevel,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch closes & print prices, returns, base-100 performance and metrics.
    Snapshot {
        /// Lookback window, in calendar days.
        #[arg(long, default_value_t = Lookback::DEFAULT, value_parser = clap::value_parser!(u16).range(Lookback::MIN as i64..=Lookback::MAX as i64))]
        days: u16,

        /// Also compute a simple moving average.
        #[arg(long)]
        sma: bool,

        /// Asset the moving average is computed for.
        #[arg(long, default_value = "gold")]
        sma_asset: Asset,

        /// Series the moving average runs over.
        #[arg(long, value_enum, default_value_t = Basis::Price)]
        sma_basis: Basis,

        /// Moving average window, in rows; defaults to SNAPSHOT_SMA_WINDOW.
        #[arg(long)]
        sma_window: Option<usize>,

        /// Print the whole snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write the cleaned closing prices as CSV.
    Export {
        /// Lookback window, in calendar days.
        #[arg(long, default_value_t = Lookback::DEFAULT, value_parser = clap::value_parser!(u16).range(Lookback::MIN as i64..=Lookback::MAX as i64))]
        days: u16,

        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Basis {
    Price,
    Normalized,
}

impl From<Basis> for RollingBasis {
    fn from(basis: Basis) -> Self {
        match basis {
            Basis::Price => RollingBasis::Price,
            Basis::Normalized => RollingBasis::Normalized,
        }
    }
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraceLevel {
    DEBUG,
    INFO,
    WARN,
    ERROR,
}
