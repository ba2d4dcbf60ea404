use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands::*, TraceLevel};
use dotenv::dotenv;
use mktintel_snapshot::{
    export, Lookback, Pipeline, RollingRequest, Settings, SnapshotError, SnapshotRequest,
};
use tracing::{debug, info, subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod ui;

fn preprocess(trace_level: Level) {
    dotenv().ok();
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .with_writer(std::io::stderr)
        .finish();
    subscriber::set_global_default(my_subscriber).expect("Set subscriber");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.trace {
        TraceLevel::DEBUG => Level::DEBUG,
        TraceLevel::INFO => Level::INFO,
        TraceLevel::WARN => Level::WARN,
        TraceLevel::ERROR => Level::ERROR,
    };

    preprocess(log_level);
    trace!("Command line input recorded: {cli:#?}");

    let settings = Settings::from_env()?;
    debug!("Settings loaded: {settings:?}");
    let pipeline = Pipeline::new(settings.provider()?, settings.cache())
        .with_timeout(settings.fetch_timeout);

    ////////////////////////////////////////////////////////////////////////////////////////////////////

    // cli framework:
    // "> mktintel <COMMAND>"
    match cli.command {
        // "> mktintel snapshot --days 30 [--sma ...] [--json]"
        Snapshot {
            days,
            sma,
            sma_asset,
            sma_basis,
            sma_window,
            json,
        } => {
            let request = SnapshotRequest {
                lookback: Lookback::new(days.into())?,
                rolling: sma.then(|| RollingRequest {
                    asset: sma_asset,
                    basis: sma_basis.into(),
                    window: sma_window.unwrap_or(settings.sma_window),
                }),
            };

            let pb = ui::spinner(format!(
                "Extracting & cleaning the last {days} days from Yahoo Finance"
            ))?;
            let snapshot = pipeline.run(&request).await;
            pb.finish_and_clear();

            match snapshot {
                Ok(snapshot) if json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
                Ok(snapshot) => ui::print_snapshot(&snapshot),
                Err(e @ SnapshotError::EmptyData { .. }) => ui::notice(&e.to_string()),
                Err(e) => return Err(e.into()),
            }
        }

        // "> mktintel export --days 30 [--out prices.csv]"
        Export { days, out } => {
            let lookback = Lookback::new(days.into())?;

            let pb = ui::spinner(format!("Fetching the last {days} days from Yahoo Finance"))?;
            let prices = pipeline.fetch(lookback).await;
            pb.finish_and_clear();

            if prices.is_empty() {
                ui::notice(&SnapshotError::EmptyData { days }.to_string());
                return Ok(());
            }

            match out {
                Some(path) => {
                    export::write_csv(&prices, std::fs::File::create(&path)?)?;
                    info!("{} rows written to {}", prices.len(), path.display());
                }
                None => export::write_csv(&prices, std::io::stdout().lock())?,
            }
        }
    }

    Ok(())
}
