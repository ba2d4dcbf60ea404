use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use mktintel_snapshot::schema::{CorrelationMatrix, Frame, RollingAverage, RollingBasis};
use mktintel_snapshot::{Asset, Snapshot};
use std::time::Duration;

const CELL: usize = 16;

pub fn spinner(msg: String) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed_precise}]")?);
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

pub fn notice(msg: &str) {
    eprintln!("{} {msg}", "!".yellow().bold());
}

pub fn print_snapshot(snapshot: &Snapshot) {
    let prices = &snapshot.prices;
    if !prices.missing.is_empty() {
        let labels: Vec<&str> = prices.missing.iter().map(|a| a.label()).collect();
        notice(&format!("no data in the window for: {}", labels.join(", ")));
    }

    heading("Prices (raw data)");
    print_frame(prices, |v| format!("{v:.2}"));

    heading("Daily returns (%)");
    print_frame(&snapshot.returns, |v| format!("{v:.2}%"));

    heading("Comparative performance (base 100)");
    print_frame(&snapshot.normalized, |v| format!("{v:.2}"));

    heading("Metrics");
    for m in &snapshot.metrics.per_asset {
        let volatility = m
            .annualized_volatility_pct
            .map(|v| format!("{v:.2}%"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{:<CELL$} {:>12.2} {:>10} | period {:>10} | vol. (ann.) {:>8}",
            m.asset.label(),
            m.latest,
            signed(m.delta_pct),
            signed(m.total_return_pct),
            volatility,
        );
    }
    println!(
        "\nBest performer:  {}\nWorst performer: {}",
        snapshot.metrics.best.label().green().bold(),
        snapshot.metrics.worst.label().red().bold(),
    );

    heading("Correlation of daily returns");
    print_correlation(&snapshot.metrics.correlation);

    if let Some(rolling) = &snapshot.rolling {
        print_rolling(rolling);
    }
}

fn heading(title: &str) {
    println!("\n{}", title.bold().underline());
}

fn signed(pct: f64) -> String {
    let text = format!("{pct:+.2}%");
    if pct >= 0.0 {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

fn print_header(assets: &[Asset]) {
    print!("{:<12}", "Date");
    for asset in assets {
        print!(" {:>CELL$}", asset.label());
    }
    println!();
}

fn print_frame(frame: &Frame, fmt: impl Fn(f64) -> String) {
    print_header(&frame.assets);
    for (date, row) in frame.rows() {
        print!("{:<12}", date.to_string());
        for value in row {
            print!(" {:>CELL$}", fmt(value));
        }
        println!();
    }
}

fn print_correlation(matrix: &CorrelationMatrix) {
    print!("{:<CELL$}", "");
    for asset in &matrix.assets {
        print!(" {:>CELL$}", asset.label());
    }
    println!();
    for (asset, row) in matrix.assets.iter().zip(&matrix.values) {
        print!("{:<CELL$}", asset.label());
        for value in row {
            let cell = if value.is_nan() {
                "n/a".to_string()
            } else {
                format!("{value:.2}")
            };
            print!(" {cell:>CELL$}");
        }
        println!();
    }
}

fn print_rolling(rolling: &RollingAverage) {
    let basis = match rolling.basis {
        RollingBasis::Price => "price",
        RollingBasis::Normalized => "base 100",
    };
    heading(&format!(
        "{}-day moving average of {} ({basis})",
        rolling.window,
        rolling.asset.label()
    ));
    for (date, value) in rolling.dates.iter().zip(&rolling.values) {
        match value {
            Some(v) => println!("{date}  {v:>12.2}"),
            None => println!("{date}  {:>12}", "-"),
        }
    }
}
