//! Headless forecasting run: load a daily OHLCV CSV, warm the baseline
//! predictor on the training partition, evaluate over the held-out windows
//! and optionally extrapolate one day past the last known record.
//!
//! # Usage
//! ```sh
//! cargo run --bin forecast -- --data data/prices.csv --target close --extend
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use stockcast::application::baseline::SmoothingPredictor;
use stockcast::application::extender::{ExogenousPlaceholders, ForecastExtender};
use stockcast::application::predictor::{ForecastingModel, StepPredictor};
use stockcast::application::runner::{MultiFeatureForecastRunner, SequentialForecastRunner};
use stockcast::config::ForecastConfig;
use stockcast::domain::channel::TargetMode;
use stockcast::infrastructure::dataset::StockDataset;
use stockcast::infrastructure::report::{
    ChartRenderer, CsvReportWriter, LogRenderer, series_columns, split_records,
};
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the daily OHLCV CSV (date,symbol,open,close,low,high,volume)
    #[arg(long)]
    data: PathBuf,

    /// Only use rows for this symbol
    #[arg(long)]
    symbol: Option<String>,

    /// Time-series window length (trading days)
    #[arg(long, default_value_t = 22)]
    window_length: usize,

    /// Fraction of records used for training
    #[arg(long, default_value_t = 0.9)]
    split_ratio: f64,

    /// Target to forecast: open, close, low, high, volume or all
    #[arg(long, default_value = "close")]
    target: String,

    /// Append one beyond-history forecast after the known windows
    #[arg(long)]
    extend: bool,

    /// Exogenous open for the synthetic day (default: last known open)
    #[arg(long)]
    next_open: Option<f64>,

    /// Exogenous close for the synthetic day (default: last known close)
    #[arg(long)]
    next_close: Option<f64>,

    /// Exogenous low for the synthetic day (default: last known low)
    #[arg(long)]
    next_low: Option<f64>,

    /// Exogenous high for the synthetic day (default: last known high)
    #[arg(long)]
    next_high: Option<f64>,

    /// Exogenous volume for the synthetic day (default: last known volume)
    #[arg(long)]
    next_volume: Option<f64>,

    /// Smoothing factor of the baseline predictor
    #[arg(long, default_value_t = 0.4)]
    alpha: f64,

    /// Where to save the fitted model as JSON
    #[arg(long)]
    model_out: Option<PathBuf>,

    /// Evaluate a previously saved model instead of fitting a fresh one
    #[arg(long)]
    model_in: Option<PathBuf>,

    /// Directory for per-series prediction reports
    #[arg(long, default_value = "reports")]
    out: PathBuf,
}

fn main() -> Result<()> {
    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let args = Args::parse();
    info!("stockcast {} starting...", env!("CARGO_PKG_VERSION"));

    let target: TargetMode = args.target.parse()?;

    info!("Loading dataset from {}...", args.data.display());
    let dataset = StockDataset::from_path(
        &args.data,
        args.symbol.as_deref(),
        args.window_length,
        args.split_ratio,
    )?;

    // Unspecified placeholders fall back to the last known raw values.
    let last = dataset.last_point();
    let placeholders = ExogenousPlaceholders {
        open: args.next_open.unwrap_or(last.open),
        close: args.next_close.unwrap_or(last.close),
        low: args.next_low.unwrap_or(last.low),
        high: args.next_high.unwrap_or(last.high),
        volume: args.next_volume.unwrap_or(last.volume),
    };

    let config = ForecastConfig {
        window_length: args.window_length,
        split_ratio: args.split_ratio,
        target,
        extend: args.extend,
        placeholders: Some(placeholders),
    };
    config.validate()?;

    let mut predictor = match &args.model_in {
        Some(path) => SmoothingPredictor::load(path)?,
        None => {
            let mut fitted = SmoothingPredictor::new(target, args.alpha);
            info!("Fitting {} (alpha={})...", fitted.name(), args.alpha);
            fitted.fit(&dataset.training_batch(target))?;
            fitted
        }
    };

    if let Some(path) = &args.model_out {
        predictor.save(path)?;
        // Evaluate what was actually persisted, not the in-memory twin.
        predictor = SmoothingPredictor::load(path)?;
    }

    let examples = dataset.test_examples(target);
    info!("Evaluating over {} test windows...", examples.len());

    let mut csv_writer = CsvReportWriter::new(args.out.clone());
    let mut log_renderer = LogRenderer;

    match target {
        TargetMode::Single(channel) => {
            let runner = SequentialForecastRunner::new(dataset.context(), channel);
            let extender = ForecastExtender::new(dataset.context(), channel, placeholders);
            let extension = config.extend.then_some(&extender);
            let records = runner.run(&mut predictor, &examples, extension)?;

            let (predicted, actual) = split_records(&records);
            log_renderer.render(channel.series_label(), &predicted, &actual)?;
            csv_writer.render(channel.series_label(), &predicted, &actual)?;
        }
        TargetMode::All => {
            let runner = MultiFeatureForecastRunner::new(dataset.context());
            let series = runner.run(&mut predictor, &examples)?;
            for one in &series {
                let (predicted, actual) = series_columns(one);
                log_renderer.render(one.channel.series_label(), &predicted, &actual)?;
                csv_writer.render(one.channel.series_label(), &predicted, &actual)?;
            }
        }
    }

    info!("Done.");
    Ok(())
}
