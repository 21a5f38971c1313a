use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, bail};
use chrono::NaiveDate;
use ndarray::Array2;
use serde::Deserialize;
use tracing::info;

use crate::application::predictor::TrainingBatch;
use crate::application::runner::TestExample;
use crate::domain::channel::{Channel, TargetMode};
use crate::domain::normalization::NormalizationContext;
use crate::domain::point::FeaturePoint;
use crate::domain::window::WindowBuffer;

/// CSV row layout: date,symbol,open,close,low,high,volume.
#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    symbol: String,
    open: f64,
    close: f64,
    low: f64,
    high: f64,
    volume: f64,
}

/// Ordered daily records split chronologically into a training and a test
/// partition, with per-channel min/max computed over the training partition
/// only. Windows and labels are materialized on demand.
#[derive(Debug)]
pub struct StockDataset {
    points: Vec<FeaturePoint>,
    split: usize,
    window_length: usize,
    context: NormalizationContext,
}

impl StockDataset {
    pub fn from_path(
        path: &Path,
        symbol: Option<&str>,
        window_length: usize,
        split_ratio: f64,
    ) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open dataset {}", path.display()))?;
        Self::from_reader(BufReader::new(file), symbol, window_length, split_ratio)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        symbol: Option<&str>,
        window_length: usize,
        split_ratio: f64,
    ) -> anyhow::Result<Self> {
        if window_length == 0 {
            bail!("window length must be at least 1");
        }
        if !(split_ratio > 0.0 && split_ratio < 1.0) {
            bail!("split ratio must be strictly between 0 and 1, got {split_ratio}");
        }

        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut points = Vec::new();
        for row in csv_reader.deserialize::<CsvRow>() {
            let row = row.context("malformed dataset row")?;
            if symbol.is_some_and(|s| s != row.symbol) {
                continue;
            }
            points.push(FeaturePoint {
                date: row.date,
                open: row.open,
                close: row.close,
                low: row.low,
                high: row.high,
                volume: row.volume,
            });
        }

        let split = (points.len() as f64 * split_ratio) as usize;
        if split == 0 {
            bail!("training partition is empty ({} records)", points.len());
        }
        if points.len() - split <= window_length {
            bail!(
                "test partition too short: {} records after split, need more than window length {}",
                points.len() - split,
                window_length
            );
        }

        let context = NormalizationContext::from_points(&points[..split])?;
        info!(
            total = points.len(),
            train = split,
            test = points.len() - split,
            window_length,
            "Loaded dataset"
        );

        Ok(Self {
            points,
            split,
            window_length,
            context,
        })
    }

    pub fn context(&self) -> &NormalizationContext {
        &self.context
    }

    pub fn window_length(&self) -> usize {
        self.window_length
    }

    pub fn train_len(&self) -> usize {
        self.split
    }

    pub fn test_len(&self) -> usize {
        self.points.len() - self.split
    }

    /// Last test-partition record; the CLI uses its raw channel values as
    /// default exogenous placeholders for the synthetic day.
    pub fn last_point(&self) -> &FeaturePoint {
        &self.points[self.points.len() - 1]
    }

    fn label_values(&self, index: usize, mode: TargetMode) -> Vec<f64> {
        let point = &self.points[index];
        match mode {
            TargetMode::Single(channel) => vec![point.channel(channel)],
            TargetMode::All => Channel::ALL.iter().map(|&c| point.channel(c)).collect(),
        }
    }

    /// Training windows with normalized labels, chronological order.
    pub fn training_batch(&self, mode: TargetMode) -> TrainingBatch {
        let count = self.split.saturating_sub(self.window_length);
        let mut windows = Vec::with_capacity(count);
        let mut labels = Array2::zeros((count, mode.output_dim()));
        for i in 0..count {
            let slice = &self.points[i..i + self.window_length];
            windows.push(WindowBuffer::from_points(slice, &self.context));
            let raw = self.label_values(i + self.window_length, mode);
            for (k, value) in raw.iter().enumerate() {
                let channel = match mode {
                    TargetMode::Single(channel) => channel,
                    TargetMode::All => Channel::ALL[k],
                };
                labels[[i, k]] = self.context.normalize(channel, *value);
            }
        }
        TrainingBatch { windows, labels }
    }

    /// Test windows with raw labels, chronological order. Window i covers
    /// records [split+i, split+i+L) and is labeled by record split+i+L.
    pub fn test_examples(&self, mode: TargetMode) -> Vec<TestExample> {
        let count = self.points.len() - self.split - self.window_length;
        (0..count)
            .map(|i| {
                let start = self.split + i;
                let slice = &self.points[start..start + self.window_length];
                TestExample {
                    window: WindowBuffer::from_points(slice, &self.context),
                    label: self.label_values(start + self.window_length, mode),
                }
            })
            .collect()
    }
}
