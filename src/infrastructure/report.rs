use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;
use tracing::info;

use crate::application::runner::{ChannelSeries, PredictionRecord};

/// Sink for one rendered series of aligned predictions. Whatever artifact it
/// produces is not consumed by the forecasting engine, and already-rendered
/// output stays in place when a later run fails.
pub trait ChartRenderer {
    fn render(
        &mut self,
        label: &str,
        predicted: &[f64],
        actual: &[Option<f64>],
    ) -> anyhow::Result<()>;
}

#[derive(Debug, Serialize)]
struct ReportRow {
    index: usize,
    predicted: f64,
    actual: Option<f64>,
}

/// Writes one `<label>.csv` per rendered series, absent actuals left empty.
pub struct CsvReportWriter {
    directory: PathBuf,
}

impl CsvReportWriter {
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    fn file_name(label: &str) -> String {
        let slug: String = label
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        format!("{slug}.csv")
    }
}

impl ChartRenderer for CsvReportWriter {
    fn render(
        &mut self,
        label: &str,
        predicted: &[f64],
        actual: &[Option<f64>],
    ) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.directory).with_context(|| {
            format!("failed to create report directory {}", self.directory.display())
        })?;
        let path = self.directory.join(Self::file_name(label));
        let file = File::create(&path)
            .with_context(|| format!("failed to create report {}", path.display()))?;
        let mut writer = csv::Writer::from_writer(file);
        for (index, (&predicted, &actual)) in predicted.iter().zip(actual).enumerate() {
            writer.serialize(ReportRow {
                index,
                predicted,
                actual,
            })?;
        }
        writer.flush()?;
        info!(rows = predicted.len(), path = %path.display(), "Wrote report");
        Ok(())
    }
}

/// Logs `predicted,actual` lines through tracing instead of producing a file.
pub struct LogRenderer;

impl ChartRenderer for LogRenderer {
    fn render(
        &mut self,
        label: &str,
        predicted: &[f64],
        actual: &[Option<f64>],
    ) -> anyhow::Result<()> {
        info!("{label}: predicted,actual");
        for (&predicted, &actual) in predicted.iter().zip(actual) {
            match actual {
                Some(actual) => info!("{predicted},{actual}"),
                None => info!("{predicted},(beyond history)"),
            }
        }
        Ok(())
    }
}

/// Splits aligned records into the parallel series renderers expect.
pub fn split_records(records: &[PredictionRecord]) -> (Vec<f64>, Vec<Option<f64>>) {
    let predicted = records.iter().map(|r| r.predicted).collect();
    let actual = records.iter().map(|r| r.actual).collect();
    (predicted, actual)
}

/// Adapts one channel series of a multi-feature run for rendering.
pub fn series_columns(series: &ChannelSeries) -> (Vec<f64>, Vec<Option<f64>>) {
    (
        series.predicted.clone(),
        series.actual.iter().copied().map(Some).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::channel::Channel;

    #[test]
    fn splits_records_preserving_absent_actuals() {
        let records = vec![
            PredictionRecord {
                index: 0,
                predicted: 1.0,
                actual: Some(1.1),
            },
            PredictionRecord {
                index: 1,
                predicted: 2.0,
                actual: None,
            },
        ];
        let (predicted, actual) = split_records(&records);
        assert_eq!(predicted, vec![1.0, 2.0]);
        assert_eq!(actual, vec![Some(1.1), None]);
    }

    #[test]
    fn series_columns_mark_every_actual_present() {
        let series = ChannelSeries {
            channel: Channel::Open,
            predicted: vec![1.0],
            actual: vec![1.5],
        };
        let (_, actual) = series_columns(&series);
        assert_eq!(actual, vec![Some(1.5)]);
    }

    #[test]
    fn file_names_are_slugged() {
        assert_eq!(CsvReportWriter::file_name("Stock CLOSE Price"), "stock_close_price.csv");
    }
}
