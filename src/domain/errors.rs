use thiserror::Error;

use crate::domain::channel::Channel;

/// Errors raised by the forecasting core. All of them abort the current run;
/// the computation is deterministic and CPU-bound, so nothing is retried.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("degenerate normalization range for {channel}: min {min} is not below max {max}")]
    NormalizationRange { channel: Channel, min: f64, max: f64 },

    #[error("record index {index} out of range for populated length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unsupported target channel {name:?} (expected open, close, low, high, volume or all)")]
    UnsupportedChannel { name: String },

    #[error("forecast extension needs at least one known prediction to feed back")]
    ExtensionPrecondition,

    #[error("step predictor failed")]
    Predictor(#[source] anyhow::Error),
}
