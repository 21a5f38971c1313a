use std::path::Path;

use ndarray::Array2;

use crate::domain::window::WindowBuffer;

/// A batch of training windows with their normalized labels, shape
/// (examples, output_dim). Labels are normalized because the model learns
/// in normalized units; raw actuals only appear on the evaluation side.
pub struct TrainingBatch {
    pub windows: Vec<WindowBuffer>,
    pub labels: Array2<f64>,
}

/// Contract for the stateful recurrent inference unit.
///
/// `step` advances internal memory with every call, so windows must be
/// presented one at a time in chronological order. The `&mut self` receiver
/// makes the recurrence visible in the signature rather than hiding it as
/// ambient object state.
pub trait StepPredictor {
    /// Runs one window through the model and returns per-timestep outputs,
    /// shape (window length, output_dim). Runners read the last timestep.
    fn step(&mut self, window: &WindowBuffer) -> anyhow::Result<Array2<f64>>;

    /// Clears recurrent memory. Must be called before reusing the predictor
    /// across independent evaluation passes, otherwise state leaks from one
    /// run into the next.
    fn reset_state(&mut self);

    fn name(&self) -> &str;
}

/// A trainable, persistable predictor. Architecture and training algorithm
/// live behind this trait; the forecasting engine never looks inside.
pub trait ForecastingModel: StepPredictor {
    fn fit(&mut self, batch: &TrainingBatch) -> anyhow::Result<()>;

    /// Persists the model to durable storage as an opaque blob.
    fn save(&self, path: &Path) -> anyhow::Result<()>;
}
