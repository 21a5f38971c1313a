use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::application::predictor::{ForecastingModel, StepPredictor, TrainingBatch};
use crate::domain::channel::{Channel, TargetMode};
use crate::domain::window::WindowBuffer;

/// Exponential-smoothing predictor standing where a trained recurrent
/// network would normally sit. It carries an explicit per-output level that
/// advances with every `step`, so call order matters exactly as it does for
/// a real recurrent model, and `reset_state` wipes it between runs.
///
/// Works in normalized units end to end; runners denormalize its output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingPredictor {
    alpha: f64,
    targets: Vec<Channel>,
    level: Vec<Option<f64>>,
}

impl SmoothingPredictor {
    pub fn new(mode: TargetMode, alpha: f64) -> Self {
        let targets = match mode {
            TargetMode::Single(channel) => vec![channel],
            TargetMode::All => Channel::ALL.to_vec(),
        };
        let level = vec![None; targets.len()];
        Self {
            alpha,
            targets,
            level,
        }
    }

    /// Restores a previously saved predictor.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open model file {}", path.display()))?;
        let predictor: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to deserialize model from {}", path.display()))?;
        info!("Loaded smoothing model from {}", path.display());
        Ok(predictor)
    }

    fn smoothed(&mut self, output: usize, observed: f64) -> f64 {
        let next = match self.level[output] {
            Some(previous) => self.alpha * observed + (1.0 - self.alpha) * previous,
            None => observed,
        };
        self.level[output] = Some(next);
        next
    }
}

impl StepPredictor for SmoothingPredictor {
    fn step(&mut self, window: &WindowBuffer) -> anyhow::Result<Array2<f64>> {
        let length = window.len();
        let mut output = Array2::zeros((length, self.targets.len()));
        let targets = self.targets.clone();
        for t in 0..length {
            for (k, channel) in targets.iter().copied().enumerate() {
                let observed = window.rows()[[t, channel.index()]];
                output[[t, k]] = self.smoothed(k, observed);
            }
        }
        Ok(output)
    }

    fn reset_state(&mut self) {
        for level in self.level.iter_mut() {
            *level = None;
        }
    }

    fn name(&self) -> &str {
        "Exponential Smoothing Baseline"
    }
}

impl ForecastingModel for SmoothingPredictor {
    /// Warms the smoothing level by replaying the training windows in order.
    /// There are no weights to learn; this is the whole "training" pass.
    fn fit(&mut self, batch: &TrainingBatch) -> anyhow::Result<()> {
        self.reset_state();
        for window in &batch.windows {
            self.step(window)?;
        }
        debug!(
            windows = batch.windows.len(),
            "Warmed smoothing level on training batch"
        );
        Ok(())
    }

    fn save(&self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create model file {}", path.display()))?;
        serde_json::to_writer(file, self)
            .with_context(|| format!("failed to serialize model to {}", path.display()))?;
        info!("Saved smoothing model to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn window(values: &[f64], channel: Channel) -> WindowBuffer {
        let mut rows = Array2::zeros((values.len(), Channel::COUNT));
        for (t, v) in values.iter().enumerate() {
            rows[[t, channel.index()]] = *v;
        }
        WindowBuffer::from_rows(rows)
    }

    #[test]
    fn first_observation_seeds_the_level() {
        let mut predictor = SmoothingPredictor::new(TargetMode::Single(Channel::Close), 0.5);
        let out = predictor
            .step(&window(&[0.4, 0.8], Channel::Close))
            .unwrap();
        assert_eq!(out[[0, 0]], 0.4);
        assert_eq!(out[[1, 0]], 0.5 * 0.8 + 0.5 * 0.4);
    }

    #[test]
    fn state_persists_across_steps_until_reset() {
        let mut predictor = SmoothingPredictor::new(TargetMode::Single(Channel::Close), 0.5);
        predictor.step(&window(&[0.4], Channel::Close)).unwrap();
        let carried = predictor.step(&window(&[0.8], Channel::Close)).unwrap();
        // Second call smooths against the level left by the first.
        assert_eq!(carried[[0, 0]], 0.5 * 0.8 + 0.5 * 0.4);

        predictor.reset_state();
        let fresh = predictor.step(&window(&[0.8], Channel::Close)).unwrap();
        assert_eq!(fresh[[0, 0]], 0.8);
    }

    #[test]
    fn save_load_round_trip_reproduces_evaluation() {
        let mut predictor = SmoothingPredictor::new(TargetMode::Single(Channel::Close), 0.4);
        // Leave a non-trivial level behind so restoration has state to carry.
        predictor
            .step(&window(&[0.4, 0.8], Channel::Close))
            .unwrap();

        let path = std::env::temp_dir().join(format!(
            "stockcast-model-roundtrip-{}.json",
            std::process::id()
        ));
        predictor.save(&path).unwrap();
        let mut restored = SmoothingPredictor::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let expected = predictor.step(&window(&[0.6], Channel::Close)).unwrap();
        let actual = restored.step(&window(&[0.6], Channel::Close)).unwrap();
        assert_eq!(expected[[0, 0]], actual[[0, 0]]);
    }

    #[test]
    fn all_mode_emits_five_outputs_per_timestep() {
        let mut predictor = SmoothingPredictor::new(TargetMode::All, 0.3);
        let mut rows = Array2::zeros((2, Channel::COUNT));
        for channel in Channel::ALL {
            rows[[0, channel.index()]] = 0.1 * (channel.index() + 1) as f64;
            rows[[1, channel.index()]] = 0.2 * (channel.index() + 1) as f64;
        }
        let out = predictor.step(&WindowBuffer::from_rows(rows)).unwrap();
        assert_eq!(out.ncols(), Channel::COUNT);
        assert_eq!(out.nrows(), 2);
    }
}
