use ndarray::Array2;
use tracing::{debug, info};

use crate::application::extender::{ForecastExtender, ForecastState};
use crate::application::predictor::StepPredictor;
use crate::domain::channel::Channel;
use crate::domain::errors::ForecastError;
use crate::domain::normalization::NormalizationContext;
use crate::domain::window::WindowBuffer;

/// One evaluation example: a model input window plus the raw (denormalized)
/// label for the step right after it. Single-target labels have one entry,
/// all-channels labels have five in fixed column order.
pub struct TestExample {
    pub window: WindowBuffer,
    pub label: Vec<f64>,
}

/// One aligned prediction. `actual` is `None` only for the trailing
/// synthetic record produced by forecast extension.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub index: usize,
    pub predicted: f64,
    pub actual: Option<f64>,
}

/// Predicted and actual series for one channel of a multi-feature run.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSeries {
    pub channel: Channel,
    pub predicted: Vec<f64>,
    pub actual: Vec<f64>,
}

/// Reads the last-timestep output of one `step` call, bounds-checked so a
/// misshapen model output surfaces as an error instead of a silent
/// misalignment.
fn last_timestep(
    predictor: &mut dyn StepPredictor,
    window: &WindowBuffer,
    output_dim: usize,
) -> Result<Vec<f64>, ForecastError> {
    let output: Array2<f64> = predictor.step(window).map_err(ForecastError::Predictor)?;
    let last = window.len().checked_sub(1).ok_or(ForecastError::IndexOutOfRange {
        index: 0,
        len: 0,
    })?;
    if output.nrows() <= last {
        return Err(ForecastError::IndexOutOfRange {
            index: last,
            len: output.nrows(),
        });
    }
    if output.ncols() < output_dim {
        return Err(ForecastError::IndexOutOfRange {
            index: output_dim - 1,
            len: output.ncols(),
        });
    }
    Ok((0..output_dim).map(|k| output[[last, k]]).collect())
}

/// Drives single-channel prediction across the known test windows in
/// chronological order, then optionally performs one forecast extension past
/// the end of history.
///
/// The run is two-phase: phase 1 emits exactly one record per known window;
/// phase 2, only when an extender is supplied, appends exactly one more
/// record built from phase 1's final output. No index variable is shared
/// between the phases.
pub struct SequentialForecastRunner<'a> {
    context: &'a NormalizationContext,
    target: Channel,
}

impl<'a> SequentialForecastRunner<'a> {
    pub fn new(context: &'a NormalizationContext, target: Channel) -> Self {
        Self { context, target }
    }

    pub fn run(
        &self,
        predictor: &mut dyn StepPredictor,
        examples: &[TestExample],
        extender: Option<&ForecastExtender<'_>>,
    ) -> Result<Vec<PredictionRecord>, ForecastError> {
        predictor.reset_state();
        let mut records = Vec::with_capacity(examples.len() + 1);

        // Phase 1: one record per known window, paired with its raw actual.
        for (index, example) in examples.iter().enumerate() {
            let output = last_timestep(predictor, &example.window, 1)?;
            let predicted = self.context.denormalize(self.target, output[0]);
            let actual = *example
                .label
                .first()
                .ok_or(ForecastError::IndexOutOfRange { index: 0, len: 0 })?;
            debug!(index, predicted, actual, "stepped known window");
            records.push(PredictionRecord {
                index,
                predicted,
                actual: Some(actual),
            });
        }

        // Phase 2: one synthetic record beyond history, fed by phase 1's
        // final prediction. The state is fresh for this run by construction.
        if let Some(extender) = extender {
            let last_example = examples.last().ok_or(ForecastError::ExtensionPrecondition)?;
            let known: Vec<f64> = records.iter().map(|r| r.predicted).collect();
            let mut state = ForecastState::new();
            if let Some(extended) = extender.extend(&mut state, &last_example.window, &known)? {
                let output = last_timestep(predictor, &extended, 1)?;
                let predicted = self.context.denormalize(self.target, output[0]);
                info!(predicted, "extended one step beyond known history");
                records.push(PredictionRecord {
                    index: records.len(),
                    predicted,
                    actual: None,
                });
            }
        }

        Ok(records)
    }
}

/// Drives all five channels simultaneously: each step yields a 5-vector,
/// denormalized per channel and regrouped into five parallel series in fixed
/// channel order. Forecast extension is not defined for this mode.
pub struct MultiFeatureForecastRunner<'a> {
    context: &'a NormalizationContext,
}

impl<'a> MultiFeatureForecastRunner<'a> {
    pub fn new(context: &'a NormalizationContext) -> Self {
        Self { context }
    }

    pub fn run(
        &self,
        predictor: &mut dyn StepPredictor,
        examples: &[TestExample],
    ) -> Result<Vec<ChannelSeries>, ForecastError> {
        predictor.reset_state();
        let mut series: Vec<ChannelSeries> = Channel::ALL
            .iter()
            .map(|&channel| ChannelSeries {
                channel,
                predicted: Vec::with_capacity(examples.len()),
                actual: Vec::with_capacity(examples.len()),
            })
            .collect();

        for example in examples {
            let output = last_timestep(predictor, &example.window, Channel::COUNT)?;
            if example.label.len() < Channel::COUNT {
                return Err(ForecastError::IndexOutOfRange {
                    index: Channel::COUNT - 1,
                    len: example.label.len(),
                });
            }
            for channel in Channel::ALL {
                let i = channel.index();
                series[i]
                    .predicted
                    .push(self.context.denormalize(channel, output[i]));
                series[i].actual.push(example.label[i]);
            }
        }

        Ok(series)
    }
}
