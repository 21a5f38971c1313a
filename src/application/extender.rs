use crate::domain::channel::Channel;
use crate::domain::errors::ForecastError;
use crate::domain::normalization::NormalizationContext;
use crate::domain::window::WindowBuffer;

/// Tracks whether the synthetic day-after-last row has been appended in the
/// current run. Owned by one run and dropped with it; a new run constructs a
/// fresh state rather than reusing a process-wide flag.
#[derive(Debug, Default)]
pub struct ForecastState {
    extended: bool,
}

impl ForecastState {
    pub fn new() -> Self {
        Self { extended: false }
    }

    pub fn is_extended(&self) -> bool {
        self.extended
    }

    fn mark_extended(&mut self) {
        self.extended = true;
    }
}

/// Raw-unit values for the channels the model does not forecast on the
/// synthetic day. Carries a slot for every channel; the endogenous slot is
/// ignored and overridden by the fed-back prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExogenousPlaceholders {
    pub open: f64,
    pub close: f64,
    pub low: f64,
    pub high: f64,
    pub volume: f64,
}

impl ExogenousPlaceholders {
    pub fn raw(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Open => self.open,
            Channel::Close => self.close,
            Channel::Low => self.low,
            Channel::High => self.high,
            Channel::Volume => self.volume,
        }
    }
}

/// Synthesizes the "day after the last known day" input row and extends the
/// final window with it. The endogenous channel is the model's own previous
/// prediction, taken in raw units and re-normalized, so the model sees its
/// forecast as if it were observed data.
pub struct ForecastExtender<'a> {
    context: &'a NormalizationContext,
    target: Channel,
    placeholders: ExogenousPlaceholders,
}

impl<'a> ForecastExtender<'a> {
    pub fn new(
        context: &'a NormalizationContext,
        target: Channel,
        placeholders: ExogenousPlaceholders,
    ) -> Self {
        Self {
            context,
            target,
            placeholders,
        }
    }

    /// Builds the extended window from the last known window and the raw
    /// predictions produced so far. Returns `Ok(None)` when this run has
    /// already extended; calling twice never yields two distinct extensions.
    pub fn extend(
        &self,
        state: &mut ForecastState,
        window: &WindowBuffer,
        known_predictions: &[f64],
    ) -> Result<Option<WindowBuffer>, ForecastError> {
        if state.is_extended() {
            return Ok(None);
        }
        let fed_back = *known_predictions
            .last()
            .ok_or(ForecastError::ExtensionPrecondition)?;

        // Fresh row, never an edit of a historical record.
        let mut row = [0.0; Channel::COUNT];
        for channel in Channel::ALL {
            let raw = if channel == self.target {
                fed_back
            } else {
                self.placeholders.raw(channel)
            };
            row[channel.index()] = self.context.normalize(channel, raw);
        }

        state.mark_extended();
        Ok(Some(window.advanced(row)))
    }
}
