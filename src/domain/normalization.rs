use crate::domain::channel::Channel;
use crate::domain::errors::ForecastError;
use crate::domain::point::FeaturePoint;

/// Per-channel min-max statistics computed once over the training partition.
/// Immutable after construction, so it can be shared freely across runs.
///
/// No clamping is ever applied: a raw value outside the training range
/// normalizes to a value outside [0, 1] and is processed as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationContext {
    min: [f64; Channel::COUNT],
    max: [f64; Channel::COUNT],
}

impl NormalizationContext {
    /// Builds the context, checking `max > min` for every channel once here
    /// so the per-call transforms stay branch-free.
    pub fn new(
        min: [f64; Channel::COUNT],
        max: [f64; Channel::COUNT],
    ) -> Result<Self, ForecastError> {
        for channel in Channel::ALL {
            let i = channel.index();
            if !(max[i] > min[i]) {
                return Err(ForecastError::NormalizationRange {
                    channel,
                    min: min[i],
                    max: max[i],
                });
            }
        }
        Ok(Self { min, max })
    }

    /// Computes per-channel min/max over `points` and builds the context.
    pub fn from_points(points: &[FeaturePoint]) -> Result<Self, ForecastError> {
        let mut min = [f64::INFINITY; Channel::COUNT];
        let mut max = [f64::NEG_INFINITY; Channel::COUNT];
        for point in points {
            for channel in Channel::ALL {
                let value = point.channel(channel);
                let i = channel.index();
                min[i] = min[i].min(value);
                max[i] = max[i].max(value);
            }
        }
        Self::new(min, max)
    }

    pub fn normalize(&self, channel: Channel, raw: f64) -> f64 {
        let i = channel.index();
        (raw - self.min[i]) / (self.max[i] - self.min[i])
    }

    pub fn denormalize(&self, channel: Channel, value: f64) -> f64 {
        let i = channel.index();
        value * (self.max[i] - self.min[i]) + self.min[i]
    }

    /// Normalizes every channel of one record, in fixed column order.
    pub fn normalize_point(&self, point: &FeaturePoint) -> [f64; Channel::COUNT] {
        let mut row = [0.0; Channel::COUNT];
        for channel in Channel::ALL {
            row[channel.index()] = self.normalize(channel, point.channel(channel));
        }
        row
    }

    pub fn min(&self, channel: Channel) -> f64 {
        self.min[channel.index()]
    }

    pub fn max(&self, channel: Channel) -> f64 {
        self.max[channel.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> NormalizationContext {
        NormalizationContext::new([5.0, 5.0, 5.0, 5.0, 50.0], [20.0, 20.0, 20.0, 20.0, 500.0])
            .unwrap()
    }

    #[test]
    fn normalizes_open_into_unit_range() {
        let ctx = context();
        let normalized = ctx.normalize(Channel::Open, 10.0);
        assert!((normalized - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn round_trip_is_exact_within_tolerance() {
        let ctx = context();
        for channel in Channel::ALL {
            for raw in [5.0, 7.5, 10.0, 19.99, 42.0, -3.0] {
                let back = ctx.denormalize(channel, ctx.normalize(channel, raw));
                assert!(
                    (back - raw).abs() <= 1e-9 * raw.abs().max(1.0),
                    "{channel}: {raw} round-tripped to {back}"
                );
            }
        }
    }

    #[test]
    fn out_of_range_values_are_not_clamped() {
        let ctx = context();
        assert!(ctx.normalize(Channel::Close, 35.0) > 1.0);
        assert!(ctx.normalize(Channel::Close, -5.0) < 0.0);
    }

    #[test]
    fn equal_min_max_is_rejected_at_construction() {
        let err = NormalizationContext::new(
            [5.0, 5.0, 7.0, 5.0, 50.0],
            [20.0, 20.0, 7.0, 20.0, 500.0],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ForecastError::NormalizationRange {
                channel: Channel::Low,
                ..
            }
        ));
    }

    #[test]
    fn inverted_range_reports_both_bounds() {
        let err = NormalizationContext::new(
            [5.0, 5.0, 5.0, 5.0, 500.0],
            [20.0, 20.0, 20.0, 20.0, 50.0],
        )
        .unwrap_err();
        match err {
            ForecastError::NormalizationRange { channel, min, max } => {
                assert_eq!(channel, Channel::Volume);
                assert_eq!(min, 500.0);
                assert_eq!(max, 50.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_point_set_is_rejected() {
        let err = NormalizationContext::from_points(&[]).unwrap_err();
        match err {
            ForecastError::NormalizationRange { min, max, .. } => {
                assert!(min.is_infinite() && max.is_infinite());
                assert!(max < min);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn from_points_uses_observed_extremes() {
        let mut points = Vec::new();
        for i in 0..4 {
            let base = 10.0 + i as f64;
            points.push(FeaturePoint {
                date: chrono::NaiveDate::from_ymd_opt(2020, 1, 1 + i).unwrap(),
                open: base,
                close: base + 0.5,
                low: base - 1.0,
                high: base + 1.0,
                volume: 100.0 * (i + 1) as f64,
            });
        }
        let ctx = NormalizationContext::from_points(&points).unwrap();
        assert_eq!(ctx.min(Channel::Open), 10.0);
        assert_eq!(ctx.max(Channel::Open), 13.0);
        assert_eq!(ctx.min(Channel::Volume), 100.0);
        assert_eq!(ctx.max(Channel::Volume), 400.0);
    }
}
