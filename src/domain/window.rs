use ndarray::{Array2, ArrayView2, s};

use crate::domain::channel::Channel;
use crate::domain::normalization::NormalizationContext;
use crate::domain::point::FeaturePoint;

/// A fixed-length trailing history of normalized feature rows, shape L×5,
/// in chronological order. This is the exact tensor handed to the model
/// for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowBuffer {
    rows: Array2<f64>,
}

impl WindowBuffer {
    /// Normalizes a contiguous chronological slice of records into a window.
    pub fn from_points(points: &[FeaturePoint], context: &NormalizationContext) -> Self {
        let mut rows = Array2::zeros((points.len(), Channel::COUNT));
        for (t, point) in points.iter().enumerate() {
            let normalized = context.normalize_point(point);
            for channel in Channel::ALL {
                rows[[t, channel.index()]] = normalized[channel.index()];
            }
        }
        Self { rows }
    }

    /// Wraps an already-normalized L×5 matrix.
    pub fn from_rows(rows: Array2<f64>) -> Self {
        debug_assert_eq!(rows.ncols(), Channel::COUNT);
        Self { rows }
    }

    /// Window length L.
    pub fn len(&self) -> usize {
        self.rows.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.nrows() == 0
    }

    pub fn rows(&self) -> ArrayView2<'_, f64> {
        self.rows.view()
    }

    /// Derived window anchored one step later: drops the earliest row and
    /// appends `row` at the tail, preserving length L. Used only when the
    /// final window is extended past the end of history.
    pub fn advanced(&self, row: [f64; Channel::COUNT]) -> Self {
        assert!(!self.is_empty(), "cannot advance an empty window");
        let length = self.rows.nrows();
        let mut rows = Array2::zeros((length, Channel::COUNT));
        rows.slice_mut(s![..length - 1, ..])
            .assign(&self.rows.slice(s![1.., ..]));
        for channel in Channel::ALL {
            rows[[length - 1, channel.index()]] = row[channel.index()];
        }
        Self { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn context() -> NormalizationContext {
        NormalizationContext::new([0.0; 5], [10.0, 10.0, 10.0, 10.0, 1000.0]).unwrap()
    }

    fn point(day: u32, value: f64) -> FeaturePoint {
        FeaturePoint {
            date: NaiveDate::from_ymd_opt(2021, 3, day).unwrap(),
            open: value,
            close: value,
            low: value,
            high: value,
            volume: value * 100.0,
        }
    }

    #[test]
    fn builds_normalized_rows_in_chronological_order() {
        let points = vec![point(1, 2.0), point(2, 5.0), point(3, 10.0)];
        let window = WindowBuffer::from_points(&points, &context());
        assert_eq!(window.len(), 3);
        assert_eq!(window.rows()[[0, Channel::Open.index()]], 0.2);
        assert_eq!(window.rows()[[1, Channel::Close.index()]], 0.5);
        assert_eq!(window.rows()[[2, Channel::High.index()]], 1.0);
        assert_eq!(window.rows()[[1, Channel::Volume.index()]], 0.5);
    }

    #[test]
    #[should_panic(expected = "cannot advance an empty window")]
    fn advancing_an_empty_window_panics() {
        let window = WindowBuffer::from_rows(ndarray::Array2::zeros((0, Channel::COUNT)));
        window.advanced([0.0; Channel::COUNT]);
    }

    #[test]
    fn advanced_drops_head_and_appends_tail() {
        let points = vec![point(1, 1.0), point(2, 2.0), point(3, 3.0)];
        let window = WindowBuffer::from_points(&points, &context());
        let next = window.advanced([0.9, 0.8, 0.7, 0.6, 0.5]);

        assert_eq!(next.len(), 3);
        // Former second row is now first.
        assert_eq!(
            next.rows()[[0, Channel::Open.index()]],
            window.rows()[[1, Channel::Open.index()]]
        );
        // Appended row sits at the tail.
        assert_eq!(next.rows()[[2, Channel::Open.index()]], 0.9);
        assert_eq!(next.rows()[[2, Channel::Volume.index()]], 0.5);
        // The source window is untouched.
        assert_eq!(window.rows()[[0, Channel::Open.index()]], 0.1);
    }
}
