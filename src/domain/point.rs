use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::channel::Channel;

/// One daily record as read from the dataset. Immutable once loaded; a
/// synthesized future day is always a freshly constructed value, never an
/// edit of an existing point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub low: f64,
    pub high: f64,
    pub volume: f64,
}

impl FeaturePoint {
    /// Raw value of the given channel.
    pub fn channel(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Open => self.open,
            Channel::Close => self.close,
            Channel::Low => self.low,
            Channel::High => self.high,
            Channel::Volume => self.volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_accessor_follows_fixed_order() {
        let point = FeaturePoint {
            date: NaiveDate::from_ymd_opt(2017, 7, 26).unwrap(),
            open: 1.0,
            close: 2.0,
            low: 3.0,
            high: 4.0,
            volume: 5.0,
        };
        let values: Vec<f64> = Channel::ALL.iter().map(|c| point.channel(*c)).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }
}
