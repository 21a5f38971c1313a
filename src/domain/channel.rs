use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::ForecastError;

/// One of the five tracked daily features. The discriminant order is the
/// column order of every window matrix and min/max array in the crate and
/// must match the order used when the model was trained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Open,
    Close,
    Low,
    High,
    Volume,
}

impl Channel {
    pub const COUNT: usize = 5;

    /// All channels in fixed column order.
    pub const ALL: [Channel; Channel::COUNT] = [
        Channel::Open,
        Channel::Close,
        Channel::Low,
        Channel::High,
        Channel::Volume,
    ];

    /// Column index of this channel in window matrices and stat arrays.
    pub fn index(self) -> usize {
        match self {
            Channel::Open => 0,
            Channel::Close => 1,
            Channel::Low => 2,
            Channel::High => 3,
            Channel::Volume => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Open => "open",
            Channel::Close => "close",
            Channel::Low => "low",
            Channel::High => "high",
            Channel::Volume => "volume",
        }
    }

    /// Human-readable series label for reports and charts.
    pub fn series_label(self) -> &'static str {
        match self {
            Channel::Open => "Stock OPEN Price",
            Channel::Close => "Stock CLOSE Price",
            Channel::Low => "Stock LOW Price",
            Channel::High => "Stock HIGH Price",
            Channel::Volume => "Stock VOLUME Amount",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Channel::Open),
            "close" => Ok(Channel::Close),
            "low" => Ok(Channel::Low),
            "high" => Ok(Channel::High),
            "volume" => Ok(Channel::Volume),
            _ => Err(ForecastError::UnsupportedChannel {
                name: s.to_string(),
            }),
        }
    }
}

/// What the model forecasts: a single channel or all five at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetMode {
    Single(Channel),
    All,
}

impl TargetMode {
    /// Width of the model output vector this mode expects per timestep.
    pub fn output_dim(self) -> usize {
        match self {
            TargetMode::Single(_) => 1,
            TargetMode::All => Channel::COUNT,
        }
    }
}

impl fmt::Display for TargetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetMode::Single(channel) => f.write_str(channel.name()),
            TargetMode::All => f.write_str("all"),
        }
    }
}

impl FromStr for TargetMode {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(TargetMode::All)
        } else {
            Ok(TargetMode::Single(s.parse()?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_indices_match_fixed_order() {
        for (i, channel) in Channel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i);
        }
    }

    #[test]
    fn parses_known_channels_case_insensitively() {
        assert_eq!("CLOSE".parse::<Channel>().unwrap(), Channel::Close);
        assert_eq!("volume".parse::<Channel>().unwrap(), Channel::Volume);
        assert_eq!("all".parse::<TargetMode>().unwrap(), TargetMode::All);
        assert_eq!(
            "open".parse::<TargetMode>().unwrap(),
            TargetMode::Single(Channel::Open)
        );
    }

    #[test]
    fn rejects_unknown_channel() {
        let err = "adjusted_close".parse::<Channel>().unwrap_err();
        assert!(matches!(
            err,
            ForecastError::UnsupportedChannel { ref name } if name == "adjusted_close"
        ));
    }
}
