use anyhow::bail;

use crate::application::extender::ExogenousPlaceholders;
use crate::domain::channel::TargetMode;

/// Settings for one forecasting pass, validated once before any run starts.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// Time-series window length L; 22 approximates one month of trading days.
    pub window_length: usize,
    /// Chronological train/test split, e.g. 0.9 for 90% training.
    pub split_ratio: f64,
    pub target: TargetMode,
    /// Whether to append one beyond-history forecast after the known windows.
    pub extend: bool,
    /// Raw exogenous values for the synthetic day; required when extending.
    pub placeholders: Option<ExogenousPlaceholders>,
}

impl ForecastConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.window_length == 0 {
            bail!("window length must be at least 1");
        }
        if !(self.split_ratio > 0.0 && self.split_ratio < 1.0) {
            bail!(
                "split ratio must be strictly between 0 and 1, got {}",
                self.split_ratio
            );
        }
        if self.extend {
            if self.target == TargetMode::All {
                bail!("forecast extension is not defined for all-channels mode");
            }
            if self.placeholders.is_none() {
                bail!("forecast extension requires exogenous placeholder values");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::channel::Channel;

    fn base() -> ForecastConfig {
        ForecastConfig {
            window_length: 22,
            split_ratio: 0.9,
            target: TargetMode::Single(Channel::Close),
            extend: false,
            placeholders: None,
        }
    }

    #[test]
    fn accepts_a_plain_evaluation_config() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn rejects_extension_in_all_channels_mode() {
        let config = ForecastConfig {
            target: TargetMode::All,
            extend: true,
            placeholders: Some(ExogenousPlaceholders {
                open: 1.0,
                close: 1.0,
                low: 1.0,
                high: 1.0,
                volume: 1.0,
            }),
            ..base()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_extension_without_placeholders() {
        let config = ForecastConfig {
            extend: true,
            ..base()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_window() {
        let config = ForecastConfig {
            window_length: 0,
            ..base()
        };
        assert!(config.validate().is_err());
    }
}
