//! stockcast — recursive one-step-ahead forecasting over daily OHLCV records.
//!
//! The core maintains per-channel min-max normalization, steps a stateful
//! recurrent predictor across fixed-length windows in chronological order,
//! and can extend the final window one step past the end of history by
//! feeding the model's own prior prediction back in as an input feature.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
