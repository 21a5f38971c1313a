// Feature channels and target selection
pub mod channel;

// Domain-specific error types
pub mod errors;

// Min-max normalization statistics
pub mod normalization;

// Daily OHLCV records
pub mod point;

// Fixed-length model input windows
pub mod window;
