// Reference predictor (exponential smoothing)
pub mod baseline;

// Beyond-history forecast extension
pub mod extender;

// Model contracts
pub mod predictor;

// Evaluation runners
pub mod runner;
