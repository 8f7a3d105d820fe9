// Percent change and bucket classification
pub mod classifier;

// Evaluation instant
pub mod clock;

// Domain-specific error types
pub mod errors;

// Tracked symbols
pub mod instrument;

// Port interfaces
pub mod ports;

// Price observations
pub mod price;

// Time-based instrument selection
pub mod rotation;
