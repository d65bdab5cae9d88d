//! Synthetic record generators
//!
//! Manufactures earthquake records and submits them through the gateway's
//! HTTP API, never directly to the store, so the whole write path
//! (decoding, magnitude policy, persistence) is exercised.
//!
//! # Modules
//! - `bots`: Record sources: uniform random, interactive operator prompts
//! - `submit`: HTTP client posting records to `/add`
//! - `runner`: The perpetual produce → submit → log → sleep loop

pub mod bots;
pub mod runner;
pub mod submit;

pub use bots::manual::ManualReporter;
pub use bots::random::RandomReporter;
pub use bots::RecordSource;
pub use runner::{run_generator, GeneratorConfig, GeneratorStats};
pub use submit::{SubmitError, Submitter};

/// Crate version constant
pub const VERSION: &str = "1.0.0";
