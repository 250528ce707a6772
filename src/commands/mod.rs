//! Command implementations for the CLI
//!
//! - start: Start the valuation API server
//! - estimate: One-shot estimate with explanation
//! - neighborhoods: List the curated neighborhoods
//! - test: Validate configuration and load the model
//! - config: Configuration display and validation

pub mod config;
pub mod estimate;
pub mod neighborhoods;
pub mod start;
pub mod test;
