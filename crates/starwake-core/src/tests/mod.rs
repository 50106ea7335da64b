//! Cross-module tests for the full simulation loop.
//!
//! - `determinism.rs`: same seed and commands give identical runs
//! - `integration.rs`: end-to-end flight, FTL and combat scenarios
//! - `properties.rs`: proptest invariants over arbitrary inputs
//! - `helpers.rs`: scenario setup

mod determinism;
mod helpers;
mod properties;

pub use helpers::*;
