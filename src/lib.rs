//! Operational risk appetite sandbox.
//!
//! Generates synthetic business, loss, and KRI time series from configured
//! distributions, reduces them into a per-day risk profile (Expected /
//! Unexpected Loss plus KRI exceedance), and evaluates the profile against
//! user-defined appetite thresholds. Consumers receive plain record vectors;
//! rendering them is their problem.

pub mod appetite;
pub mod config;
pub mod error;
pub mod generate;
pub mod pipeline;
pub mod profile;
pub mod records;
pub mod sampler;

pub use error::Error;
