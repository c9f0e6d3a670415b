//! A shadow-value runtime for finding floating point error in running programs.
//!
//! Every floating point operation the instrumentation reports is recomputed on high-precision
//! shadow values. The runtime measures how far the program's own results drift from the
//! shadows, remembers which operations produced every shadow, and generalizes those histories
//! into expressions explaining where the error came from.

mod config;
mod context;
mod error;
pub mod evaluate;
mod executor;
pub mod marks;
pub mod real;
pub mod report;
pub mod shadow;
pub mod site;
pub mod storage;
pub mod tea;

#[cfg(test)]
mod tests;

pub use fpshadow_ops as ops;

pub use config::{MIN_PRECISION, ShadowConfig};
pub use context::ShadowContext;
pub use error::FpShadowError;
pub use report::Report;
