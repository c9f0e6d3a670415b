use crate::FpShadowError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The smallest working precision accepted. Anything less could not even hold a double exactly.
pub const MIN_PRECISION: u32 = 64;

/// Tunables for a shadow execution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Bits of mantissa in every shadow value
    pub precision: u32,
    /// Bits of error at which an operation site is reported
    pub error_threshold: f64,
    /// Build provenance trees and generalized expressions
    pub report_exprs: bool,
    pub max_expr_depth: usize,
    pub max_print_depth: usize,
    pub max_subsume_depth: usize,
    pub human_readable: bool,
    /// Annotate each FPCore with the precision the guest computed in
    pub typed_bench: bool,
    pub temp_capacity: usize,
    pub output_path: PathBuf,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            precision: 1000,
            error_threshold: 5.0,
            report_exprs: true,
            max_expr_depth: 10,
            max_print_depth: 8,
            max_subsume_depth: 10,
            human_readable: true,
            typed_bench: false,
            temp_capacity: 4096,
            output_path: PathBuf::from("fpshadow.gh"),
        }
    }
}

impl ShadowConfig {
    pub fn validate(&self) -> Result<(), FpShadowError> {
        let max = rug::float::prec_max();
        if self.precision < MIN_PRECISION || self.precision > max {
            return Err(FpShadowError::InvalidPrecision {
                precision: self.precision,
                min: MIN_PRECISION,
                max,
            });
        }
        if self.error_threshold.is_nan() || self.error_threshold < 0.0 {
            return Err(FpShadowError::InvalidConfig(
                "error threshold must be a non-negative number of bits",
            ));
        }
        if self.max_expr_depth == 0 {
            return Err(FpShadowError::InvalidConfig(
                "maximum expression depth must be at least one",
            ));
        }
        if self.temp_capacity == 0 {
            return Err(FpShadowError::InvalidConfig(
                "temporary table needs at least one slot",
            ));
        }
        Ok(())
    }
}
