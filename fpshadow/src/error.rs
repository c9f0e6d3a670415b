use fpshadow_ops::{FpOpsError, OpSite};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FpShadowError {
    #[error("Malformed instrumentation event")]
    Ops(#[from] FpOpsError),
    #[error("Error writing the report")]
    Io(#[from] std::io::Error),
    #[error("Cannot mark the value at {0} as an output: the mark has no source location")]
    UnattributableMark(OpSite),
    #[error("Temporary {index} is outside the temporary table (capacity {capacity})")]
    TempOutOfRange { index: usize, capacity: usize },
    #[error("Working precision of {precision} bits is outside the supported range {min}..={max}")]
    InvalidPrecision { precision: u32, min: u32, max: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("{name} takes {expected} operands but {found} were given")]
    ArityMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },
}
