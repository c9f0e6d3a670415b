use crate::{LocType, ShadowOp};
use thiserror::Error;

/// An error constructing or decoding something that is about to be handed to the shadow runtime
#[derive(Debug, Error)]
pub enum FpOpsError {
    /// A catalog name did not match any [`ShadowOp`](crate::ShadowOp)
    #[error("`{0}` is not a shadowed operation")]
    UnknownOperation(String),
    /// Locations only come in 1, 2, 4 or 8 lanes, and only some of those exist for each width
    #[error("no location type holds {lanes} lanes of that width")]
    InvalidLaneCount { lanes: usize },
    /// An operation event carried the wrong number of operands for its operation
    #[error("{op} takes {expected} operands but {found} were given")]
    ArityMismatch {
        op: ShadowOp,
        expected: usize,
        found: usize,
    },
    /// Concrete bits did not cover every lane of the location type
    #[error("{ty:?} needs {expected} bytes of concrete data but only {found} were given")]
    ShortLaneBits {
        ty: LocType,
        expected: usize,
        found: usize,
    },
    #[error("Malformed hex in concrete lane data")]
    Hex(#[from] hex::FromHexError),
}
