use serde::{Deserialize, Serialize};

/// A rounding mode operand as the guest instruction encodes it.
///
/// The nearest-with-tie variants and "prepare for shorter precision" have no distinct
/// high-precision counterpart; the shadow runtime rounds those to nearest.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestRounding {
    #[default]
    Nearest,
    NearestTieAway,
    NearestTieZero,
    PrepareShorter,
    NegInf,
    PosInf,
    Zero,
    AwayFromZero,
}
