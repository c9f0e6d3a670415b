use crate::FpOpsError;
use serde::{Deserialize, Serialize};

/// The IEEE-754 format of a single lane.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatWidth {
    F32,
    F64,
}

impl FloatWidth {
    pub fn bytes(&self) -> usize {
        match self {
            FloatWidth::F32 => 4,
            FloatWidth::F64 => 8,
        }
    }

    /// The name FPCore uses for this format.
    pub fn fpcore_precision(&self) -> &'static str {
        match self {
            FloatWidth::F32 => "binary32",
            FloatWidth::F64 => "binary64",
        }
    }
}

/// The shape of a floating point storage slot. Most slots hold a single float or double, but
/// SIMD slots hold several lanes of the same width. Lane zero is the lowest-addressed lane.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocType {
    Float,
    Floatx2,
    Floatx4,
    Floatx8,
    Double,
    Doublex2,
    Doublex4,
}

impl LocType {
    pub fn new(width: FloatWidth, lanes: usize) -> Result<Self, FpOpsError> {
        match (width, lanes) {
            (FloatWidth::F32, 1) => Ok(LocType::Float),
            (FloatWidth::F32, 2) => Ok(LocType::Floatx2),
            (FloatWidth::F32, 4) => Ok(LocType::Floatx4),
            (FloatWidth::F32, 8) => Ok(LocType::Floatx8),
            (FloatWidth::F64, 1) => Ok(LocType::Double),
            (FloatWidth::F64, 2) => Ok(LocType::Doublex2),
            (FloatWidth::F64, 4) => Ok(LocType::Doublex4),
            _ => Err(FpOpsError::InvalidLaneCount { lanes }),
        }
    }

    /// How many lanes the slot holds
    pub fn capacity(&self) -> usize {
        match self {
            LocType::Float | LocType::Double => 1,
            LocType::Floatx2 | LocType::Doublex2 => 2,
            LocType::Floatx4 | LocType::Doublex4 => 4,
            LocType::Floatx8 => 8,
        }
    }

    pub fn width(&self) -> FloatWidth {
        match self {
            LocType::Float | LocType::Floatx2 | LocType::Floatx4 | LocType::Floatx8 => {
                FloatWidth::F32
            }
            LocType::Double | LocType::Doublex2 | LocType::Doublex4 => FloatWidth::F64,
        }
    }

    /// Size in bytes of one lane
    pub fn el_size(&self) -> usize {
        self.width().bytes()
    }

    /// Size in bytes of the whole slot
    pub fn byte_size(&self) -> usize {
        self.el_size() * self.capacity()
    }

    pub fn is_scalar(&self) -> bool {
        self.capacity() == 1
    }
}

/// Which lanes of a packed operation the real instruction actually computes.
///
/// `Lowest` covers the `F0xN` family of instructions (`addss`, `sqrtsd`, ...), which compute
/// lane zero and copy the remaining lanes through from their first operand.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneMode {
    #[default]
    All,
    Lowest,
}

impl LaneMode {
    pub fn computed(&self, ty: LocType) -> usize {
        match self {
            LaneMode::All => ty.capacity(),
            LaneMode::Lowest => 1,
        }
    }
}
