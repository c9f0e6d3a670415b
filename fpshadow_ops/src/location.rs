use crate::{FloatWidth, FpOpsError, LocType};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, LowerHex};

/// A place the guest can keep a floating point value, and so a place a shadow can live.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// A slot in the current block's temporary table
    Temp(usize),
    /// A byte offset into the current thread's register file
    Register(u64),
    /// A guest memory address
    Memory(u64),
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Temp(idx) => write!(f, "t{}", idx),
            Location::Register(offset) => write!(f, "reg[{:#x}]", offset),
            Location::Memory(addr) => write!(f, "mem[{:#x}]", addr),
        }
    }
}

/// The raw little-endian contents of a floating point slot, lane zero first.
///
/// In a trace these are written as a hex string, so a double `1.0` is `"000000000000f03f"`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaneBits {
    #[serde(with = "hex")]
    bytes: Vec<u8>,
}

impl LaneBits {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn from_hex<T: AsRef<[u8]>>(data: T) -> Result<Self, FpOpsError> {
        Ok(Self::new(hex::decode(data)?))
    }

    pub fn from_f64s(values: &[f64]) -> Self {
        Self::new(values.iter().flat_map(|v| v.to_le_bytes()).collect())
    }

    pub fn from_f32s(values: &[f32]) -> Self {
        Self::new(values.iter().flat_map(|v| v.to_le_bytes()).collect())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Checks that there are enough bytes to cover every lane of `ty`
    pub fn check_covers(&self, ty: LocType) -> Result<(), FpOpsError> {
        if self.bytes.len() < ty.byte_size() {
            Err(FpOpsError::ShortLaneBits {
                ty,
                expected: ty.byte_size(),
                found: self.bytes.len(),
            })
        } else {
            Ok(())
        }
    }

    /// The bit pattern of one lane, zero-extended to 64 bits
    pub fn lane_bits(&self, lane: usize, width: FloatWidth) -> Option<u64> {
        let size = width.bytes();
        let chunk = self.bytes.get(lane * size..(lane + 1) * size)?;
        match width {
            FloatWidth::F32 => Some(u32::from_le_bytes(chunk.try_into().ok()?) as u64),
            FloatWidth::F64 => Some(u64::from_le_bytes(chunk.try_into().ok()?)),
        }
    }

    /// The value of one lane. Single precision lanes widen exactly.
    pub fn lane_value(&self, lane: usize, width: FloatWidth) -> Option<f64> {
        let bits = self.lane_bits(lane, width)?;
        Some(match width {
            FloatWidth::F32 => f32::from_bits(bits as u32) as f64,
            FloatWidth::F64 => f64::from_bits(bits),
        })
    }
}

impl LowerHex for LaneBits {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.bytes))
    }
}

/// One input to a shadowed operation: where its shadow might live, and what the guest
/// actually holds there.
///
/// An operand with no location is a constant or a value the harness cannot name; it is always
/// bootstrapped from its bits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operand {
    #[serde(default)]
    pub location: Option<Location>,
    pub bits: LaneBits,
}

impl Operand {
    pub fn at(location: Location, bits: LaneBits) -> Self {
        Self {
            location: Some(location),
            bits,
        }
    }

    pub fn constant(bits: LaneBits) -> Self {
        Self {
            location: None,
            bits,
        }
    }
}
