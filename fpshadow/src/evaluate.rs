//! Scoring a shadow value against what the guest actually computed.

use fpshadow_ops::FloatWidth;
use rug::Float;
use serde::Serialize;

/// The distance reported between a NaN and anything that is not a NaN
pub const MAX_ULPS: u64 = u64::MAX - 1;

/// Distance in units of the last place between two doubles.
///
/// Signed zeros are the same point. Two NaNs are no distance apart, and a NaN is as far as
/// possible from every number.
pub fn ulps_f64(x: f64, y: f64) -> u64 {
    let (x, y) = (fold_zero_f64(x), fold_zero_f64(y));
    match (x.is_nan(), y.is_nan()) {
        (true, true) => 0,
        (true, false) | (false, true) => MAX_ULPS,
        (false, false) => ordered_f64(x).abs_diff(ordered_f64(y)),
    }
}

/// Distance in units of the last place between two singles, with the same conventions as
/// [`ulps_f64`]
pub fn ulps_f32(x: f32, y: f32) -> u64 {
    let (x, y) = (fold_zero_f32(x), fold_zero_f32(y));
    match (x.is_nan(), y.is_nan()) {
        (true, true) => 0,
        (true, false) | (false, true) => MAX_ULPS,
        (false, false) => ordered_f32(x).abs_diff(ordered_f32(y)) as u64,
    }
}

fn fold_zero_f64(x: f64) -> f64 {
    if x == 0.0 { 0.0 } else { x }
}

fn fold_zero_f32(x: f32) -> f32 {
    if x == 0.0 { 0.0 } else { x }
}

// Maps the sign-magnitude bit pattern onto a signed integer line where adjacent floats are
// adjacent integers.
fn ordered_f64(x: f64) -> i64 {
    let bits = x.to_bits() as i64;
    if bits < 0 { i64::MIN.wrapping_sub(bits) } else { bits }
}

fn ordered_f32(x: f32) -> i32 {
    let bits = x.to_bits() as i32;
    if bits < 0 { i32::MIN.wrapping_sub(bits) } else { bits }
}

/// `log2(ulps + 1)`, evaluated without losing the low bits of large distances
pub fn bits_of_error(ulps: u64) -> f64 {
    Float::with_val(65, u128::from(ulps) + 1).log2().to_f64()
}

/// The error of one lane of one operation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LaneError {
    /// The shadow, rounded to the guest's format
    pub shadow: f64,
    pub computed: f64,
    pub ulps: u64,
    pub bits: f64,
}

/// Rounds the shadow to `width` and measures how far the guest's value is from it
pub fn lane_error(shadow: &Float, computed: f64, width: FloatWidth) -> LaneError {
    let (rounded, ulps) = match width {
        FloatWidth::F32 => {
            let rounded = shadow.to_f32();
            (rounded as f64, ulps_f32(rounded, computed as f32))
        }
        FloatWidth::F64 => {
            let rounded = shadow.to_f64();
            (rounded, ulps_f64(rounded, computed))
        }
    };
    LaneError {
        shadow: rounded,
        computed,
        ulps,
        bits: bits_of_error(ulps),
    }
}

/// Running error statistics, in bits.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct ErrorAggregate {
    pub max_error: f64,
    pub total_error: f64,
    pub num_evals: u64,
}

impl ErrorAggregate {
    pub fn update(&mut self, bits: f64) {
        if bits > self.max_error {
            self.max_error = bits;
        }
        self.total_error += bits;
        self.num_evals += 1;
    }

    pub fn average(&self) -> f64 {
        if self.num_evals == 0 {
            0.0
        } else {
            self.total_error / self.num_evals as f64
        }
    }
}
