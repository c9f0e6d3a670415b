//! High-precision semantics of every shadowed operation.

use fpshadow_ops::{GuestRounding, ShadowOp};
use rug::Float;
use rug::float::Round;
use rug::ops::{AssignRound, Pow};
use std::cmp::Ordering;

/// The high-precision rounding mode matching a guest rounding operand.
///
/// Tie-breaking variants and "prepare for shorter precision" only differ from round-to-nearest
/// at the guest's precision, so they all round to nearest here.
pub fn to_round(rounding: GuestRounding) -> Round {
    match rounding {
        GuestRounding::Nearest
        | GuestRounding::NearestTieAway
        | GuestRounding::NearestTieZero
        | GuestRounding::PrepareShorter => Round::Nearest,
        GuestRounding::NegInf => Round::Down,
        GuestRounding::PosInf => Round::Up,
        GuestRounding::Zero => Round::Zero,
        GuestRounding::AwayFromZero => Round::AwayZero,
    }
}

fn at<T>(precision: u32, round: Round, val: T) -> Float
where
    Float: AssignRound<T, Round = Round, Ordering = Ordering>,
{
    Float::with_val_round(precision, val, round).0
}

/// Computes `op` over the operands at `precision` bits. Returns `None` if the number of operands
/// is wrong for the operation.
pub fn compute(
    op: ShadowOp,
    args: &[&Float],
    rounding: GuestRounding,
    precision: u32,
) -> Option<Float> {
    let p = precision;
    let r = to_round(rounding);
    let one = || Float::with_val(p, 1);
    let two = || Float::with_val(p, 2);
    let result = match (op, args) {
        (ShadowOp::Add, &[a, b]) => at(p, r, a + b),
        (ShadowOp::Sub, &[a, b]) => at(p, r, a - b),
        (ShadowOp::Mul, &[a, b]) => at(p, r, a * b),
        (ShadowOp::Div, &[a, b]) => at(p, r, a / b),
        (ShadowOp::Fma, &[a, b, c]) => at(p, r, a.mul_add_ref(b, c)),
        (ShadowOp::Fms, &[a, b, c]) => at(p, r, a.mul_sub_ref(b, c)),
        (ShadowOp::Neg, &[a]) => at(p, r, -a),
        (ShadowOp::Abs, &[a]) => at(p, r, a.abs_ref()),
        (ShadowOp::Min, &[a, b]) => at(p, r, a.min_ref(b)),
        (ShadowOp::Max, &[a, b]) => at(p, r, a.max_ref(b)),
        (ShadowOp::Sqrt, &[a]) => at(p, r, a.sqrt_ref()),
        (ShadowOp::Cbrt, &[a]) => at(p, r, a.cbrt_ref()),
        // The estimates are shadowed by the exact values they estimate
        (ShadowOp::RecipEst, &[a]) => at(p, r, a.recip_ref()),
        (ShadowOp::RSqrtEst, &[a]) => at(p, r, a.recip_sqrt_ref()),
        // 2 - a*b
        (ShadowOp::RecipStep, &[a, b]) => {
            let neg = Float::with_val(a.prec(), -a);
            at(p, r, neg.mul_add_ref(b, &two()))
        }
        // (3 - a*b) / 2
        (ShadowOp::RSqrtStep, &[a, b]) => {
            let neg = Float::with_val(a.prec(), -a);
            let diff = at(p, r, neg.mul_add_ref(b, &Float::with_val(p, 3)));
            at(p, r, &diff / &two())
        }
        (ShadowOp::Sin, &[a]) => at(p, r, a.sin_ref()),
        (ShadowOp::Cos, &[a]) => at(p, r, a.cos_ref()),
        (ShadowOp::Tan, &[a]) => at(p, r, a.tan_ref()),
        (ShadowOp::Asin, &[a]) => at(p, r, a.asin_ref()),
        (ShadowOp::Acos, &[a]) => at(p, r, a.acos_ref()),
        (ShadowOp::Atan, &[a]) => at(p, r, a.atan_ref()),
        (ShadowOp::Atan2, &[y, x]) => at(p, r, y.atan2_ref(x)),
        (ShadowOp::Sinh, &[a]) => at(p, r, a.sinh_ref()),
        (ShadowOp::Cosh, &[a]) => at(p, r, a.cosh_ref()),
        (ShadowOp::Tanh, &[a]) => at(p, r, a.tanh_ref()),
        (ShadowOp::Asinh, &[a]) => at(p, r, a.asinh_ref()),
        (ShadowOp::Acosh, &[a]) => at(p, r, a.acosh_ref()),
        (ShadowOp::Atanh, &[a]) => at(p, r, a.atanh_ref()),
        (ShadowOp::Exp, &[a]) => at(p, r, a.exp_ref()),
        (ShadowOp::Exp2, &[a]) => at(p, r, a.exp2_ref()),
        (ShadowOp::Expm1, &[a]) => at(p, r, a.exp_m1_ref()),
        (ShadowOp::Exp2M1, &[a]) => {
            let pow = at(p, r, a.exp2_ref());
            at(p, r, &pow - &one())
        }
        (ShadowOp::RecipExp, &[a]) => {
            let neg = at(p, r, -a);
            at(p, r, neg.exp_ref())
        }
        (ShadowOp::Log, &[a]) => at(p, r, a.ln_ref()),
        (ShadowOp::Log2, &[a]) => at(p, r, a.log2_ref()),
        (ShadowOp::Log10, &[a]) => at(p, r, a.log10_ref()),
        (ShadowOp::Log1p, &[a]) => at(p, r, a.ln_1p_ref()),
        // y * log2(x)
        (ShadowOp::Yl2x, &[y, x]) => {
            let log = at(p, r, x.log2_ref());
            at(p, r, y * &log)
        }
        // y * log2(x + 1)
        (ShadowOp::Yl2xP1, &[y, x]) => {
            let shifted = at(p, r, x + &one());
            let log = at(p, r, shifted.log2_ref());
            at(p, r, y * &log)
        }
        // a * 2^trunc(b)
        (ShadowOp::Scale, &[a, b]) => {
            let exponent = at(p, r, b.trunc_ref());
            let factor = at(p, r, (&two()).pow(&exponent));
            at(p, r, a * &factor)
        }
        (ShadowOp::Pow, &[a, b]) => at(p, r, a.pow(b)),
        (ShadowOp::Hypot, &[a, b]) => at(p, r, a.hypot_ref(b)),
        (ShadowOp::Fmod, &[a, b]) => at(p, r, a % b),
        (ShadowOp::Remainder, &[a, b]) => at(p, r, a.remainder_ref(b)),
        (ShadowOp::Copysign, &[a, b]) => at(p, r, a.copysign_ref(b)),
        (ShadowOp::Fdim, &[a, b]) => at(p, r, a.positive_diff_ref(b)),
        (ShadowOp::Erf, &[a]) => at(p, r, a.erf_ref()),
        (ShadowOp::Erfc, &[a]) => at(p, r, a.erfc_ref()),
        (ShadowOp::Tgamma, &[a]) => at(p, r, a.gamma_ref()),
        (ShadowOp::Lgamma, &[a]) => at(p, r, a.ln_gamma_ref()),
        (ShadowOp::RoundEven, &[a]) => at(p, r, a.round_even_ref()),
        (ShadowOp::RoundAway, &[a]) => at(p, r, a.round_ref()),
        (ShadowOp::Floor, &[a]) => at(p, r, a.floor_ref()),
        (ShadowOp::Ceil, &[a]) => at(p, r, a.ceil_ref()),
        (ShadowOp::Trunc, &[a]) => at(p, r, a.trunc_ref()),
        (ShadowOp::RoundToInt, &[a]) => round_to_int(a, rounding, p),
        _ => return None,
    };
    Some(result)
}

fn round_to_int(a: &Float, rounding: GuestRounding, p: u32) -> Float {
    let r = Round::Nearest;
    match rounding {
        GuestRounding::Nearest | GuestRounding::NearestTieZero | GuestRounding::PrepareShorter => {
            at(p, r, a.round_even_ref())
        }
        GuestRounding::NearestTieAway => at(p, r, a.round_ref()),
        GuestRounding::NegInf => at(p, r, a.floor_ref()),
        GuestRounding::PosInf => at(p, r, a.ceil_ref()),
        GuestRounding::Zero => at(p, r, a.trunc_ref()),
        GuestRounding::AwayFromZero if a.is_sign_negative() => at(p, r, a.floor_ref()),
        GuestRounding::AwayFromZero => at(p, r, a.ceil_ref()),
    }
}
