use crate::{FpOpsError, LocType};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

macro_rules! shadow_ops {
    ($($variant:ident => ($name:literal, $symbol:literal, $plain:literal, $arity:literal)),+ $(,)?) => {
        /// The closed catalog of operations the runtime knows how to shadow.
        ///
        /// Each variant names the mathematical function only; the lane shape and which lanes are
        /// computed travel alongside it in the event.
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum ShadowOp {
            $($variant),+
        }

        impl ShadowOp {
            /// Every operation in the catalog, in declaration order
            pub const CATALOG: &'static [ShadowOp] = &[$(ShadowOp::$variant),+];

            /// The stable identifier used in traces and on the command line
            pub fn name(&self) -> &'static str {
                match self {
                    $(ShadowOp::$variant => $name),+
                }
            }

            /// The function symbol used when printing expressions
            pub fn symbol(&self) -> &'static str {
                match self {
                    $(ShadowOp::$variant => $symbol),+
                }
            }

            /// A human name for reports, like "subtraction"
            pub fn plain_name(&self) -> &'static str {
                match self {
                    $(ShadowOp::$variant => $plain),+
                }
            }

            /// Number of floating point operands, not counting a rounding mode
            pub fn arity(&self) -> usize {
                match self {
                    $(ShadowOp::$variant => $arity),+
                }
            }
        }
    };
}

shadow_ops! {
    Add => ("add", "+", "addition", 2),
    Sub => ("sub", "-", "subtraction", 2),
    Mul => ("mul", "*", "multiplication", 2),
    Div => ("div", "/", "division", 2),
    Fma => ("fma", "fma", "fused multiply-add", 3),
    Fms => ("fms", "fms", "fused multiply-subtract", 3),
    Neg => ("neg", "-", "negation", 1),
    Abs => ("abs", "fabs", "absolute value", 1),
    Min => ("min", "fmin", "minimum", 2),
    Max => ("max", "fmax", "maximum", 2),
    Sqrt => ("sqrt", "sqrt", "square root", 1),
    Cbrt => ("cbrt", "cbrt", "cube root", 1),
    RecipEst => ("recip_est", "recip", "reciprocal estimate", 1),
    RSqrtEst => ("rsqrt_est", "rsqrt", "reciprocal square root estimate", 1),
    RecipStep => ("recip_step", "recip-step", "reciprocal newton step", 2),
    RSqrtStep => ("rsqrt_step", "rsqrt-step", "reciprocal square root newton step", 2),
    Sin => ("sin", "sin", "sine", 1),
    Cos => ("cos", "cos", "cosine", 1),
    Tan => ("tan", "tan", "tangent", 1),
    Asin => ("asin", "asin", "arc sine", 1),
    Acos => ("acos", "acos", "arc cosine", 1),
    Atan => ("atan", "atan", "arc tangent", 1),
    Atan2 => ("atan2", "atan2", "arc tangent (two arguments)", 2),
    Sinh => ("sinh", "sinh", "hyperbolic sine", 1),
    Cosh => ("cosh", "cosh", "hyperbolic cosine", 1),
    Tanh => ("tanh", "tanh", "hyperbolic tangent", 1),
    Asinh => ("asinh", "asinh", "hyperbolic arc sine", 1),
    Acosh => ("acosh", "acosh", "hyperbolic arc cosine", 1),
    Atanh => ("atanh", "atanh", "hyperbolic arc tangent", 1),
    Exp => ("exp", "exp", "exponentiate", 1),
    Exp2 => ("exp2", "exp2", "base-two exponentiate", 1),
    Expm1 => ("expm1", "expm1", "exponentiate minus one", 1),
    Exp2M1 => ("exp2m1", "exp2m1", "base-two exponentiate minus one", 1),
    RecipExp => ("recip_exp", "recip-exp", "reciprocal exponentiate", 1),
    Log => ("log", "log", "log", 1),
    Log2 => ("log2", "log2", "log base two", 1),
    Log10 => ("log10", "log10", "log base ten", 1),
    Log1p => ("log1p", "log1p", "plus one log", 1),
    Yl2x => ("yl2x", "yl2x", "scaled log base two", 2),
    Yl2xP1 => ("yl2xp1", "yl2xp1", "scaled plus one log base two", 2),
    Scale => ("scale", "scale", "scale by power of two", 2),
    Pow => ("pow", "pow", "power", 2),
    Hypot => ("hypot", "hypot", "hypotenuse", 2),
    Fmod => ("fmod", "fmod", "modulus", 2),
    Remainder => ("remainder", "remainder", "remainder", 2),
    Copysign => ("copysign", "copysign", "copy sign", 2),
    Fdim => ("fdim", "fdim", "positive difference", 2),
    Erf => ("erf", "erf", "error function", 1),
    Erfc => ("erfc", "erfc", "complementary error function", 1),
    Tgamma => ("tgamma", "tgamma", "gamma function", 1),
    Lgamma => ("lgamma", "lgamma", "log gamma function", 1),
    RoundEven => ("rint", "rint", "round to nearest integer", 1),
    RoundAway => ("round", "round", "round", 1),
    Floor => ("floor", "floor", "floor", 1),
    Ceil => ("ceil", "ceil", "ceiling", 1),
    Trunc => ("trunc", "trunc", "truncate", 1),
    RoundToInt => ("round_to_int", "nearbyint", "round to integer", 1),
}

impl ShadowOp {
    /// Whether the operation exists in packed form.
    ///
    /// The vector units only implement the basic arithmetic, the square root and reciprocal
    /// families, sign manipulation, min/max, fused multiply-add and rounding to integers.
    /// Everything else only reaches us as a scalar libm call or x87 instruction.
    pub fn is_packable(&self) -> bool {
        matches!(
            self,
            ShadowOp::Add
                | ShadowOp::Sub
                | ShadowOp::Mul
                | ShadowOp::Div
                | ShadowOp::Fma
                | ShadowOp::Fms
                | ShadowOp::Neg
                | ShadowOp::Abs
                | ShadowOp::Min
                | ShadowOp::Max
                | ShadowOp::Sqrt
                | ShadowOp::RecipEst
                | ShadowOp::RSqrtEst
                | ShadowOp::RecipStep
                | ShadowOp::RSqrtStep
                | ShadowOp::RoundEven
                | ShadowOp::Floor
                | ShadowOp::Ceil
                | ShadowOp::Trunc
                | ShadowOp::RoundToInt
        )
    }

    /// Whether this operation can be shadowed on a slot of the given type
    pub fn supports(&self, ty: LocType) -> bool {
        ty.is_scalar() || self.is_packable()
    }
}

impl Display for ShadowOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ShadowOp {
    type Err = FpOpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShadowOp::CATALOG
            .iter()
            .find(|op| op.name() == s)
            .copied()
            .ok_or_else(|| FpOpsError::UnknownOperation(s.to_string()))
    }
}

/// Operations that only move shadow references between lanes and slots.
///
/// None of these compute anything, so none of them are evaluated for error. Narrowing
/// conversions keep the high-precision value; the error they introduce shows up at the next
/// evaluated operation that consumes them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conversion {
    F32ToF64,
    F64ToF32,
    /// The low double of a 128-bit vector
    LowLane64,
    /// The high double of a 128-bit vector
    HighLane64,
    /// The low float of a 128-bit vector
    LowLane32,
    /// Two doubles (high, low) into one 128-bit vector
    ConcatLanes64,
    /// Replace the low double of a vector (vector, scalar)
    SetLowLane64,
    /// Replace the low float of a vector (vector, scalar)
    SetLowLane32,
    /// Keep the low double, zero the rest
    ZeroHigh64,
    /// Keep the low float, zero the rest
    ZeroHigh96,
}

impl Conversion {
    pub const CATALOG: &'static [Conversion] = &[
        Conversion::F32ToF64,
        Conversion::F64ToF32,
        Conversion::LowLane64,
        Conversion::HighLane64,
        Conversion::LowLane32,
        Conversion::ConcatLanes64,
        Conversion::SetLowLane64,
        Conversion::SetLowLane32,
        Conversion::ZeroHigh64,
        Conversion::ZeroHigh96,
    ];

    /// The location types of the operands, in order
    pub fn arg_types(&self) -> &'static [LocType] {
        match self {
            Conversion::F32ToF64 => &[LocType::Float],
            Conversion::F64ToF32 => &[LocType::Double],
            Conversion::LowLane64 | Conversion::HighLane64 | Conversion::ZeroHigh64 => {
                &[LocType::Doublex2]
            }
            Conversion::LowLane32 | Conversion::ZeroHigh96 => &[LocType::Floatx4],
            Conversion::ConcatLanes64 => &[LocType::Double, LocType::Double],
            Conversion::SetLowLane64 => &[LocType::Doublex2, LocType::Double],
            Conversion::SetLowLane32 => &[LocType::Floatx4, LocType::Float],
        }
    }

    pub fn result_type(&self) -> LocType {
        match self {
            Conversion::F32ToF64 | Conversion::LowLane64 | Conversion::HighLane64 => {
                LocType::Double
            }
            Conversion::F64ToF32 | Conversion::LowLane32 => LocType::Float,
            Conversion::ConcatLanes64 | Conversion::SetLowLane64 | Conversion::ZeroHigh64 => {
                LocType::Doublex2
            }
            Conversion::SetLowLane32 | Conversion::ZeroHigh96 => LocType::Floatx4,
        }
    }

    pub fn arity(&self) -> usize {
        self.arg_types().len()
    }

    /// For each result lane, the `(operand, lane)` it is copied from, or `None` if the
    /// result lane is zeroed.
    pub fn lane_sources(&self) -> Vec<Option<(usize, usize)>> {
        match self {
            Conversion::F32ToF64
            | Conversion::F64ToF32
            | Conversion::LowLane64
            | Conversion::LowLane32 => vec![Some((0, 0))],
            Conversion::HighLane64 => vec![Some((0, 1))],
            Conversion::ConcatLanes64 => vec![Some((1, 0)), Some((0, 0))],
            Conversion::SetLowLane64 => vec![Some((1, 0)), Some((0, 1))],
            Conversion::SetLowLane32 => {
                vec![Some((1, 0)), Some((0, 1)), Some((0, 2)), Some((0, 3))]
            }
            Conversion::ZeroHigh64 => vec![Some((0, 0)), None],
            Conversion::ZeroHigh96 => vec![Some((0, 0)), None, None, None],
        }
    }
}
