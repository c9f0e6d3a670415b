use crate::{
    Conversion, FpOpsError, GuestRounding, LaneBits, LaneMode, LocType, Location, OpSite, Operand,
    ShadowOp,
};
use serde::{Deserialize, Serialize};

/// One dynamically executed floating point operation, as reported by the instrumentation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpEvent {
    pub op: ShadowOp,
    pub site: OpSite,
    pub ty: LocType,
    #[serde(default)]
    pub lanes: LaneMode,
    /// Present for instructions that take an explicit rounding mode operand
    #[serde(default)]
    pub rounding: Option<GuestRounding>,
    pub args: Vec<Operand>,
    /// Where the result is written. `None` means the result is only evaluated, never stored.
    #[serde(default)]
    pub dest: Option<Location>,
    /// What the guest actually computed
    pub result: LaneBits,
}

impl OpEvent {
    /// A scalar operation whose result lands in `dest`
    pub fn scalar(
        op: ShadowOp,
        site: OpSite,
        ty: LocType,
        args: Vec<Operand>,
        dest: Location,
        result: LaneBits,
    ) -> Self {
        Self {
            op,
            site,
            ty,
            lanes: LaneMode::All,
            rounding: None,
            args,
            dest: Some(dest),
            result,
        }
    }

    pub fn with_lanes(mut self, lanes: LaneMode) -> Self {
        self.lanes = lanes;
        self
    }

    pub fn with_rounding(mut self, rounding: GuestRounding) -> Self {
        self.rounding = Some(rounding);
        self
    }

    /// Checks the event is self-consistent. It says nothing about whether the operation can be
    /// shadowed at this shape; that is the runtime's call.
    pub fn validate(&self) -> Result<(), FpOpsError> {
        if self.args.len() != self.op.arity() {
            return Err(FpOpsError::ArityMismatch {
                op: self.op,
                expected: self.op.arity(),
                found: self.args.len(),
            });
        }
        for arg in &self.args {
            arg.bits.check_covers(self.ty)?;
        }
        self.result.check_covers(self.ty)
    }
}

/// A lane shuffle or width conversion. Only locations are needed, since nothing is computed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertEvent {
    pub conv: Conversion,
    pub args: Vec<Location>,
    pub dest: Location,
}

/// Marks the value in `operand` as an observable program output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkEvent {
    pub site: OpSite,
    pub operand: Operand,
    pub ty: LocType,
    #[serde(default)]
    pub lane: usize,
}

/// Everything the runtime can be told, in the order the guest does it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Op(OpEvent),
    Convert(ConvertEvent),
    Move {
        src: Location,
        dest: Location,
        ty: LocType,
    },
    Unshadow {
        dest: Location,
        ty: LocType,
    },
    /// The current translated block has finished; its temporaries are dead
    EndBlock,
    SwitchThread {
        tid: u32,
    },
    ExitThread {
        tid: u32,
    },
    Mark(MarkEvent),
    Start,
    Stop,
}
