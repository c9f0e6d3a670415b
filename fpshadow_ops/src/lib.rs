//! The vocabulary spoken between a binary instrumentation harness and the `fpshadow` runtime:
//! which operations can be shadowed, where values live, and the events that describe a
//! running program's floating point behavior.

mod error;
mod event;
mod location;
mod op;
mod rounding;
mod site;
mod ty;

pub use error::FpOpsError;
pub use event::{ConvertEvent, Event, MarkEvent, OpEvent};
pub use location::{LaneBits, Location, Operand};
pub use op::{Conversion, ShadowOp};
pub use rounding::GuestRounding;
pub use site::{OpSite, SourceLocation};
pub use ty::{FloatWidth, LaneMode, LocType};
