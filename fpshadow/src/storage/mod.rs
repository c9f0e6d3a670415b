//! Shadow state for every place the guest keeps floating point values.
//!
//! There are three tables with different lifetimes: temporaries live until the end of the
//! translated block, registers live as long as their thread, and memory lives until
//! overwritten. They all share one contract: [`Storage::get`] hands out new references to the
//! stored shadows, [`Storage::set`] replaces whatever was there, and [`Storage::bootstrap`]
//! fills any unshadowed lane from the guest's own bits.

mod lanes;
mod registers;
mod temps;


pub use lanes::LaneMap;
pub use registers::ThreadRegisters;
pub use temps::TempTable;

use crate::FpShadowError;
use crate::shadow::{ShadowLocation, ShadowValue};
use fpshadow_ops::{LocType, Location, Operand};
use tracing::trace;

#[derive(Debug)]
pub struct Storage {
    temps: TempTable,
    registers: ThreadRegisters,
    memory: LaneMap,
}

impl Storage {
    pub fn new(temp_capacity: usize) -> Self {
        Self {
            temps: TempTable::new(temp_capacity),
            registers: ThreadRegisters::default(),
            memory: LaneMap::new(),
        }
    }

    pub fn temps(&self) -> &TempTable {
        &self.temps
    }

    pub fn registers(&self) -> &ThreadRegisters {
        &self.registers
    }

    pub fn memory(&self) -> &LaneMap {
        &self.memory
    }

    /// The shadow of `loc`, viewed as `ty`, or `None` if no lane of it is shadowed
    pub fn get(&self, loc: Location, ty: LocType) -> Result<Option<ShadowLocation>, FpShadowError> {
        Ok(match loc {
            Location::Temp(idx) => self.temps.get(idx)?.and_then(|s| s.retype(ty)),
            Location::Register(offset) => self.registers.current().and_then(|r| r.get(offset, ty)),
            Location::Memory(addr) => self.memory.get(addr, ty),
        })
    }

    pub fn set(
        &mut self,
        loc: Location,
        ty: LocType,
        shadow: Option<ShadowLocation>,
    ) -> Result<(), FpShadowError> {
        let shadow = shadow.filter(|s| !s.is_unshadowed());
        trace!(
            location = %loc,
            ?ty,
            shadowed = shadow.is_some(),
            "shadow write"
        );
        match loc {
            Location::Temp(idx) => self.temps.set(idx, shadow)?,
            Location::Register(offset) => {
                self.registers.current_mut().set(offset, ty, shadow.as_ref())
            }
            Location::Memory(addr) => self.memory.set(addr, ty, shadow.as_ref()),
        }
        Ok(())
    }

    /// Copies the shadow of `src` to `dest`. Both locations end up sharing the same values.
    pub fn copy(
        &mut self,
        src: Location,
        dest: Location,
        ty: LocType,
    ) -> Result<(), FpShadowError> {
        let shadow = self.get(src, ty)?;
        trace!(%src, %dest, "shadow move");
        self.set(dest, ty, shadow)
    }

    /// The shadow of an operand with every lane present.
    ///
    /// Lanes with no shadow are created from the operand's bits, which are taken to be exact.
    /// If the operand names a location, the new shadows are stored back there so that later
    /// readers share them.
    pub fn bootstrap(
        &mut self,
        operand: &Operand,
        ty: LocType,
        precision: u32,
        with_stems: bool,
    ) -> Result<ShadowLocation, FpShadowError> {
        let existing = match operand.location {
            Some(loc) => self.get(loc, ty)?,
            None => None,
        };
        let mut shadow = existing.unwrap_or_else(|| ShadowLocation::new(ty));
        let mut created = false;
        for lane in 0..ty.capacity() {
            if shadow.lane(lane).is_some() {
                continue;
            }
            if let Some(value) = operand.bits.lane_value(lane, ty.width()) {
                shadow.set_lane(
                    lane,
                    Some(ShadowValue::from_concrete(value, precision, with_stems)),
                );
                created = true;
            }
        }
        if let (true, Some(loc)) = (created, operand.location) {
            trace!(location = %loc, "bootstrapped shadow");
            self.set(loc, ty, Some(shadow.clone()))?;
        }
        Ok(shadow)
    }

    /// Releases the temporaries of the block that just finished
    pub fn end_block(&mut self) {
        self.temps.clear_block();
    }

    pub fn switch_thread(&mut self, tid: u32) {
        self.registers.switch_to(tid);
    }

    pub fn exit_thread(&mut self, tid: u32) {
        self.registers.exit(tid);
    }
}
