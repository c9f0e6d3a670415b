use crate::shadow::{ShadowLocation, ShadowValue};
use fpshadow_ops::{FloatWidth, LocType};
use std::collections::HashMap;

#[derive(Clone, Debug)]
struct LaneSlot {
    width: FloatWidth,
    value: ShadowValue,
}

/// Byte-addressed shadow storage, used for both register files and memory.
///
/// Each lane of a location is stored separately at `base + el_size * lane`, tagged with the
/// width it was written at. Reads at a different width, or reads overlapping a lane that was
/// written somewhere else, see no shadow.
#[derive(Clone, Debug, Default)]
pub struct LaneMap {
    slots: HashMap<u64, LaneSlot>,
}

impl LaneMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of shadowed lanes
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The shadow stored exactly at `addr`, whatever its width
    pub fn value_at(&self, addr: u64) -> Option<&ShadowValue> {
        self.slots.get(&addr).map(|s| &s.value)
    }

    pub fn get(&self, base: u64, ty: LocType) -> Option<ShadowLocation> {
        let width = ty.width();
        let lanes = (0..ty.capacity())
            .map(|lane| {
                let addr = base.wrapping_add((lane * ty.el_size()) as u64);
                self.slots
                    .get(&addr)
                    .filter(|slot| slot.width == width)
                    .map(|slot| slot.value.clone())
            })
            .collect();
        let shadow = ShadowLocation::from_lanes(ty, lanes);
        (!shadow.is_unshadowed()).then_some(shadow)
    }

    /// Replaces the shadow of every lane of `ty` at `base`. A `None` shadow, or a `None` lane,
    /// leaves that part of the map unshadowed.
    pub fn set(&mut self, base: u64, ty: LocType, shadow: Option<&ShadowLocation>) {
        let width = ty.width();
        for lane in 0..ty.capacity() {
            let addr = base.wrapping_add((lane * ty.el_size()) as u64);
            self.clear_overlapping(addr, width);
            if let Some(value) = shadow.and_then(|s| s.lane(lane)) {
                self.slots.insert(
                    addr,
                    LaneSlot {
                        width,
                        value: value.clone(),
                    },
                );
            }
        }
    }

    fn clear_overlapping(&mut self, addr: u64, width: FloatWidth) {
        let end = addr.saturating_add(width.bytes() as u64);
        let widest = FloatWidth::F64.bytes() as u64;
        for start in addr.saturating_sub(widest - 1)..end {
            let overlaps = self
                .slots
                .get(&start)
                .is_some_and(|slot| start + slot.width.bytes() as u64 > addr);
            if overlaps {
                self.slots.remove(&start);
            }
        }
    }
}
