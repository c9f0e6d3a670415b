use crate::shadow::ShadowValue;
use fpshadow_ops::LocType;

/// The shadow of one storage slot: one optional shadow value per lane.
///
/// A lane with no shadow is bootstrapped from the guest's bits the next time an operation
/// reads it.
#[derive(Clone, Debug)]
pub struct ShadowLocation {
    ty: LocType,
    lanes: Vec<Option<ShadowValue>>,
}

impl ShadowLocation {
    pub fn new(ty: LocType) -> Self {
        Self {
            ty,
            lanes: vec![None; ty.capacity()],
        }
    }

    /// Builds a location from explicit lanes. Missing lanes are unshadowed and extra lanes are
    /// dropped.
    pub fn from_lanes(ty: LocType, mut lanes: Vec<Option<ShadowValue>>) -> Self {
        lanes.resize(ty.capacity(), None);
        Self { ty, lanes }
    }

    pub fn ty(&self) -> LocType {
        self.ty
    }

    pub fn lane(&self, idx: usize) -> Option<&ShadowValue> {
        self.lanes.get(idx).and_then(Option::as_ref)
    }

    pub fn lanes(&self) -> &[Option<ShadowValue>] {
        &self.lanes
    }

    pub fn set_lane(&mut self, idx: usize, value: Option<ShadowValue>) {
        if let Some(slot) = self.lanes.get_mut(idx) {
            *slot = value;
        }
    }

    pub fn is_unshadowed(&self) -> bool {
        self.lanes.iter().all(Option::is_none)
    }

    /// Views this location as a different type of the same lane width, keeping the low lanes.
    ///
    /// A different lane width means the guest is reinterpreting the bits, which no shadow can
    /// follow, so the result is `None`.
    pub fn retype(&self, ty: LocType) -> Option<ShadowLocation> {
        if ty == self.ty {
            return Some(self.clone());
        }
        if ty.width() != self.ty.width() {
            return None;
        }
        let located = Self::from_lanes(ty, self.lanes.clone());
        (!located.is_unshadowed()).then_some(located)
    }
}
