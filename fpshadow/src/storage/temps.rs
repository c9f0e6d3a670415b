use crate::FpShadowError;
use crate::shadow::ShadowLocation;

/// Shadows of the current translated block's temporaries.
///
/// The table has a fixed capacity but remembers how far into it the current block has written,
/// so ending a block only visits the slots the block actually used.
#[derive(Debug)]
pub struct TempTable {
    slots: Vec<Option<ShadowLocation>>,
    high_water: usize,
}

impl TempTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            high_water: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// One past the highest slot written since the block started
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    fn check(&self, index: usize) -> Result<(), FpShadowError> {
        if index < self.slots.len() {
            Ok(())
        } else {
            Err(FpShadowError::TempOutOfRange {
                index,
                capacity: self.slots.len(),
            })
        }
    }

    pub fn get(&self, index: usize) -> Result<Option<&ShadowLocation>, FpShadowError> {
        self.check(index)?;
        Ok(self.slots[index].as_ref())
    }

    pub fn set(
        &mut self,
        index: usize,
        shadow: Option<ShadowLocation>,
    ) -> Result<(), FpShadowError> {
        self.check(index)?;
        if shadow.is_some() {
            self.high_water = self.high_water.max(index + 1);
        }
        self.slots[index] = shadow;
        Ok(())
    }

    /// Releases every shadow written during the block
    pub fn clear_block(&mut self) {
        for slot in &mut self.slots[..self.high_water] {
            *slot = None;
        }
        self.high_water = 0;
    }
}
