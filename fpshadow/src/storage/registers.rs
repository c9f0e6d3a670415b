use crate::storage::LaneMap;
use std::collections::HashMap;

/// One register file per guest thread. Only one thread runs at a time; the host tells us
/// when that changes.
#[derive(Debug, Default)]
pub struct ThreadRegisters {
    current: u32,
    files: HashMap<u32, LaneMap>,
}

impl ThreadRegisters {
    pub fn switch_to(&mut self, tid: u32) {
        self.current = tid;
    }

    /// Releases every shadow held in the thread's registers
    pub fn exit(&mut self, tid: u32) {
        self.files.remove(&tid);
    }

    pub fn current(&self) -> Option<&LaneMap> {
        self.files.get(&self.current)
    }

    pub fn current_mut(&mut self) -> &mut LaneMap {
        self.files.entry(self.current).or_default()
    }
}
