use crate::evaluate::ErrorAggregate;
use crate::tea::TeaState;
use fpshadow_ops::{FloatWidth, OpSite, ShadowOp};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use tracing::debug;

/// Index of an operation site in its [`SiteTable`]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SiteId(usize);

impl SiteId {
    pub fn new(idx: usize) -> Self {
        Self(idx)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for SiteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "site{}", self.0)
    }
}

/// Everything known about one static operation.
#[derive(Debug)]
pub struct SiteRecord {
    pub site: OpSite,
    pub op: ShadowOp,
    pub width: FloatWidth,
    pub error: ErrorAggregate,
    pub tea: TeaState,
    tracked: bool,
}

impl SiteRecord {
    pub fn is_tracked(&self) -> bool {
        self.tracked
    }
}

/// All operation sites seen so far, plus the ones whose error crossed the threshold.
#[derive(Debug, Default)]
pub struct SiteTable {
    records: Vec<SiteRecord>,
    by_address: HashMap<u64, SiteId>,
    tracked: Vec<SiteId>,
}

impl SiteTable {
    /// The record for `site`, created on first sight
    pub fn intern(&mut self, site: &OpSite, op: ShadowOp, width: FloatWidth) -> SiteId {
        if let Some(id) = self.by_address.get(&site.address) {
            return *id;
        }
        let id = SiteId(self.records.len());
        self.records.push(SiteRecord {
            site: site.clone(),
            op,
            width,
            error: ErrorAggregate::default(),
            tea: TeaState::Untead,
            tracked: false,
        });
        self.by_address.insert(site.address, id);
        id
    }

    pub fn get(&self, id: SiteId) -> &SiteRecord {
        &self.records[id.0]
    }

    pub fn get_mut(&mut self, id: SiteId) -> &mut SiteRecord {
        &mut self.records[id.0]
    }

    pub fn lookup(&self, address: u64) -> Option<SiteId> {
        self.by_address.get(&address).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sites whose error has crossed the threshold, in the order they crossed it
    pub fn tracked(&self) -> &[SiteId] {
        &self.tracked
    }

    /// Adds one evaluation to the site's statistics. Returns `true` if this evaluation is the
    /// one that put the site over `threshold`; a site is only ever added to the tracked set once.
    pub fn record_error(&mut self, id: SiteId, bits: f64, threshold: f64) -> bool {
        let record = &mut self.records[id.0];
        record.error.update(bits);
        if bits >= threshold && !record.tracked {
            record.tracked = true;
            self.tracked.push(id);
            debug!(site = %record.site, bits, "tracking site");
            true
        } else {
            false
        }
    }
}
