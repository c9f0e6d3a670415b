use crate::FpShadowError;
use crate::context::ShadowContext;
use crate::evaluate::{ErrorAggregate, lane_error};
use crate::site::SiteId;
use fpshadow_ops::{MarkEvent, OpSite};
use sorted_vec::SortedVec;
use std::collections::HashMap;
use tracing::{debug, warn};

/// A program output the harness asked us to watch, and the erroneous sites that fed it.
#[derive(Debug)]
pub struct MarkRecord {
    pub site: OpSite,
    pub error: ErrorAggregate,
    influences: SortedVec<SiteId>,
}

impl MarkRecord {
    pub fn influences(&self) -> &[SiteId] {
        &self.influences
    }

    fn add_influence(&mut self, id: SiteId) {
        if self.influences.binary_search(&id).is_err() {
            self.influences.insert(id);
        }
    }
}

#[derive(Debug, Default)]
pub struct MarkTable {
    records: Vec<MarkRecord>,
    by_address: HashMap<u64, usize>,
}

impl MarkTable {
    fn entry(&mut self, site: &OpSite) -> &mut MarkRecord {
        let idx = *self.by_address.entry(site.address).or_insert_with(|| {
            self.records.push(MarkRecord {
                site: site.clone(),
                error: ErrorAggregate::default(),
                influences: SortedVec::new(),
            });
            self.records.len() - 1
        });
        &mut self.records[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarkRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ShadowContext {
    /// Scores a program output and remembers which erroneous sites contributed to it
    pub fn mark(&mut self, event: &MarkEvent) -> Result<(), FpShadowError> {
        if event.site.source.is_none() {
            return Err(FpShadowError::UnattributableMark(event.site.clone()));
        }
        let width = event.ty.width();
        let shadow = self.storage.bootstrap(
            &event.operand,
            event.ty,
            self.config.precision,
            self.config.report_exprs,
        )?;
        let (Some(value), Some(concrete)) = (
            shadow.lane(event.lane),
            event.operand.bits.lane_value(event.lane, width),
        ) else {
            warn!(site = %event.site, lane = event.lane, "marked lane is outside its location");
            return Ok(());
        };
        let error = lane_error(value.real(), concrete, width);
        debug!(site = %event.site, bits = error.bits, "output mark");
        let record = self.marks.entry(&event.site);
        record.error.update(error.bits);
        for id in value.influences() {
            record.add_influence(*id);
        }
        Ok(())
    }
}
