//! Shadow execution of operation and conversion events.

use crate::context::ShadowContext;
use crate::evaluate::lane_error;
use crate::shadow::{ShadowLocation, ShadowValue, Stem};
use crate::site::SiteId;
use crate::{FpShadowError, real};
use fpshadow_ops::{ConvertEvent, OpEvent};
use rug::Float;
use sorted_vec::SortedVec;
use tracing::{debug, warn};

impl ShadowContext {
    /// Shadows one dynamic execution of an operation.
    ///
    /// Each lane the guest computed gets a fresh shadow value from the operands' shadows,
    /// bootstrapping any the operands lack, and is scored against the guest's result. Lanes
    /// the instruction leaves alone keep the shadows of the first operand.
    pub fn execute(&mut self, event: &OpEvent) -> Result<(), FpShadowError> {
        event.validate()?;
        if !self.is_running() {
            return self.unshadow_dest(event);
        }
        if !event.op.supports(event.ty) {
            warn!(
                op = %event.op,
                ty = ?event.ty,
                site = %event.site,
                "operation is not shadowed at this shape"
            );
            return self.unshadow_dest(event);
        }
        let precision = self.config.precision;
        let with_stems = self.config.report_exprs;
        let threshold = self.config.error_threshold;
        let max_depth = self.config.max_expr_depth;
        let width = event.ty.width();
        let site = self.sites.intern(&event.site, event.op, width);

        let args = event
            .args
            .iter()
            .map(|arg| self.storage.bootstrap(arg, event.ty, precision, with_stems))
            .collect::<Result<Vec<_>, _>>()?;
        let rounding = event.rounding.unwrap_or_default();
        let computed = event.lanes.computed(event.ty);

        let mut result = ShadowLocation::new(event.ty);
        for lane in 0..computed {
            let lane_args: Vec<&ShadowValue> = args.iter().filter_map(|a| a.lane(lane)).collect();
            let reals: Vec<&Float> = lane_args.iter().map(|a| a.real()).collect();
            let (Some(real), Some(concrete)) = (
                real::compute(event.op, &reals, rounding, precision),
                event.result.lane_value(lane, width),
            ) else {
                continue;
            };
            let error = lane_error(&real, concrete, width);
            debug!(
                site = %event.site,
                op = %event.op,
                lane,
                shadow = error.shadow,
                computed = error.computed,
                ulps = error.ulps,
                bits = error.bits,
                "evaluated"
            );
            self.sites.record_error(site, error.bits, threshold);

            let stem = with_stems.then(|| Stem::Branch {
                op: event.op,
                site,
                value: concrete.to_bits(),
                args: lane_args.iter().map(|a| (*a).clone()).collect(),
            });
            let mut influences: Vec<SiteId> = lane_args
                .iter()
                .flat_map(|a| a.influences().iter().copied())
                .collect();
            if error.bits >= threshold {
                influences.push(site);
            }
            influences.sort_unstable();
            influences.dedup();
            let value =
                ShadowValue::with_influences(real, stem, SortedVec::from_unsorted(influences));
            if with_stems {
                self.sites.get_mut(site).tea.fold(&value, max_depth);
            }
            result.set_lane(lane, Some(value));
        }
        for lane in computed..event.ty.capacity() {
            let passed = args.first().and_then(|a| a.lane(lane)).cloned();
            result.set_lane(lane, passed);
        }

        match event.dest {
            Some(dest) => self.storage.set(dest, event.ty, Some(result)),
            None => Ok(()),
        }
    }

    fn unshadow_dest(&mut self, event: &OpEvent) -> Result<(), FpShadowError> {
        match event.dest {
            Some(dest) => self.storage.set(dest, event.ty, None),
            None => Ok(()),
        }
    }

    /// Moves shadow references between lanes and widths without computing anything.
    ///
    /// Narrowing keeps the full shadow; whatever the narrowing lost shows up as error at the
    /// next operation that uses it.
    pub fn convert(&mut self, event: &ConvertEvent) -> Result<(), FpShadowError> {
        let conv = event.conv;
        if event.args.len() != conv.arity() {
            return Err(FpShadowError::ArityMismatch {
                name: "conversion",
                expected: conv.arity(),
                found: event.args.len(),
            });
        }
        let inputs = event
            .args
            .iter()
            .zip(conv.arg_types())
            .map(|(loc, ty)| self.storage.get(*loc, *ty))
            .collect::<Result<Vec<_>, _>>()?;
        let lanes = conv
            .lane_sources()
            .into_iter()
            .map(|source| {
                let (arg, lane) = source?;
                inputs.get(arg)?.as_ref()?.lane(lane).cloned()
            })
            .collect();
        let ty = conv.result_type();
        self.storage
            .set(event.dest, ty, Some(ShadowLocation::from_lanes(ty, lanes)))
    }
}
