use crate::site::SiteId;
use fpshadow_ops::ShadowOp;
use rug::Float;
use sorted_vec::SortedVec;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// A high-precision stand-in for one concrete floating point value.
///
/// Shadow values are immutable and shared: every storage slot and every [`Stem`] that refers
/// to the value holds one strong reference, and the value is released when the last of them
/// goes away. Locations are updated by replacing references, never by writing through them.
#[derive(Clone)]
pub struct ShadowValue(Rc<ShadowInner>);

struct ShadowInner {
    real: Float,
    stem: Option<Stem>,
    influences: SortedVec<SiteId>,
}

/// How a shadow value came to be.
pub enum Stem {
    /// Bootstrapped from a concrete value, which is trusted as exact
    Leaf { value: u64 },
    /// Computed by a shadowed operation.
    ///
    /// `value` is what the guest computed, as the bits of a double. The arguments are the
    /// shadow values of the operands, which keeps the whole history alive regardless of what
    /// has since been written over the locations they came from.
    Branch {
        op: ShadowOp,
        site: SiteId,
        value: u64,
        args: Vec<ShadowValue>,
    },
}

impl Stem {
    /// The concrete value at this point of the history, as the bits of a double
    pub fn value(&self) -> u64 {
        match self {
            Stem::Leaf { value } | Stem::Branch { value, .. } => *value,
        }
    }

    pub fn args(&self) -> &[ShadowValue] {
        match self {
            Stem::Leaf { .. } => &[],
            Stem::Branch { args, .. } => args,
        }
    }
}

impl ShadowValue {
    pub fn new(real: Float, stem: Option<Stem>) -> Self {
        Self::with_influences(real, stem, SortedVec::new())
    }

    /// A computed value along with every erroneous site that contributed to it
    pub fn with_influences(
        real: Float,
        stem: Option<Stem>,
        influences: SortedVec<SiteId>,
    ) -> Self {
        Self(Rc::new(ShadowInner {
            real,
            stem,
            influences,
        }))
    }

    /// Bootstraps a shadow from a concrete value. The stem is only built when `with_stem`.
    pub fn from_concrete(value: f64, precision: u32, with_stem: bool) -> Self {
        let stem = with_stem.then(|| Stem::Leaf {
            value: value.to_bits(),
        });
        Self::new(Float::with_val(precision, value), stem)
    }

    pub fn real(&self) -> &Float {
        &self.0.real
    }

    pub fn stem(&self) -> Option<&Stem> {
        self.0.stem.as_ref()
    }

    /// Erroneous sites somewhere in this value's history. Kept whether or not stems are.
    pub fn influences(&self) -> &[SiteId] {
        &self.0.influences
    }

    /// The concrete value this shadow stands for, falling back to the shadow itself rounded to
    /// a double when no stem was recorded
    pub fn concrete_bits(&self) -> u64 {
        match self.stem() {
            Some(stem) => stem.value(),
            None => self.real().to_f64().to_bits(),
        }
    }

    /// The number of live owners: storage slots, stems, and handles held by the caller
    pub fn refcount(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn ptr_eq(&self, other: &ShadowValue) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn take_args(&mut self, into: &mut Vec<ShadowValue>) {
        if let Some(inner) = Rc::get_mut(&mut self.0) {
            if let Some(Stem::Branch { args, .. }) = &mut inner.stem {
                into.append(args);
            }
        }
    }
}

// A loop-carried value can sit at the end of a history millions of operations long. Releasing
// it through the default recursive drop would overflow the stack, so uniquely owned histories
// are flattened onto a worklist and released one node at a time.
impl Drop for ShadowValue {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_args(&mut pending);
        while let Some(mut value) = pending.pop() {
            value.take_args(&mut pending);
        }
    }
}

impl Debug for ShadowValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("ShadowValue");
        s.field("real", &self.real().to_f64());
        match self.stem() {
            Some(Stem::Leaf { value }) => s.field("leaf", &f64::from_bits(*value)),
            Some(Stem::Branch { op, site, .. }) => s.field("op", op).field("site", site),
            None => s.field("stem", &None::<()>),
        };
        s.finish()
    }
}
