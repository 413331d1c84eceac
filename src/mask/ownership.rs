use std::cell::Cell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use log::{debug, warn};

use super::SelectionMask;

/// Running totals of holds and releases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoldCounts {
    pub holds: u64,
    pub releases: u64,
}

impl HoldCounts {
    /// Masks currently held and not yet released
    pub fn outstanding(&self) -> u64 {
        self.holds - self.releases
    }
}

/// Shared hold/release bookkeeping for every mask handed out to tools.
///
/// Cloning the ledger shares the counters.
#[derive(Clone, Default)]
pub struct MaskLedger {
    counts: Rc<Cell<HoldCounts>>,
}

impl fmt::Debug for MaskLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskLedger")
            .field("counts", &self.counts.get())
            .finish()
    }
}

impl MaskLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes exclusive ownership of `mask` until the returned handle is released
    pub fn hold(&self, mask: SelectionMask) -> HeldMask {
        let mut counts = self.counts.get();
        counts.holds += 1;
        self.counts.set(counts);
        debug!("hold mask {} ({} outstanding)", mask.id(), counts.outstanding());
        HeldMask {
            mask,
            ledger: self.clone(),
            live: true,
        }
    }

    /// Releases whatever `slot` holds. An empty slot is a no-op.
    pub fn release(slot: &mut Option<HeldMask>) -> Option<SelectionMask> {
        slot.take().map(HeldMask::release)
    }

    pub fn counts(&self) -> HoldCounts {
        self.counts.get()
    }

    pub fn outstanding(&self) -> u64 {
        self.counts.get().outstanding()
    }

    fn record_release(&self) {
        let mut counts = self.counts.get();
        counts.releases += 1;
        self.counts.set(counts);
    }
}

/// A mask exclusively owned by one tool for the length of a gesture.
///
/// Not `Clone`: the only ways out are [`HeldMask::release`] or dropping the
/// handle, and both count as exactly one release.
pub struct HeldMask {
    mask: SelectionMask,
    ledger: MaskLedger,
    live: bool,
}

impl HeldMask {
    pub fn release(mut self) -> SelectionMask {
        self.live = false;
        self.ledger.record_release();
        debug!(
            "release mask {} ({} outstanding)",
            self.mask.id(),
            self.ledger.outstanding()
        );
        std::mem::take(&mut self.mask)
    }
}

impl fmt::Debug for HeldMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeldMask")
            .field("id", &self.mask.id())
            .field("samples", &self.mask.len())
            .finish_non_exhaustive()
    }
}

impl Deref for HeldMask {
    type Target = SelectionMask;

    fn deref(&self) -> &SelectionMask {
        &self.mask
    }
}

impl DerefMut for HeldMask {
    fn deref_mut(&mut self) -> &mut SelectionMask {
        &mut self.mask
    }
}

impl Drop for HeldMask {
    fn drop(&mut self) {
        if self.live {
            warn!("mask {} dropped while held", self.mask.id());
            self.ledger.record_release();
        }
    }
}
