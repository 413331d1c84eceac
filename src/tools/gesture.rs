use std::fmt;

use log::{debug, warn};

use crate::error::Diagnostic;
use crate::event::EventKind;
use crate::host::{PaintCompositor, PaintOptions};
use crate::mask::{HeldMask, MaskLedger, SelectionMask};

/// Where a tool is in its activate/start/update/end cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Inactive,
    /// Selected and waiting for the pointer to go down
    Armed,
    /// Between `toolstart` and `toolend`
    Active,
}

/// Per-tool gesture state plus the mask the tool owns while drawing.
///
/// The held mask is only ever released in two places: [`Gesture::commit`]
/// after the final paint, and [`Gesture::finalize`], which the toolbox runs
/// after every `toolend` and `tooldeactivate`.
pub struct Gesture {
    tool: &'static str,
    state: GestureState,
    mask: Option<HeldMask>,
    which: u32,
    ledger: MaskLedger,
}

impl fmt::Debug for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gesture")
            .field("tool", &self.tool)
            .field("state", &self.state)
            .field("mask", &self.mask)
            .field("which", &self.which)
            .finish()
    }
}

impl Gesture {
    pub fn new(tool: &'static str, ledger: MaskLedger) -> Self {
        Self {
            tool,
            state: GestureState::Inactive,
            mask: None,
            which: 0,
            ledger,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Button or device id captured at `toolstart`
    pub fn which(&self) -> u32 {
        self.which
    }

    pub fn is_holding(&self) -> bool {
        self.mask.is_some()
    }

    pub fn mask(&self) -> Option<&SelectionMask> {
        self.mask.as_deref()
    }

    pub fn ledger(&self) -> &MaskLedger {
        &self.ledger
    }

    pub fn arm(&mut self) {
        match self.state {
            GestureState::Inactive => self.state = GestureState::Armed,
            GestureState::Armed => {}
            GestureState::Active => debug!("{}: activate during a gesture", self.tool),
        }
    }

    /// Enters `Active`, dropping any mask left over from an unfinished gesture
    pub fn start(&mut self, which: u32) {
        if MaskLedger::release(&mut self.mask).is_some() {
            warn!("{}: released a stale mask at toolstart", self.tool);
        }
        self.which = which;
        self.state = GestureState::Active;
    }

    /// Holds a fresh empty mask for the rest of the gesture
    pub fn hold_new(&mut self) -> &mut SelectionMask {
        MaskLedger::release(&mut self.mask);
        self.mask.insert(self.ledger.hold(SelectionMask::new()))
    }

    /// The held mask, or a logged diagnostic when there is none
    pub fn mask_mut(&mut self, kind: EventKind) -> Result<&mut SelectionMask, Diagnostic> {
        let tool = self.tool;
        self.mask.as_deref_mut().ok_or_else(|| no_mask(tool, kind))
    }

    /// Non-destructive paint of the held mask
    pub fn preview<C>(&self, compositor: &mut C, options: PaintOptions) -> Result<(), Diagnostic>
    where
        C: PaintCompositor + ?Sized,
    {
        let Some(mask) = self.mask.as_deref() else {
            return Err(no_mask(self.tool, EventKind::ToolUpdate));
        };
        compositor.paint(
            mask,
            &PaintOptions {
                preview: true,
                ..options
            },
        );
        Ok(())
    }

    /// Paints the held mask for good and releases it
    pub fn commit<C>(&mut self, compositor: &mut C, options: PaintOptions) -> Result<SelectionMask, Diagnostic>
    where
        C: PaintCompositor + ?Sized,
    {
        let Some(held) = self.mask.take() else {
            return Err(no_mask(self.tool, EventKind::ToolEnd));
        };
        compositor.paint(
            &held,
            &PaintOptions {
                preview: false,
                ..options
            },
        );
        self.state = GestureState::Inactive;
        Ok(held.release())
    }

    /// Returns to `Inactive`, releasing any mask without painting it.
    /// Returns true if a mask was still held.
    pub fn finalize(&mut self) -> bool {
        self.state = GestureState::Inactive;
        self.which = 0;
        let released = MaskLedger::release(&mut self.mask).is_some();
        if released {
            debug!("{}: gesture ended without commit", self.tool);
        }
        released
    }
}

fn no_mask(tool: &'static str, kind: EventKind) -> Diagnostic {
    let diagnostic = Diagnostic::InvalidGestureState { tool, kind };
    warn!("{}", diagnostic);
    diagnostic
}
