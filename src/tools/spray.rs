use std::fmt;

use crate::brush::{self, RandomScatter, ScatterSource, Stamp};
use crate::config::SprayConfig;
use crate::event::EventKind;
use crate::host::{Host, PaintOptions};
use crate::mask::MaskLedger;

use super::{Gesture, Tool, ToolInput};

/// What the last update stamped, kept for inspection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StampReport {
    pub stamp: Stamp,
    pub samples: usize,
}

/// Airbrush that drops jittered round stamps around the pointer.
///
/// While a button is held the stamps accumulate into one mask that is
/// previewed on every update and committed at `toolend`. While hovering the
/// mask is rebuilt on every update and only shown as a cursor.
pub struct SprayTool {
    config: SprayConfig,
    scatter: Box<dyn ScatterSource>,
    gesture: Gesture,
    last_stamp: Option<StampReport>,
}

impl fmt::Debug for SprayTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SprayTool")
            .field("config", &self.config)
            .field("gesture", &self.gesture)
            .field("last_stamp", &self.last_stamp)
            .finish_non_exhaustive()
    }
}

impl SprayTool {
    pub const NAME: &'static str = "spray";

    pub fn new(config: SprayConfig, ledger: MaskLedger) -> Self {
        Self::with_scatter(config, ledger, Box::new(RandomScatter::from_entropy()))
    }

    pub fn with_scatter(config: SprayConfig, ledger: MaskLedger, scatter: Box<dyn ScatterSource>) -> Self {
        Self {
            config,
            scatter,
            gesture: Gesture::new(Self::NAME, ledger),
            last_stamp: None,
        }
    }

    pub fn last_stamp(&self) -> Option<StampReport> {
        self.last_stamp
    }

    /// Jittered stamp for a pointer at `input`. The further the center is
    /// thrown from the pointer, the smaller the stamp.
    fn next_stamp(&mut self, input: &ToolInput) -> Stamp {
        let scatter = self.config.scatter;
        let offset = self.scatter.offset(scatter);
        let radius = scatter - offset.length_sq() / scatter;
        Stamp::new(input.pos + offset, radius).with_falloff(self.config.falloff)
    }

    fn painting(&self) -> bool {
        self.gesture.which() != 0
    }
}

impl Tool for SprayTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn events(&self) -> &'static [EventKind] {
        &[
            EventKind::ToolStart,
            EventKind::ToolUpdate,
            EventKind::ToolEnd,
            EventKind::ToolDeactivate,
        ]
    }

    fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    fn gesture_mut(&mut self) -> &mut Gesture {
        &mut self.gesture
    }

    fn on_start(&mut self, host: &mut dyn Host, input: &ToolInput) {
        host.set_cursor_hidden(true);
        self.gesture.hold_new();
        self.on_update(host, input);
    }

    fn on_update(&mut self, host: &mut dyn Host, input: &ToolInput) {
        if !self.gesture.is_holding() {
            let _ = self.gesture.mask_mut(EventKind::ToolUpdate);
            return;
        }
        let stamp = self.next_stamp(input);
        let painting = self.painting();
        let Ok(mask) = self.gesture.mask_mut(EventKind::ToolUpdate) else {
            return;
        };
        if !painting {
            mask.clear();
        }
        let samples = brush::stamp(mask, &stamp);
        self.last_stamp = Some(StampReport { stamp, samples });

        let options = if painting {
            PaintOptions::preview().on_surface(input.surface)
        } else {
            PaintOptions::preview().as_cursor()
        };
        let _ = self.gesture.preview(host, options);
    }

    fn on_end(&mut self, host: &mut dyn Host, input: &ToolInput) {
        if self.painting() {
            let _ = self
                .gesture
                .commit(host, PaintOptions::commit().on_surface(input.surface));
        }
        host.set_cursor_hidden(false);
    }

    fn on_deactivate(&mut self, host: &mut dyn Host) {
        host.set_cursor_hidden(false);
    }
}
