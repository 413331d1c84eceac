use crate::config::SquareConfig;
use crate::event::EventKind;
use crate::host::{Host, PaintOptions};
use crate::mask::MaskLedger;

use super::{Gesture, Tool, ToolInput};

/// Paints single pixels under the pointer.
#[derive(Debug)]
pub struct SquareTool {
    config: SquareConfig,
    gesture: Gesture,
}

impl SquareTool {
    pub const NAME: &'static str = "square";

    pub fn new(config: SquareConfig, ledger: MaskLedger) -> Self {
        Self {
            config,
            gesture: Gesture::new(Self::NAME, ledger),
        }
    }
}

impl Tool for SquareTool {
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

    fn on_start(&mut self, _host: &mut dyn Host, _input: &ToolInput) {
        self.gesture.hold_new();
    }

    fn on_update(&mut self, host: &mut dyn Host, input: &ToolInput) {
        let (x, y) = input.pixel();
        let Ok(mask) = self.gesture.mask_mut(EventKind::ToolUpdate) else {
            return;
        };
        mask.add(x, y, self.config.weight);
        let _ = self.gesture.preview(host, PaintOptions::preview());
    }

    fn on_end(&mut self, host: &mut dyn Host, _input: &ToolInput) {
        let _ = self.gesture.commit(host, PaintOptions::commit());
    }
}
