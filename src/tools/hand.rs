use log::warn;
use serde_json::Value;

use crate::event::EventKind;
use crate::host::Host;
use crate::mask::MaskLedger;

use super::{Gesture, Tool, ToolInput};

/// Pans the canvas by making the editor draggable for the length of a gesture.
#[derive(Debug)]
pub struct HandTool {
    gesture: Gesture,
}

impl HandTool {
    pub const NAME: &'static str = "hand";
    pub const EDITOR_ID: &'static str = "editor";

    pub fn new(ledger: MaskLedger) -> Self {
        Self {
            gesture: Gesture::new(Self::NAME, ledger),
        }
    }

    fn set_draggable(host: &mut dyn Host, draggable: bool) {
        let window = host.window();
        match host.find_child_by_id(window, Self::EDITOR_ID) {
            Some(editor) => host.set(editor, "draggable", Value::Bool(draggable)),
            None => warn!("hand: no \"{}\" node to drag", Self::EDITOR_ID),
        }
    }
}

impl Tool for HandTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn events(&self) -> &'static [EventKind] {
        &[EventKind::ToolStart, EventKind::ToolEnd, EventKind::ToolDeactivate]
    }

    fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    fn gesture_mut(&mut self) -> &mut Gesture {
        &mut self.gesture
    }

    fn on_start(&mut self, host: &mut dyn Host, _input: &ToolInput) {
        Self::set_draggable(host, true);
    }

    fn on_end(&mut self, host: &mut dyn Host, _input: &ToolInput) {
        Self::set_draggable(host, false);
    }

    fn on_deactivate(&mut self, host: &mut dyn Host) {
        Self::set_draggable(host, false);
    }
}
