use log::{debug, warn};

use crate::event::EventKind;
use crate::host::{Host, HostCommand, NodeId};
use crate::mask::MaskLedger;

use super::{Gesture, Tool, ToolInput};

/// Opens a color picker popup while selected.
///
/// Pressing on the canvas, switching tools or closing the popup tears the
/// popup down. Unless the tool was switched away from, the host is then asked
/// to go back to the previous tool.
#[derive(Debug)]
pub struct ColorWheelTool {
    gesture: Gesture,
    window: Option<NodeId>,
}

impl ColorWheelTool {
    pub const NAME: &'static str = "wheel";
    pub const TEMPLATE: &'static str = "colorpicker";

    pub fn new(ledger: MaskLedger) -> Self {
        Self {
            gesture: Gesture::new(Self::NAME, ledger),
            window: None,
        }
    }

    /// The open popup, if any
    pub fn window(&self) -> Option<NodeId> {
        self.window
    }

    fn close(&mut self, host: &mut dyn Host, toggle_back: bool) {
        let Some(window) = self.window.take() else {
            return;
        };
        host.remove(window);
        if toggle_back {
            host.command(HostCommand::ToggleTool);
        }
    }
}

impl Tool for ColorWheelTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn events(&self) -> &'static [EventKind] {
        &[
            EventKind::ToolActivate,
            EventKind::ToolStart,
            EventKind::ToolDeactivate,
            EventKind::Remove,
        ]
    }

    fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    fn gesture_mut(&mut self) -> &mut Gesture {
        &mut self.gesture
    }

    fn on_activate(&mut self, host: &mut dyn Host, _input: &ToolInput) {
        if self.window.is_some() {
            return;
        }
        let parent = host.window();
        match host.create_child(parent, Self::TEMPLATE) {
            Some(window) => {
                host.add_event_listener(window, EventKind::Remove);
                self.window = Some(window);
            }
            None => warn!("wheel: could not create \"{}\"", Self::TEMPLATE),
        }
    }

    fn on_start(&mut self, host: &mut dyn Host, _input: &ToolInput) {
        self.close(host, true);
    }

    fn on_deactivate(&mut self, host: &mut dyn Host) {
        self.close(host, false);
    }

    fn on_remove(&mut self, host: &mut dyn Host, node: Option<NodeId>) {
        if node.is_some() && node != self.window {
            debug!("wheel: ignoring removal of {:?}", node);
            return;
        }
        self.close(host, true);
    }
}
