use egui::{Modifiers, Pos2};
use log::debug;

use crate::config::ScriptConfig;
use crate::event::{Arg, EventKind, Invocation, position_arg};
use crate::host::{Host, NodeId};
use crate::mask::MaskLedger;

mod gesture;
pub use gesture::{Gesture, GestureState};

mod toolbox;
pub use toolbox::ToolBox;

mod square;
pub use square::SquareTool;

mod spray;
pub use spray::{SprayTool, StampReport};

mod hand;
pub use hand::HandTool;

mod colorwheel;
pub use colorwheel::ColorWheelTool;

/// Pointer state carried by a tool event
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ToolInput {
    pub pos: Pos2,
    /// Pressed button or device id; 0 while hovering
    pub which: u32,
    pub modifiers: Modifiers,
    /// The node the event was reported on, usually the canvas
    pub surface: Option<NodeId>,
}

impl ToolInput {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            pos: Pos2::new(x, y),
            ..Self::default()
        }
    }

    /// Reads `(x, y, which, modifiers)`. Missing values default to zero.
    pub fn from_args(args: &[Arg], surface: Option<NodeId>) -> Self {
        let bits = args.get(3).and_then(Arg::as_u32).unwrap_or(0);
        Self {
            pos: position_arg(args, 0).unwrap_or(Pos2::ZERO),
            which: args.get(2).and_then(Arg::as_u32).unwrap_or(0),
            modifiers: Modifiers {
                shift: bits & 1 != 0,
                ctrl: bits & 2 != 0,
                alt: bits & 4 != 0,
                mac_cmd: false,
                command: bits & 8 != 0,
            },
            surface,
        }
    }

    /// Integer pixel under the pointer
    pub fn pixel(&self) -> (i32, i32) {
        (self.pos.x.floor() as i32, self.pos.y.floor() as i32)
    }
}

/// A tool script. Every handler has a no-op default so a tool only
/// implements the events it cares about and lists them in [`Tool::events`].
pub trait Tool {
    fn name(&self) -> &'static str;

    /// Events this tool's script listens to
    fn events(&self) -> &'static [EventKind];

    fn gesture(&self) -> &Gesture;

    fn gesture_mut(&mut self) -> &mut Gesture;

    fn on_activate(&mut self, _host: &mut dyn Host, _input: &ToolInput) {}

    fn on_start(&mut self, _host: &mut dyn Host, _input: &ToolInput) {}

    fn on_update(&mut self, _host: &mut dyn Host, _input: &ToolInput) {}

    fn on_end(&mut self, _host: &mut dyn Host, _input: &ToolInput) {}

    fn on_deactivate(&mut self, _host: &mut dyn Host) {}

    /// A node this tool listens on was removed
    fn on_remove(&mut self, _host: &mut dyn Host, _node: Option<NodeId>) {}

    /// Routes one invocation to the matching handler
    fn handle(&mut self, host: &mut dyn Host, invocation: &Invocation<'_>) {
        let input = ToolInput::from_args(invocation.args, invocation.target);
        match invocation.kind {
            EventKind::ToolActivate => self.on_activate(host, &input),
            EventKind::ToolStart => self.on_start(host, &input),
            EventKind::ToolUpdate => self.on_update(host, &input),
            EventKind::ToolEnd => self.on_end(host, &input),
            EventKind::ToolDeactivate => self.on_deactivate(host),
            EventKind::Remove => self.on_remove(host, invocation.target),
            other => debug!("{} ignores {}", self.name(), other),
        }
    }
}

/// All available tools
#[derive(Debug)]
pub enum ToolType {
    Square(SquareTool),
    Spray(SprayTool),
    Hand(HandTool),
    ColorWheel(ColorWheelTool),
}

impl Tool for ToolType {
    fn name(&self) -> &'static str {
        match self {
            Self::Square(tool) => tool.name(),
            Self::Spray(tool) => tool.name(),
            Self::Hand(tool) => tool.name(),
            Self::ColorWheel(tool) => tool.name(),
        }
    }

    fn events(&self) -> &'static [EventKind] {
        match self {
            Self::Square(tool) => tool.events(),
            Self::Spray(tool) => tool.events(),
            Self::Hand(tool) => tool.events(),
            Self::ColorWheel(tool) => tool.events(),
        }
    }

    fn gesture(&self) -> &Gesture {
        match self {
            Self::Square(tool) => tool.gesture(),
            Self::Spray(tool) => tool.gesture(),
            Self::Hand(tool) => tool.gesture(),
            Self::ColorWheel(tool) => tool.gesture(),
        }
    }

    fn gesture_mut(&mut self) -> &mut Gesture {
        match self {
            Self::Square(tool) => tool.gesture_mut(),
            Self::Spray(tool) => tool.gesture_mut(),
            Self::Hand(tool) => tool.gesture_mut(),
            Self::ColorWheel(tool) => tool.gesture_mut(),
        }
    }

    fn handle(&mut self, host: &mut dyn Host, invocation: &Invocation<'_>) {
        match self {
            Self::Square(tool) => tool.handle(host, invocation),
            Self::Spray(tool) => tool.handle(host, invocation),
            Self::Hand(tool) => tool.handle(host, invocation),
            Self::ColorWheel(tool) => tool.handle(host, invocation),
        }
    }
}

impl ToolType {
    pub fn as_spray(&self) -> Option<&SprayTool> {
        match self {
            Self::Spray(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn as_color_wheel(&self) -> Option<&ColorWheelTool> {
        match self {
            Self::ColorWheel(tool) => Some(tool),
            _ => None,
        }
    }
}

/// Creates the tool registered under `name`
pub fn new_tool(name: &str, config: &ScriptConfig, ledger: &MaskLedger) -> Option<ToolType> {
    match name {
        SquareTool::NAME => Some(ToolType::Square(SquareTool::new(config.square.clone(), ledger.clone()))),
        SprayTool::NAME => Some(ToolType::Spray(SprayTool::new(config.spray.clone(), ledger.clone()))),
        HandTool::NAME => Some(ToolType::Hand(HandTool::new(ledger.clone()))),
        ColorWheelTool::NAME => Some(ToolType::ColorWheel(ColorWheelTool::new(ledger.clone()))),
        _ => None,
    }
}
