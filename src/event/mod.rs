mod dispatcher;

pub use dispatcher::{Dispatch, EventDispatcher, Handler, Invocation, Target, SCRIPT_CONTROLLER};

use std::fmt;
use std::str::FromStr;

use egui::Pos2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::NodeId;

/// Every event kind a script can listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    ToolActivate,
    ToolStart,
    ToolUpdate,
    ToolEnd,
    ToolDeactivate,
    Click,
    MouseDown,
    MouseUp,
    MouseMove,
    Change,
    Remove,
    Tick,
    /// Sent once to the script controller after the skin is loaded
    Init,
    /// Host-wide notification that the active tool changed
    ActivateTool,
}

impl EventKind {
    pub const ALL: [EventKind; 14] = [
        Self::ToolActivate,
        Self::ToolStart,
        Self::ToolUpdate,
        Self::ToolEnd,
        Self::ToolDeactivate,
        Self::Click,
        Self::MouseDown,
        Self::MouseUp,
        Self::MouseMove,
        Self::Change,
        Self::Remove,
        Self::Tick,
        Self::Init,
        Self::ActivateTool,
    ];

    /// The name the host uses on the wire
    pub fn name(self) -> &'static str {
        match self {
            Self::ToolActivate => "toolactivate",
            Self::ToolStart => "toolstart",
            Self::ToolUpdate => "toolupdate",
            Self::ToolEnd => "toolend",
            Self::ToolDeactivate => "tooldeactivate",
            Self::Click => "click",
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::MouseMove => "mousemove",
            Self::Change => "change",
            Self::Remove => "remove",
            Self::Tick => "tick",
            Self::Init => "init",
            Self::ActivateTool => "activatetool",
        }
    }

    /// True for the five events that drive a tool gesture
    pub fn is_tool_event(self) -> bool {
        matches!(
            self,
            Self::ToolActivate
                | Self::ToolStart
                | Self::ToolUpdate
                | Self::ToolEnd
                | Self::ToolDeactivate
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event kind \"{0}\"")]
pub struct ParseEventKindError(pub String);

impl FromStr for EventKind {
    type Err = ParseEventKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| ParseEventKindError(name.to_owned()))
    }
}

/// One positional argument attached to an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Arg {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Arg {
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Number(n) => Some(*n as f32),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Text(_) => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Number(n) if *n >= 0.0 => Some(*n as u32),
            Self::Bool(b) => Some(u32::from(*b)),
            _ => None,
        }
    }
}

impl From<f32> for Arg {
    fn from(value: f32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for Arg {
    fn from(value: u32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Reads `args[index]` and `args[index + 1]` as a position
pub fn position_arg(args: &[Arg], index: usize) -> Option<Pos2> {
    let x = args.get(index)?.as_f32()?;
    let y = args.get(index + 1)?.as_f32()?;
    Some(Pos2::new(x, y))
}

/// A single event as delivered by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    #[serde(default)]
    pub target: Option<NodeId>,
    /// Innermost node under the pointer when it differs from `target`
    #[serde(default)]
    pub origin: Option<NodeId>,
    #[serde(default)]
    pub args: Vec<Arg>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            target: None,
            origin: None,
            args: Vec::new(),
        }
    }

    pub fn on(mut self, target: NodeId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn from_origin(mut self, origin: NodeId) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = Arg>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    /// The pointer position carried in the first two arguments, if any
    pub fn position(&self) -> Option<Pos2> {
        position_arg(&self.args, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip_through_from_str() {
        for kind in EventKind::ALL {
            assert_eq!(kind.name().parse::<EventKind>(), Ok(kind));
        }
        assert_eq!(" toolstart ".parse::<EventKind>(), Ok(EventKind::ToolStart));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = "doubleclick".parse::<EventKind>().unwrap_err();
        assert_eq!(err, ParseEventKindError("doubleclick".to_owned()));
    }

    #[test]
    fn test_event_position_reads_leading_numbers() {
        let event = Event::new(EventKind::MouseDown).with_args([Arg::from(4.0), Arg::from(9.0)]);
        assert_eq!(event.position(), Some(Pos2::new(4.0, 9.0)));

        let event = Event::new(EventKind::Click).with_args([Arg::from("x")]);
        assert_eq!(event.position(), None);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&EventKind::ToolDeactivate).unwrap();
        assert_eq!(json, "\"tooldeactivate\"");
    }
}
