#![warn(clippy::all, rust_2018_idioms)]

pub mod brush;
pub mod config;
pub mod error;
pub mod event;
pub mod host;
pub mod mask;
pub mod session;
pub mod skin;
pub mod tools;
pub mod widgets;

pub use brush::{Falloff, ScatterSource, Stamp};
pub use config::{ScriptConfig, SkinKind};
pub use error::{ConfigError, Diagnostic, HostError, SessionError};
pub use event::{Arg, Dispatch, Event, EventDispatcher, EventKind, Target};
pub use host::{Host, MemoryHost, NodeId, PaintOptions};
pub use mask::{HeldMask, MaskLedger, SelectionMask};
pub use session::Session;
pub use skin::{MenuGroup, Skin};
pub use tools::{Tool, ToolBox, ToolType};
pub use widgets::ColorPicker;
