//! The narrow interfaces through which scripts reach the host application.
//!
//! Scene storage, compositing, dialogs and file I/O all live on the host side.
//! Scripts only ever hold [`NodeId`]s and call through these traits.

pub mod memory;

pub use memory::{MemoryHost, Recorded};

use std::fmt;
use std::path::{Path, PathBuf};

use egui::{Color32, Vec2};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::HostError;
use crate::event::EventKind;
use crate::mask::SelectionMask;

/// Identity of a host-owned view node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Options for one call into the compositor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaintOptions {
    /// Non-destructive; replaced by the next preview or the commit
    pub preview: bool,
    /// Surface to paint on. The active cell when `None`
    pub surface: Option<NodeId>,
    /// Draw the mask as a cursor outline instead of a stroke
    pub cursor: bool,
}

impl PaintOptions {
    pub fn preview() -> Self {
        Self {
            preview: true,
            ..Self::default()
        }
    }

    pub fn commit() -> Self {
        Self::default()
    }

    pub fn on_surface(mut self, surface: Option<NodeId>) -> Self {
        self.surface = surface;
        self
    }

    pub fn as_cursor(mut self) -> Self {
        self.cursor = true;
        self
    }
}

/// Named commands a script can ask the host to run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum HostCommand {
    ToggleTool,
    NewFile { interactive: bool },
}

/// What the host reports about the currently selected tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveTool {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub meta: Value,
}

/// Node tree operations
pub trait SceneTree {
    /// Searches the subtree under `parent` for a node with this id
    fn find_child_by_id(&self, parent: NodeId, id: &str) -> Option<NodeId>;

    /// Searches the subtree under `parent` for a node with this name or class tag
    fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId>;

    /// Instantiates the named template as a new child of `parent`
    fn create_child(&mut self, parent: NodeId, template: &str) -> Option<NodeId>;

    fn remove(&mut self, node: NodeId);

    /// Asks the host to deliver `kind` events on `node` to this script
    fn add_event_listener(&mut self, node: NodeId, kind: EventKind);

    fn get(&self, node: NodeId, property: &str) -> Option<Value>;

    fn set(&mut self, node: NodeId, property: &str, value: Value);

    fn visible(&self, node: NodeId) -> bool;

    fn set_visible(&mut self, node: NodeId, visible: bool);

    fn bring_to_front(&mut self, node: NodeId);

    fn focus(&mut self, node: NodeId);

    fn has_tag(&self, node: NodeId, tag: &str) -> bool;

    /// Size of the node on screen
    fn global_size(&self, node: NodeId) -> Option<Vec2>;

    /// Pixels backing the node, for nodes that have any
    fn surface(&self, node: NodeId) -> Option<&RgbaImage>;
}

/// Blends a weighted mask onto a surface with the active color.
pub trait PaintCompositor {
    fn paint(&mut self, mask: &SelectionMask, options: &PaintOptions);
}

/// Application-level commands
pub trait HostCommands {
    fn command(&mut self, command: HostCommand);

    fn quit(&mut self);

    /// Shows an open-file dialog. `None` when the user cancels
    fn open(&mut self, filter: &str, title: &str) -> Option<PathBuf>;

    /// Shows a save-file dialog. `None` when the user cancels
    fn save(&mut self, filter: &str, title: &str, label: &str) -> Option<PathBuf>;

    fn write(&mut self, path: &Path, snapshot: &RgbaImage) -> Result<(), HostError>;

    fn activate_color(&mut self, color: Color32);

    /// Subscribes the script to a host-wide event not bound to any view
    fn listen(&mut self, kind: EventKind);

    fn active_tool(&self) -> Option<ActiveTool>;

    fn apply_tool_config(&mut self, config: Value);

    /// Flattened pixels of the active cell
    fn composite(&self) -> Option<RgbaImage>;

    /// The main window, parent of tool popups
    fn window(&self) -> NodeId;

    fn set_cursor_hidden(&mut self, hidden: bool);
}

/// Everything a script can talk to
pub trait Host: SceneTree + PaintCompositor + HostCommands {}

impl<T: SceneTree + PaintCompositor + HostCommands + ?Sized> Host for T {}
