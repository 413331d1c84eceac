//! A host that keeps its scene in memory and records every command it gets.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use egui::{Color32, Vec2};
use image::{ImageFormat, RgbaImage};
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{ActiveTool, HostCommand, HostCommands, NodeId, PaintCompositor, PaintOptions, SceneTree};
use crate::error::HostError;
use crate::event::EventKind;
use crate::mask::{MaskId, SelectionMask};

/// One node of the in-memory scene
#[derive(Debug, Clone)]
pub struct MemoryNode {
    pub id: String,
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub tags: Vec<String>,
    pub properties: Map<String, Value>,
    pub visible: bool,
    pub listeners: Vec<EventKind>,
    pub size: Vec2,
    pub surface: Option<RgbaImage>,
}

impl MemoryNode {
    fn new(id: &str, name: &str, parent: Option<NodeId>) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            parent,
            children: Vec::new(),
            tags: Vec::new(),
            properties: Map::new(),
            visible: true,
            listeners: Vec::new(),
            size: Vec2::ZERO,
            surface: None,
        }
    }
}

/// Everything a script asked the host to do, in order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Recorded {
    Paint {
        mask: MaskId,
        samples: Vec<(i32, i32, u8)>,
        options: PaintOptions,
    },
    Command {
        command: HostCommand,
    },
    Quit,
    Open {
        filter: String,
        title: String,
    },
    Save {
        filter: String,
        title: String,
        label: String,
    },
    Write {
        path: PathBuf,
        bytes: usize,
    },
    ActivateColor {
        rgba: [u8; 4],
    },
    ApplyToolConfig {
        config: Value,
    },
    CursorHidden {
        hidden: bool,
    },
    Created {
        node: NodeId,
        template: String,
    },
    Removed {
        node: NodeId,
    },
    BringToFront {
        node: NodeId,
    },
    Focus {
        node: NodeId,
    },
}

/// In-memory [`super::Host`].
///
/// Dialog answers, the active tool and the composite are plain fields the
/// caller sets up front.
#[derive(Debug)]
pub struct MemoryHost {
    nodes: HashMap<NodeId, MemoryNode>,
    root: NodeId,
    z_order: Vec<NodeId>,
    log: Vec<Recorded>,
    listening: Vec<EventKind>,
    files: HashMap<PathBuf, Vec<u8>>,
    cursor_hidden: bool,
    quit: bool,
    color: Option<Color32>,
    pub active_tool: Option<ActiveTool>,
    pub open_response: Option<PathBuf>,
    pub save_response: Option<PathBuf>,
    pub composite: Option<RgbaImage>,
    pub fail_writes: bool,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// A scene holding only the root window
    pub fn new() -> Self {
        let root = NodeId::new();
        let mut nodes = HashMap::new();
        nodes.insert(root, MemoryNode::new("window", "window", None));
        Self {
            nodes,
            root,
            z_order: vec![root],
            log: Vec::new(),
            listening: Vec::new(),
            files: HashMap::new(),
            cursor_hidden: false,
            quit: false,
            color: None,
            active_tool: None,
            open_response: None,
            save_response: None,
            composite: None,
            fail_writes: false,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Adds a node under `parent` and returns its identity
    pub fn add_node(&mut self, parent: NodeId, id: &str, name: &str) -> NodeId {
        let node = NodeId::new();
        self.nodes.insert(node, MemoryNode::new(id, name, Some(parent)));
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.push(node);
        }
        self.z_order.push(node);
        node
    }

    pub fn add_tag(&mut self, node: NodeId, tag: &str) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.tags.push(tag.to_owned());
        }
    }

    pub fn set_size(&mut self, node: NodeId, size: Vec2) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.size = size;
        }
    }

    pub fn set_surface(&mut self, node: NodeId, surface: RgbaImage) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.surface = Some(surface);
        }
    }

    pub fn node(&self, node: NodeId) -> Option<&MemoryNode> {
        self.nodes.get(&node)
    }

    /// Looks a node up by id anywhere in the scene
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.find_child_by_id(self.root, id)
    }

    pub fn log(&self) -> &[Recorded] {
        &self.log
    }

    pub fn take_log(&mut self) -> Vec<Recorded> {
        std::mem::take(&mut self.log)
    }

    /// Every paint call, in order
    pub fn paints(&self) -> Vec<(MaskId, &[(i32, i32, u8)], PaintOptions)> {
        self.log
            .iter()
            .filter_map(|entry| match entry {
                Recorded::Paint { mask, samples, options } => Some((*mask, samples.as_slice(), *options)),
                _ => None,
            })
            .collect()
    }

    pub fn commands(&self) -> Vec<&HostCommand> {
        self.log
            .iter()
            .filter_map(|entry| match entry {
                Recorded::Command { command } => Some(command),
                _ => None,
            })
            .collect()
    }

    /// Host-wide events scripts subscribed to
    pub fn listening(&self) -> &[EventKind] {
        &self.listening
    }

    pub fn file(&self, path: &Path) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn has_quit(&self) -> bool {
        self.quit
    }

    pub fn active_color(&self) -> Option<Color32> {
        self.color
    }

    pub fn cursor_hidden(&self) -> bool {
        self.cursor_hidden
    }

    /// The node drawn on top of all others
    pub fn front_most(&self) -> Option<NodeId> {
        self.z_order.last().copied()
    }

    fn find(&self, parent: NodeId, matches: &dyn Fn(&MemoryNode) -> bool) -> Option<NodeId> {
        let node = self.nodes.get(&parent)?;
        for &child in &node.children {
            if self.nodes.get(&child).is_some_and(|c| matches(c)) {
                return Some(child);
            }
            if let Some(found) = self.find(child, matches) {
                return Some(found);
            }
        }
        None
    }

    fn remove_subtree(&mut self, node: NodeId) {
        if let Some(removed) = self.nodes.remove(&node) {
            self.z_order.retain(|&other| other != node);
            for child in removed.children {
                self.remove_subtree(child);
            }
        }
    }
}

impl SceneTree for MemoryHost {
    fn find_child_by_id(&self, parent: NodeId, id: &str) -> Option<NodeId> {
        self.find(parent, &|node| node.id == id)
    }

    fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.find(parent, &|node| node.name == name || node.tags.iter().any(|tag| tag == name))
    }

    fn create_child(&mut self, parent: NodeId, template: &str) -> Option<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return None;
        }
        let node = self.add_node(parent, template, template);
        self.log.push(Recorded::Created {
            node,
            template: template.to_owned(),
        });
        Some(node)
    }

    fn remove(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(&node).map(|n| n.parent) else {
            debug!("remove: node {} already gone", node);
            return;
        };
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|&child| child != node);
        }
        self.remove_subtree(node);
        self.log.push(Recorded::Removed { node });
    }

    fn add_event_listener(&mut self, node: NodeId, kind: EventKind) {
        if let Some(node) = self.nodes.get_mut(&node) {
            if !node.listeners.contains(&kind) {
                node.listeners.push(kind);
            }
        }
    }

    fn get(&self, node: NodeId, property: &str) -> Option<Value> {
        self.nodes.get(&node)?.properties.get(property).cloned()
    }

    fn set(&mut self, node: NodeId, property: &str, value: Value) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.properties.insert(property.to_owned(), value);
        }
    }

    fn visible(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|node| node.visible)
    }

    fn set_visible(&mut self, node: NodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.visible = visible;
        }
    }

    fn bring_to_front(&mut self, node: NodeId) {
        if !self.nodes.contains_key(&node) {
            return;
        }
        self.z_order.retain(|&other| other != node);
        self.z_order.push(node);
        self.log.push(Recorded::BringToFront { node });
    }

    fn focus(&mut self, node: NodeId) {
        self.log.push(Recorded::Focus { node });
    }

    fn has_tag(&self, node: NodeId, tag: &str) -> bool {
        self.nodes
            .get(&node)
            .is_some_and(|node| node.tags.iter().any(|t| t == tag))
    }

    fn global_size(&self, node: NodeId) -> Option<Vec2> {
        self.nodes.get(&node).map(|node| node.size)
    }

    fn surface(&self, node: NodeId) -> Option<&RgbaImage> {
        self.nodes.get(&node)?.surface.as_ref()
    }
}

impl PaintCompositor for MemoryHost {
    fn paint(&mut self, mask: &SelectionMask, options: &PaintOptions) {
        self.log.push(Recorded::Paint {
            mask: mask.id(),
            samples: mask.to_sorted_vec(),
            options: *options,
        });
    }
}

impl HostCommands for MemoryHost {
    fn command(&mut self, command: HostCommand) {
        self.log.push(Recorded::Command { command });
    }

    fn quit(&mut self) {
        self.quit = true;
        self.log.push(Recorded::Quit);
    }

    fn open(&mut self, filter: &str, title: &str) -> Option<PathBuf> {
        self.log.push(Recorded::Open {
            filter: filter.to_owned(),
            title: title.to_owned(),
        });
        self.open_response.clone()
    }

    fn save(&mut self, filter: &str, title: &str, label: &str) -> Option<PathBuf> {
        self.log.push(Recorded::Save {
            filter: filter.to_owned(),
            title: title.to_owned(),
            label: label.to_owned(),
        });
        self.save_response.clone()
    }

    fn write(&mut self, path: &Path, snapshot: &RgbaImage) -> Result<(), HostError> {
        let write_error = |reason: String| HostError::Write {
            path: path.display().to_string(),
            reason,
        };
        if self.fail_writes {
            return Err(write_error("writes disabled".to_owned()));
        }
        let mut bytes = Cursor::new(Vec::new());
        snapshot
            .write_to(&mut bytes, ImageFormat::Png)
            .map_err(|e| write_error(e.to_string()))?;
        let bytes = bytes.into_inner();
        self.log.push(Recorded::Write {
            path: path.to_path_buf(),
            bytes: bytes.len(),
        });
        self.files.insert(path.to_path_buf(), bytes);
        Ok(())
    }

    fn activate_color(&mut self, color: Color32) {
        self.color = Some(color);
        self.log.push(Recorded::ActivateColor { rgba: color.to_array() });
    }

    fn listen(&mut self, kind: EventKind) {
        if !self.listening.contains(&kind) {
            self.listening.push(kind);
        }
    }

    fn active_tool(&self) -> Option<ActiveTool> {
        self.active_tool.clone()
    }

    fn apply_tool_config(&mut self, config: Value) {
        self.log.push(Recorded::ApplyToolConfig { config });
    }

    fn composite(&self) -> Option<RgbaImage> {
        self.composite.clone()
    }

    fn window(&self) -> NodeId {
        self.root
    }

    fn set_cursor_hidden(&mut self, hidden: bool) {
        self.cursor_hidden = hidden;
        self.log.push(Recorded::CursorHidden { hidden });
    }
}
