//! Replays a recorded session of host events against a [`MemoryHost`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use egui::Vec2;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ScriptConfig;
use crate::error::{Diagnostic, SessionError};
use crate::event::{Arg, Dispatch, Event, EventKind};
use crate::host::{ActiveTool, MemoryHost, NodeId, SceneTree};
use crate::skin::Skin;
use crate::tools::ToolBox;

/// A node to create before the session starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Id of the parent node. The root window when absent
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub size: Option<[f32; 2]>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// One step of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Step {
    /// Switch tools the way the toolbar would
    Select { tool: String },
    /// Deliver an event. Nodes are referred to by id.
    Event {
        kind: EventKind,
        #[serde(default)]
        target: Option<String>,
        #[serde(default)]
        origin: Option<String>,
        #[serde(default)]
        args: Vec<Arg>,
    },
}

/// A scene, the host's canned answers and the steps to run on it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub config: ScriptConfig,
    pub nodes: Vec<SceneNode>,
    pub active_tool: Option<ActiveTool>,
    pub open_response: Option<PathBuf>,
    pub save_response: Option<PathBuf>,
    /// Size of a blank composite the host hands out on save
    pub composite: Option<[u32; 2]>,
    pub steps: Vec<Step>,
}

/// The host after a replay, and how each step was routed
#[derive(Debug)]
pub struct Replay {
    pub host: MemoryHost,
    pub outcomes: Vec<Dispatch>,
}

impl Session {
    pub fn from_json_str(json: &str) -> Result<Self, SessionError> {
        let session: Self = serde_json::from_str(json)?;
        session.config.validate()?;
        Ok(session)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn run(&self) -> Result<Replay, SessionError> {
        let mut host = MemoryHost::new();
        let root = host.root();
        let mut ids: HashMap<&str, NodeId> = HashMap::new();

        for node in &self.nodes {
            let parent = match &node.parent {
                Some(parent) => lookup(&ids, parent)?,
                None => root,
            };
            let name = if node.name.is_empty() { &node.id } else { &node.name };
            let created = host.add_node(parent, &node.id, name);
            for tag in &node.tags {
                host.add_tag(created, tag);
            }
            if let Some([w, h]) = node.size {
                host.set_size(created, Vec2::new(w, h));
            }
            for (property, value) in &node.properties {
                host.set(created, property, value.clone());
            }
            ids.insert(&node.id, created);
        }

        host.active_tool = self.active_tool.clone();
        host.open_response = self.open_response.clone();
        host.save_response = self.save_response.clone();
        host.composite = self
            .composite
            .map(|[width, height]| image::RgbaImage::new(width, height));

        let mut skin = Skin::load(&mut host, root, self.config.clone());
        let mut toolbox = ToolBox::with_default_tools(self.config.clone());
        let mut outcomes = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            match step {
                Step::Select { tool } => {
                    let outcome = if toolbox.select(&mut host, tool) {
                        Dispatch::Handled {
                            controller: tool.clone(),
                        }
                    } else {
                        Dispatch::Dropped(Diagnostic::UnknownTool { name: tool.clone() })
                    };
                    outcomes.push(outcome);
                }
                Step::Event {
                    kind,
                    target,
                    origin,
                    args,
                } => {
                    let mut event = Event::new(*kind).with_args(args.iter().cloned());
                    if let Some(target) = target {
                        event = event.on(lookup(&ids, target)?);
                    }
                    if let Some(origin) = origin {
                        event = event.from_origin(lookup(&ids, origin)?);
                    }
                    let outcome = if kind.is_tool_event() {
                        toolbox.handle(&mut host, &event)
                    } else {
                        skin.handle(&mut host, &event)
                    };
                    debug!("{} -> {:?}", kind, outcome);
                    outcomes.push(outcome);
                }
            }
        }

        toolbox.deselect(&mut host);
        skin.teardown(&mut host);
        info!(
            "Replayed {} steps, {} masks still held",
            self.steps.len(),
            toolbox.ledger().outstanding()
        );
        Ok(Replay { host, outcomes })
    }
}

fn lookup(ids: &HashMap<&str, NodeId>, id: &str) -> Result<NodeId, SessionError> {
    ids.get(id)
        .copied()
        .ok_or_else(|| SessionError::UnknownNode(id.to_owned()))
}
