use std::fmt;

use log::{debug, info, warn};

use crate::config::ScriptConfig;
use crate::error::Diagnostic;
use crate::event::{Arg, Dispatch, Event, EventDispatcher, EventKind, Invocation, Target};
use crate::host::{Host, NodeId};
use crate::mask::MaskLedger;

use super::{GestureState, Tool, ToolInput, ToolType, new_tool};

struct ToolSlot<H: 'static> {
    tool: ToolType,
    script: EventDispatcher<ToolType, H>,
}

/// Owns every tool and drives their gestures.
///
/// At most one tool is selected and at most one gesture is active. Switching
/// tools always deactivates the outgoing tool before the incoming one sees
/// any event, and every `toolend` or `tooldeactivate` ends in
/// [`super::Gesture::finalize`], so no mask outlives its gesture.
pub struct ToolBox<H: Host + 'static> {
    config: ScriptConfig,
    ledger: MaskLedger,
    slots: Vec<ToolSlot<H>>,
    selected: Option<usize>,
}

impl<H: Host + 'static> fmt::Debug for ToolBox<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolBox")
            .field("tools", &self.names().collect::<Vec<_>>())
            .field("selected", &self.selected().map(|tool| tool.name()))
            .field("ledger", &self.ledger)
            .finish()
    }
}

impl<H: Host + 'static> ToolBox<H> {
    pub fn new(config: ScriptConfig) -> Self {
        Self {
            config,
            ledger: MaskLedger::new(),
            slots: Vec::new(),
            selected: None,
        }
    }

    /// A toolbox with square, spray, hand and wheel registered
    pub fn with_default_tools(config: ScriptConfig) -> Self {
        let mut toolbox = Self::new(config);
        for name in ["square", "spray", "hand", "wheel"] {
            toolbox.add_named(name);
        }
        toolbox
    }

    pub fn ledger(&self) -> &MaskLedger {
        &self.ledger
    }

    /// Registers a tool by name. Returns false for unknown names.
    pub fn add_named(&mut self, name: &str) -> bool {
        match new_tool(name, &self.config, &self.ledger) {
            Some(tool) => {
                self.add_tool(tool);
                true
            }
            None => {
                warn!("{}", Diagnostic::UnknownTool { name: name.to_owned() });
                false
            }
        }
    }

    /// Registers `tool`, replacing any tool with the same name
    pub fn add_tool(&mut self, tool: ToolType) {
        let script = Self::script_for(&tool);
        let slot = ToolSlot { tool, script };
        match self.index_of(slot.tool.name()) {
            Some(index) => {
                info!("Replacing tool {}", slot.tool.name());
                if self.selected == Some(index) {
                    self.selected = None;
                }
                self.slots[index] = slot;
            }
            None => self.slots.push(slot),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().map(|slot| slot.tool.name())
    }

    pub fn tool(&self, name: &str) -> Option<&ToolType> {
        self.index_of(name).map(|index| &self.slots[index].tool)
    }

    pub fn selected(&self) -> Option<&ToolType> {
        self.selected.map(|index| &self.slots[index].tool)
    }

    /// The tool currently in the middle of a gesture
    pub fn active(&self) -> Option<&ToolType> {
        self.slots
            .iter()
            .map(|slot| &slot.tool)
            .find(|tool| tool.gesture().state() == GestureState::Active)
    }

    /// Makes `name` the selected tool, deactivating the previous one first
    pub fn select(&mut self, host: &mut H, name: &str) -> bool {
        let Some(index) = self.index_of(name) else {
            warn!("{}", Diagnostic::UnknownTool { name: name.to_owned() });
            return false;
        };
        if self.selected == Some(index) {
            return true;
        }
        self.deselect(host);
        self.selected = Some(index);
        info!("Activating tool {}", name);
        self.deliver(index, host, EventKind::ToolActivate, None, &[]);
        true
    }

    /// Deactivates the selected tool, aborting any gesture in progress
    pub fn deselect(&mut self, host: &mut H) {
        if let Some(index) = self.selected.take() {
            self.deliver(index, host, EventKind::ToolDeactivate, None, &[]);
        }
    }

    /// Delivers a host event to the selected tool
    pub fn handle(&mut self, host: &mut H, event: &Event) -> Dispatch {
        let Some(index) = self.selected else {
            let diagnostic = Diagnostic::UnresolvedTarget {
                kind: event.kind,
                controller: "toolbox".to_owned(),
            };
            warn!("{}", diagnostic);
            return Dispatch::Dropped(diagnostic);
        };

        if event.kind == EventKind::ToolStart {
            let stale: Vec<usize> = (0..self.slots.len())
                .filter(|&other| {
                    other != index && self.slots[other].tool.gesture().state() == GestureState::Active
                })
                .collect();
            for other in stale {
                self.deliver(other, host, EventKind::ToolDeactivate, None, &[]);
            }
        }

        self.deliver(index, host, event.kind, event.target, &event.args)
    }

    fn deliver(
        &mut self,
        index: usize,
        host: &mut H,
        kind: EventKind,
        target: Option<NodeId>,
        args: &[Arg],
    ) -> Dispatch {
        let slot = &mut self.slots[index];
        if kind == EventKind::ToolStart {
            let which = ToolInput::from_args(args, target).which;
            slot.tool.gesture_mut().start(which);
        }

        let outcome = slot.script.dispatch(&mut slot.tool, host, kind, target, args);

        match kind {
            EventKind::ToolActivate => slot.tool.gesture_mut().arm(),
            EventKind::ToolEnd => {
                slot.tool.gesture_mut().finalize();
                slot.tool.gesture_mut().arm();
            }
            EventKind::ToolDeactivate => {
                slot.tool.gesture_mut().finalize();
            }
            _ => {}
        }
        outcome
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.tool.name() == name)
    }

    fn script_for(tool: &ToolType) -> EventDispatcher<ToolType, H> {
        let mut script = EventDispatcher::new();
        for &kind in tool.events() {
            script.register(
                Target::Script,
                kind,
                Box::new(|tool: &mut ToolType, host: &mut H, invocation: &Invocation<'_>| {
                    tool.handle(host, invocation)
                }),
            );
        }
        // Gesture events a tool does not use are expected, not unresolved
        for kind in EventKind::ALL {
            if kind.is_tool_event() && !tool.events().contains(&kind) {
                script.register(
                    Target::Script,
                    kind,
                    Box::new(|tool: &mut ToolType, _: &mut H, invocation: &Invocation<'_>| {
                        debug!("{} ignores {}", tool.name(), invocation.kind)
                    }),
                );
            }
        }
        script
    }
}
