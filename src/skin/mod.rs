//! UI controllers for the editor's skins.
//!
//! A [`Skin`] declares its controllers through a [`ControllerRegistry`],
//! resolves them against the host's scene once at load and afterwards only
//! routes events. All shared state lives in [`SkinState`].

mod controllers;
pub mod menu;
pub mod registry;

pub use menu::{MenuChange, MenuEntry, MenuGroup};
pub use registry::{ControllerRegistry, SetupReport};

use std::collections::HashMap;
use std::fmt;

use log::info;

use crate::config::{ScriptConfig, SkinKind};
use crate::event::{Dispatch, Event, EventDispatcher, EventKind};
use crate::host::{Host, NodeId};

/// Controller name to bound view
pub type ViewMap = HashMap<String, NodeId>;

/// A click a button already handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Claim {
    origin: NodeId,
    by: Option<NodeId>,
}

/// Context shared by every controller of a skin
#[derive(Debug)]
pub struct SkinState {
    pub kind: SkinKind,
    pub config: ScriptConfig,
    pub views: ViewMap,
    pub menus: MenuGroup,
    claim: Option<Claim>,
}

impl SkinState {
    pub fn view(&self, name: &str) -> Option<NodeId> {
        self.views.get(name).copied()
    }

    /// Marks the click that started at `origin` as handled by a button
    pub fn claim_click(&mut self, origin: Option<NodeId>, by: Option<NodeId>) {
        self.claim = origin.map(|origin| Claim { origin, by });
    }

    /// True if a button already handled the click that started at `origin`
    pub fn is_claimed(&self, origin: Option<NodeId>) -> bool {
        origin.is_some() && self.claim.map(|claim| claim.origin) == origin
    }

    /// Keeps a claim only while the same click travels up to other views.
    /// A new click, or the claiming button being hit again, drops it.
    fn begin_event(&mut self, event: &Event) {
        let Some(claim) = self.claim else {
            return;
        };
        let origin = event.origin.or(event.target);
        if origin != Some(claim.origin) || event.target == claim.by {
            self.claim = None;
        }
    }
}

/// A loaded skin: its state plus the dispatcher its controllers live in
pub struct Skin<H: Host + 'static> {
    state: SkinState,
    dispatcher: EventDispatcher<SkinState, H>,
    report: SetupReport,
}

impl<H: Host + 'static> fmt::Debug for Skin<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Skin")
            .field("state", &self.state)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

impl<H: Host + 'static> Skin<H> {
    /// Wires the skin named in `config` to the scene under `root` and sends
    /// it `init`
    pub fn load(host: &mut H, root: NodeId, config: ScriptConfig) -> Self {
        let kind = config.skin;
        let mut registry = ControllerRegistry::new();
        let menus = controllers::declare(kind, &mut registry, &config);

        let mut dispatcher = EventDispatcher::new();
        let report = registry.setup(host, root, &mut dispatcher);
        info!(
            "Loaded {:?} skin: {} views bound, {} missing",
            kind,
            report.bound.len(),
            report.missing.len()
        );

        let state = SkinState {
            kind,
            config,
            views: report.bound.iter().cloned().collect(),
            menus,
            claim: None,
        };
        let mut skin = Self {
            state,
            dispatcher,
            report,
        };
        skin.handle(host, &Event::new(EventKind::Init));
        skin
    }

    pub fn handle(&mut self, host: &mut H, event: &Event) -> Dispatch {
        self.state.begin_event(event);
        self.dispatcher.dispatch_event(&mut self.state, host, event)
    }

    pub fn state(&self) -> &SkinState {
        &self.state
    }

    pub fn report(&self) -> &SetupReport {
        &self.report
    }

    pub fn view(&self, name: &str) -> Option<NodeId> {
        self.state.view(name)
    }

    /// Closes any open menu and drops the skin's controllers
    pub fn teardown(mut self, host: &mut H) {
        self.state.menus.close(host, &self.state.views);
        info!("Unloaded {:?} skin", self.state.kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SkinState {
        SkinState {
            kind: SkinKind::Futuretro,
            config: ScriptConfig::default(),
            views: ViewMap::new(),
            menus: MenuGroup::new("*clickout"),
            claim: None,
        }
    }

    #[test]
    fn test_claim_follows_the_click_to_ancestors() {
        let (button, menu) = (NodeId::new(), NodeId::new());
        let mut state = state();
        state.claim_click(Some(button), Some(button));

        state.begin_event(&Event::new(EventKind::Click).on(menu).from_origin(button));
        assert!(state.is_claimed(Some(button)));
    }

    #[test]
    fn test_claim_does_not_outlive_its_click() {
        let (button, menu) = (NodeId::new(), NodeId::new());
        let mut state = state();

        state.claim_click(Some(button), Some(button));
        state.begin_event(&Event::new(EventKind::Click).on(button));
        assert!(!state.is_claimed(Some(button)));

        state.claim_click(Some(button), Some(button));
        state.begin_event(&Event::new(EventKind::Click).on(menu));
        assert!(!state.is_claimed(Some(button)));
        assert!(!state.is_claimed(None));
    }
}
