use log::{debug, warn};
use serde_json::Value;

use crate::host::{NodeId, SceneTree};

use super::ViewMap;

/// Button `state` while its menu is open
pub const STATE_ACTIVE: &str = "active";
/// Button `state` while its menu is closed
pub const STATE_ENABLED: &str = "enabled";

/// A button and the menu it opens, by controller name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub button: String,
    pub menu: String,
}

/// What [`MenuGroup::button_pressed`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChange {
    Opened,
    Closed,
    /// The button or its menu has no view
    Unchanged,
}

/// Menus of which at most one is open at a time.
///
/// Opening a menu shows it, marks its button active and raises it. Closing
/// hides it and marks the button enabled again. Both always happen together.
#[derive(Debug, Clone)]
pub struct MenuGroup {
    entries: Vec<MenuEntry>,
    active: Option<usize>,
    clickout_tag: String,
}

impl MenuGroup {
    pub fn new(clickout_tag: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            active: None,
            clickout_tag: clickout_tag.into(),
        }
    }

    pub fn with_menu(mut self, button: &str, menu: &str) -> Self {
        self.entries.push(MenuEntry {
            button: button.to_owned(),
            menu: menu.to_owned(),
        });
        self
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn clickout_tag(&self) -> &str {
        &self.clickout_tag
    }

    /// The open menu, if any
    pub fn active(&self) -> Option<&MenuEntry> {
        self.active.map(|index| &self.entries[index])
    }

    pub fn is_open(&self, menu: &str) -> bool {
        self.active().is_some_and(|entry| entry.menu == menu)
    }

    /// Toggles the menu belonging to `button`, closing any other open menu
    pub fn button_pressed<H>(&mut self, host: &mut H, views: &ViewMap, button: &str) -> MenuChange
    where
        H: SceneTree + ?Sized,
    {
        let Some(index) = self.entries.iter().position(|entry| entry.button == button) else {
            warn!("No menu for button {}", button);
            return MenuChange::Unchanged;
        };

        if self.active == Some(index) {
            self.close(host, views);
            return MenuChange::Closed;
        }

        let entry = &self.entries[index];
        let (Some(button_node), Some(menu_node)) = (views.get(&entry.button), views.get(&entry.menu)) else {
            warn!("Menu {} is not bound to a view", entry.menu);
            return MenuChange::Unchanged;
        };
        let (button_node, menu_node) = (*button_node, *menu_node);

        self.close(host, views);
        debug!("Opening {}", self.entries[index].menu);
        host.set_visible(menu_node, true);
        host.set(button_node, "state", Value::from(STATE_ACTIVE));
        host.bring_to_front(menu_node);
        self.active = Some(index);
        MenuChange::Opened
    }

    /// Closes the open menu when a click lands on a clickout region that no
    /// button already handled. Returns true if a menu was closed.
    pub fn outside_click<H>(&mut self, host: &mut H, views: &ViewMap, origin: Option<NodeId>, handled: bool) -> bool
    where
        H: SceneTree + ?Sized,
    {
        if handled || self.active.is_none() {
            return false;
        }
        let Some(origin) = origin else {
            return false;
        };
        if !host.has_tag(origin, &self.clickout_tag) {
            return false;
        }
        self.close(host, views)
    }

    /// Closes the open menu. Returns false if none was open.
    pub fn close<H>(&mut self, host: &mut H, views: &ViewMap) -> bool
    where
        H: SceneTree + ?Sized,
    {
        let Some(index) = self.active.take() else {
            return false;
        };
        let entry = &self.entries[index];
        debug!("Closing {}", entry.menu);
        if let Some(&menu) = views.get(&entry.menu) {
            host.set_visible(menu, false);
        }
        if let Some(&button) = views.get(&entry.button) {
            host.set(button, "state", Value::from(STATE_ENABLED));
        }
        true
    }
}

/// Hides a clickout overlay when it is clicked directly
pub fn dismiss_clickout<H>(host: &mut H, origin: Option<NodeId>, tag: &str) -> bool
where
    H: SceneTree + ?Sized,
{
    match origin {
        Some(node) if host.has_tag(node, tag) => {
            host.set_visible(node, false);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    struct Fixture {
        host: MemoryHost,
        views: ViewMap,
        group: MenuGroup,
    }

    fn fixture() -> Fixture {
        let mut host = MemoryHost::new();
        let root = host.root();
        let mut views = ViewMap::new();
        for name in ["startbutton", "filemenu", "filterbutton", "filtermenu"] {
            let node = host.add_node(root, name, name);
            views.insert(name.to_owned(), node);
        }
        host.add_tag(views["filemenu"], "*clickout");
        let group = MenuGroup::new("*clickout")
            .with_menu("startbutton", "filemenu")
            .with_menu("filterbutton", "filtermenu");
        Fixture { host, views, group }
    }

    fn state(host: &MemoryHost, node: NodeId) -> Option<Value> {
        host.get(node, "state")
    }

    #[test]
    fn test_second_menu_replaces_first() {
        let Fixture { mut host, views, mut group } = fixture();

        assert_eq!(group.button_pressed(&mut host, &views, "startbutton"), MenuChange::Opened);
        assert_eq!(group.button_pressed(&mut host, &views, "filterbutton"), MenuChange::Opened);

        assert!(group.is_open("filtermenu"));
        assert!(!host.visible(views["filemenu"]));
        assert!(host.visible(views["filtermenu"]));
        assert_eq!(state(&host, views["startbutton"]), Some(Value::from("enabled")));
        assert_eq!(state(&host, views["filterbutton"]), Some(Value::from("active")));
        assert_eq!(host.front_most(), Some(views["filtermenu"]));
    }

    #[test]
    fn test_pressing_again_closes() {
        let Fixture { mut host, views, mut group } = fixture();
        group.button_pressed(&mut host, &views, "startbutton");
        assert_eq!(group.button_pressed(&mut host, &views, "startbutton"), MenuChange::Closed);
        assert!(group.active().is_none());
        assert!(!host.visible(views["filemenu"]));
    }

    #[test]
    fn test_outside_click_needs_clickout_tag() {
        let Fixture { mut host, views, mut group } = fixture();
        group.button_pressed(&mut host, &views, "startbutton");

        assert!(!group.outside_click(&mut host, &views, Some(views["filterbutton"]), false));
        assert!(!group.outside_click(&mut host, &views, Some(views["filemenu"]), true));
        assert!(group.is_open("filemenu"));

        assert!(group.outside_click(&mut host, &views, Some(views["filemenu"]), false));
        assert!(group.active().is_none());
        assert_eq!(state(&host, views["startbutton"]), Some(Value::from("enabled")));
    }

    #[test]
    fn test_close_is_idempotent() {
        let Fixture { mut host, views, mut group } = fixture();
        assert!(!group.close(&mut host, &views));
        group.button_pressed(&mut host, &views, "startbutton");
        assert!(group.close(&mut host, &views));
        assert!(!group.close(&mut host, &views));
    }

    #[test]
    fn test_unbound_menu_is_left_alone() {
        let Fixture { mut host, views, .. } = fixture();
        let mut group = MenuGroup::new("*clickout").with_menu("helpbutton", "helpmenu");
        assert_eq!(group.button_pressed(&mut host, &views, "helpbutton"), MenuChange::Unchanged);
        assert_eq!(group.button_pressed(&mut host, &views, "nobutton"), MenuChange::Unchanged);
        assert!(group.active().is_none());
    }

    #[test]
    fn test_dismiss_clickout_hides_tagged_overlay() {
        let Fixture { mut host, views, .. } = fixture();
        assert!(!dismiss_clickout(&mut host, Some(views["startbutton"]), "*clickout"));
        assert!(dismiss_clickout(&mut host, Some(views["filemenu"]), "*clickout"));
        assert!(!host.visible(views["filemenu"]));
    }
}
