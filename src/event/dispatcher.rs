use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};

use super::{Arg, Event, EventKind};
use crate::error::Diagnostic;
use crate::host::NodeId;

/// Name of the unscoped controller every dispatcher falls back to
pub const SCRIPT_CONTROLLER: &str = "script";

/// Who a controller table belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// A controller bound to one host view
    View(NodeId),
    /// The script-level controller, used as fallback for every view
    Script,
}

/// Everything a handler gets to see about the event it is handling
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub kind: EventKind,
    /// Name of the controller that is handling the event
    pub controller: &'a str,
    /// The view bound to that controller, if any
    pub view: Option<NodeId>,
    /// The node the host reported the event on
    pub target: Option<NodeId>,
    /// The innermost node under the pointer, `target` when not reported
    pub origin: Option<NodeId>,
    pub args: &'a [Arg],
}

/// A registered event handler.
///
/// `S` is the script's own state, `H` the host it issues commands to. Both are
/// passed in on every call instead of being captured.
pub type Handler<S, H> = Box<dyn FnMut(&mut S, &mut H, &Invocation<'_>)>;

/// How a dispatched event was routed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The controller owning the target handled it
    Handled { controller: String },
    /// The script controller handled it
    FellBack,
    /// Nobody listens for this event
    Dropped(Diagnostic),
}

impl Dispatch {
    pub fn was_handled(&self) -> bool {
        !matches!(self, Self::Dropped(_))
    }
}

/// Routes named events to per-target controller tables.
///
/// Tables are filled once at setup. Resolution goes through a reverse index
/// from node identity to controller, so it depends only on what is registered
/// and never on registration order.
pub struct EventDispatcher<S, H: ?Sized> {
    tables: HashMap<Target, HashMap<EventKind, Handler<S, H>>>,
    names: HashMap<NodeId, String>,
    views: HashMap<String, NodeId>,
}

impl<S, H: ?Sized> Default for EventDispatcher<S, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, H: ?Sized> fmt::Debug for EventDispatcher<S, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &format!("<{} handlers>", self.len()))
            .field("views", &self.views)
            .finish()
    }
}

impl<S, H: ?Sized> EventDispatcher<S, H> {
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
            names: HashMap::new(),
            views: HashMap::new(),
        }
    }

    /// Record that `node` is the view of the controller called `name`
    pub fn bind_view(&mut self, node: NodeId, name: &str) {
        self.names.insert(node, name.to_owned());
        self.views.insert(name.to_owned(), node);
    }

    /// The view bound to the controller called `name`
    pub fn view(&self, name: &str) -> Option<NodeId> {
        self.views.get(name).copied()
    }

    /// The controller name bound to `node`
    pub fn controller_of(&self, node: NodeId) -> Option<&str> {
        self.names.get(&node).map(String::as_str)
    }

    pub fn register(&mut self, target: Target, kind: EventKind, handler: Handler<S, H>) {
        let table = self.tables.entry(target).or_default();
        if table.insert(kind, handler).is_some() {
            debug!("Replacing listener \"{}\" on {:?}", kind, target);
        }
    }

    pub fn has_handler(&self, target: Target, kind: EventKind) -> bool {
        self.tables
            .get(&target)
            .is_some_and(|table| table.contains_key(&kind))
    }

    /// Total number of registered handlers
    pub fn len(&self) -> usize {
        self.tables.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Route `kind` on `target` to its handler, falling back to the script
    /// controller. Unresolved events are logged and dropped.
    pub fn dispatch(
        &mut self,
        state: &mut S,
        host: &mut H,
        kind: EventKind,
        target: Option<NodeId>,
        args: &[Arg],
    ) -> Dispatch {
        self.route(state, host, kind, target, target, args)
    }

    /// Like [`EventDispatcher::dispatch`], keeping the event's origin
    pub fn dispatch_event(&mut self, state: &mut S, host: &mut H, event: &Event) -> Dispatch {
        let origin = event.origin.or(event.target);
        self.route(state, host, event.kind, event.target, origin, &event.args)
    }

    fn route(
        &mut self,
        state: &mut S,
        host: &mut H,
        kind: EventKind,
        target: Option<NodeId>,
        origin: Option<NodeId>,
        args: &[Arg],
    ) -> Dispatch {
        let owner = target.filter(|node| self.tables.contains_key(&Target::View(*node)));
        let owner_name = owner
            .and_then(|node| self.names.get(&node))
            .map(String::as_str)
            .unwrap_or("<unnamed>");

        if let Some(node) = owner {
            if let Some(handler) = self
                .tables
                .get_mut(&Target::View(node))
                .and_then(|table| table.get_mut(&kind))
            {
                debug!("{}.{}", owner_name, kind);
                let invocation = Invocation {
                    kind,
                    controller: owner_name,
                    view: Some(node),
                    target,
                    origin,
                    args,
                };
                handler(state, host, &invocation);
                return Dispatch::Handled {
                    controller: owner_name.to_owned(),
                };
            }
        }

        if let Some(handler) = self
            .tables
            .get_mut(&Target::Script)
            .and_then(|table| table.get_mut(&kind))
        {
            debug!("{}.{}", SCRIPT_CONTROLLER, kind);
            let invocation = Invocation {
                kind,
                controller: SCRIPT_CONTROLLER,
                view: self.views.get(SCRIPT_CONTROLLER).copied(),
                target,
                origin,
                args,
            };
            handler(state, host, &invocation);
            return Dispatch::FellBack;
        }

        let diagnostic = Diagnostic::UnresolvedTarget {
            kind,
            controller: SCRIPT_CONTROLLER.to_owned(),
        };
        warn!("{}", diagnostic);
        Dispatch::Dropped(diagnostic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Calls(Vec<String>);

    type TestDispatcher = EventDispatcher<Calls, ()>;

    fn recorder(label: &'static str) -> Handler<Calls, ()> {
        Box::new(move |calls: &mut Calls, _: &mut (), inv: &Invocation<'_>| {
            calls.0.push(format!("{}:{}:{}", label, inv.controller, inv.kind));
        })
    }

    #[test]
    fn test_registered_handler_wins_over_fallback() {
        let button = NodeId::new();
        let mut dispatcher = TestDispatcher::new();
        dispatcher.bind_view(button, "quitbutton");
        dispatcher.register(Target::View(button), EventKind::Click, recorder("view"));
        dispatcher.register(Target::Script, EventKind::Click, recorder("script"));

        let mut calls = Calls::default();
        let outcome = dispatcher.dispatch(&mut calls, &mut (), EventKind::Click, Some(button), &[]);

        assert_eq!(
            outcome,
            Dispatch::Handled {
                controller: "quitbutton".to_owned()
            }
        );
        assert_eq!(calls.0, vec!["view:quitbutton:click"]);
    }

    #[test]
    fn test_missing_kind_falls_back_to_script() {
        let button = NodeId::new();
        let mut dispatcher = TestDispatcher::new();
        dispatcher.bind_view(button, "startbutton");
        dispatcher.register(Target::View(button), EventKind::MouseUp, recorder("view"));
        dispatcher.register(Target::Script, EventKind::Click, recorder("script"));

        let mut calls = Calls::default();
        let outcome = dispatcher.dispatch(&mut calls, &mut (), EventKind::Click, Some(button), &[]);

        assert_eq!(outcome, Dispatch::FellBack);
        assert_eq!(calls.0, vec!["script:script:click"]);
    }

    #[test]
    fn test_unknown_target_uses_fallback() {
        let mut dispatcher = TestDispatcher::new();
        dispatcher.register(Target::Script, EventKind::Tick, recorder("script"));

        let mut calls = Calls::default();
        let outcome = dispatcher.dispatch(&mut calls, &mut (), EventKind::Tick, Some(NodeId::new()), &[]);

        assert_eq!(outcome, Dispatch::FellBack);
        assert_eq!(calls.0.len(), 1);
    }

    #[test]
    fn test_unresolved_event_is_dropped_not_failed() {
        let mut dispatcher = TestDispatcher::new();
        dispatcher.register(Target::Script, EventKind::Click, recorder("script"));

        let mut calls = Calls::default();
        let outcome = dispatcher.dispatch(&mut calls, &mut (), EventKind::Change, None, &[]);

        assert!(!outcome.was_handled());
        assert!(matches!(
            outcome,
            Dispatch::Dropped(Diagnostic::UnresolvedTarget {
                kind: EventKind::Change,
                ..
            })
        ));
        assert!(calls.0.is_empty());
    }

    #[test]
    fn test_handler_sees_view_and_args() {
        let panel = NodeId::new();
        let mut dispatcher: EventDispatcher<Vec<(Option<NodeId>, usize)>, ()> = EventDispatcher::new();
        dispatcher.bind_view(panel, "toolconfigpanel");
        dispatcher.register(
            Target::View(panel),
            EventKind::Change,
            Box::new(
                |seen: &mut Vec<(Option<NodeId>, usize)>, _: &mut (), inv: &Invocation<'_>| {
                    seen.push((inv.view, inv.args.len()))
                },
            ),
        );

        let mut seen = Vec::new();
        let args = [Arg::from(1.0), Arg::from(true)];
        dispatcher.dispatch(&mut seen, &mut (), EventKind::Change, Some(panel), &args);

        assert_eq!(seen, vec![(Some(panel), 2)]);
        assert_eq!(dispatcher.view("toolconfigpanel"), Some(panel));
        assert_eq!(dispatcher.controller_of(panel), Some("toolconfigpanel"));
        assert_eq!(dispatcher.len(), 1);
    }
}
