use log::{info, warn};

use crate::error::Diagnostic;
use crate::event::{EventDispatcher, EventKind, Handler, Target};
use crate::host::{Host, NodeId};

struct ControllerDecl<S, H: ?Sized> {
    name: String,
    handlers: Vec<(EventKind, Handler<S, H>)>,
}

/// What [`ControllerRegistry::setup`] managed to wire up
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupReport {
    /// Controllers whose view was found, in declaration order
    pub bound: Vec<(String, NodeId)>,
    /// One [`Diagnostic::MissingView`] per controller without a view
    pub missing: Vec<Diagnostic>,
}

impl SetupReport {
    pub fn view(&self, name: &str) -> Option<NodeId> {
        self.bound
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|&(_, node)| node)
    }
}

/// Declares which controllers a script has and what each listens to.
///
/// Nothing touches the host until [`ControllerRegistry::setup`], which
/// resolves every controller name to a view and hands the handlers to an
/// [`EventDispatcher`].
pub struct ControllerRegistry<S, H: ?Sized> {
    controllers: Vec<ControllerDecl<S, H>>,
    script: Vec<(EventKind, Handler<S, H>)>,
}

impl<S, H: ?Sized> Default for ControllerRegistry<S, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, H: ?Sized> ControllerRegistry<S, H> {
    pub fn new() -> Self {
        Self {
            controllers: Vec::new(),
            script: Vec::new(),
        }
    }

    /// Declares a controller with no handlers. Its view is still looked up.
    pub fn view(&mut self, name: &str) -> &mut Self {
        self.decl(name);
        self
    }

    /// Adds a handler for `kind` to the controller called `name`
    pub fn on(&mut self, name: &str, kind: EventKind, handler: Handler<S, H>) -> &mut Self {
        self.decl(name).handlers.push((kind, handler));
        self
    }

    /// Adds a script-level handler, used as fallback for every view
    pub fn on_script(&mut self, kind: EventKind, handler: Handler<S, H>) -> &mut Self {
        self.script.push((kind, handler));
        self
    }

    pub fn controller_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.controllers.iter().map(|decl| decl.name.as_str())
    }

    fn decl(&mut self, name: &str) -> &mut ControllerDecl<S, H> {
        let index = match self.controllers.iter().position(|decl| decl.name == name) {
            Some(index) => index,
            None => {
                self.controllers.push(ControllerDecl {
                    name: name.to_owned(),
                    handlers: Vec::new(),
                });
                self.controllers.len() - 1
            }
        };
        &mut self.controllers[index]
    }
}

impl<S, H: Host + ?Sized> ControllerRegistry<S, H> {
    /// Resolves every controller under `root` and fills `dispatcher`
    pub fn setup(self, host: &mut H, root: NodeId, dispatcher: &mut EventDispatcher<S, H>) -> SetupReport {
        let mut report = SetupReport::default();

        for decl in self.controllers {
            let found = host
                .find_child_by_id(root, &decl.name)
                .or_else(|| host.find_child(root, &decl.name));
            let Some(node) = found else {
                let diagnostic = Diagnostic::MissingView { name: decl.name };
                warn!("{}", diagnostic);
                report.missing.push(diagnostic);
                continue;
            };

            dispatcher.bind_view(node, &decl.name);
            for (kind, handler) in decl.handlers {
                info!("Listening to {}.{}", decl.name, kind);
                host.add_event_listener(node, kind);
                dispatcher.register(Target::View(node), kind, handler);
            }
            report.bound.push((decl.name, node));
        }

        for (kind, handler) in self.script {
            info!("Listening to script.{}", kind);
            host.listen(kind);
            dispatcher.register(Target::Script, kind, handler);
        }

        report
    }
}
