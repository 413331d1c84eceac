//! Controllers of the three bundled skins.

use log::{debug, info, warn};
use serde_json::Value;

use crate::config::{ScriptConfig, SkinKind};
use crate::error::Diagnostic;
use crate::event::{EventKind, Handler, Invocation};
use crate::host::{Host, HostCommand};

use super::menu::{MenuGroup, dismiss_clickout};
use super::registry::ControllerRegistry;
use super::SkinState;

type Registry<H> = ControllerRegistry<SkinState, H>;

/// Declares the controllers of `kind` and returns its menu group
pub(super) fn declare<H: Host + 'static>(kind: SkinKind, registry: &mut Registry<H>, config: &ScriptConfig) -> MenuGroup {
    let menus = MenuGroup::new(config.menu.clickout_tag.clone());
    registry.on_script(EventKind::Init, boot());
    match kind {
        SkinKind::Default => {
            default_skin(registry);
            menus
        }
        SkinKind::Experience => {
            experience_skin(registry);
            menus.with_menu("startbutton", "filemenu")
        }
        SkinKind::Futuretro => {
            futuretro_skin(registry);
            menus
                .with_menu("startbutton", "filemenu")
                .with_menu("filterbutton", "filtermenu")
        }
    }
}

fn default_skin<H: Host + 'static>(registry: &mut Registry<H>) {
    registry
        .view("editor")
        .view("toolconfigbutton")
        .on("toolconfigpanel", EventKind::Change, apply_tool_config("toolconfigpanel"))
        .on("toolconfigquick", EventKind::Change, apply_tool_config("toolconfigquick"))
        .on("quitbutton", EventKind::Click, quit())
        .on_script(
            EventKind::ActivateTool,
            show_tool_config(Some("toolconfigbutton"), &["toolconfigquick", "toolconfigpanel"]),
        )
        .on_script(
            EventKind::Click,
            Box::new(|state: &mut SkinState, host: &mut H, inv: &Invocation<'_>| {
                if dismiss_clickout(host, inv.origin, state.menus.clickout_tag()) {
                    debug!("Dismissed clickout overlay");
                }
            }),
        );
}

fn experience_skin<H: Host + 'static>(registry: &mut Registry<H>) {
    registry
        .view("editor")
        .view("toolconfigbutton")
        .on("filemenu", EventKind::Click, close_menu())
        .on("toolconfigmenu", EventKind::Change, apply_tool_config("toolconfigmenu"))
        .on("startbutton", EventKind::MouseUp, toggle_menu("startbutton"))
        .on("quitbutton", EventKind::Click, quit())
        .on_script(
            EventKind::ActivateTool,
            show_tool_config(Some("toolconfigbutton"), &["toolconfigmenu"]),
        );
}

fn futuretro_skin<H: Host + 'static>(registry: &mut Registry<H>) {
    registry
        .view("editor")
        .on("toolconfigmenu", EventKind::Change, apply_tool_config("toolconfigmenu"))
        .on(
            "filemenu",
            EventKind::Click,
            Box::new(|state: &mut SkinState, host: &mut H, inv: &Invocation<'_>| {
                let handled = state.is_claimed(inv.origin);
                let on_menu = inv.origin.is_some() && inv.origin == inv.view;
                if on_menu && !handled {
                    state.menus.close(host, &state.views);
                } else {
                    state.menus.outside_click(host, &state.views, inv.origin, handled);
                }
            }),
        )
        .on("filtermenu", EventKind::Click, close_menu())
        .on("startbutton", EventKind::MouseUp, toggle_menu("startbutton"))
        .on("filterbutton", EventKind::MouseUp, toggle_menu("filterbutton"))
        .on(
            "newbutton",
            EventKind::Click,
            Box::new(|state: &mut SkinState, host: &mut H, inv: &Invocation<'_>| {
                state.claim_click(inv.origin, inv.view);
                state.menus.close(host, &state.views);
                host.command(HostCommand::NewFile { interactive: true });
            }),
        )
        .on(
            "openbutton",
            EventKind::Click,
            Box::new(|state: &mut SkinState, host: &mut H, inv: &Invocation<'_>| {
                state.claim_click(inv.origin, inv.view);
                state.menus.close(host, &state.views);
                let Some(path) = host.open("*.png", "Open image") else {
                    return;
                };
                let Some(editor) = state.view("editor") else {
                    warn!("{}", Diagnostic::MissingView { name: "editor".to_owned() });
                    return;
                };
                host.set(editor, "file", Value::from(path.display().to_string()));
                host.set_visible(editor, true);
            }),
        )
        .on(
            "savebutton",
            EventKind::Click,
            Box::new(|state: &mut SkinState, host: &mut H, inv: &Invocation<'_>| {
                state.claim_click(inv.origin, inv.view);
                state.menus.close(host, &state.views);
                let Some(path) = host.save("*.png", "Save image", "Image format") else {
                    return;
                };
                let Some(snapshot) = host.composite() else {
                    warn!("Nothing to save to {}", path.display());
                    return;
                };
                match host.write(&path, &snapshot) {
                    Ok(()) => info!("Saved {}", path.display()),
                    Err(e) => warn!("{}", e),
                }
            }),
        )
        .on("quitbutton", EventKind::Click, quit())
        .on_script(EventKind::ActivateTool, show_tool_config(None, &["toolconfigmenu"]));
}

fn boot<H: Host + 'static>() -> Handler<SkinState, H> {
    Box::new(|state: &mut SkinState, _: &mut H, _: &Invocation<'_>| {
        info!("Booting {:?} UI with {} views", state.kind, state.views.len());
    })
}

fn quit<H: Host + 'static>() -> Handler<SkinState, H> {
    Box::new(|state: &mut SkinState, host: &mut H, inv: &Invocation<'_>| {
        state.claim_click(inv.origin, inv.view);
        host.quit();
    })
}

fn toggle_menu<H: Host + 'static>(button: &'static str) -> Handler<SkinState, H> {
    Box::new(move |state: &mut SkinState, host: &mut H, inv: &Invocation<'_>| {
        state.claim_click(inv.origin, inv.view);
        state.menus.button_pressed(host, &state.views, button);
    })
}

fn close_menu<H: Host + 'static>() -> Handler<SkinState, H> {
    Box::new(|state: &mut SkinState, host: &mut H, _: &Invocation<'_>| {
        state.menus.close(host, &state.views);
    })
}

/// Takes the panel's pending `result` and hands it to the active tool
fn apply_tool_config<H: Host + 'static>(panel: &'static str) -> Handler<SkinState, H> {
    Box::new(move |state: &mut SkinState, host: &mut H, inv: &Invocation<'_>| {
        let Some(view) = inv.view.or_else(|| state.view(panel)) else {
            return;
        };
        let result = host.get(view, "result").unwrap_or(Value::Null);
        host.set(view, "result", Value::Null);
        if result.is_null() {
            debug!("{}: nothing to apply", panel);
            return;
        }
        if host.active_tool().is_none() {
            warn!("{}: no active tool", panel);
            return;
        }
        host.apply_tool_config(result);
    })
}

/// Mirrors the active tool onto the config button and panels
fn show_tool_config<H: Host + 'static>(
    button: Option<&'static str>,
    panels: &'static [&'static str],
) -> Handler<SkinState, H> {
    Box::new(move |state: &mut SkinState, host: &mut H, _: &Invocation<'_>| {
        let button = button.and_then(|name| state.view(name));
        let Some(tool) = host.active_tool() else {
            if let Some(button) = button {
                host.set_visible(button, false);
            }
            return;
        };
        if let Some(button) = button {
            host.set(button, "src", tool.icon.map(Value::from).unwrap_or(Value::Null));
            host.set_visible(button, true);
        }
        for panel in panels {
            if let Some(node) = state.view(panel) {
                host.set(node, "meta", tool.meta.clone());
            }
        }
    })
}
