use std::fmt;

use egui::{Color32, Pos2};
use log::{debug, warn};
use serde_json::Value;

use crate::error::Diagnostic;
use crate::event::{Dispatch, Event, EventDispatcher, EventKind, Invocation, Target};
use crate::host::{Host, NodeId};

/// State behind a mounted color picker
#[derive(Debug, Clone, Copy)]
pub struct PickerState {
    /// The picker node, receives the picked `value`
    pub target: NodeId,
    /// The swatch image the color is sampled from
    pub sample: NodeId,
    pub last_pick: Option<Color32>,
}

/// Picks a color off the `sample` swatch on mouse down.
pub struct ColorPicker<H: Host + 'static> {
    state: PickerState,
    dispatcher: EventDispatcher<PickerState, H>,
}

impl<H: Host + 'static> fmt::Debug for ColorPicker<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorPicker").field("state", &self.state).finish()
    }
}

impl<H: Host + 'static> ColorPicker<H> {
    pub const SAMPLE: &'static str = "sample";

    /// Mounts the picker on `target`. Fails if it has no `sample` child.
    pub fn attach(host: &mut H, target: NodeId) -> Result<Self, Diagnostic> {
        let Some(sample) = host.find_child_by_id(target, Self::SAMPLE) else {
            let diagnostic = Diagnostic::MissingView {
                name: Self::SAMPLE.to_owned(),
            };
            warn!("{}", diagnostic);
            return Err(diagnostic);
        };

        host.add_event_listener(sample, EventKind::MouseDown);
        let mut dispatcher = EventDispatcher::new();
        dispatcher.bind_view(sample, Self::SAMPLE);
        dispatcher.register(
            Target::View(sample),
            EventKind::MouseDown,
            Box::new(|state: &mut PickerState, host: &mut H, inv: &Invocation<'_>| {
                let Some(pos) = crate::event::position_arg(inv.args, 0) else {
                    warn!("colorpicker: mousedown without a position");
                    return;
                };
                if let Some(color) = pick(host, state, pos) {
                    state.last_pick = Some(color);
                }
            }),
        );

        Ok(Self {
            state: PickerState {
                target,
                sample,
                last_pick: None,
            },
            dispatcher,
        })
    }

    pub fn handle(&mut self, host: &mut H, event: &Event) -> Dispatch {
        self.dispatcher.dispatch_event(&mut self.state, host, event)
    }

    pub fn state(&self) -> &PickerState {
        &self.state
    }
}

/// Maps `pos` in screen units onto the swatch's pixels and activates the
/// color found there
fn pick<H: Host + ?Sized>(host: &mut H, state: &PickerState, pos: Pos2) -> Option<Color32> {
    let size = host.global_size(state.sample).filter(|size| size.x > 0.0 && size.y > 0.0)?;
    let surface = host.surface(state.sample)?;
    let x = (pos.x / size.x * surface.width() as f32) as i64;
    let y = (pos.y / size.y * surface.height() as f32) as i64;
    if x < 0 || y < 0 || x >= i64::from(surface.width()) || y >= i64::from(surface.height()) {
        debug!("colorpicker: ({}, {}) is off the swatch", x, y);
        return None;
    }

    let [r, g, b, a] = surface.get_pixel(x as u32, y as u32).0;
    let color = Color32::from_rgba_unmultiplied(r, g, b, a);
    host.set(state.target, "value", Value::from(to_hex(color)));
    host.activate_color(color);
    Some(color)
}

fn to_hex(color: Color32) -> String {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
}
