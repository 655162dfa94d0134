//! Mount contract between a payload and whatever draws the panel

mod text;

pub use text::TextTarget;

use openapi_fragment::OperationSelector;
use tracing::warn;

use crate::panel::Panel;
use crate::settings::PanelSettings;

/// Something a panel can be drawn onto
pub trait RenderTarget {
    /// Draw the full panel: header, servers, fields, errors and outcome
    fn render_panel(&mut self, panel: &Panel);

    /// Draw a standalone error in place of the panel
    fn render_error(&mut self, message: &str);
}

/// Resolve `payload` and draw its first operation.
///
/// On failure an error naming the reason is drawn instead and `None` is
/// returned; nothing is raised past this boundary.
pub fn mount<T: RenderTarget + ?Sized>(
    target: &mut T,
    payload: &str,
    settings: &PanelSettings,
) -> Option<Panel> {
    finish_mount(target, Panel::from_payload(payload, settings))
}

/// Like [`mount`], for a caller-chosen path and method
pub fn mount_selected<T: RenderTarget + ?Sized>(
    target: &mut T,
    payload: &str,
    selector: &OperationSelector,
    settings: &PanelSettings,
) -> Option<Panel> {
    finish_mount(
        target,
        Panel::from_payload_selected(payload, selector, settings),
    )
}

fn finish_mount<T: RenderTarget + ?Sized>(
    target: &mut T,
    panel: crate::error::Result<Panel>,
) -> Option<Panel> {
    match panel {
        Ok(panel) => {
            target.render_panel(&panel);
            Some(panel)
        }
        Err(e) => {
            warn!("Failed to mount panel: {}", e);
            target.render_error(&e.to_string());
            None
        }
    }
}
