//! Plain-text render target

use std::fmt::Write;

use super::RenderTarget;
use crate::panel::Panel;

/// Renders panels into a text buffer
#[derive(Debug, Default)]
pub struct TextTarget {
    buffer: String,
}

impl TextTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> &str {
        &self.buffer
    }

    /// Take the rendered text, leaving the buffer empty
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}

impl RenderTarget for TextTarget {
    fn render_panel(&mut self, panel: &Panel) {
        // Writing to a String cannot fail
        let _ = write_panel(&mut self.buffer, panel);
    }

    fn render_error(&mut self, message: &str) {
        let _ = writeln!(self.buffer, "Error: {}", message);
    }
}

fn write_panel(out: &mut String, panel: &Panel) -> std::fmt::Result {
    let op = panel.operation();

    writeln!(out, "{} {} [{}]", op.method, op.path, op.color())?;
    if let Some(summary) = &op.summary {
        writeln!(out, "{}", summary)?;
    }
    if let Some(description) = &op.description {
        if op.summary.as_ref() != Some(description) {
            writeln!(out, "{}", description)?;
        }
    }
    if op.deprecated {
        writeln!(out, "(DEPRECATED)")?;
    }

    writeln!(out, "Servers:")?;
    if panel.servers().is_empty() {
        writeln!(out, "  (none)")?;
    }
    for (index, server) in panel.servers().iter().enumerate() {
        let marker = if index == panel.selected_server_index() { '*' } else { ' ' };
        match &server.description {
            Some(desc) => writeln!(out, "  {} [{}] {} ({})", marker, index, server.url, desc)?,
            None => writeln!(out, "  {} [{}] {}", marker, index, server.url)?,
        }
    }

    if let Some((content_type, _)) = op.request_body.as_ref().and_then(|b| b.first_media()) {
        let required = op.request_body.as_ref().map(|b| b.required).unwrap_or(false);
        writeln!(
            out,
            "Request body: {}{}",
            content_type,
            if required { " (required)" } else { "" }
        )?;
    }

    writeln!(out, "Fields:")?;
    if panel.fields().is_empty() {
        writeln!(out, "  (none)")?;
    }
    let form = panel.form();
    for field in &panel.fields().fields {
        let key = field.key();
        let flags = if field.required {
            format!("{}, required", field.location)
        } else {
            field.location.to_string()
        };
        let value = form.value(&key).unwrap_or("");

        write!(out, "  {} ({}) = {:?}", field.name, flags, value)?;
        if !field.placeholder().is_empty() {
            write!(out, " - {}", field.placeholder())?;
        }
        writeln!(out)?;

        if let Some(error) = form.error(&key) {
            writeln!(out, "    ! {}", error)?;
        }
    }

    if panel.is_pending() {
        writeln!(out, "Result: pending...")?;
    }
    match panel.outcome() {
        Some(Ok(response)) => {
            match &response.matched_response {
                Some(matched) => writeln!(
                    out,
                    "Result: HTTP {} (documented as {})",
                    response.status, matched
                )?,
                None => writeln!(out, "Result: HTTP {}", response.status)?,
            }
            writeln!(out, "{}", response.body)?;
        }
        Some(Err(failure)) => writeln!(out, "Result: error: {}", failure)?,
        None => {}
    }

    Ok(())
}
