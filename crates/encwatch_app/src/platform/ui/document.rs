use std::collections::BTreeMap;
use std::fmt::Write as _;

use thiserror::Error;
use v_htmlescape::escape;

use super::render::{ContainerId, DomCommand, UploadBar};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("container #{0} does not exist")]
    MissingContainer(ContainerId),
    #[error("failed to present document: {0}")]
    Present(String),
}

/// Target of rendered command batches.
pub trait Surface {
    fn has_container(&self, id: &ContainerId) -> bool;

    /// Applies a whole batch or nothing.
    fn apply(&mut self, commands: Vec<DomCommand>) -> Result<(), SurfaceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Link {
        href: String,
        label: String,
    },
    Progress {
        label: String,
        percent_text: String,
        value: u8,
        max: u8,
    },
}

/// In-memory element tree keyed by container id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    containers: BTreeMap<ContainerId, Vec<Element>>,
    status_text: String,
    upload: Option<UploadBar>,
}

impl Document {
    pub fn with_containers<'a>(ids: impl IntoIterator<Item = &'a ContainerId>) -> Self {
        Self {
            containers: ids.into_iter().map(|id| (id.clone(), Vec::new())).collect(),
            ..Self::default()
        }
    }

    pub fn container(&self, id: &ContainerId) -> Option<&[Element]> {
        self.containers.get(id).map(Vec::as_slice)
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn upload(&self) -> Option<&UploadBar> {
        self.upload.as_ref()
    }

    /// Plain-text rendering for terminals and logs.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (id, elements) in &self.containers {
            let _ = writeln!(out, "[{id}]");
            if elements.is_empty() {
                out.push_str("  (empty)\n");
            }
            for element in elements {
                match element {
                    Element::Link { href, label } => {
                        let _ = writeln!(out, "  {label} -> {href}");
                    }
                    Element::Progress {
                        label,
                        percent_text,
                        value,
                        max,
                    } => {
                        let _ = writeln!(
                            out,
                            "  {label} {percent_text} {}",
                            text_bar(*value, *max, 20)
                        );
                    }
                }
            }
        }
        if !self.status_text.is_empty() {
            let _ = writeln!(out, "{}", self.status_text);
        }
        if let Some(upload) = &self.upload {
            match upload.value {
                Some(value) => {
                    let _ = writeln!(out, "{} {}", upload.text, text_bar(value, 100, 20));
                }
                None => {
                    let _ = writeln!(out, "{}", upload.text);
                }
            }
        }
        out
    }

    /// Static HTML page with one `div` per container, mirroring the element
    /// structure a browser page would hold.
    pub fn to_html(&self) -> String {
        let mut out = String::from(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>encwatch</title></head>\n<body>\n",
        );
        for (id, elements) in &self.containers {
            let _ = writeln!(out, "<div id=\"{}\">", escape(id.as_str()));
            for element in elements {
                match element {
                    Element::Link { href, label } => {
                        let _ = writeln!(
                            out,
                            "  <a href=\"{}\" download=\"{}\">{}</a>",
                            escape(href),
                            escape(label),
                            escape(label)
                        );
                    }
                    Element::Progress {
                        label,
                        percent_text,
                        value,
                        max,
                    } => {
                        let _ = writeln!(
                            out,
                            "  <div><p>{}</p><span>{}</span><progress max=\"{max}\" value=\"{value}\"></progress></div>",
                            escape(label),
                            escape(percent_text)
                        );
                    }
                }
            }
            out.push_str("</div>\n");
        }
        let _ = writeln!(out, "<p id=\"status\">{}</p>", escape(&self.status_text));
        if let Some(upload) = &self.upload {
            let _ = writeln!(
                out,
                "<p id=\"upload\">{}</p><progress id=\"progress\" max=\"100\" value=\"{}\"></progress>",
                escape(&upload.text),
                upload.value.unwrap_or(0)
            );
        }
        out.push_str("</body>\n</html>\n");
        out
    }

    fn require(&self, id: &ContainerId) -> Result<(), SurfaceError> {
        if self.containers.contains_key(id) {
            Ok(())
        } else {
            Err(SurfaceError::MissingContainer(id.clone()))
        }
    }

    fn push(&mut self, id: &ContainerId, element: Element) {
        if let Some(elements) = self.containers.get_mut(id) {
            elements.push(element);
        }
    }
}

impl Surface for Document {
    fn has_container(&self, id: &ContainerId) -> bool {
        self.containers.contains_key(id)
    }

    fn apply(&mut self, commands: Vec<DomCommand>) -> Result<(), SurfaceError> {
        // Validate first so a bad batch leaves the document untouched.
        for command in &commands {
            match command {
                DomCommand::ClearContainer { container }
                | DomCommand::AppendLink { container, .. }
                | DomCommand::AppendProgress { container, .. } => self.require(container)?,
                DomCommand::SetStatusText { .. } | DomCommand::SetUploadProgress { .. } => {}
            }
        }

        for command in commands {
            match command {
                DomCommand::ClearContainer { container } => {
                    if let Some(elements) = self.containers.get_mut(&container) {
                        elements.clear();
                    }
                }
                DomCommand::AppendLink {
                    container,
                    href,
                    label,
                } => self.push(&container, Element::Link { href, label }),
                DomCommand::AppendProgress {
                    container,
                    label,
                    percent_text,
                    value,
                    max,
                } => self.push(
                    &container,
                    Element::Progress {
                        label,
                        percent_text,
                        value,
                        max,
                    },
                ),
                DomCommand::SetStatusText { text } => self.status_text = text,
                DomCommand::SetUploadProgress { upload } => self.upload = upload,
            }
        }
        Ok(())
    }
}

fn text_bar(value: u8, max: u8, width: usize) -> String {
    let max = max.max(1) as usize;
    let filled = (value.min(max as u8) as usize * width) / max;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_bar_scales_to_width() {
        assert_eq!(text_bar(0, 100, 4), "[....]");
        assert_eq!(text_bar(50, 100, 4), "[##..]");
        assert_eq!(text_bar(100, 100, 4), "[####]");
        assert_eq!(text_bar(200, 100, 4), "[####]");
    }
}
