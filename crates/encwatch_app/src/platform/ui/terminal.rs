use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use encwatch_engine::AtomicFileWriter;
use engine_logging::engine_warn;

use super::document::{Document, Surface, SurfaceError};
use super::render::{ContainerId, DomCommand};

/// Where an HTML copy of the document is written after every render.
#[derive(Debug, Clone)]
pub struct HtmlSnapshot {
    dir: PathBuf,
    file_name: String,
}

impl HtmlSnapshot {
    /// Returns `None` when `path` has no file name component.
    pub fn new(path: PathBuf) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Some(Self { dir, file_name })
    }
}

/// Keeps a [`Document`] and prints its text form after each applied batch.
pub struct TerminalSurface<W: Write> {
    document: Document,
    out: W,
    snapshot: Option<HtmlSnapshot>,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(document: Document, out: W, snapshot: Option<HtmlSnapshot>) -> Self {
        Self {
            document,
            out,
            snapshot,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        let stamp = Local::now().format("%H:%M:%S");
        write!(
            self.out,
            "--- {stamp} ---\n{}",
            self.document.to_text()
        )
        .and_then(|()| self.out.flush())
        .map_err(|err| SurfaceError::Present(err.to_string()))?;

        if let Some(snapshot) = &self.snapshot {
            let writer = AtomicFileWriter::new(snapshot.dir.clone());
            // A stale snapshot is not worth stopping the loop for.
            if let Err(err) = writer.write(&snapshot.file_name, self.document.to_html().as_bytes())
            {
                engine_warn!(
                    "Failed to write HTML snapshot {:?}/{}: {}",
                    snapshot.dir,
                    snapshot.file_name,
                    err
                );
            }
        }
        Ok(())
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn has_container(&self, id: &ContainerId) -> bool {
        self.document.has_container(id)
    }

    fn apply(&mut self, commands: Vec<DomCommand>) -> Result<(), SurfaceError> {
        self.document.apply(commands)?;
        self.present()
    }
}
