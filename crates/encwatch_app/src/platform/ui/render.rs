use std::fmt;

use encwatch_core::{AppViewModel, UploadPhase, UploadView, PROGRESS_MAX};

/// Stable id of a display region supplied by the surrounding page.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerId(pub String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two regions the reconciliation loop redraws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Containers {
    pub completed: ContainerId,
    pub progress: ContainerId,
}

impl Containers {
    pub fn new(completed: impl Into<String>, progress: impl Into<String>) -> Self {
        Self {
            completed: ContainerId::new(completed),
            progress: ContainerId::new(progress),
        }
    }

    pub fn ids(&self) -> [&ContainerId; 2] {
        [&self.completed, &self.progress]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomCommand {
    ClearContainer {
        container: ContainerId,
    },
    AppendLink {
        container: ContainerId,
        href: String,
        label: String,
    },
    AppendProgress {
        container: ContainerId,
        label: String,
        percent_text: String,
        value: u8,
        max: u8,
    },
    SetStatusText {
        text: String,
    },
    /// `None` hides the upload bar.
    SetUploadProgress {
        upload: Option<UploadBar>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadBar {
    pub text: String,
    pub value: Option<u8>,
}

/// Full redraw of both containers plus the status and upload chrome.
///
/// Each container is cleared before anything is appended to it, so applying
/// the batch never mixes rows from two snapshots.
pub fn render(containers: &Containers, view: &AppViewModel) -> Vec<DomCommand> {
    let mut cmds = Vec::with_capacity(5 + view.completed.len() + view.in_progress.len());

    cmds.push(DomCommand::ClearContainer {
        container: containers.completed.clone(),
    });
    cmds.extend(view.completed.iter().map(|link| DomCommand::AppendLink {
        container: containers.completed.clone(),
        href: link.href.clone(),
        label: link.label.clone(),
    }));

    cmds.push(DomCommand::ClearContainer {
        container: containers.progress.clone(),
    });
    cmds.extend(view.in_progress.iter().map(|row| DomCommand::AppendProgress {
        container: containers.progress.clone(),
        label: row.label.clone(),
        percent_text: row.percent_text.clone(),
        value: row.value,
        max: PROGRESS_MAX,
    }));

    cmds.push(DomCommand::SetStatusText {
        text: status_text(view),
    });
    cmds.push(DomCommand::SetUploadProgress {
        upload: view.upload.as_ref().map(upload_bar),
    });

    cmds
}

fn status_text(view: &AppViewModel) -> String {
    let mut text = match view.snapshot_tick {
        Some(tick) => format!(
            "Tick {} | Ready: {} | Encoding: {}",
            tick,
            view.completed.len(),
            view.in_progress.len()
        ),
        None => "Waiting for first status".to_string(),
    };
    if !view.downloads_in_flight.is_empty() {
        text.push_str(&format!(
            " | Downloading: {}",
            view.downloads_in_flight.join(", ")
        ));
    }
    // A failed fetch does not redraw on its own; this shows up on the next
    // redraw triggered by a transfer while the server is still unreachable.
    if let Some(message) = &view.last_failure {
        text.push_str(&format!(
            " | Fetch failed {}x: {}",
            view.failure_streak, message
        ));
    }
    text
}

fn upload_bar(upload: &UploadView) -> UploadBar {
    let text = match &upload.phase {
        UploadPhase::Sending => match upload.percent() {
            Some(percent) => format!("Uploading {} ({}%)", upload.file_name, percent),
            None => format!("Uploading {} ({} B)", upload.file_name, upload.sent),
        },
        UploadPhase::Done { status } => {
            format!("Uploaded {} (HTTP {})", upload.file_name, status)
        }
        UploadPhase::Failed { message } => {
            format!("Upload of {} failed: {}", upload.file_name, message)
        }
    };
    UploadBar {
        text,
        value: upload.percent(),
    }
}
