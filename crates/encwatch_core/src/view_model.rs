/// Link shown in the completed container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLinkView {
    pub label: String,
    pub href: String,
}

/// Labeled bar shown in the progress container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRowView {
    pub label: String,
    pub percent_text: String,
    /// Bar position out of [`PROGRESS_MAX`].
    pub value: u8,
}

pub const PROGRESS_MAX: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPhase {
    Sending,
    Done { status: u16 },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadView {
    pub file_name: String,
    pub sent: u64,
    pub total: Option<u64>,
    pub phase: UploadPhase,
}

impl UploadView {
    /// Percentage of the body sent, when the total size is known.
    pub fn percent(&self) -> Option<u8> {
        match self.phase {
            UploadPhase::Done { .. } => Some(100),
            _ => match self.total {
                Some(0) => Some(100),
                Some(total) => Some(((self.sent.min(total) * 100) / total) as u8),
                None => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub completed: Vec<DownloadLinkView>,
    pub in_progress: Vec<ProgressRowView>,
    pub upload: Option<UploadView>,
    pub downloads_in_flight: Vec<String>,
    /// Tick whose fetch produced the rendered snapshot.
    pub snapshot_tick: Option<u64>,
    pub failure_streak: u32,
    pub last_failure: Option<String>,
}
