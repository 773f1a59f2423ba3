use std::collections::BTreeSet;

use crate::view_model::{
    AppViewModel, DownloadLinkView, ProgressRowView, UploadPhase, UploadView,
};
use crate::{DownloadRoute, Progress, StatusMap};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    route: DownloadRoute,
    tick: u64,
    snapshot: StatusMap,
    snapshot_tick: Option<u64>,
    failure_streak: u32,
    last_failure: Option<String>,
    upload: Option<UploadView>,
    downloads: BTreeSet<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(route: DownloadRoute) -> Self {
        Self {
            route,
            ..Self::default()
        }
    }

    pub fn route(&self) -> &DownloadRoute {
        &self.route
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn snapshot(&self) -> &StatusMap {
        &self.snapshot
    }

    pub fn view(&self) -> AppViewModel {
        let mut completed = Vec::new();
        let mut in_progress = Vec::new();
        for (name, progress) in &self.snapshot {
            match progress {
                Progress::Complete => completed.push(DownloadLinkView {
                    label: name.clone(),
                    href: self.route.href_for(name),
                }),
                other => in_progress.push(ProgressRowView {
                    label: name.clone(),
                    percent_text: other.percent_text(),
                    value: other.bar_value(),
                }),
            }
        }

        AppViewModel {
            completed,
            in_progress,
            upload: self.upload.clone(),
            downloads_in_flight: self.downloads.iter().cloned().collect(),
            snapshot_tick: self.snapshot_tick,
            failure_streak: self.failure_streak,
            last_failure: self.last_failure.clone(),
        }
    }

    /// Returns whether a render is pending and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    pub(crate) fn replace_snapshot(&mut self, tick: u64, entries: StatusMap) {
        self.snapshot = entries;
        self.snapshot_tick = Some(tick);
        self.failure_streak = 0;
        self.last_failure = None;
        self.mark_dirty();
    }

    /// Records a failed fetch. The snapshot and the dirty flag stay untouched
    /// so the previous render remains on screen.
    pub(crate) fn record_failure(&mut self, message: String) {
        self.failure_streak = self.failure_streak.saturating_add(1);
        self.last_failure = Some(message);
    }

    pub(crate) fn upload_active(&self) -> bool {
        matches!(
            self.upload,
            Some(UploadView {
                phase: UploadPhase::Sending,
                ..
            })
        )
    }

    pub(crate) fn start_upload(&mut self, file_name: String) {
        self.upload = Some(UploadView {
            file_name,
            sent: 0,
            total: None,
            phase: UploadPhase::Sending,
        });
        self.mark_dirty();
    }

    pub(crate) fn apply_upload_progress(&mut self, sent: u64, total: Option<u64>) {
        if let Some(upload) = self.upload.as_mut() {
            if upload.phase == UploadPhase::Sending {
                upload.sent = sent;
                upload.total = total.or(upload.total);
                self.dirty = true;
            }
        }
    }

    pub(crate) fn finish_upload(&mut self, phase: UploadPhase) {
        if let Some(upload) = self.upload.as_mut() {
            upload.phase = phase;
            self.dirty = true;
        }
    }

    pub(crate) fn is_downloadable(&self, name: &str) -> bool {
        self.snapshot
            .get(name)
            .is_some_and(Progress::is_complete)
    }

    /// Returns `false` if a download for `name` is already running.
    pub(crate) fn begin_download(&mut self, name: &str) -> bool {
        let inserted = self.downloads.insert(name.to_string());
        if inserted {
            self.mark_dirty();
        }
        inserted
    }

    pub(crate) fn end_download(&mut self, name: &str) {
        if self.downloads.remove(name) {
            self.mark_dirty();
        }
    }
}
