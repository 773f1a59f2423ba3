use crate::view_model::UploadPhase;
use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Tick => {
            let tick = state.next_tick();
            vec![Effect::FetchStatus { tick }]
        }
        Msg::StatusFetched { tick, entries } => {
            // Whichever fetch completes last is what the user sees, even if an
            // older tick finishes after a newer one.
            state.replace_snapshot(tick, entries);
            Vec::new()
        }
        Msg::StatusFetchFailed { message, .. } => {
            state.record_failure(message);
            Vec::new()
        }
        Msg::UploadRequested { path } => {
            if path.is_empty() || state.upload_active() {
                return (state, Vec::new());
            }
            state.start_upload(file_name_of(&path));
            vec![Effect::UploadFile { path }]
        }
        Msg::UploadProgress { sent, total } => {
            state.apply_upload_progress(sent, total);
            Vec::new()
        }
        Msg::UploadDone { result } => {
            let phase = match result {
                Ok(status) => UploadPhase::Done { status },
                Err(message) => UploadPhase::Failed { message },
            };
            state.finish_upload(phase);
            Vec::new()
        }
        Msg::DownloadRequested { name } => {
            if !state.is_downloadable(&name) || !state.begin_download(&name) {
                return (state, Vec::new());
            }
            let href = state.route().href_for(&name);
            vec![Effect::DownloadItem { name, href }]
        }
        Msg::DownloadDone { name, .. } => {
            state.end_download(&name);
            Vec::new()
        }
    };

    (state, effects)
}

fn file_name_of(path: &str) -> String {
    path.rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::file_name_of;

    #[test]
    fn file_name_strips_directories() {
        assert_eq!(file_name_of("/tmp/clip.mp4"), "clip.mp4");
        assert_eq!(file_name_of("C:\\videos\\clip.mkv"), "clip.mkv");
        assert_eq!(file_name_of("clip.mp4"), "clip.mp4");
        assert_eq!(file_name_of("dir/"), "dir");
    }
}
