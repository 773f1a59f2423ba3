use encwatch_core::{
    update, AppState, DownloadRoute, Effect, Msg, Progress, StatusMap, UploadPhase,
};

fn with_snapshot(state: AppState, entries: &[(&str, &str)]) -> AppState {
    let entries: StatusMap = entries
        .iter()
        .map(|(name, value)| (name.to_string(), Progress::from_text(value)))
        .collect();
    let (state, _) = update(state, Msg::StatusFetched { tick: 1, entries });
    state
}

#[test]
fn upload_request_emits_effect_and_tracks_progress() {
    let (mut state, effects) = update(
        AppState::new(),
        Msg::UploadRequested {
            path: "/home/me/clip.mp4".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::UploadFile {
            path: "/home/me/clip.mp4".to_string()
        }]
    );
    assert!(state.consume_dirty());
    let upload = state.view().upload.unwrap();
    assert_eq!(upload.file_name, "clip.mp4");
    assert_eq!(upload.phase, UploadPhase::Sending);
    assert_eq!(upload.percent(), None);

    let (mut state, _) = update(
        state,
        Msg::UploadProgress {
            sent: 25,
            total: Some(100),
        },
    );
    assert!(state.consume_dirty());
    assert_eq!(state.view().upload.unwrap().percent(), Some(25));

    let (state, _) = update(state, Msg::UploadDone { result: Ok(200) });
    let upload = state.view().upload.unwrap();
    assert_eq!(upload.phase, UploadPhase::Done { status: 200 });
    assert_eq!(upload.percent(), Some(100));
}

#[test]
fn second_upload_is_ignored_while_sending() {
    let (state, _) = update(
        AppState::new(),
        Msg::UploadRequested {
            path: "a.mp4".to_string(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::UploadRequested {
            path: "b.mp4".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().upload.unwrap().file_name, "a.mp4");

    let (state, _) = update(
        state,
        Msg::UploadDone {
            result: Err("broken pipe".to_string()),
        },
    );
    let (_state, effects) = update(
        state,
        Msg::UploadRequested {
            path: "b.mp4".to_string(),
        },
    );
    assert_eq!(effects.len(), 1);
}

#[test]
fn empty_upload_path_is_ignored() {
    let state = AppState::new();
    let (next, effects) = update(
        state.clone(),
        Msg::UploadRequested {
            path: String::new(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(next, state);
}

#[test]
fn upload_path_is_passed_through_untouched() {
    let (state, effects) = update(
        AppState::new(),
        Msg::UploadRequested {
            path: "clips/ take two .mp4".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::UploadFile {
            path: "clips/ take two .mp4".to_string()
        }]
    );
    assert_eq!(state.view().upload.unwrap().file_name, " take two .mp4");
}

#[test]
fn download_only_for_completed_items() {
    let state = with_snapshot(
        AppState::with_route(DownloadRoute::new("/files/")),
        &[("done.mp4", "100"), ("busy.mp4", "50")],
    );

    let (state, effects) = update(
        state,
        Msg::DownloadRequested {
            name: "busy.mp4".to_string(),
        },
    );
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::DownloadRequested {
            name: "missing.mp4".to_string(),
        },
    );
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::DownloadRequested {
            name: "done.mp4".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::DownloadItem {
            name: "done.mp4".to_string(),
            href: "/files/done.mp4".to_string(),
        }]
    );
    assert_eq!(state.view().downloads_in_flight, vec!["done.mp4".to_string()]);

    // Duplicate request while the first is running.
    let (state, effects) = update(
        state,
        Msg::DownloadRequested {
            name: "done.mp4".to_string(),
        },
    );
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::DownloadDone {
            name: "done.mp4".to_string(),
            result: Ok("downloads/done.mp4".to_string()),
        },
    );
    assert!(state.view().downloads_in_flight.is_empty());
}
