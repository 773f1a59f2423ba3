//! Encwatch core: pure reconciliation state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod status;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::AppState;
pub use status::{DownloadRoute, Progress, StatusMap, TERMINAL_MARKER};
pub use update::update;
pub use view_model::{
    AppViewModel, DownloadLinkView, ProgressRowView, UploadPhase, UploadView, PROGRESS_MAX,
};
