//! Encwatch app: reconciliation loop, surfaces and command-line entry points.
pub mod platform;

pub use platform::app::{run_download, run_upload, run_watch, AppError, Session};
pub use platform::cli::{parse_args, Command, USAGE};
pub use platform::config::{config_path, load_config, AppConfig};
pub use platform::controller::Controller;
pub use platform::ui::document::{Document, Element, Surface};
pub use platform::ui::render::{render, ContainerId, Containers, DomCommand};
