//! Encwatch engine: network IO and effect execution.
mod decode;
mod engine;
mod fetch;
mod filename;
mod persist;
mod transfer;
mod types;

pub use decode::{decode_status, DecodeError};
pub use engine::{EngineConfig, EngineError, EngineHandle};
pub use fetch::{
    ChannelProgressSink, Endpoints, FetchSettings, ProgressSink, ReqwestStatusFetcher,
    StatusFetcher,
};
pub use filename::download_filename;
pub use persist::{ensure_output_dir, AtomicFileWriter, PendingFile, PersistError};
pub use transfer::{Downloader, ReqwestDownloader, ReqwestUploader, Uploader, UPLOAD_FIELD};
pub use types::{EngineEvent, FailureKind, FetchError, Tick};
