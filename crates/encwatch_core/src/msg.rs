#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Poll timer fired.
    Tick,
    /// Status endpoint answered for the fetch issued on `tick`.
    StatusFetched {
        tick: u64,
        entries: crate::StatusMap,
    },
    /// Status fetch or parse failed for the fetch issued on `tick`.
    StatusFetchFailed { tick: u64, message: String },
    /// User picked a file to upload.
    UploadRequested { path: String },
    /// Bytes of the request body handed to the transport so far.
    UploadProgress { sent: u64, total: Option<u64> },
    /// Upload finished; `Ok` carries the HTTP status.
    UploadDone { result: Result<u16, String> },
    /// User asked to download a completed item.
    DownloadRequested { name: String },
    /// Download finished; `Ok` carries where the file was written.
    DownloadDone {
        name: String,
        result: Result<String, String>,
    },
}
