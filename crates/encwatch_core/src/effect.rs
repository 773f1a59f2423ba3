#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// One status fetch shared by both views for this tick.
    FetchStatus { tick: u64 },
    UploadFile { path: String },
    DownloadItem { name: String, href: String },
}
