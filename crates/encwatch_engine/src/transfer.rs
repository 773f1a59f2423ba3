use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use tokio_util::io::ReaderStream;

use crate::fetch::{build_client, map_reqwest_error, Endpoints, FetchSettings, ProgressSink};
use crate::filename::download_filename;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::{EngineEvent, FailureKind, FetchError};

/// Multipart field the upload endpoint reads the file from.
pub const UPLOAD_FIELD: &str = "file";

#[async_trait::async_trait]
pub trait Uploader: Send + Sync {
    /// Sends `path` and returns the HTTP status of the accepted upload.
    async fn upload(&self, path: &Path, sink: Arc<dyn ProgressSink>) -> Result<u16, FetchError>;
}

#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    /// Fetches `href` into the download directory and returns the written path.
    async fn download(&self, name: &str, href: &str) -> Result<PathBuf, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestUploader {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl ReqwestUploader {
    pub fn new(endpoints: Endpoints, settings: &FetchSettings) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(settings, false)?,
            endpoints,
        })
    }
}

#[async_trait::async_trait]
impl Uploader for ReqwestUploader {
    async fn upload(&self, path: &Path, sink: Arc<dyn ProgressSink>) -> Result<u16, FetchError> {
        let url = self.endpoints.upload_url()?;
        let file = tokio::fs::File::open(path).await.map_err(io_error)?;
        let total = file.metadata().await.map_err(io_error)?.len();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        sink.emit(EngineEvent::UploadProgress {
            sent: 0,
            total: Some(total),
        });

        let sent = Arc::new(AtomicU64::new(0));
        let progress_sink = sink.clone();
        let stream = ReaderStream::new(file).map(move |chunk| {
            if let Ok(bytes) = &chunk {
                let now = sent.fetch_add(bytes.len() as u64, Ordering::Relaxed) + bytes.len() as u64;
                progress_sink.emit(EngineEvent::UploadProgress {
                    sent: now,
                    total: Some(total),
                });
            }
            chunk
        });

        let part = Part::stream_with_length(Body::wrap_stream(stream), total).file_name(file_name);
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        Ok(status.as_u16())
    }
}

pub struct ReqwestDownloader {
    client: reqwest::Client,
    endpoints: Endpoints,
    writer: AtomicFileWriter,
}

impl ReqwestDownloader {
    pub fn new(
        endpoints: Endpoints,
        settings: &FetchSettings,
        download_dir: PathBuf,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(settings, false)?,
            endpoints,
            writer: AtomicFileWriter::new(download_dir),
        })
    }
}

#[async_trait::async_trait]
impl Downloader for ReqwestDownloader {
    async fn download(&self, name: &str, href: &str) -> Result<PathBuf, FetchError> {
        let url = self.endpoints.resolve(href)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let mut pending = self
            .writer
            .begin(&download_filename(name))
            .map_err(persist_error)?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            pending.write_chunk(&chunk).map_err(persist_error)?;
        }
        pending.commit().map_err(persist_error)
    }
}

fn io_error(err: std::io::Error) -> FetchError {
    FetchError::new(FailureKind::Io, err.to_string())
}

fn persist_error(err: PersistError) -> FetchError {
    FetchError::new(FailureKind::Io, err.to_string())
}
