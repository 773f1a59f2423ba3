use std::time::Duration;

use encwatch_core::StatusMap;
use futures_util::StreamExt;
use url::Url;

use crate::decode::decode_status;
use crate::{EngineEvent, FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Upper bound for a status body; downloads and uploads are not capped.
    pub max_status_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            max_status_bytes: 1024 * 1024,
        }
    }
}

/// Server routes, resolved against one base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
    status_path: String,
    upload_path: String,
}

impl Endpoints {
    pub fn new(
        base: &str,
        status_path: impl Into<String>,
        upload_path: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let base = Url::parse(base)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::new(
                FailureKind::InvalidUrl,
                format!("{base} cannot be used as a base url"),
            ));
        }
        Ok(Self {
            base,
            status_path: status_path.into(),
            upload_path: upload_path.into(),
        })
    }

    pub fn status_url(&self) -> Result<Url, FetchError> {
        self.resolve(&self.status_path)
    }

    pub fn upload_url(&self) -> Result<Url, FetchError> {
        self.resolve(&self.upload_path)
    }

    /// Resolves a server-relative reference such as a download link target.
    pub fn resolve(&self, reference: &str) -> Result<Url, FetchError> {
        self.base
            .join(reference)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[async_trait::async_trait]
pub trait StatusFetcher: Send + Sync {
    async fn fetch_status(&self) -> Result<StatusMap, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestStatusFetcher {
    client: reqwest::Client,
    endpoints: Endpoints,
    settings: FetchSettings,
}

impl ReqwestStatusFetcher {
    pub fn new(endpoints: Endpoints, settings: FetchSettings) -> Result<Self, FetchError> {
        let client = build_client(&settings, true)?;
        Ok(Self {
            client,
            endpoints,
            settings,
        })
    }
}

#[async_trait::async_trait]
impl StatusFetcher for ReqwestStatusFetcher {
    async fn fetch_status(&self) -> Result<StatusMap, FetchError> {
        let url = self.endpoints.status_url()?;
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

        let max_bytes = self.settings.max_status_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, Some(content_len)));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, Some(next_len)));
            }
            body.extend_from_slice(&chunk);
        }

        decode_status(&body)
            .map_err(|err| FetchError::new(FailureKind::MalformedJson, err.to_string()))
    }
}

/// Builds a client. Transfers skip the overall request timeout since large
/// files legitimately take longer than a status poll.
pub(crate) fn build_client(
    settings: &FetchSettings,
    with_request_timeout: bool,
) -> Result<reqwest::Client, FetchError> {
    let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
    if with_request_timeout {
        builder = builder.timeout(settings.request_timeout);
    }
    builder
        .build()
        .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
}

fn too_large(max_bytes: u64, actual: Option<u64>) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge { max_bytes, actual },
        "response too large",
    )
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_resolve_against_base() {
        let endpoints = Endpoints::new("http://127.0.0.1:8081", "/ready", "/upload").unwrap();
        assert_eq!(
            endpoints.status_url().unwrap().as_str(),
            "http://127.0.0.1:8081/ready"
        );
        assert_eq!(
            endpoints.upload_url().unwrap().as_str(),
            "http://127.0.0.1:8081/upload"
        );
        assert_eq!(
            endpoints.resolve("/encoding/a%20b.mp4").unwrap().as_str(),
            "http://127.0.0.1:8081/encoding/a%20b.mp4"
        );
    }

    #[test]
    fn endpoints_reject_bad_base() {
        let err = Endpoints::new("not a url", "/ready", "/upload").unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
        let err = Endpoints::new("mailto:me@example.com", "/ready", "/upload").unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }
}
