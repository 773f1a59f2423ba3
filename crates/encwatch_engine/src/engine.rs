use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info};
use futures_util::FutureExt;
use thiserror::Error;

use crate::fetch::{ChannelProgressSink, Endpoints, FetchSettings, ReqwestStatusFetcher};
use crate::transfer::{ReqwestDownloader, ReqwestUploader};
use crate::{
    Downloader, EngineEvent, FailureKind, FetchError, ProgressSink, StatusFetcher, Tick, Uploader,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build http client: {0}")]
    Client(#[from] FetchError),
}

/// Everything the engine needs to talk to the server.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub endpoints: Endpoints,
    pub fetch: FetchSettings,
    pub download_dir: PathBuf,
}

enum EngineCommand {
    FetchStatus { tick: Tick },
    Upload { path: PathBuf },
    Download { name: String, href: String },
}

impl EngineCommand {
    /// Completion event reported when the worker handling this command panics.
    fn panicked(&self) -> EngineEvent {
        let error = FetchError::new(FailureKind::WorkerPanicked, "worker task panicked");
        match self {
            EngineCommand::FetchStatus { tick } => EngineEvent::StatusFetched {
                tick: *tick,
                result: Err(error),
            },
            EngineCommand::Upload { .. } => EngineEvent::UploadCompleted { result: Err(error) },
            EngineCommand::Download { name, .. } => EngineEvent::DownloadCompleted {
                name: name.clone(),
                result: Err(error),
            },
        }
    }
}

struct Workers {
    fetcher: Arc<dyn StatusFetcher>,
    uploader: Arc<dyn Uploader>,
    downloader: Arc<dyn Downloader>,
}

/// Runs network IO on a background tokio runtime. Commands are fire-and-forget;
/// results come back as [`EngineEvent`]s in completion order.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let fetcher = ReqwestStatusFetcher::new(config.endpoints.clone(), config.fetch.clone())?;
        let uploader = ReqwestUploader::new(config.endpoints.clone(), &config.fetch)?;
        let downloader =
            ReqwestDownloader::new(config.endpoints, &config.fetch, config.download_dir)?;
        Self::with_workers(
            Arc::new(fetcher),
            Arc::new(uploader),
            Arc::new(downloader),
        )
    }

    /// Builds an engine around caller-provided workers.
    pub fn with_workers(
        fetcher: Arc<dyn StatusFetcher>,
        uploader: Arc<dyn Uploader>,
        downloader: Arc<dyn Downloader>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let workers = Arc::new(Workers {
            fetcher,
            uploader,
            downloader,
        });

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let workers = workers.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    // Every command must answer with exactly one completion event.
                    let fallback = command.panicked();
                    let work = handle_command(&workers, command, event_tx.clone());
                    let outcome = AssertUnwindSafe(work).catch_unwind().await;
                    if outcome.is_err() {
                        engine_error!("Engine worker panicked; reporting failure");
                        let _ = event_tx.send(fallback);
                    }
                });
            }
            engine_debug!("Engine command channel closed");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn fetch_status(&self, tick: Tick) {
        let _ = self.cmd_tx.send(EngineCommand::FetchStatus { tick });
    }

    pub fn upload(&self, path: impl Into<PathBuf>) {
        let _ = self.cmd_tx.send(EngineCommand::Upload { path: path.into() });
    }

    pub fn download(&self, name: impl Into<String>, href: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Download {
            name: name.into(),
            href: href.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    workers: &Workers,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::FetchStatus { tick } => {
            let result = workers.fetcher.fetch_status().await;
            let _ = event_tx.send(EngineEvent::StatusFetched { tick, result });
        }
        EngineCommand::Upload { path } => {
            engine_info!("Uploading {:?}", path);
            let sink: Arc<dyn ProgressSink> = Arc::new(ChannelProgressSink::new(event_tx.clone()));
            let result = workers.uploader.upload(&path, sink).await;
            let _ = event_tx.send(EngineEvent::UploadCompleted { result });
        }
        EngineCommand::Download { name, href } => {
            engine_info!("Downloading {} from {}", name, href);
            let result = workers.downloader.download(&name, &href).await;
            let _ = event_tx.send(EngineEvent::DownloadCompleted { name, result });
        }
    }
}
