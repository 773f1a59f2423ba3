use std::time::Duration;

use encwatch_core::{Effect, Msg};
use encwatch_engine::{EngineEvent, EngineHandle};
use engine_logging::{engine_error, engine_info, engine_warn, tick_info, tick_warn};

/// Hands effects to the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    outstanding: usize,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            outstanding: 0,
        }
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchStatus { tick } => {
                    self.engine.fetch_status(tick);
                }
                Effect::UploadFile { path } => {
                    engine_info!("UploadFile path={}", path);
                    self.engine.upload(path);
                }
                Effect::DownloadItem { name, href } => {
                    engine_info!("DownloadItem name={} href={}", name, href);
                    self.engine.download(name, href);
                }
            }
            self.outstanding += 1;
        }
    }

    /// No effect is waiting for its completion event.
    pub fn is_idle(&self) -> bool {
        self.outstanding == 0
    }

    pub fn try_next(&mut self) -> Option<Msg> {
        let event = self.engine.try_recv()?;
        Some(self.translate(event))
    }

    pub fn next_timeout(&mut self, timeout: Duration) -> Option<Msg> {
        let event = self.engine.recv_timeout(timeout)?;
        Some(self.translate(event))
    }

    fn translate(&mut self, event: EngineEvent) -> Msg {
        match event {
            EngineEvent::StatusFetched { tick, result } => {
                self.complete_one();
                match result {
                    Ok(entries) => {
                        tick_info!("Status for tick {} has {} entries", tick, entries.len());
                        Msg::StatusFetched { tick, entries }
                    }
                    Err(err) => {
                        tick_warn!("Status fetch for tick {} failed: {}", tick, err);
                        Msg::StatusFetchFailed {
                            tick,
                            message: err.to_string(),
                        }
                    }
                }
            }
            EngineEvent::UploadProgress { sent, total } => Msg::UploadProgress { sent, total },
            EngineEvent::UploadCompleted { result } => {
                self.complete_one();
                Msg::UploadDone {
                    result: result.map_err(|err| {
                        engine_error!("Upload failed: {}", err);
                        err.to_string()
                    }),
                }
            }
            EngineEvent::DownloadCompleted { name, result } => {
                self.complete_one();
                let result = match result {
                    Ok(path) => {
                        engine_info!("Downloaded {} to {:?}", name, path);
                        Ok(path.display().to_string())
                    }
                    Err(err) => {
                        engine_warn!("Download of {} failed: {}", name, err);
                        Err(err.to_string())
                    }
                };
                Msg::DownloadDone { name, result }
            }
        }
    }

    fn complete_one(&mut self) {
        self.outstanding = self.outstanding.saturating_sub(1);
    }
}
