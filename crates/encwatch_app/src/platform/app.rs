use std::io::{self, Stdout};
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use encwatch_core::{AppState, Effect, Msg};
use encwatch_engine::{EngineError, EngineHandle};
use engine_logging::{engine_info, set_poll_tick};
use thiserror::Error;

use super::config::{AppConfig, ConfigError};
use super::controller::{Controller, ControllerError};
use super::effects::EffectRunner;
use super::scheduler::{spawn_ticker, IntervalScheduler, Scheduler};
use super::ui::document::{Document, Surface};
use super::ui::terminal::{HtmlSnapshot, TerminalSurface};

/// How long the loop waits on the tick channel before checking the engine.
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Controller(#[from] ControllerError),
    #[error("{0} is not ready for download")]
    NotReady(String),
    #[error("upload of {path} failed: {message}")]
    Upload { path: String, message: String },
    #[error("download of {name} failed: {message}")]
    Download { name: String, message: String },
}

/// A controller wired to an engine, driven from the calling thread.
pub struct Session<S: Surface> {
    controller: Controller<S>,
    runner: EffectRunner,
}

impl<S: Surface> Session<S> {
    pub fn new(controller: Controller<S>, engine: EngineHandle) -> Self {
        Self {
            controller,
            runner: EffectRunner::new(engine),
        }
    }

    pub fn controller(&self) -> &Controller<S> {
        &self.controller
    }

    pub fn into_controller(self) -> Controller<S> {
        self.controller
    }

    /// Dispatches `msg` and hands its effects to the engine.
    pub fn dispatch(&mut self, msg: Msg) -> Result<Vec<Effect>, AppError> {
        if matches!(msg, Msg::Tick) {
            set_poll_tick(self.controller.state().tick() + 1);
        }
        let effects = self.controller.dispatch(msg)?;
        self.runner.enqueue(effects.clone());
        Ok(effects)
    }

    /// Processes engine events until every issued effect has completed.
    /// Returns the messages that were dispatched along the way.
    pub fn drain_until_idle(&mut self) -> Result<Vec<Msg>, AppError> {
        let mut seen = Vec::new();
        while !self.runner.is_idle() {
            if let Some(msg) = self.runner.next_timeout(EVENT_POLL_INTERVAL) {
                seen.push(msg.clone());
                self.dispatch(msg)?;
            }
        }
        Ok(seen)
    }

    /// Reconciliation loop: ticks from `ticks`, results from the engine, all
    /// dispatched on this thread. Returns once the tick source is exhausted
    /// and the last fetch has been applied.
    pub fn run(&mut self, ticks: &mpsc::Receiver<Msg>) -> Result<(), AppError> {
        let mut ticks_done = false;
        loop {
            if !ticks_done {
                match ticks.recv_timeout(EVENT_POLL_INTERVAL) {
                    Ok(msg) => {
                        self.dispatch(msg)?;
                    }
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                    Err(mpsc::RecvTimeoutError::Disconnected) => ticks_done = true,
                }
            } else if let Some(msg) = self.runner.next_timeout(EVENT_POLL_INTERVAL) {
                self.dispatch(msg)?;
            }

            while let Some(msg) = self.runner.try_next() {
                self.dispatch(msg)?;
            }

            if ticks_done && self.runner.is_idle() {
                return Ok(());
            }
        }
    }
}

fn terminal_session(config: &AppConfig) -> Result<Session<TerminalSurface<Stdout>>, AppError> {
    config.validate()?;
    let containers = config.containers();
    let document = Document::with_containers(&config.page_containers());
    let snapshot = config.html_snapshot.clone().and_then(HtmlSnapshot::new);
    let surface = TerminalSurface::new(document, io::stdout(), snapshot);
    let controller = Controller::new(AppState::with_route(config.route()), surface, containers)?;
    let engine = EngineHandle::new(config.engine_config()?)?;
    Ok(Session::new(controller, engine))
}

/// Polls the status endpoint and redraws until `max_ticks` is reached, or
/// forever when it is unset.
pub fn run_watch(config: &AppConfig) -> Result<(), AppError> {
    let scheduler = IntervalScheduler::new(config.poll_interval(), config.max_ticks);
    run_watch_with(config, scheduler)
}

pub fn run_watch_with<T: Scheduler>(config: &AppConfig, scheduler: T) -> Result<(), AppError> {
    let mut session = terminal_session(config)?;
    engine_info!(
        "Watching {}{} every {:?}",
        config.server_url,
        config.status_path,
        config.poll_interval()
    );
    let (tick_tx, tick_rx) = mpsc::channel();
    spawn_ticker(scheduler, tick_tx);
    session.run(&tick_rx)
}

pub fn run_upload(config: &AppConfig, path: &Path) -> Result<(), AppError> {
    let mut session = terminal_session(config)?;
    let path_text = path.display().to_string();
    session.dispatch(Msg::UploadRequested {
        path: path_text.clone(),
    })?;
    for msg in session.drain_until_idle()? {
        if let Msg::UploadDone {
            result: Err(message),
        } = msg
        {
            return Err(AppError::Upload {
                path: path_text,
                message,
            });
        }
    }
    Ok(())
}

/// Fetches the status once, then downloads `name` if it is complete.
pub fn run_download(config: &AppConfig, name: &str) -> Result<(), AppError> {
    let mut session = terminal_session(config)?;
    download_with(&mut session, name)
}

pub fn download_with<S: Surface>(session: &mut Session<S>, name: &str) -> Result<(), AppError> {
    session.dispatch(Msg::Tick)?;
    session.drain_until_idle()?;

    let effects = session.dispatch(Msg::DownloadRequested {
        name: name.to_string(),
    })?;
    if effects.is_empty() {
        return Err(AppError::NotReady(name.to_string()));
    }
    for msg in session.drain_until_idle()? {
        if let Msg::DownloadDone {
            result: Err(message),
            ..
        } = msg
        {
            return Err(AppError::Download {
                name: name.to_string(),
                message,
            });
        }
    }
    Ok(())
}
