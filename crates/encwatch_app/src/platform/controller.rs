use encwatch_core::{update, AppState, Effect, Msg};
use engine_logging::engine_debug;
use thiserror::Error;

use super::ui::document::{Surface, SurfaceError};
use super::ui::render::{render, ContainerId, Containers};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("page has no container #{0}")]
    MissingContainer(ContainerId),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Owns the reconciliation state and the surface it draws on.
///
/// Every dirty state change triggers a full redraw of both containers; there
/// is no diffing against what is already on screen.
pub struct Controller<S: Surface> {
    state: AppState,
    surface: S,
    containers: Containers,
}

impl<S: Surface> Controller<S> {
    /// Fails once, up front, if the surface lacks either container.
    pub fn new(state: AppState, surface: S, containers: Containers) -> Result<Self, ControllerError> {
        for id in containers.ids() {
            if !surface.has_container(id) {
                return Err(ControllerError::MissingContainer(id.clone()));
            }
        }
        Ok(Self {
            state,
            surface,
            containers,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn dispatch(&mut self, msg: Msg) -> Result<Vec<Effect>, ControllerError> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let commands = state
            .consume_dirty()
            .then(|| render(&self.containers, &state.view()));
        self.state = state;

        if let Some(commands) = commands {
            engine_debug!("Applying {} render commands", commands.len());
            self.surface.apply(commands)?;
        }
        Ok(effects)
    }
}
