//! Ordered consumption of the envelope stream.
//!
//! The authoritative [`TreeModel`] lives inside [`SurfaceState`], which is
//! moved through [`step`] once per envelope. Nothing else holds a mutable
//! handle to it; presenters only ever see laid-out [`Snapshot`]s.

use serde::Serialize;
use std::sync::Arc;

use crate::error::StreamError;
use crate::layout::{RenderNode, Viewport, layout_tree};
use crate::model::TreeModel;
use crate::protocol::{Envelope, Liveness, Message};
use crate::source::StopSignal;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Streaming,
    Error,
}

/// A laid-out view of one tree revision.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub surface_id: String,
    /// Bumped by every adopted surface replacement.
    pub generation: u64,
    /// Successful patches since the current generation began.
    pub revision: u64,
    pub timestamp: i64,
    pub root: Arc<RenderNode>,
}

/// Receives everything the stream produces for display.
pub trait Presenter {
    fn present(&mut self, snapshot: Snapshot);

    fn connection_changed(&mut self, _state: ConnectionState) {}

    fn liveness_changed(&mut self, _liveness: &Liveness) {}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceState {
    connection: ConnectionState,
    tree: Option<TreeModel>,
    generation: u64,
    revision: u64,
    liveness: Option<Liveness>,
    last_timestamp: Option<i64>,
}

impl SurfaceState {
    pub fn connecting() -> Self {
        Self {
            connection: ConnectionState::Connecting,
            ..Self::default()
        }
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn tree(&self) -> Option<&TreeModel> {
        self.tree.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn liveness(&self) -> Option<&Liveness> {
        self.liveness.as_ref()
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.last_timestamp
    }

    /// Lays out the current tree, if any.
    pub fn snapshot(&self, viewport: Viewport) -> Option<Snapshot> {
        let tree = self.tree.as_ref()?;

        Some(Snapshot {
            surface_id: tree.surface_id().to_string(),
            generation: self.generation,
            revision: self.revision,
            timestamp: self.last_timestamp.unwrap_or_default(),
            root: Arc::new(layout_tree(tree.root(), viewport)),
        })
    }

    fn idle(self) -> Step {
        Step {
            state: self,
            effect: Effect::Idle,
        }
    }

    fn publish(self, viewport: Viewport) -> Step {
        let effect = match self.snapshot(viewport) {
            Some(snapshot) => Effect::Publish(snapshot),
            None => Effect::Idle,
        };

        Step {
            state: self,
            effect,
        }
    }

    fn fail(mut self, err: StreamError) -> Step {
        self.connection = ConnectionState::Error;

        Step {
            state: self,
            effect: Effect::Fail(err),
        }
    }
}

/// What the caller should do after a step.
#[derive(Debug)]
pub enum Effect {
    Idle,
    Liveness(Liveness),
    Publish(Snapshot),
    /// The stream cannot continue; the state has moved to `Error`.
    Fail(StreamError),
}

#[derive(Debug)]
pub struct Step {
    pub state: SurfaceState,
    pub effect: Effect,
}

/// Processes one envelope to completion.
pub fn step(mut state: SurfaceState, envelope: Envelope, viewport: Viewport) -> Step {
    if state.connection == ConnectionState::Error {
        return state.idle();
    }

    let timestamp = envelope.timestamp;
    let message = match envelope.decode() {
        Ok(message) => message,
        Err(err) => return state.fail(err),
    };

    state.connection = ConnectionState::Streaming;
    state.last_timestamp = Some(timestamp);

    match message {
        Message::Heartbeat(liveness) => {
            state.liveness = Some(liveness.clone());
            Step {
                state,
                effect: Effect::Liveness(liveness),
            }
        }
        Message::SurfaceUpdate(update) => {
            let surface_id = update.surface_id.clone();
            match TreeModel::new(update.surface_id, update.root) {
                Ok(tree) => {
                    log::info!(
                        "adopted surface '{surface_id}' with {} nodes",
                        tree.root().node_count()
                    );
                    state.tree = Some(tree);
                    state.generation += 1;
                    state.revision = 0;
                    state.publish(viewport)
                }
                Err(source) => state.fail(StreamError::InvalidSurface { surface_id, source }),
            }
        }
        Message::DataModelUpdate(update) => {
            let Some(path) = update.path else {
                log::debug!("ignoring data model update without a path");
                return state.idle();
            };

            let Some(tree) = state.tree.as_mut() else {
                log::debug!("ignoring data model update before any surface");
                return state.idle();
            };

            if !tree.apply_patch(&path, &update.value) {
                return state.idle();
            }

            state.revision += 1;
            state.publish(viewport)
        }
    }
}

/// Drains `source` in order until it ends, the stop signal is raised, or the
/// stream fails.
pub fn run_stream<I, P>(
    source: I,
    presenter: &mut P,
    viewport: Viewport,
    stop: &StopSignal,
) -> Result<SurfaceState, StreamError>
where
    I: IntoIterator<Item = Result<Envelope, StreamError>>,
    P: Presenter + ?Sized,
{
    let mut state = SurfaceState::connecting();
    presenter.connection_changed(state.connection());
    log::info!("surface stream connecting");

    for item in source {
        if stop.is_stopped() {
            log::info!("stop requested; leaving surface stream");
            break;
        }

        let previous = state.connection();
        let Step {
            state: next,
            effect,
        } = match item {
            Ok(envelope) => step(state, envelope, viewport),
            Err(err) => state.fail(err),
        };
        state = next;

        if state.connection() != previous {
            log::info!("connection {previous:?} -> {:?}", state.connection());
            presenter.connection_changed(state.connection());
        }

        match effect {
            Effect::Idle => {}
            Effect::Liveness(liveness) => presenter.liveness_changed(&liveness),
            Effect::Publish(snapshot) => presenter.present(snapshot),
            Effect::Fail(err) => {
                log::error!("surface stream failed: {err}");
                return Err(err);
            }
        }
    }

    Ok(state)
}
