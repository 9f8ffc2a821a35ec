pub mod config;
pub mod demo;
pub mod error;
pub mod layout;
pub mod model;
pub mod patch;
pub mod protocol;
pub mod sequencer;
pub mod source;

use std::io;
use std::thread::JoinHandle;

pub use crate::config::{HostConfig, SourceKind};
pub use crate::error::{HostError, PatchError, StreamError, TreeError};
pub use crate::layout::{ComputedLayout, RenderNode, Viewport, layout_tree};
pub use crate::model::{ComponentKind, ComponentNode, TreeModel};
pub use crate::protocol::{Envelope, HostFrame, Liveness, MessageKind};
pub use crate::sequencer::{ConnectionState, Presenter, Snapshot, SurfaceState, run_stream, step};
pub use crate::source::StopSignal;
pub use serde_json;

/// Runs the configured source through the sequencer until the stream ends,
/// fails, or `stop` is raised.
pub fn run<P>(
    config: &HostConfig,
    presenter: &mut P,
    stop: &StopSignal,
) -> Result<SurfaceState, HostError>
where
    P: Presenter + ?Sized,
{
    log::info!(
        "starting {:?} source, viewport {}x{}",
        config.source,
        config.viewport.width,
        config.viewport.height
    );

    let (stream, producer) = match config.source {
        SourceKind::Stdio => {
            source::spawn_reader(io::stdin(), config.inbound_queue_cap, stop.clone())?
        }
        SourceKind::Demo => source::spawn_script(
            demo::script(config.demo_ticks, config.demo_interval),
            config.inbound_queue_cap,
            stop.clone(),
        )?,
    };

    let result = run_stream(stream, presenter, config.viewport, stop);

    // The stream has been dropped, so a producer blocked on the queue exits.
    stop.stop();
    join_producer(producer, config.source);

    result.map_err(HostError::from)
}

fn join_producer(producer: JoinHandle<()>, source: SourceKind) {
    if source == SourceKind::Stdio && !producer.is_finished() {
        // A reader blocked on stdin cannot be woken; leave it to process exit.
        log::warn!("source thread still active during shutdown; skipping join");
        return;
    }

    if let Err(err) = producer.join() {
        log::error!("source thread join failed: {err:?}");
    }
}
