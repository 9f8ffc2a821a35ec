use std::io;
use std::process;
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread;

use surface_ui_runtime::protocol::writer_loop;
use surface_ui_runtime::{
    ConnectionState, HostConfig, HostFrame, Liveness, Presenter, Snapshot, StopSignal,
};

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        log::error!("surface_ui_host fatal error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = HostConfig::from_env();
    let stop = StopSignal::new();
    let (tx, rx) = mpsc::sync_channel(config.outbound_queue_cap);

    let writer_handle = thread::Builder::new()
        .name("surface-writer".to_string())
        .spawn(move || writer_loop(io::stdout().lock(), rx))?;

    let mut presenter = FramePresenter::new(tx, config.outbound_queue_cap, stop.clone());
    let outcome = surface_ui_runtime::run(&config, &mut presenter, &stop);

    // Closing the queue lets the writer drain and exit.
    drop(presenter);
    match writer_handle.join() {
        Ok(Ok(())) => {}
        Ok(Err(err)) => log::error!("writer thread returned error: {err}"),
        Err(err) => log::error!("writer thread join failed: {err:?}"),
    }

    let state = outcome?;
    log::info!(
        "surface stream ended {:?} at generation {} revision {}",
        state.connection(),
        state.generation(),
        state.revision()
    );
    Ok(())
}

/// Serialises everything the stream produces as outbound frames on stdout.
struct FramePresenter {
    tx: SyncSender<HostFrame>,
    queue_capacity: usize,
    stop: StopSignal,
    liveness: Option<Liveness>,
    connection: ConnectionState,
}

impl FramePresenter {
    fn new(tx: SyncSender<HostFrame>, queue_capacity: usize, stop: StopSignal) -> Self {
        Self {
            tx,
            queue_capacity,
            stop,
            liveness: None,
            connection: ConnectionState::Disconnected,
        }
    }

    fn status_frame(&self) -> HostFrame {
        HostFrame::Status {
            state: self.connection,
            liveness: self.liveness.clone(),
        }
    }

    fn enqueue(&self, frame: HostFrame) {
        let frame = match self.tx.try_send(frame) {
            Ok(()) => return,
            Err(TrySendError::Full(frame)) => {
                log::warn!(
                    "outbound queue full (cap={}); waiting to enqueue frame",
                    self.queue_capacity
                );
                frame
            }
            Err(TrySendError::Disconnected(_frame)) => {
                log::warn!("outbound writer gone; stopping stream");
                self.stop.stop();
                return;
            }
        };

        if self.tx.send(frame).is_err() {
            log::warn!("outbound writer gone; stopping stream");
            self.stop.stop();
        }
    }
}

impl Presenter for FramePresenter {
    fn present(&mut self, snapshot: Snapshot) {
        log::debug!(
            "presenting '{}' generation {} revision {}",
            snapshot.surface_id,
            snapshot.generation,
            snapshot.revision
        );
        self.enqueue(HostFrame::Snapshot(snapshot));
    }

    fn connection_changed(&mut self, state: ConnectionState) {
        self.connection = state;
        self.enqueue(self.status_frame());
    }

    fn liveness_changed(&mut self, liveness: &Liveness) {
        self.liveness = Some(liveness.clone());
        self.enqueue(self.status_frame());
    }
}
