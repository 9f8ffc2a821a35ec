//! Producers feeding the sequencer through a bounded queue.

use std::io::Read;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::{HostError, StreamError};
use crate::protocol::{Envelope, reader_loop};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub type StreamItem = Result<Envelope, StreamError>;

/// Shared cancellation flag for the consumer and its producers.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Receiving end of a producer queue. Ends when every producer is gone or the
/// stop signal is raised.
#[derive(Debug)]
pub struct EnvelopeStream {
    rx: Receiver<StreamItem>,
    stop: StopSignal,
}

impl Iterator for EnvelopeStream {
    type Item = StreamItem;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.stop.is_stopped() {
                return None;
            }

            match self.rx.recv_timeout(POLL_INTERVAL) {
                Ok(item) => return Some(item),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}

pub fn envelope_channel(queue_cap: usize, stop: StopSignal) -> (SyncSender<StreamItem>, EnvelopeStream) {
    let (tx, rx) = mpsc::sync_channel(queue_cap);
    (tx, EnvelopeStream { rx, stop })
}

/// Reads length-prefixed envelopes from `reader` on a dedicated thread. A
/// transport or decode failure is forwarded as the final item.
pub fn spawn_reader<R>(
    reader: R,
    queue_cap: usize,
    stop: StopSignal,
) -> Result<(EnvelopeStream, JoinHandle<()>), HostError>
where
    R: Read + Send + 'static,
{
    let (tx, stream) = envelope_channel(queue_cap, stop.clone());

    let handle = thread::Builder::new()
        .name("surface-reader".to_string())
        .spawn(move || {
            let result = reader_loop(reader, |envelope| {
                if stop.is_stopped() || tx.send(Ok(envelope)).is_err() {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            });

            match result {
                Ok(()) => log::debug!("envelope reader reached end of input"),
                Err(err) => {
                    if tx.send(Err(err)).is_err() {
                        log::debug!("envelope reader failed after the consumer left");
                    }
                }
            }
        })
        .map_err(|source| HostError::spawn("reader", source))?;

    Ok((stream, handle))
}

/// An envelope released after `delay`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedEnvelope {
    pub delay: Duration,
    pub envelope: Envelope,
}

impl ScriptedEnvelope {
    pub fn new(delay: Duration, envelope: Envelope) -> Self {
        Self { delay, envelope }
    }
}

/// Replays a timed script on a dedicated thread.
pub fn spawn_script<I>(
    script: I,
    queue_cap: usize,
    stop: StopSignal,
) -> Result<(EnvelopeStream, JoinHandle<()>), HostError>
where
    I: IntoIterator<Item = ScriptedEnvelope>,
    I::IntoIter: Send + 'static,
{
    let (tx, stream) = envelope_channel(queue_cap, stop.clone());
    let script = script.into_iter();

    let handle = thread::Builder::new()
        .name("surface-script".to_string())
        .spawn(move || {
            for scripted in script {
                if !sleep_unless_stopped(scripted.delay, &stop) {
                    break;
                }

                if tx.send(Ok(scripted.envelope)).is_err() {
                    log::debug!("script consumer left; stopping replay");
                    break;
                }
            }
        })
        .map_err(|source| HostError::spawn("script", source))?;

    Ok((stream, handle))
}

/// Sleeps in short slices. Returns `false` if the stop signal was raised.
fn sleep_unless_stopped(delay: Duration, stop: &StopSignal) -> bool {
    let mut remaining = delay;

    loop {
        if stop.is_stopped() {
            return false;
        }

        if remaining.is_zero() {
            return true;
        }

        let slice = remaining.min(POLL_INTERVAL);
        thread::sleep(slice);
        remaining -= slice;
    }
}
