use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender, SyncSender};
use std::thread;

use crate::models::candidate::{Candidate, RecognitionSource};
use crate::models::error::ScanError;
use crate::models::frame::Frame;
use crate::models::identifier::Identifier;

/// What a recognition channel found in one frame.
#[derive(Debug)]
pub(crate) struct ChannelReport {
    pub source: RecognitionSource,
    pub result: Result<Option<String>, ScanError>,
}

/// Everything the dispatcher reacts to.
#[derive(Debug)]
pub(crate) enum ScanEvent {
    Report(ChannelReport),
    /// Typed entry; the dispatcher answers on `reply` with its decision.
    Manual {
        candidate: Candidate,
        reply: SyncSender<Result<Identifier, ScanError>>,
    },
    Cancel,
}

/// Spawn a recognition worker fed one frame at a time.
///
/// The worker exits when its job sender is dropped or when the dispatcher
/// stops listening for reports.
pub(crate) fn spawn_worker<F>(
    source: RecognitionSource,
    events: Sender<ScanEvent>,
    mut recognize: F,
) -> Result<(Sender<Frame>, thread::JoinHandle<()>), ScanError>
where
    F: FnMut(&Frame) -> Result<Option<String>, ScanError> + Send + 'static,
{
    let (jobs_tx, jobs_rx) = mpsc::channel::<Frame>();

    let handle = thread::Builder::new()
        .name(format!("isbn-{}-worker", source.label()))
        .spawn(move || {
            for frame in jobs_rx.iter() {
                let result = match panic::catch_unwind(AssertUnwindSafe(|| recognize(&frame))) {
                    Ok(result) => result,
                    Err(_) => Err(ScanError::RecognitionFault(format!(
                        "{} recognizer panicked",
                        source.label()
                    ))),
                };
                if events
                    .send(ScanEvent::Report(ChannelReport { source, result }))
                    .is_err()
                {
                    break;
                }
            }
        })
        .map_err(|e| {
            ScanError::ConfigurationFailed(format!(
                "failed to spawn {} worker: {}",
                source.label(),
                e
            ))
        })?;

    Ok((jobs_tx, handle))
}
