//! Background frame writer.
//!
//! The annealing loop only pushes [`ImprovementEvent`]s into a bounded
//! channel; a dedicated thread renders and writes the PNG files.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, warn};

use super::frame::save_frame;
use crate::anneal::{ImprovementEvent, ImprovementSink};
use crate::error::{Error, Result};

/// Default number of events buffered before the search blocks on the writer.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// What the writer thread did before exiting.
#[derive(Debug, Default)]
struct WriterReport {
    written: usize,
    failed: usize,
    first_error: Option<Error>,
}

/// [`ImprovementSink`] that writes one PNG frame per event on a background
/// thread.
///
/// Frame write failures do not stop the search. They are logged as they
/// happen and the first one is returned by [`finish`](Self::finish).
pub struct FrameWriter {
    sender: Option<SyncSender<ImprovementEvent>>,
    handle: Option<JoinHandle<WriterReport>>,
    disconnected: bool,
}

impl FrameWriter {
    /// Spawns the writer thread. Frames go to `output_dir`, upscaled by
    /// `scale`.
    pub fn spawn(output_dir: PathBuf, scale: u32, capacity: usize) -> Self {
        let (tx, rx) = mpsc::sync_channel::<ImprovementEvent>(capacity);
        let handle = thread::Builder::new()
            .name("frame-writer".into())
            .spawn(move || drain(rx, output_dir, scale));

        match handle {
            Ok(handle) => Self {
                sender: Some(tx),
                handle: Some(handle),
                disconnected: false,
            },
            Err(e) => {
                error!(error = %e, "failed to spawn frame writer thread; frames will be dropped");
                Self {
                    sender: None,
                    handle: None,
                    disconnected: true,
                }
            }
        }
    }

    /// Closes the queue, waits for pending frames, and returns how many
    /// were written.
    ///
    /// # Errors
    ///
    /// The first frame that failed to render or write.
    pub fn finish(mut self) -> Result<usize> {
        let report = self.shutdown();
        if report.failed > 0 {
            warn!(
                written = report.written,
                failed = report.failed,
                "some frames could not be written"
            );
        }
        match report.first_error {
            Some(e) => Err(e),
            None => Ok(report.written),
        }
    }

    fn shutdown(&mut self) -> WriterReport {
        // Dropping the sender ends the writer's receive loop.
        self.sender.take();
        match self.handle.take().map(JoinHandle::join) {
            Some(Ok(report)) => report,
            Some(Err(panic)) => std::panic::resume_unwind(panic),
            None => WriterReport::default(),
        }
    }
}

impl ImprovementSink for FrameWriter {
    fn on_improvement(&mut self, event: ImprovementEvent) {
        let Some(ref tx) = self.sender else {
            return;
        };
        if tx.send(event).is_err() && !self.disconnected {
            self.disconnected = true;
            error!("frame writer stopped; further frames are dropped");
        }
    }
}

impl Drop for FrameWriter {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.shutdown();
        }
    }
}

fn drain(rx: Receiver<ImprovementEvent>, dir: PathBuf, scale: u32) -> WriterReport {
    let mut report = WriterReport::default();

    for event in rx {
        match save_frame(&dir, &event, scale) {
            Ok(path) => {
                report.written += 1;
                debug!(path = %path.display(), score = event.score, "frame written");
            }
            Err(e) => {
                error!(error = %e, attempt = event.attempt, "failed to write frame");
                report.failed += 1;
                report.first_error.get_or_insert(e);
            }
        }
    }
    report
}
