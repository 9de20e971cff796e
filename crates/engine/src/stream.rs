use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use log::debug;
use prepare_fs::FileRecord;
use prepare_runtime::STAGE_CHANNEL_CAPACITY;
use smallvec::SmallVec;

use crate::error::PrepareError;

/// Records produced for one input. Usually one; none when filtered out;
/// two when a side-car source map comes along.
pub type Emitted = SmallVec<[FileRecord; 2]>;

/// One step of a file pipeline.
///
/// Each input is handled to completion before the next one is taken, and
/// outputs keep input order.
pub trait Transform: Send + 'static {
    type Input: Send + 'static;

    fn transform(&self, input: Self::Input) -> Result<Emitted, PrepareError>;
}

/// Counters reported when a stage finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSummary {
    pub received: usize,
    pub emitted: usize,
    /// Inputs that succeeded without producing anything.
    pub dropped: usize,
    pub failed: usize,
    /// Whether the stage stopped on a stream-fatal error.
    pub aborted: bool,
}

/// A transform running on its own thread.
pub struct Stage {
    /// Records in processing order. Bounded: the stage blocks once it is
    /// `STAGE_CHANNEL_CAPACITY` records ahead of the consumer.
    pub output: Receiver<FileRecord>,
    /// Per-file failures, in the order they happened.
    pub errors: Receiver<PrepareError>,
    handle: JoinHandle<StageSummary>,
}

impl Stage {
    /// Wait for the stage to finish.
    ///
    /// Drain `output` first or concurrently: a full output channel keeps
    /// the stage blocked.
    pub fn join(self) -> thread::Result<StageSummary> {
        self.handle.join()
    }

    /// Drain both channels and wait for the stage.
    pub fn collect(self) -> thread::Result<(Vec<FileRecord>, Vec<PrepareError>, StageSummary)> {
        let records: Vec<FileRecord> = self.output.iter().collect();
        let summary = self.handle.join()?;
        let errors: Vec<PrepareError> = self.errors.try_iter().collect();
        Ok((records, errors, summary))
    }
}

/// Run `transform` on a new thread over everything arriving on `input`.
///
/// The stage ends when `input` disconnects, when the consumer drops
/// `output`, or after reporting an error for which
/// [`PrepareError::aborts_stream`] holds.
pub fn spawn_stage<T: Transform>(transform: T, input: Receiver<T::Input>) -> Stage {
    let (out_tx, out_rx) = channel::bounded(STAGE_CHANNEL_CAPACITY);
    let (err_tx, err_rx) = channel::unbounded();

    let handle = thread::spawn(move || drive(&transform, input, out_tx, err_tx));

    Stage {
        output: out_rx,
        errors: err_rx,
        handle,
    }
}

fn drive<T: Transform>(
    transform: &T,
    input: Receiver<T::Input>,
    out_tx: Sender<FileRecord>,
    err_tx: Sender<PrepareError>,
) -> StageSummary {
    let mut summary = StageSummary::default();

    'inputs: for item in input.iter() {
        summary.received += 1;

        match transform.transform(item) {
            Ok(records) if records.is_empty() => summary.dropped += 1,
            Ok(records) => {
                for record in records {
                    if out_tx.send(record).is_err() {
                        debug!("[stage] consumer hung up, stopping");
                        break 'inputs;
                    }
                    summary.emitted += 1;
                }
            }
            Err(e) => {
                summary.failed += 1;
                let fatal = e.aborts_stream();
                debug!("[stage] input #{} failed: {e}", summary.received);
                // Nobody listening for errors is not a reason to stop.
                let _ = err_tx.send(e);
                if fatal {
                    summary.aborted = true;
                    break;
                }
            }
        }
    }

    debug!("[stage] finished: {summary:?}");
    summary
}

/// Run `transform` over `inputs` on the current thread.
pub fn run_all<T, I>(transform: &T, inputs: I) -> (Vec<FileRecord>, Vec<PrepareError>)
where
    T: Transform,
    I: IntoIterator<Item = T::Input>,
{
    let mut records = Vec::new();
    let mut errors = Vec::new();

    for item in inputs {
        match transform.transform(item) {
            Ok(emitted) => records.extend(emitted),
            Err(e) => {
                let fatal = e.aborts_stream();
                errors.push(e);
                if fatal {
                    break;
                }
            }
        }
    }

    (records, errors)
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
