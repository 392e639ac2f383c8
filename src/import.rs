//! Background track import
//!
//! Loading a track must not hold the rig gate while audio is decoded,
//! so a load only queues a job. A dedicated worker thread decodes it
//! and then takes the gate briefly to swap the finished track in.
//! Partial tracks reported along the way are swapped in the same way,
//! still marked as importing, so the meters fill in as decoding runs.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::deck::Track;
use crate::error::ImportError;
use crate::rig::SharedRig;
use crate::status::{Status, StatusLevel};

/// Turns a file into a [`Track`]; supplied by the audio engine
///
/// A decoder may hand `progress` the audio decoded so far as often as
/// it likes; each call replaces what the deck shows until the final
/// track is returned.
pub trait Decoder: Send + 'static {
    fn decode(&self, path: &Path, progress: &mut dyn FnMut(Track)) -> Result<Track, ImportError>;
}

/// Decoder for builds without an audio engine: every import fails
pub struct NullDecoder;

impl Decoder for NullDecoder {
    fn decode(&self, path: &Path, _progress: &mut dyn FnMut(Track)) -> Result<Track, ImportError> {
        Err(ImportError::DecodeFailed {
            path: path.display().to_string(),
            message: "no decoder available".to_string(),
        })
    }
}

/// Request to import a file into a deck
#[derive(Debug, Clone)]
pub struct ImportJob {
    pub deck: usize,
    pub ticket: u64,
    pub pathname: String,
}

enum WorkerMessage {
    Job(ImportJob),
    Stop,
}

/// Cloneable handle for queueing imports
#[derive(Clone)]
pub struct Importer {
    tx: Sender<WorkerMessage>,
    status: Arc<Status>,
}

impl Importer {
    /// Queue a job; returns immediately
    pub fn submit(&self, job: ImportJob) -> Result<(), ImportError> {
        self.status
            .set(StatusLevel::Info, format!("Importing '{}'...", job.pathname));
        self.tx
            .send(WorkerMessage::Job(job))
            .map_err(|_| ImportError::WorkerStopped)
    }
}

/// The thread that runs imports one at a time
pub struct ImportWorker {
    tx: Sender<WorkerMessage>,
    thread_handle: Option<JoinHandle<()>>,
}

impl ImportWorker {
    /// Start the worker; the returned [`Importer`] goes into the rig
    pub fn start<D: Decoder>(
        rig: SharedRig,
        status: Arc<Status>,
        decoder: D,
    ) -> Result<(Self, Importer), ImportError> {
        let (tx, rx) = unbounded();
        let thread_status = status.clone();

        let handle = thread::Builder::new()
            .name("import".to_string())
            .spawn(move || run(rx, rig, thread_status, decoder))
            .map_err(|_| ImportError::WorkerStopped)?;

        let importer = Importer {
            tx: tx.clone(),
            status,
        };

        Ok((
            Self {
                tx,
                thread_handle: Some(handle),
            },
            importer,
        ))
    }

    /// Finish the current job, then stop
    pub fn stop(&mut self) {
        let _ = self.tx.send(WorkerMessage::Stop);

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ImportWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<D: Decoder>(rx: Receiver<WorkerMessage>, rig: SharedRig, status: Arc<Status>, decoder: D) {
    while let Ok(WorkerMessage::Job(job)) = rx.recv() {
        let mut publish = |partial: Track| {
            if !rig.lock().import_progress(job.deck, job.ticket, partial) {
                tracing::trace!("Deck {}: progress for a stale import", job.deck + 1);
            }
        };

        match decoder.decode(Path::new(&job.pathname), &mut publish) {
            Ok(track) => {
                let swapped = rig.lock().complete_import(job.deck, job.ticket, track);

                if swapped {
                    tracing::info!("Deck {}: imported '{}'", job.deck + 1, job.pathname);
                    status.set(StatusLevel::Info, format!("Loaded '{}'", job.pathname));
                } else {
                    tracing::debug!("Deck {}: discarded stale import", job.deck + 1);
                }
            }
            Err(e) => {
                tracing::warn!("Deck {}: {}", job.deck + 1, e);

                // Leave the placeholder in place but stop showing it as busy
                let _ = rig.lock().complete_import(job.deck, job.ticket, Track::empty());
                status.set(StatusLevel::Alert, e.to_string());
            }
        }
    }
}
