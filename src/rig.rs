//! The deck rig and the gate that serialises access to it
//!
//! Every thread that touches deck or track state (the render loop,
//! the remote control thread, the import worker and the audio engine)
//! does so through a single [`Gate`] covering the whole deck array.
//!
//! The gate is not re-entrant. A thread must never call into code that
//! locks the gate while already holding it; handlers receive `&mut Rig`
//! from their caller instead of locking themselves.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::constants::MAX_DECKS;
use crate::deck::{Deck, Track};
use crate::error::ConfigError;
use crate::import::{ImportJob, Importer};
use crate::library::Record;

/// Lock guarding all shared deck and track state
pub type Gate = Mutex<Rig>;

/// Thread-safe handle to the gate
pub type SharedRig = Arc<Gate>;

/// The fixed array of decks plus the means to load tracks into them
pub struct Rig {
    decks: Vec<Deck>,
    importer: Option<Importer>,
    next_ticket: u64,
}

impl Rig {
    /// Allocate `ndeck` decks for the lifetime of the process
    pub fn new(ndeck: usize) -> Result<Self, ConfigError> {
        if ndeck == 0 || ndeck > MAX_DECKS {
            return Err(ConfigError::InvalidDeckCount(ndeck));
        }

        Ok(Self {
            decks: (0..ndeck).map(Deck::new).collect(),
            importer: None,
            next_ticket: 0,
        })
    }

    /// Wrap the rig in its gate
    pub fn into_shared(self) -> SharedRig {
        Arc::new(Mutex::new(self))
    }

    /// Attach the import worker used by [`Rig::load`]
    pub fn set_importer(&mut self, importer: Importer) {
        self.importer = Some(importer);
    }

    pub fn len(&self) -> usize {
        self.decks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decks.is_empty()
    }

    pub fn decks(&self) -> &[Deck] {
        &self.decks
    }

    pub fn deck(&self, index: usize) -> Option<&Deck> {
        self.decks.get(index)
    }

    pub fn deck_mut(&mut self, index: usize) -> Option<&mut Deck> {
        self.decks.get_mut(index)
    }

    /// Begin an asynchronous import of `record` into deck `index`
    ///
    /// The deck shows an importing placeholder straight away. Returns
    /// false if the deck does not exist.
    pub fn load(&mut self, index: usize, record: Arc<Record>) -> bool {
        if index >= self.decks.len() {
            return false;
        }

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let pathname = record.pathname.clone();
        self.decks[index].begin_load(record, ticket);

        match &self.importer {
            Some(importer) => {
                let job = ImportJob {
                    deck: index,
                    ticket,
                    pathname,
                };
                if let Err(e) = importer.submit(job) {
                    tracing::warn!("Deck {}: cannot queue import: {}", index + 1, e);
                    self.decks[index].complete_load(ticket, Track::empty());
                }
            }
            None => tracing::debug!("Deck {}: no importer attached", index + 1),
        }

        true
    }

    /// Deliver partial audio for an import still running
    pub fn import_progress(&mut self, index: usize, ticket: u64, partial: Track) -> bool {
        self.decks
            .get_mut(index)
            .map(|deck| deck.update_load(ticket, partial))
            .unwrap_or(false)
    }

    /// Deliver a finished import; stale tickets are discarded
    pub fn complete_import(&mut self, index: usize, ticket: u64, track: Track) -> bool {
        self.decks
            .get_mut(index)
            .map(|deck| deck.complete_load(ticket, track))
            .unwrap_or(false)
    }

    /// Copy deck `source` into deck `target`
    ///
    /// Returns false if either index is out of range.
    pub fn clone_deck(&mut self, target: usize, source: usize) -> bool {
        if target >= self.decks.len() || source >= self.decks.len() {
            return false;
        }
        if target != source {
            let from = self.decks[source].clone();
            self.decks[target].clone_from_deck(&from);
        }
        true
    }

    /// Advance every deck's timeline by `dt` seconds
    ///
    /// This is where an audio engine reports progress; the binary also
    /// uses it to keep the playheads moving without one.
    pub fn advance(&mut self, dt: f64) {
        for deck in &mut self.decks {
            deck.player.advance(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{ImportWorker, NullDecoder};
    use crate::status::Status;

    #[test]
    fn test_deck_count_validated() {
        assert!(Rig::new(0).is_err());
        assert!(Rig::new(MAX_DECKS + 1).is_err());
        assert_eq!(Rig::new(2).unwrap().len(), 2);
    }

    #[test]
    fn test_load_without_importer_shows_placeholder() {
        let mut rig = Rig::new(2).unwrap();
        assert!(rig.load(1, Arc::new(Record::from_path("x.wav"))));
        assert!(rig.deck(1).unwrap().track().is_importing());
        assert!(!rig.load(2, Arc::new(Record::from_path("x.wav"))));
    }

    #[test]
    fn test_complete_import_uses_ticket() {
        let mut rig = Rig::new(1).unwrap();
        rig.load(0, Arc::new(Record::from_path("x.wav")));
        let ticket = rig.deck(0).unwrap().track().ticket();

        assert!(!rig.complete_import(0, ticket + 1, Track::empty()));
        assert!(rig.complete_import(0, ticket, Track::from_pcm(48000, &[0.0; 10])));
        assert_eq!(rig.deck(0).unwrap().track().length(), 10);
    }

    #[test]
    fn test_import_progress_keeps_placeholder_state() {
        let mut rig = Rig::new(1).unwrap();
        rig.load(0, Arc::new(Record::from_path("x.wav")));
        let ticket = rig.deck(0).unwrap().track().ticket();

        assert!(!rig.import_progress(0, ticket + 1, Track::from_pcm(48000, &[0.0; 4])));
        assert!(rig.import_progress(0, ticket, Track::from_pcm(48000, &[0.0; 4])));

        let track = rig.deck(0).unwrap().track();
        assert!(track.is_importing());
        assert_eq!(track.ticket(), ticket);
        assert_eq!(track.length(), 4);

        // Growing partials keep replacing each other until completion
        assert!(rig.import_progress(0, ticket, Track::from_pcm(48000, &[0.0; 8])));
        assert!(rig.complete_import(0, ticket, Track::from_pcm(48000, &[0.0; 12])));
        assert!(!rig.import_progress(0, ticket, Track::from_pcm(48000, &[0.0; 4])));
        assert_eq!(rig.deck(0).unwrap().track().length(), 12);
    }

    #[test]
    fn test_refused_import_clears_placeholder() {
        let shared = Rig::new(1).unwrap().into_shared();
        let status = Arc::new(Status::new("test"));
        let (mut worker, importer) =
            ImportWorker::start(shared.clone(), status, NullDecoder).unwrap();
        worker.stop();

        let mut rig = shared.lock();
        rig.set_importer(importer);
        assert!(rig.load(0, Arc::new(Record::from_path("x.wav"))));

        let track = rig.deck(0).unwrap().track();
        assert!(!track.is_importing());
        assert_eq!(track.length(), 0);
        assert!(rig.deck(0).unwrap().record().is_some());
    }

    #[test]
    fn test_clone_deck_bounds() {
        let mut rig = Rig::new(2).unwrap();
        rig.deck_mut(0).unwrap().seek_to(7.0);

        assert!(rig.clone_deck(1, 0));
        assert_eq!(rig.deck(1).unwrap().elapsed(), 7.0);
        assert!(!rig.clone_deck(1, 2));
        assert!(rig.clone_deck(0, 0));
    }
}
