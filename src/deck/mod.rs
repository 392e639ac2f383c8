//! Deck state: player, cue points and timecode selection
//!
//! Every method here assumes the caller holds the rig gate. None of
//! them block or perform I/O.

pub mod cues;
pub mod player;
pub mod timecode;
pub mod track;

pub use cues::Cues;
pub use player::Player;
pub use timecode::Timecoder;
pub use track::Track;

use std::sync::Arc;

use crate::library::Record;

/// One independently controllable playback channel
#[derive(Debug, Clone)]
pub struct Deck {
    index: usize,
    pub player: Player,
    pub cues: Cues,
    pub timecoder: Timecoder,
    /// Cue label the transport buttons act on
    active_cue: usize,
    record: Option<Arc<Record>>,
}

impl Deck {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            player: Player::new(),
            cues: Cues::new(),
            timecoder: Timecoder::new(),
            active_cue: 0,
            record: None,
        }
    }

    /// Position of this deck in the rig, from zero
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn track(&self) -> &Arc<Track> {
        self.player.track()
    }

    pub fn record(&self) -> Option<&Arc<Record>> {
        self.record.as_ref()
    }

    pub fn elapsed(&self) -> f64 {
        self.player.elapsed()
    }

    pub fn position_samples(&self) -> i64 {
        self.player.position_samples()
    }

    pub fn seek_to(&mut self, seconds: f64) {
        self.player.seek_to(seconds);
    }

    /// Seek to a fraction of the track, clamped to `0.0..=1.0`
    pub fn seek_fraction(&mut self, fraction: f64) {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        let duration = self.track().duration();
        self.player.seek_to(fraction * duration);
    }

    pub fn set_pitch(&mut self, pitch: f64) {
        if pitch.is_finite() {
            self.player.pitch = pitch;
        }
    }

    /// Return the playhead to the start of the track
    pub fn recue(&mut self) {
        self.player.recue();
    }

    /// Start or stop playback
    ///
    /// Under timecode control this hands the deck back to the keyboard
    /// and plays at normal speed.
    pub fn play(&mut self) {
        if self.player.timecode_control() {
            self.player.set_timecode_control(false);
            self.player.pitch = 1.0;
        } else if self.player.pitch == 0.0 {
            self.player.pitch = 1.0;
        } else {
            self.player.pitch = 0.0;
        }
    }

    pub fn active_cue(&self) -> usize {
        self.active_cue
    }

    /// Point the active cue at `label` without moving the playhead
    pub fn cue(&mut self, label: usize) {
        if label < crate::constants::MAX_CUES {
            self.active_cue = label;
        }
    }

    /// Seek to a stored cue; returns false if the label is unset
    pub fn cue_go(&mut self, label: usize) -> bool {
        match self.cues.get(label) {
            Some(position) => {
                self.player.seek_to(position);
                true
            }
            None => false,
        }
    }

    /// Store a cue at `position`, or at the playhead if not given
    pub fn cue_set(&mut self, label: usize, position: Option<f64>) {
        let position = position.unwrap_or_else(|| self.player.elapsed());
        if position.is_finite() {
            self.cues.set(label, position);
        }
    }

    pub fn cue_unset(&mut self, label: usize) {
        self.cues.unset(label);
    }

    /// Tempo of the loaded track
    pub fn bpm(&self) -> Option<f64> {
        self.track().bpm()
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        self.player.track_mut().set_bpm(bpm);
    }

    /// Set the beat grid directly, in samples
    pub fn set_beat_grid(&mut self, interval: f64, offset: f64) {
        let track = self.player.track_mut();
        track.beat_interval = Some(interval);
        track.beat_offset = offset;
    }

    /// Show `record` as loading, with an empty importing track in place
    pub fn begin_load(&mut self, record: Arc<Record>, ticket: u64) {
        self.record = Some(record);
        self.player.set_track(Arc::new(Track::importing(ticket)));
        self.player.pitch = 0.0;
    }

    fn awaiting(&self, ticket: u64) -> bool {
        let current = self.track();
        current.is_importing() && current.ticket() == ticket
    }

    /// Show the audio decoded so far, still marked as importing
    pub fn update_load(&mut self, ticket: u64, partial: Track) -> bool {
        if !self.awaiting(ticket) {
            return false;
        }
        self.player.replace_track(Arc::new(partial.continue_import(ticket)));
        true
    }

    /// Swap in a finished import if it is still the one being waited on
    ///
    /// Returns false if a newer load replaced the placeholder.
    pub fn complete_load(&mut self, ticket: u64, track: Track) -> bool {
        if !self.awaiting(ticket) {
            return false;
        }
        self.player.replace_track(Arc::new(track.finish_import(ticket)));
        true
    }

    /// Take over another deck's record, track, playhead, pitch and cues
    ///
    /// Timecode control and the timecode definition stay with this deck.
    pub fn clone_from_deck(&mut self, from: &Deck) {
        if self.index == from.index {
            return;
        }
        self.record = from.record.clone();
        self.player.clone_from_player(&from.player);
        self.cues = from.cues.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_CUES;

    fn loaded_deck() -> Deck {
        let mut deck = Deck::new(0);
        deck.player
            .set_track(Arc::new(Track::from_pcm(1000, &vec![0.5; 10_000])));
        deck
    }

    #[test]
    fn test_cue_set_then_go() {
        let mut deck = loaded_deck();
        deck.seek_to(3.25);
        deck.cue_set(0, None);

        deck.seek_to(9.0);
        assert!(deck.cue_go(0));
        assert_eq!(deck.elapsed(), 3.25);

        deck.cue_unset(0);
        deck.seek_to(1.0);
        assert!(!deck.cue_go(0));
        assert_eq!(deck.elapsed(), 1.0);
    }

    #[test]
    fn test_non_finite_values_ignored() {
        let mut deck = loaded_deck();
        deck.cue_set(1, Some(2.0));
        deck.cue_set(1, Some(f64::INFINITY));
        deck.cue_set(2, Some(f64::NAN));

        assert!(deck.cue_go(1));
        assert_eq!(deck.elapsed(), 2.0);
        assert!(!deck.cue_go(2));

        deck.set_pitch(1.0);
        deck.set_pitch(f64::NAN);
        assert_eq!(deck.player.pitch, 1.0);
    }

    #[test]
    fn test_cue_pointer_does_not_seek() {
        let mut deck = loaded_deck();
        deck.seek_to(2.0);
        deck.cue(5);
        assert_eq!(deck.active_cue(), 5);
        assert_eq!(deck.elapsed(), 2.0);

        deck.cue(MAX_CUES);
        assert_eq!(deck.active_cue(), 5);
    }

    #[test]
    fn test_play_toggles_and_releases_timecode() {
        let mut deck = loaded_deck();
        deck.play();
        assert_eq!(deck.player.pitch, 1.0);
        deck.play();
        assert_eq!(deck.player.pitch, 0.0);

        deck.player.set_timecode_control(true);
        deck.player.pitch = 0.97;
        deck.play();
        assert!(!deck.player.timecode_control());
        assert_eq!(deck.player.pitch, 1.0);
    }

    #[test]
    fn test_seek_fraction_clamps() {
        let mut deck = loaded_deck();
        deck.seek_fraction(0.5);
        assert!((deck.elapsed() - 5.0).abs() < 1e-9);

        deck.seek_fraction(3.0);
        assert!((deck.elapsed() - 10.0).abs() < 1e-9);

        deck.seek_fraction(-1.0);
        assert!(deck.elapsed().abs() < 1e-9);
    }

    #[test]
    fn test_stale_import_is_dropped() {
        let mut deck = Deck::new(1);
        deck.begin_load(Arc::new(Record::from_path("a.wav")), 1);
        deck.begin_load(Arc::new(Record::from_path("b.wav")), 2);

        assert!(!deck.complete_load(1, Track::from_pcm(44100, &[0.1; 64])));
        assert!(deck.track().is_importing());

        assert!(deck.complete_load(2, Track::from_pcm(44100, &[0.1; 64])));
        assert!(!deck.track().is_importing());
        assert_eq!(deck.track().length(), 64);
    }

    #[test]
    fn test_clone_copies_state_but_not_timecode() {
        let mut source = loaded_deck();
        source.seek_to(4.0);
        source.cue_set(2, Some(1.5));

        let mut target = Deck::new(1);
        target.player.set_timecode_control(true);
        target.clone_from_deck(&source);

        assert!((target.elapsed() - 4.0).abs() < 1e-9);
        assert_eq!(target.cues.get(2), Some(1.5));
        assert!(target.player.timecode_control());
        assert!(Arc::ptr_eq(target.track(), source.track()));
    }

    #[test]
    fn test_tempo_edit_does_not_leak_into_clone() {
        let mut a = loaded_deck();
        let mut b = Deck::new(1);
        b.clone_from_deck(&a);

        a.set_bpm(120.0);
        assert!(a.bpm().is_some());
        assert!(b.bpm().is_none());
    }
}
