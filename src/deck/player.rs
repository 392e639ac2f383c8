//! Playback state for one deck
//!
//! The audio engine advances `position` and reads `pitch`; the interface
//! reads the elapsed time and moves the offset to seek. All of it lives
//! behind the rig gate.

use std::sync::Arc;

use super::track::Track;

/// Playback head over a shared track
#[derive(Debug, Clone)]
pub struct Player {
    track: Arc<Track>,
    /// Timeline position in seconds, advanced by the engine
    position: f64,
    /// Timeline position that corresponds to the start of the track
    offset: f64,
    /// Playback speed multiplier; 0 is stopped, 1 is normal speed
    pub pitch: f64,
    timecode_control: bool,
}

impl Player {
    pub fn new() -> Self {
        Self {
            track: Arc::new(Track::empty()),
            position: 0.0,
            offset: 0.0,
            pitch: 0.0,
            timecode_control: false,
        }
    }

    pub fn track(&self) -> &Arc<Track> {
        &self.track
    }

    /// Mutable access to the track, copying it first if another deck
    /// shares it
    pub fn track_mut(&mut self) -> &mut Track {
        Arc::make_mut(&mut self.track)
    }

    /// Switch to a new track from the start
    ///
    /// The previous track is released when the last `Arc` to it is
    /// dropped, so an engine still holding it keeps it alive.
    pub fn set_track(&mut self, track: Arc<Track>) {
        self.track = track;
        self.offset = self.position;
    }

    /// Swap the track without moving the playhead
    pub(crate) fn replace_track(&mut self, track: Arc<Track>) {
        self.track = track;
    }

    /// Seconds since the start of the track
    pub fn elapsed(&self) -> f64 {
        self.position - self.offset
    }

    /// Playhead in samples of the current track
    ///
    /// Clamped to four times the track length (at least four seconds)
    /// either side of the start.
    pub fn position_samples(&self) -> i64 {
        let rate = self.track.rate() as u64;
        let limit = self.track.length().max(rate).saturating_mul(4).min(i64::MAX as u64) as f64;
        let samples = self.elapsed() * rate as f64;

        if samples.is_nan() {
            return 0;
        }
        samples.clamp(-limit, limit) as i64
    }

    /// Move the playhead to `seconds` into the track; non-finite
    /// positions are ignored
    pub fn seek_to(&mut self, seconds: f64) {
        if seconds.is_finite() {
            self.offset = self.position - seconds;
        }
    }

    /// Make the current timeline position the start of the track
    pub fn recue(&mut self) {
        self.offset = self.position;
    }

    /// Move the timeline forward by `dt` seconds at the current pitch
    pub fn advance(&mut self, dt: f64) {
        self.position += self.pitch * dt;
    }

    pub fn timecode_control(&self) -> bool {
        self.timecode_control
    }

    pub fn set_timecode_control(&mut self, on: bool) {
        self.timecode_control = on;
    }

    /// Flip timecode control and return the new state
    pub fn toggle_timecode_control(&mut self) -> bool {
        self.timecode_control = !self.timecode_control;
        self.timecode_control
    }

    /// Take over another player's track, playhead and pitch
    pub fn clone_from_player(&mut self, from: &Player) {
        self.track = from.track.clone();
        self.offset = self.position - from.elapsed();
        self.pitch = from.pitch;
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}
