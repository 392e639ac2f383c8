//! Track audio summaries and beat grid
//!
//! The playback engine owns the audio itself; what the interface needs
//! is two amplitude summaries of it. The overview holds one value per
//! [`OVERVIEW_BLOCK`] samples for the whole-track meter; the fine buffer
//! holds one value per [`FINE_BLOCK`] samples for the zoomed closeup.
//! Values are peak amplitudes scaled to `0..=255`.

use std::sync::Arc;

use crate::constants::DEFAULT_SAMPLE_RATE;

/// log2 of the number of samples summarised by one overview value
pub const OVERVIEW_SHIFT: u32 = 11;

/// Samples per overview value
pub const OVERVIEW_BLOCK: usize = 1 << OVERVIEW_SHIFT;

/// log2 of the number of samples summarised by one fine value
pub const FINE_SHIFT: u32 = 6;

/// Samples per fine value
pub const FINE_BLOCK: usize = 1 << FINE_SHIFT;

/// A loaded (or loading) track as seen by the interface
///
/// Cloning is cheap: the summary buffers are shared. This matters
/// because tempo edits go through `Arc::make_mut` on the deck's handle.
#[derive(Debug, Clone)]
pub struct Track {
    rate: u32,
    length: u64,
    overview: Arc<[u8]>,
    fine: Arc<[u8]>,
    importing: bool,
    /// Import ticket this track was created for; zero for tracks not
    /// produced by an import
    ticket: u64,
    /// Samples per beat, if known
    pub beat_interval: Option<f64>,
    /// Sample position of a beat, used to phase the grid
    pub beat_offset: f64,
}

impl Track {
    /// A track with no audio
    pub fn empty() -> Self {
        Self {
            rate: DEFAULT_SAMPLE_RATE,
            length: 0,
            overview: Arc::from(Vec::new()),
            fine: Arc::from(Vec::new()),
            importing: false,
            ticket: 0,
            beat_interval: None,
            beat_offset: 0.0,
        }
    }

    /// Placeholder shown while an import is running
    pub fn importing(ticket: u64) -> Self {
        Self {
            importing: true,
            ticket,
            ..Self::empty()
        }
    }

    /// Build from precomputed summaries
    pub fn from_summaries(rate: u32, length: u64, overview: Vec<u8>, fine: Vec<u8>) -> Self {
        Self {
            rate,
            length,
            overview: Arc::from(overview),
            fine: Arc::from(fine),
            ..Self::empty()
        }
    }

    /// Summarise mono PCM in the range -1.0..=1.0
    pub fn from_pcm(rate: u32, samples: &[f32]) -> Self {
        Self::from_summaries(
            rate,
            samples.len() as u64,
            summarise(samples, OVERVIEW_BLOCK),
            summarise(samples, FINE_BLOCK),
        )
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Length in samples
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Length in seconds
    pub fn duration(&self) -> f64 {
        if self.rate == 0 {
            0.0
        } else {
            self.length as f64 / self.rate as f64
        }
    }

    pub fn is_importing(&self) -> bool {
        self.importing
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Mark partial audio as still importing under the given ticket
    pub(crate) fn continue_import(mut self, ticket: u64) -> Self {
        self.importing = true;
        self.ticket = ticket;
        self
    }

    /// Mark the track as finished importing under the given ticket
    pub(crate) fn finish_import(mut self, ticket: u64) -> Self {
        self.importing = false;
        self.ticket = ticket;
        self
    }

    /// Overview amplitude at sample `sp`; zero outside the track
    pub fn overview(&self, sp: i64) -> u8 {
        lookup(&self.overview, self.length, sp, OVERVIEW_SHIFT)
    }

    /// Fine amplitude at sample `sp`; zero outside the track
    pub fn fine(&self, sp: i64) -> u8 {
        lookup(&self.fine, self.length, sp, FINE_SHIFT)
    }

    /// Tempo in beats per minute, if a beat interval is set
    pub fn bpm(&self) -> Option<f64> {
        self.beat_interval
            .filter(|i| *i > 0.0)
            .map(|i| self.rate as f64 * 60.0 / i)
    }

    /// Set the beat interval from a tempo; non-positive or non-finite
    /// tempos are ignored
    pub fn set_bpm(&mut self, bpm: f64) {
        if bpm.is_finite() && bpm > 0.0 {
            self.beat_interval = Some(self.rate as f64 * 60.0 / bpm);
        }
    }
}

impl Default for Track {
    fn default() -> Self {
        Self::empty()
    }
}

fn lookup(buffer: &[u8], length: u64, sp: i64, shift: u32) -> u8 {
    if sp < 0 || sp as u64 >= length {
        return 0;
    }
    buffer.get((sp >> shift) as usize).copied().unwrap_or(0)
}

fn summarise(samples: &[f32], block: usize) -> Vec<u8> {
    samples
        .chunks(block)
        .map(|chunk| {
            let peak = chunk.iter().fold(0.0f32, |m, s| m.max(s.abs()));
            (peak.min(1.0) * 255.0) as u8
        })
        .collect()
}
