//! Timecode signal selection
//!
//! Decoding the control record is the engine's job. The interface only
//! chooses which signal definition the decoder should expect.

/// Known timecode signal definitions, in cycling order
pub const DEFINITIONS: &[&str] = &[
    "serato_2a",
    "serato_2b",
    "serato_cd",
    "traktor_a",
    "traktor_b",
    "mixvibes_v2",
    "mixvibes_7inch",
];

/// Per-deck choice of timecode definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timecoder {
    definition: usize,
}

impl Timecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the current definition
    pub fn definition(&self) -> &'static str {
        DEFINITIONS[self.definition % DEFINITIONS.len()]
    }

    /// Move to the next definition, wrapping, and return its name
    pub fn cycle_definition(&mut self) -> &'static str {
        self.definition = (self.definition + 1) % DEFINITIONS.len();
        self.definition()
    }
}
