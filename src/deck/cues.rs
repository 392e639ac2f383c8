//! Numbered cue points

use crate::constants::MAX_CUES;

/// Fixed table of cue positions in seconds, indexed by label
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cues {
    slots: [Option<f64>; MAX_CUES],
}

impl Cues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored position for `label`; `None` if unset or out of range
    pub fn get(&self, label: usize) -> Option<f64> {
        self.slots.get(label).copied().flatten()
    }

    /// Store a position; out-of-range labels are ignored
    pub fn set(&mut self, label: usize, seconds: f64) {
        if let Some(slot) = self.slots.get_mut(label) {
            *slot = Some(seconds);
        }
    }

    pub fn unset(&mut self, label: usize) {
        if let Some(slot) = self.slots.get_mut(label) {
            *slot = None;
        }
    }

    /// Number of labels that hold a position
    pub fn count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_unset() {
        let mut cues = Cues::new();
        cues.set(3, 12.5);
        assert_eq!(cues.get(3), Some(12.5));
        assert_eq!(cues.count(), 1);

        cues.unset(3);
        assert_eq!(cues.get(3), None);
    }

    #[test]
    fn test_out_of_range_ignored() {
        let mut cues = Cues::new();
        cues.set(MAX_CUES, 1.0);
        assert_eq!(cues.get(MAX_CUES), None);
        assert_eq!(cues.count(), 0);
    }
}
