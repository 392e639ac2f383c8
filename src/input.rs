//! Keyboard handling
//!
//! Letters, digits and navigation keys drive the library selector.
//! Function keys act on decks in groups of four: F1-F4 on the first
//! deck, F5-F8 on the second, F9-F12 on the third. Shift on a function
//! key clones a deck instead, taking the action slot as the source.

use std::sync::Arc;

use crate::constants::MAX_DECKS;
use crate::events::{Key, Modifiers};
use crate::library::Selector;
use crate::render::MeterScale;
use crate::rig::Rig;
use crate::status::{Status, StatusLevel};

/// What a function key does to its deck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckAction {
    /// Load the selected record
    Load,
    /// Return to the start of the track
    Recue,
    /// Toggle timecode control, or with ctrl cycle the definition
    Timecode,
    /// Measure the beat interval from two presses
    TempoTap,
}

impl DeckAction {
    /// Position within a group of four keys
    pub fn slot(self) -> usize {
        match self {
            DeckAction::Load => 0,
            DeckAction::Recue => 1,
            DeckAction::Timecode => 2,
            DeckAction::TempoTap => 3,
        }
    }
}

/// Function key number to `(deck, action)`
#[derive(Debug, Clone)]
pub struct FunctionKeyMap {
    entries: Vec<(usize, DeckAction)>,
}

impl FunctionKeyMap {
    /// F1 to F12 over up to three decks
    pub fn standard() -> Self {
        const ACTIONS: [DeckAction; 4] = [
            DeckAction::Load,
            DeckAction::Recue,
            DeckAction::Timecode,
            DeckAction::TempoTap,
        ];

        let entries = (0..MAX_DECKS)
            .flat_map(|deck| ACTIONS.iter().map(move |action| (deck, *action)))
            .collect();

        Self { entries }
    }

    /// Mapping for function key `n`, numbered from 1
    pub fn lookup(&self, n: u8) -> Option<(usize, DeckAction)> {
        let index = (n as usize).checked_sub(1)?;
        self.entries.get(index).copied()
    }
}

impl Default for FunctionKeyMap {
    fn default() -> Self {
        Self::standard()
    }
}

/// Which parts of the display a key affected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    /// Search, cursor or crate changed
    Selection,
    /// Deck state changed
    Deck,
    /// Closeup zoom changed
    Zoom,
}

/// Maps key presses onto selector, meter and deck actions
pub struct InputRouter {
    keys: FunctionKeyMap,
    /// First tap of a tempo measurement, in samples, per deck
    taps: Vec<Option<i64>>,
    status: Arc<Status>,
}

impl InputRouter {
    pub fn new(keys: FunctionKeyMap, status: Arc<Status>) -> Self {
        Self {
            keys,
            taps: vec![None; MAX_DECKS],
            status,
        }
    }

    /// Record a tap at sample position `position`
    ///
    /// The first tap of a pair is remembered; the second returns the
    /// beat `(interval, offset)` and forgets the pair.
    pub fn tap(&mut self, deck: usize, position: i64) -> Option<(i64, i64)> {
        let marker = self.taps.get_mut(deck)?;

        match marker.take() {
            None => {
                *marker = Some(position);
                None
            }
            Some(first) => {
                let interval = position.saturating_sub(first).saturating_abs();
                if interval == 0 {
                    return None;
                }
                Some((interval, position.rem_euclid(interval)))
            }
        }
    }

    /// True if a first tap is waiting on `deck`
    pub fn tap_pending(&self, deck: usize) -> bool {
        self.taps.get(deck).map(|t| t.is_some()).unwrap_or(false)
    }

    /// Handle one key press; the caller holds the rig gate
    pub fn handle_key(
        &mut self,
        key: Key,
        mods: Modifiers,
        selector: &mut Selector,
        scale: &mut MeterScale,
        rig: &mut Rig,
    ) -> KeyOutcome {
        match key {
            Key::Char(c) if c.is_ascii_alphanumeric() => {
                selector.search_refine(c.to_ascii_lowercase());
            }
            Key::Space => selector.search_refine(' '),
            Key::Period => selector.search_refine('.'),
            Key::Backspace => selector.search_expand(),
            Key::Home => selector.top(),
            Key::End => selector.bottom(),
            Key::Up => selector.up(),
            Key::Down => selector.down(),
            Key::PageUp => selector.page_up(),
            Key::PageDown => selector.page_down(),
            Key::Left => selector.prev(),
            Key::Right => selector.next(),
            Key::Tab if mods.ctrl => selector.toggle_order(),
            Key::Tab => selector.toggle(),

            Key::Plus | Key::Equals => {
                scale.zoom_in();
                tracing::debug!("Meter scale decreased to {}", scale.get());
                return KeyOutcome::Zoom;
            }
            Key::Minus => {
                scale.zoom_out();
                tracing::debug!("Meter scale increased to {}", scale.get());
                return KeyOutcome::Zoom;
            }

            Key::F(n) => return self.function_key(n, mods, selector, rig),

            _ => {
                tracing::debug!("Ignoring key {:?}", key);
                return KeyOutcome::Ignored;
            }
        }

        KeyOutcome::Selection
    }

    fn function_key(&mut self, n: u8, mods: Modifiers, selector: &Selector, rig: &mut Rig) -> KeyOutcome {
        let Some((d, action)) = self.keys.lookup(n) else {
            return KeyOutcome::Ignored;
        };
        if d >= rig.len() {
            return KeyOutcome::Ignored;
        }

        if mods.shift {
            let source = action.slot();
            if source < rig.len() && rig.clone_deck(d, source) {
                tracing::info!("Deck {}: cloned from deck {}", d + 1, source + 1);
                return KeyOutcome::Deck;
            }
            return KeyOutcome::Ignored;
        }

        match action {
            DeckAction::Load => match selector.current() {
                Some(record) => {
                    rig.load(d, record);
                }
                None => return KeyOutcome::Ignored,
            },

            DeckAction::Recue => {
                if let Some(deck) = rig.deck_mut(d) {
                    deck.recue();
                }
            }

            DeckAction::Timecode => {
                let Some(deck) = rig.deck_mut(d) else {
                    return KeyOutcome::Ignored;
                };
                if mods.ctrl {
                    let name = deck.timecoder.cycle_definition();
                    tracing::info!("Deck {}: timecode definition {}", d + 1, name);
                    self.status
                        .set(StatusLevel::Info, format!("Deck {}: timecode {}", d + 1, name));
                } else {
                    let on = deck.player.toggle_timecode_control();
                    tracing::debug!("Deck {}: timecode control {}", d + 1, on);
                }
            }

            DeckAction::TempoTap => {
                let position = match rig.deck(d) {
                    Some(deck) => deck.position_samples(),
                    None => return KeyOutcome::Ignored,
                };
                if let Some((interval, offset)) = self.tap(d, position) {
                    if let Some(deck) = rig.deck_mut(d) {
                        deck.set_beat_grid(interval as f64, offset as f64);
                        tracing::debug!("Deck {}: beat interval {} samples", d + 1, interval);
                    }
                }
            }
        }

        KeyOutcome::Deck
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_METER_SCALE;
    use crate::deck::Track;
    use crate::library::{Library, Record};

    fn router() -> InputRouter {
        InputRouter::new(FunctionKeyMap::standard(), Arc::new(Status::new("test")))
    }

    fn selector() -> Selector {
        Selector::new(Library::from_records(vec![
            Record::from_path("/music/one.flac"),
            Record::from_path("/music/two.flac"),
        ]))
    }

    fn rig() -> Rig {
        let mut rig = Rig::new(2).unwrap();
        for d in 0..2 {
            rig.deck_mut(d)
                .unwrap()
                .player
                .set_track(Arc::new(Track::from_pcm(1000, &vec![0.1; 100_000])));
        }
        rig
    }

    #[test]
    fn test_key_table() {
        let keys = FunctionKeyMap::standard();

        assert_eq!(keys.lookup(1), Some((0, DeckAction::Load)));
        assert_eq!(keys.lookup(4), Some((0, DeckAction::TempoTap)));
        assert_eq!(keys.lookup(6), Some((1, DeckAction::Recue)));
        assert_eq!(keys.lookup(11), Some((2, DeckAction::Timecode)));
        assert_eq!(keys.lookup(0), None);
        assert_eq!(keys.lookup(13), None);
    }

    #[test]
    fn test_tap_pairs() {
        let mut r = router();

        assert_eq!(r.tap(0, 1000), None);
        assert!(r.tap_pending(0));
        assert_eq!(r.tap(0, 1500), Some((500, 0)));
        assert!(!r.tap_pending(0));

        // Third tap starts a new pair
        assert_eq!(r.tap(0, 1700), None);
        assert_eq!(r.tap(0, 2000), Some((300, 200)));

        // Decks keep separate markers
        assert_eq!(r.tap(1, 10), None);
        assert!(!r.tap_pending(0));
    }

    #[test]
    fn test_tap_at_extreme_positions() {
        let mut r = router();

        assert_eq!(r.tap(0, i64::MIN), None);
        assert_eq!(r.tap(0, i64::MAX), Some((i64::MAX, 0)));

        assert_eq!(r.tap(0, i64::MAX), None);
        assert_eq!(r.tap(0, i64::MIN), Some((i64::MAX, i64::MAX - 1)));
    }

    #[test]
    fn test_tempo_tap_sets_grid() {
        let mut r = router();
        let mut sel = selector();
        let mut scale = MeterScale::default();
        let mut rig = rig();

        rig.deck_mut(0).unwrap().seek_to(1.0);
        r.handle_key(Key::F(4), Modifiers::NONE, &mut sel, &mut scale, &mut rig);
        rig.deck_mut(0).unwrap().seek_to(1.5);
        r.handle_key(Key::F(4), Modifiers::NONE, &mut sel, &mut scale, &mut rig);

        let track = rig.deck(0).unwrap().track();
        assert_eq!(track.beat_interval, Some(500.0));
        assert_eq!(track.beat_offset, 0.0);
        assert!((rig.deck(0).unwrap().bpm().unwrap() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_keys_clamp() {
        let mut r = router();
        let mut sel = selector();
        let mut rig = rig();
        let mut scale = MeterScale::new(1);

        for _ in 0..5 {
            r.handle_key(Key::Plus, Modifiers::NONE, &mut sel, &mut scale, &mut rig);
        }
        assert_eq!(scale.get(), 0);

        for _ in 0..20 {
            assert_eq!(
                r.handle_key(Key::Minus, Modifiers::NONE, &mut sel, &mut scale, &mut rig),
                KeyOutcome::Zoom
            );
        }
        assert_eq!(scale.get(), MAX_METER_SCALE);

        r.handle_key(Key::Equals, Modifiers::NONE, &mut sel, &mut scale, &mut rig);
        assert_eq!(scale.get(), MAX_METER_SCALE - 1);
    }

    #[test]
    fn test_load_needs_selection() {
        let mut r = router();
        let mut scale = MeterScale::default();
        let mut rig = rig();

        let mut sel = selector();
        let outcome = r.handle_key(Key::F(1), Modifiers::NONE, &mut sel, &mut scale, &mut rig);
        assert_eq!(outcome, KeyOutcome::Deck);
        assert!(rig.deck(0).unwrap().track().is_importing());

        let mut empty = Selector::new(Library::new());
        let outcome = r.handle_key(Key::F(5), Modifiers::NONE, &mut empty, &mut scale, &mut rig);
        assert_eq!(outcome, KeyOutcome::Ignored);
        assert!(!rig.deck(1).unwrap().track().is_importing());
    }

    #[test]
    fn test_shift_clones_from_slot() {
        let mut r = router();
        let mut sel = selector();
        let mut scale = MeterScale::default();
        let mut rig = rig();

        rig.deck_mut(0).unwrap().seek_to(12.0);

        // Shift+F5: deck 2, slot 0, so clone from deck 1
        let outcome = r.handle_key(Key::F(5), Modifiers::SHIFT, &mut sel, &mut scale, &mut rig);
        assert_eq!(outcome, KeyOutcome::Deck);
        assert!((rig.deck(1).unwrap().elapsed() - 12.0).abs() < 1e-9);

        // Shift+F7: slot 2 has no deck in a two-deck rig
        let outcome = r.handle_key(Key::F(7), Modifiers::SHIFT, &mut sel, &mut scale, &mut rig);
        assert_eq!(outcome, KeyOutcome::Ignored);
    }

    #[test]
    fn test_timecode_keys() {
        let mut r = router();
        let mut sel = selector();
        let mut scale = MeterScale::default();
        let mut rig = rig();

        r.handle_key(Key::F(3), Modifiers::NONE, &mut sel, &mut scale, &mut rig);
        assert!(rig.deck(0).unwrap().player.timecode_control());

        r.handle_key(Key::F(3), Modifiers::CTRL, &mut sel, &mut scale, &mut rig);
        assert_eq!(rig.deck(0).unwrap().timecoder.definition(), "serato_2b");
        assert!(rig.deck(0).unwrap().player.timecode_control());
    }

    #[test]
    fn test_keys_for_missing_decks_are_ignored() {
        let mut r = router();
        let mut sel = selector();
        let mut scale = MeterScale::default();
        let mut rig = rig();

        let outcome = r.handle_key(Key::F(9), Modifiers::NONE, &mut sel, &mut scale, &mut rig);
        assert_eq!(outcome, KeyOutcome::Ignored);

        let outcome = r.handle_key(Key::Other(0x1234), Modifiers::NONE, &mut sel, &mut scale, &mut rig);
        assert_eq!(outcome, KeyOutcome::Ignored);
    }

    #[test]
    fn test_search_keys() {
        let mut r = router();
        let mut sel = selector();
        let mut scale = MeterScale::default();
        let mut rig = rig();

        for key in [Key::Char('T'), Key::Char('w')] {
            let outcome = r.handle_key(key, Modifiers::NONE, &mut sel, &mut scale, &mut rig);
            assert_eq!(outcome, KeyOutcome::Selection);
        }
        assert_eq!(sel.search(), "tw");
        assert_eq!(sel.view_listing().len(), 1);

        r.handle_key(Key::Backspace, Modifiers::NONE, &mut sel, &mut scale, &mut rig);
        assert_eq!(sel.search(), "t");
    }
}
