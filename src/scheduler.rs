//! Redraw scheduling: which regions exist and which need painting
//!
//! The window is divided afresh on every iteration of the render loop.
//! A region that does not meet its minimum size is dropped for that
//! iteration and its dirty flag is cleared without painting, so a
//! later enlargement repaints everything via the resize path instead.

use crate::constants::{
    BORDER, LIBRARY_MIN_HEIGHT, LIBRARY_MIN_WIDTH, PLAYER_HEIGHT, SPACER, STATUS_HEIGHT,
    STATUS_MIN_REMAINDER,
};
use crate::layout::{from_bottom, from_top, shrink, split, Rect};

/// Independently repainted areas of the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Decks,
    Status,
    Library,
}

impl Region {
    /// Fixed order in which dirty regions are painted and published
    pub const PAINT_ORDER: [Region; 3] = [Region::Library, Region::Status, Region::Decks];
}

/// One dirty flag per region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedrawState {
    decks: bool,
    status: bool,
    library: bool,
}

impl RedrawState {
    /// Everything dirty, forcing a full first paint
    pub fn new() -> Self {
        Self {
            decks: true,
            status: true,
            library: true,
        }
    }

    fn flag(&mut self, region: Region) -> &mut bool {
        match region {
            Region::Decks => &mut self.decks,
            Region::Status => &mut self.status,
            Region::Library => &mut self.library,
        }
    }

    pub fn mark(&mut self, region: Region) {
        *self.flag(region) = true;
    }

    pub fn invalidate_all(&mut self) {
        *self = Self::new();
    }

    pub fn is_dirty(&self, region: Region) -> bool {
        match region {
            Region::Decks => self.decks,
            Region::Status => self.status,
            Region::Library => self.library,
        }
    }

    /// Clear a flag once its region has been painted
    pub fn clear(&mut self, region: Region) {
        *self.flag(region) = false;
    }

    /// Drop pending paints for regions the layout could not fit
    pub fn apply_layout(&mut self, regions: &Regions) {
        for region in Region::PAINT_ORDER {
            if regions.rect(region).is_none() {
                self.clear(region);
            }
        }
    }

    pub fn any(&self) -> bool {
        self.decks || self.status || self.library
    }
}

impl Default for RedrawState {
    fn default() -> Self {
        Self::new()
    }
}

/// Usable area of a window of the given size
pub fn workspace(width: i32, height: i32) -> Rect {
    shrink(Rect::new(0, 0, width, height), BORDER)
}

/// The window divided into regions for one iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regions {
    decks: Option<Rect>,
    status: Option<Rect>,
    library: Option<Rect>,
}

impl Regions {
    /// Status line along the bottom, decks along the top and the
    /// library in between
    ///
    /// The status line is dropped if it would leave less than
    /// `STATUS_MIN_REMAINDER` pixels of height; the library if it would
    /// be smaller than its minimum; the decks only if the remaining
    /// space went negative.
    pub fn compute(workspace: Rect) -> Self {
        let (rest, status) = split(workspace, from_bottom(STATUS_HEIGHT, SPACER));
        let (rest, status) = if rest.h < STATUS_MIN_REMAINDER || rest.w < 0 {
            (workspace, None)
        } else {
            (rest, Some(status))
        };

        let (decks, library) = split(rest, from_top(PLAYER_HEIGHT, SPACER));
        let (decks, library) = if library.h < LIBRARY_MIN_HEIGHT || library.w < LIBRARY_MIN_WIDTH {
            (rest, None)
        } else {
            (decks, Some(library))
        };

        let decks = if decks.is_degenerate() { None } else { Some(decks) };

        Self {
            decks,
            status: status.filter(|r| !r.is_degenerate()),
            library,
        }
    }

    /// Rectangle for `region`, or `None` if it is skipped
    pub fn rect(&self, region: Region) -> Option<Rect> {
        match region {
            Region::Decks => self.decks,
            Region::Status => self.status,
            Region::Library => self.library,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_fully_dirty() {
        let state = RedrawState::new();
        for region in Region::PAINT_ORDER {
            assert!(state.is_dirty(region));
        }
    }

    #[test]
    fn test_default_window_has_all_regions() {
        let regions = Regions::compute(workspace(800, 600));

        assert_eq!(regions.rect(Region::Decks), Some(Rect::new(1, 1, 798, PLAYER_HEIGHT)));
        assert_eq!(regions.rect(Region::Status), Some(Rect::new(1, 587, 798, STATUS_HEIGHT)));

        let library = regions.rect(Region::Library).unwrap();
        assert_eq!(library.y, 1 + PLAYER_HEIGHT + SPACER);
        assert_eq!(library.bottom(), 587 - SPACER);
    }

    #[test]
    fn test_short_window_drops_status_and_library() {
        let ws = workspace(960, 130);
        let regions = Regions::compute(ws);

        assert_eq!(regions.rect(Region::Status), None);
        assert_eq!(regions.rect(Region::Library), None);
        assert_eq!(regions.rect(Region::Decks), Some(ws));

        let mut state = RedrawState::new();
        state.apply_layout(&regions);
        assert!(!state.is_dirty(Region::Status));
        assert!(!state.is_dirty(Region::Library));
        assert!(state.is_dirty(Region::Decks));
    }

    #[test]
    fn test_degenerate_window_drops_everything() {
        let regions = Regions::compute(workspace(1, 1));

        for region in Region::PAINT_ORDER {
            assert_eq!(regions.rect(region), None);
        }
    }

    #[test]
    fn test_mark_and_clear() {
        let mut state = RedrawState::new();
        for region in Region::PAINT_ORDER {
            state.clear(region);
        }
        assert!(!state.any());

        state.mark(Region::Status);
        assert!(state.is_dirty(Region::Status));
        assert!(!state.is_dirty(Region::Decks));

        state.invalidate_all();
        assert!(state.is_dirty(Region::Library));
    }
}
