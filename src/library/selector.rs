//! Cursor over the library: search filter, crate choice and record
//! selection
//!
//! Owned by the render thread. Nothing here is shared with the remote
//! control thread, so it lives outside the rig gate.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{Library, Record};

/// How the record listing is ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Artist,
    Bpm,
    /// Order of the crate itself
    Playlist,
}

impl SortOrder {
    pub fn next(self) -> Self {
        match self {
            SortOrder::Artist => SortOrder::Bpm,
            SortOrder::Bpm => SortOrder::Playlist,
            SortOrder::Playlist => SortOrder::Artist,
        }
    }

    /// Short token drawn next to the selected crate
    pub fn token(self) -> &'static str {
        match self {
            SortOrder::Artist => "ART",
            SortOrder::Bpm => "BPM",
            SortOrder::Playlist => "PLS",
        }
    }
}

/// A scrolling view onto a list of `entries` items, `lines` of which
/// are visible at once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scroll {
    pub entries: usize,
    pub lines: usize,
    pub offset: usize,
    pub selected: Option<usize>,
}

impl Scroll {
    pub fn set_entries(&mut self, entries: usize) {
        self.entries = entries;
        self.selected = match self.selected {
            _ if entries == 0 => None,
            Some(s) => Some(s.min(entries - 1)),
            None => Some(0),
        };
        self.fit();
    }

    pub fn set_lines(&mut self, lines: usize) {
        self.lines = lines;
        self.fit();
    }

    pub fn select(&mut self, index: usize) {
        if self.entries > 0 {
            self.selected = Some(index.min(self.entries - 1));
            self.fit();
        }
    }

    pub fn up(&mut self, n: usize) {
        if let Some(s) = self.selected {
            self.select(s.saturating_sub(n));
        }
    }

    pub fn down(&mut self, n: usize) {
        if let Some(s) = self.selected {
            self.select(s.saturating_add(n));
        }
    }

    pub fn top(&mut self) {
        self.select(0);
    }

    pub fn bottom(&mut self) {
        self.select(self.entries.saturating_sub(1));
    }

    /// Move the offset so the selection is on screen
    fn fit(&mut self) {
        let Some(selected) = self.selected else {
            self.offset = 0;
            return;
        };

        if selected < self.offset {
            self.offset = selected;
        } else if self.lines > 0 && selected >= self.offset + self.lines {
            self.offset = selected + 1 - self.lines;
        }

        let max_offset = self.entries.saturating_sub(self.lines.max(1));
        self.offset = self.offset.min(max_offset);
    }
}

/// Search and selection state over a [`Library`]
pub struct Selector {
    library: Library,
    crates: Scroll,
    records: Scroll,
    search: String,
    sort: SortOrder,
    /// Crate to return to when toggling back from "All records"
    toggle_back: Option<usize>,
    view: Vec<Arc<Record>>,
}

impl Selector {
    pub fn new(library: Library) -> Self {
        let mut selector = Self {
            library,
            crates: Scroll::default(),
            records: Scroll::default(),
            search: String::new(),
            sort: SortOrder::Artist,
            toggle_back: None,
            view: Vec::new(),
        };
        selector.crates.set_entries(selector.library.crates().len());
        selector.rebuild();
        selector
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn crates(&self) -> &Scroll {
        &self.crates
    }

    pub fn records(&self) -> &Scroll {
        &self.records
    }

    /// Records of the current crate that match the search, in order
    pub fn view_listing(&self) -> &[Arc<Record>] {
        &self.view
    }

    /// The highlighted record, if any
    pub fn current(&self) -> Option<Arc<Record>> {
        self.records
            .selected
            .and_then(|i| self.view.get(i))
            .cloned()
    }

    /// Number of listing lines that fit on screen
    pub fn set_lines(&mut self, lines: usize) {
        self.crates.set_lines(lines);
        self.records.set_lines(lines);
    }

    pub fn search_refine(&mut self, c: char) {
        self.search.push(c);
        self.rebuild();
    }

    pub fn search_expand(&mut self) {
        if self.search.pop().is_some() {
            self.rebuild();
        }
    }

    pub fn up(&mut self) {
        self.records.up(1);
    }

    pub fn down(&mut self) {
        self.records.down(1);
    }

    pub fn page_up(&mut self) {
        self.records.up(self.records.lines.max(1));
    }

    pub fn page_down(&mut self) {
        self.records.down(self.records.lines.max(1));
    }

    pub fn top(&mut self) {
        self.records.top();
    }

    pub fn bottom(&mut self) {
        self.records.bottom();
    }

    /// Previous crate
    pub fn prev(&mut self) {
        self.crates.up(1);
        self.toggle_back = None;
        self.rebuild();
    }

    /// Next crate
    pub fn next(&mut self) {
        self.crates.down(1);
        self.toggle_back = None;
        self.rebuild();
    }

    /// Jump between the current crate and "All records"
    pub fn toggle(&mut self) {
        let current = self.crates.selected.unwrap_or(0);

        match self.toggle_back.take() {
            Some(back) if current == 0 => self.crates.select(back),
            _ if current != 0 => {
                self.toggle_back = Some(current);
                self.crates.select(0);
            }
            _ => return,
        }
        self.rebuild();
    }

    pub fn toggle_order(&mut self) {
        self.sort = self.sort.next();
        self.rebuild();
    }

    /// Recompute the listing, keeping the highlighted record if it is
    /// still present
    fn rebuild(&mut self) {
        let previous = self.current();
        let crate_index = self.crates.selected.unwrap_or(0);

        let mut view: Vec<Arc<Record>> = self
            .library
            .crate_at(crate_index)
            .map(|c| {
                c.records
                    .iter()
                    .filter(|r| r.matches(&self.search))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        match self.sort {
            SortOrder::Artist => view.sort_by_cached_key(|r| {
                (r.artist.to_lowercase(), r.title.to_lowercase())
            }),
            SortOrder::Bpm => view.sort_by(|a, b| compare_bpm(a.bpm, b.bpm)),
            SortOrder::Playlist => {}
        }

        let keep = previous.and_then(|p| view.iter().position(|r| Arc::ptr_eq(r, &p)));

        self.view = view;
        self.records.set_entries(self.view.len());
        self.records.select(keep.unwrap_or(0));
    }
}

fn compare_bpm(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(artist: &str, title: &str, bpm: Option<f64>) -> Record {
        Record {
            pathname: format!("/music/{} - {}.flac", artist, title),
            artist: artist.into(),
            title: title.into(),
            bpm,
        }
    }

    fn library() -> Library {
        let mut lib = Library::new();
        lib.add_crate(
            "set",
            vec![
                record("Zed", "Last", Some(140.0)),
                record("Abba", "First", Some(120.0)),
                record("Moby", "Middle", None),
            ],
        );
        lib
    }

    #[test]
    fn test_search_refine_and_expand() {
        let mut sel = Selector::new(library());
        assert_eq!(sel.view_listing().len(), 3);

        for c in "mob".chars() {
            sel.search_refine(c);
        }
        assert_eq!(sel.view_listing().len(), 1);
        assert_eq!(sel.current().unwrap().artist, "Moby");

        sel.search_refine('x');
        assert!(sel.current().is_none());

        sel.search_expand();
        assert_eq!(sel.view_listing().len(), 1);
    }

    #[test]
    fn test_sort_orders() {
        let mut sel = Selector::new(library());
        assert_eq!(sel.view_listing()[0].artist, "Abba");

        sel.toggle_order();
        assert_eq!(sel.sort(), SortOrder::Bpm);
        assert_eq!(sel.view_listing()[0].bpm, Some(120.0));
        assert_eq!(sel.view_listing()[2].bpm, None);

        sel.toggle_order();
        assert_eq!(sel.view_listing()[0].artist, "Zed");
    }

    #[test]
    fn test_cursor_movement_and_scroll() {
        let mut sel = Selector::new(library());
        sel.set_lines(2);

        sel.bottom();
        assert_eq!(sel.records().selected, Some(2));
        assert_eq!(sel.records().offset, 1);

        sel.page_up();
        assert_eq!(sel.records().selected, Some(0));
        assert_eq!(sel.records().offset, 0);

        sel.up();
        assert_eq!(sel.records().selected, Some(0));
    }

    #[test]
    fn test_toggle_between_crates() {
        let mut sel = Selector::new(library());
        sel.next();
        assert_eq!(sel.crates().selected, Some(1));

        sel.toggle();
        assert_eq!(sel.crates().selected, Some(0));

        sel.toggle();
        assert_eq!(sel.crates().selected, Some(1));
    }

    #[test]
    fn test_empty_library_has_no_selection() {
        let sel = Selector::new(Library::new());
        assert!(sel.current().is_none());
        assert_eq!(sel.records().selected, None);
    }
}
