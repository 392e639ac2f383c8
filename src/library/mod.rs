//! Record library and selection
//!
//! The library index itself is built elsewhere; this module holds the
//! result (crates of records) and the cursor state the keyboard moves
//! around in it.

pub mod selector;

pub use selector::{Scroll, Selector, SortOrder};

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::error::ConfigError;

/// A single entry in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub pathname: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bpm: Option<f64>,
}

impl Record {
    /// A record known only by its pathname, as loaded over the network
    pub fn from_path(pathname: impl Into<String>) -> Self {
        let pathname = pathname.into();
        let title = Path::new(&pathname)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            pathname,
            artist: String::new(),
            title,
            bpm: None,
        }
    }

    /// True if every whitespace-separated word of `query` appears in
    /// the artist, title or pathname, ignoring case
    pub fn matches(&self, query: &str) -> bool {
        let artist = self.artist.to_lowercase();
        let title = self.title.to_lowercase();
        let pathname = self.pathname.to_lowercase();

        query.split_whitespace().all(|word| {
            let word = word.to_lowercase();
            artist.contains(&word) || title.contains(&word) || pathname.contains(&word)
        })
    }
}

/// A named list of records
#[derive(Debug, Clone)]
pub struct Crate {
    pub name: String,
    /// Fixed crates are generated rather than user-defined
    pub is_fixed: bool,
    pub records: Vec<Arc<Record>>,
}

/// All crates; the first is always the fixed "All records" crate
#[derive(Debug, Clone)]
pub struct Library {
    crates: Vec<Crate>,
}

#[derive(Deserialize)]
struct LibraryFile {
    #[serde(default)]
    crates: Vec<CrateFile>,
}

#[derive(Deserialize)]
struct CrateFile {
    name: String,
    records: Vec<Record>,
}

impl Library {
    /// Name of the crate holding every record
    pub const ALL: &'static str = "All records";

    pub fn new() -> Self {
        Self::from_records(Vec::new())
    }

    /// A library with only the "All records" crate
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            crates: vec![Crate {
                name: Self::ALL.to_string(),
                is_fixed: true,
                records: records.into_iter().map(Arc::new).collect(),
            }],
        }
    }

    /// Add a user crate; its records also join "All records"
    pub fn add_crate(&mut self, name: impl Into<String>, records: Vec<Record>) {
        let records: Vec<Arc<Record>> = records.into_iter().map(Arc::new).collect();
        self.crates[0].records.extend(records.iter().cloned());
        self.crates.push(Crate {
            name: name.into(),
            is_fixed: false,
            records,
        });
    }

    /// Read a JSON listing of the form `{"crates": [{"name", "records"}]}`
    pub fn load_json(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let file: LibraryFile = serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let mut library = Self::new();
        for c in file.crates {
            library.add_crate(c.name, c.records);
        }

        tracing::info!(
            "Library loaded: {} crates, {} records",
            library.crates.len(),
            library.crates[0].records.len()
        );

        Ok(library)
    }

    pub fn crates(&self) -> &[Crate] {
        &self.crates
    }

    pub fn crate_at(&self, index: usize) -> Option<&Crate> {
        self.crates.get(index)
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_path() {
        let r = Record::from_path("/music/Artist - Song.flac");
        assert_eq!(r.title, "Artist - Song");
        assert!(r.matches("song ARTIST"));
        assert!(!r.matches("song missing"));
    }

    #[test]
    fn test_add_crate_feeds_all_records() {
        let mut lib = Library::from_records(vec![Record::from_path("a.mp3")]);
        lib.add_crate("techno", vec![Record::from_path("b.mp3")]);

        assert_eq!(lib.crates().len(), 2);
        assert_eq!(lib.crates()[0].records.len(), 2);
        assert!(lib.crates()[0].is_fixed);
        assert!(!lib.crates()[1].is_fixed);
    }

    #[test]
    fn test_load_json() {
        let dir = std::env::temp_dir().join(format!("deckscope-lib-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("library.json");
        std::fs::write(
            &path,
            r#"{"crates": [{"name": "house", "records": [
                {"pathname": "/a.wav", "artist": "A", "title": "One", "bpm": 124.0}
            ]}]}"#,
        )
        .unwrap();

        let lib = Library::load_json(&path).unwrap();
        assert_eq!(lib.crates()[1].name, "house");
        assert_eq!(lib.crates()[1].records[0].bpm, Some(124.0));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
