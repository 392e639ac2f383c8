//! # deckscope
//!
//! Multi-deck DJ interface: waveform meters, keyboard control and
//! network remote control, all acting on one shared deck rig.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │                                 OWNER                                    │
//! │   config ──► Rig::new ──► ImportWorker ──► RemoteServer ──► Interface   │
//! │                     (waits for quit, then stops and joins everything)    │
//! └──────────────────────────────────────────────────────────────────────────┘
//!
//!  ┌────────────┐   Tick    ┌───────────────────────────────────────────┐
//!  │  Ticker    │──────────►│                                           │
//!  └────────────┘           │          EventQueue (crossbeam)           │
//!  ┌────────────┐  Status   │   at most one pending Tick / Status       │
//!  │  Status    │──────────►│                                           │
//!  └────────────┘           └─────────────────────┬─────────────────────┘
//!  window: Key, Resize, Quit ────────────────────►│
//!                                                 ▼
//!  ┌──────────────────────────────────────────────────────────────────────┐
//!  │                   Interface thread (interface)                      │
//!  │  wait ──► lock gate ──► handle ──► Regions::compute ──► paint dirty │
//!  │           (InputRouter)              (scheduler)     (render::*)    │
//!  │                                                   publish per region│
//!  └──────────────────────────────┬───────────────────────────────────────┘
//!                                 │
//!                                 ▼
//!               ┌──────────────────────────────────┐
//!               │   Gate: Mutex<Rig>               │
//!               │   Deck 1 │ Deck 2 │ Deck 3       │
//!               │   Player, Track, Cues, Timecoder │
//!               └──────────────────────────────────┘
//!                    ▲                        ▲
//!                    │ dispatch               │ complete_import
//!  ┌─────────────────┴──────────┐   ┌─────────┴──────────────┐
//!  │ RemoteServer thread (UDP)  │   │ ImportWorker thread    │
//!  │ /deckN/... → Namespace     │   │ Decoder → Track        │
//!  └────────────────────────────┘   └────────────────────────┘
//! ```

pub mod config;
pub mod deck;
pub mod error;
pub mod events;
pub mod import;
pub mod input;
pub mod interface;
pub mod layout;
pub mod library;
pub mod remote;
pub mod render;
pub mod rig;
pub mod scheduler;
pub mod status;

pub use error::{Error, Result};

/// Application-wide constants
pub mod constants {
    /// Decks supported; twelve function keys make three groups of four
    pub const MAX_DECKS: usize = 3;

    /// Cue points per deck
    pub const MAX_CUES: usize = 16;

    /// Sample rate assumed for placeholder tracks
    pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

    /// Largest closeup zoom (2^11 samples per pixel)
    pub const MAX_METER_SCALE: u32 = 11;

    pub const DEFAULT_METER_SCALE: u32 = 8;

    /// Seconds from the end at which meters and clocks show a warning
    pub const METER_WARNING_TIME: i64 = 20;

    /// Refresh tick interval in milliseconds
    pub const REFRESH_MS: u64 = 10;

    /// Window size when no geometry is given
    pub const DEFAULT_WIDTH: i32 = 960;
    pub const DEFAULT_HEIGHT: i32 = 720;

    // Layout, in pixels

    pub const BORDER: i32 = 1;
    pub const SPACER: i32 = 8;
    pub const HALF_SPACER: i32 = 4;
    pub const CURSOR_WIDTH: i32 = 4;

    pub const PLAYER_HEIGHT: i32 = 213;
    pub const LIBRARY_MIN_WIDTH: i32 = 64;
    pub const LIBRARY_MIN_HEIGHT: i32 = 64;

    pub const SEARCH_HEIGHT: i32 = 15;
    pub const STATUS_HEIGHT: i32 = 12;
    /// Height the rest of the window must keep for the status line to show
    pub const STATUS_MIN_REMAINDER: i32 = 128;

    pub const BPM_WIDTH: i32 = 32;
    pub const SORT_WIDTH: i32 = 21;
    pub const RESULTS_ARTIST_WIDTH: i32 = 200;
    pub const TOKEN_SPACE: i32 = 2;
    pub const SCROLLBAR_SIZE: i32 = 10;
}
