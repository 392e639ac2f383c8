//! The render loop
//!
//! One thread owns the display and everything it paints from. Each
//! iteration waits for an event with the rig gate released, then holds
//! the gate while it handles the event, divides the window into regions
//! and paints whichever regions are dirty. Every painted region is
//! published on its own as soon as it is finished.
//!
//! ```text
//!   wait (gate released) ──► handle ──► layout ──► paint dirty ──┐
//!        ▲                                          publish each │
//!        └───────────────────────────────────────────────────────┘
//! ```

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::MutexGuard;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::{DeckArrangement, InterfaceConfig};
use crate::error::InterfaceError;
use crate::events::{Event, EventQueue, Key, Modifiers, Ticker};
use crate::input::{FunctionKeyMap, InputRouter, KeyOutcome};
use crate::layout::Rect;
use crate::library::Selector;
use crate::render::panels::{draw_decks, draw_library, draw_status};
use crate::render::{Canvas, Display, MeterScale, Palette};
use crate::rig::{Rig, SharedRig};
use crate::scheduler::{workspace, Region, RedrawState, Regions};
use crate::status::{Status, StatusLevel};

/// Everything the render thread paints from, besides the rig
pub struct Interface<D: Display> {
    display: D,
    palette: Palette,
    scale: MeterScale,
    arrangement: DeckArrangement,
    selector: Selector,
    router: InputRouter,
    status: Arc<Status>,
    redraw: RedrawState,
    workspace: Rect,
    /// Whole window cleared since the last resize
    cleared: bool,
}

impl<D: Display> Interface<D> {
    pub fn new(mut display: D, status: Arc<Status>, selector: Selector, config: &InterfaceConfig) -> Self {
        let (w, h) = {
            let canvas = display.canvas();
            (canvas.width(), canvas.height())
        };

        Self {
            display,
            palette: Palette::default(),
            scale: MeterScale::new(config.meter_scale),
            arrangement: config.arrangement,
            selector,
            router: InputRouter::new(FunctionKeyMap::standard(), status.clone()),
            status,
            redraw: RedrawState::new(),
            workspace: workspace(w, h),
            cleared: false,
        }
    }

    /// Launch the render thread and its refresh timer
    ///
    /// Status changes are routed into `queue` from here on.
    pub fn start(
        self,
        rig: SharedRig,
        queue: Arc<EventQueue>,
        refresh: Duration,
    ) -> Result<InterfaceHandle<D>, InterfaceError> {
        let notify_queue = queue.clone();
        self.status.set_notifier(move || {
            notify_queue.push(Event::Status);
        });

        let (quit_tx, quit_rx) = bounded(1);
        let loop_queue = queue.clone();

        tracing::info!("Launching interface thread");

        let handle = thread::Builder::new()
            .name("interface".to_string())
            .spawn(move || {
                let result = self.run(rig, loop_queue, quit_tx);
                if let Err(e) = &result {
                    tracing::error!("Interface thread failed: {}", e);
                }
                result
            })
            .map_err(|e| InterfaceError::Spawn(e.to_string()))?;

        let ticker = match Ticker::start(queue.clone(), refresh) {
            Ok(ticker) => ticker,
            Err(e) => {
                queue.push(Event::Shutdown);
                let _ = handle.join();
                return Err(e);
            }
        };

        Ok(InterfaceHandle {
            queue,
            quit: quit_rx,
            ticker,
            thread_handle: Some(handle),
        })
    }

    fn run(
        mut self,
        rig: SharedRig,
        queue: Arc<EventQueue>,
        quit: Sender<()>,
    ) -> Result<D, InterfaceError> {
        let mut guard = rig.lock();
        self.paint(&mut guard);

        loop {
            let event = MutexGuard::unlocked(&mut guard, || queue.wait());

            if !self.handle(event, &mut guard, &quit)? {
                break;
            }

            self.paint(&mut guard);
        }

        drop(guard);
        tracing::info!("Interface thread finished");
        Ok(self.display)
    }

    /// Apply one event; false once the loop should finish
    fn handle(&mut self, event: Event, rig: &mut Rig, quit: &Sender<()>) -> Result<bool, InterfaceError> {
        match event {
            Event::Quit => {
                let _ = quit.try_send(());
            }

            Event::Resize { width, height } => {
                self.display.resize(width, height)?;
                self.workspace = workspace(width, height);
                self.redraw.invalidate_all();
                self.cleared = false;
                tracing::info!("New interface size is {}x{}", width, height);
            }

            Event::Tick => self.redraw.mark(Region::Decks),

            Event::Status => self.redraw.mark(Region::Status),

            Event::Key { key, mods } => self.key(key, mods, rig),

            Event::Shutdown => return Ok(false),
        }

        Ok(true)
    }

    fn key(&mut self, key: Key, mods: Modifiers, rig: &mut Rig) {
        match self
            .router
            .handle_key(key, mods, &mut self.selector, &mut self.scale, rig)
        {
            KeyOutcome::Selection => {
                match self.selector.current() {
                    Some(record) => self.status.set(StatusLevel::Verbose, record.pathname.clone()),
                    None => self.status.set(StatusLevel::Verbose, "No search results found"),
                }
                self.redraw.mark(Region::Library);
            }
            KeyOutcome::Deck => {
                self.redraw.mark(Region::Decks);
                self.redraw.mark(Region::Library);
            }
            KeyOutcome::Zoom => self.redraw.mark(Region::Decks),
            KeyOutcome::Ignored => {}
        }
    }

    /// Lay out the window and paint every dirty region that fits
    fn paint(&mut self, rig: &Rig) {
        let regions = Regions::compute(self.workspace);
        self.redraw.apply_layout(&regions);

        if !self.cleared {
            let canvas = self.display.canvas();
            let whole = Rect::new(0, 0, canvas.width(), canvas.height());
            canvas.fill_rect(whole, self.palette.background);
            self.display.publish(whole);
            self.cleared = true;
        }

        for region in Region::PAINT_ORDER {
            if !self.redraw.is_dirty(region) {
                continue;
            }
            let Some(rect) = regions.rect(region) else {
                continue;
            };

            let canvas = self.display.canvas();
            match region {
                Region::Library => draw_library(canvas, rect, &mut self.selector, &self.palette),
                Region::Status => {
                    let (level, text) = self.status.get();
                    draw_status(canvas, rect, level, &text, &self.palette);
                }
                Region::Decks => draw_decks(
                    canvas,
                    rect,
                    rig.decks(),
                    self.arrangement,
                    self.scale,
                    &self.palette,
                ),
            }

            self.redraw.clear(region);
            self.display.publish(rect);
        }
    }
}

/// Owner's handle on a running render loop
pub struct InterfaceHandle<D: Display> {
    queue: Arc<EventQueue>,
    quit: Receiver<()>,
    ticker: Ticker,
    thread_handle: Option<JoinHandle<Result<D, InterfaceError>>>,
}

impl<D: Display> InterfaceHandle<D> {
    /// Signalled when the user asks to quit
    pub fn quit_requested(&self) -> &Receiver<()> {
        &self.quit
    }

    /// Post an event to the render loop
    pub fn post(&self, event: Event) -> bool {
        self.queue.push(event)
    }

    /// Ask the render loop to finish, wait for it and take back the display
    ///
    /// Events already queued are handled first.
    pub fn stop(mut self) -> Result<D, InterfaceError> {
        self.ticker.stop();
        self.queue.push(Event::Shutdown);

        match self.thread_handle.take() {
            Some(handle) => handle.join().map_err(|_| InterfaceError::Panicked)?,
            None => Err(InterfaceError::Panicked),
        }
    }
}

impl<D: Display> Drop for InterfaceHandle<D> {
    fn drop(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            self.queue.push(Event::Shutdown);
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{Library, Record};
    use crate::render::{MemoryDisplay, PixelFormat};
    use crate::rig::Rig;

    fn interface(w: i32, h: i32, status: Arc<Status>) -> Interface<MemoryDisplay> {
        let display = MemoryDisplay::new(w, h, PixelFormat::BGRX32).unwrap();
        let selector = Selector::new(Library::from_records(vec![Record::from_path("/music/a.flac")]));
        Interface::new(display, status, selector, &InterfaceConfig::default())
    }

    #[test]
    fn test_first_paint_covers_every_region() {
        let mut ui = interface(800, 600, Arc::new(Status::new("ready")));
        let rig = Rig::new(2).unwrap();

        ui.paint(&rig);

        let regions = Regions::compute(workspace(800, 600));
        for region in Region::PAINT_ORDER {
            let rect = regions.rect(region).unwrap();
            assert!(ui.display.published().contains(&rect), "{:?} not published", region);
            assert!(!ui.redraw.is_dirty(region));
        }
    }

    #[test]
    fn test_tick_repaints_only_decks() {
        let mut ui = interface(800, 600, Arc::new(Status::new("ready")));
        let mut rig = Rig::new(2).unwrap();
        let (quit_tx, _quit_rx) = bounded(1);

        ui.paint(&rig);
        let before = ui.display.published().len();

        assert!(ui.handle(Event::Tick, &mut rig, &quit_tx).unwrap());
        ui.paint(&rig);

        let decks = Regions::compute(ui.workspace).rect(Region::Decks).unwrap();
        assert_eq!(&ui.display.published()[before..], &[decks]);
    }

    #[test]
    fn test_resize_invalidates_everything() {
        let mut ui = interface(800, 600, Arc::new(Status::new("ready")));
        let mut rig = Rig::new(1).unwrap();
        let (quit_tx, _quit_rx) = bounded(1);

        ui.paint(&rig);
        ui.handle(Event::Resize { width: 640, height: 480 }, &mut rig, &quit_tx)
            .unwrap();

        assert_eq!(ui.display.resizes(), 1);
        assert_eq!(ui.workspace, workspace(640, 480));
        for region in Region::PAINT_ORDER {
            assert!(ui.redraw.is_dirty(region));
        }
    }

    #[test]
    fn test_selection_key_sets_verbose_status() {
        let status = Arc::new(Status::new("ready"));
        let mut ui = interface(800, 600, status.clone());
        let mut rig = Rig::new(1).unwrap();
        let (quit_tx, _quit_rx) = bounded(1);

        ui.handle(
            Event::Key {
                key: Key::Char('z'),
                mods: Modifiers::NONE,
            },
            &mut rig,
            &quit_tx,
        )
        .unwrap();

        assert_eq!(
            status.get(),
            (StatusLevel::Verbose, "No search results found".to_string())
        );
    }

    #[test]
    fn test_quit_notifies_owner() {
        let mut ui = interface(100, 100, Arc::new(Status::new("ready")));
        let mut rig = Rig::new(1).unwrap();
        let (quit_tx, quit_rx) = bounded(1);

        assert!(ui.handle(Event::Quit, &mut rig, &quit_tx).unwrap());
        assert!(quit_rx.try_recv().is_ok());
        assert!(!ui.handle(Event::Shutdown, &mut rig, &quit_tx).unwrap());
    }

    #[test]
    fn test_bad_resize_is_an_error() {
        let mut ui = interface(100, 100, Arc::new(Status::new("ready")));
        let mut rig = Rig::new(1).unwrap();
        let (quit_tx, _quit_rx) = bounded(1);

        let result = ui.handle(Event::Resize { width: 0, height: 10 }, &mut rig, &quit_tx);
        assert!(matches!(result, Err(InterfaceError::Display(_))));
    }
}
