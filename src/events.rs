//! Event source for the render loop
//!
//! The render thread blocks on [`EventQueue::wait`] and nothing else.
//! Window input, the refresh timer, status changes and the shutdown
//! request all arrive through the same queue.
//!
//! Timer ticks and status notifications are synthetic and can be
//! produced much faster than a slow paint consumes them. Each of these
//! kinds carries a pending flag: a push while one is already queued is
//! dropped, so there is never more than one of each waiting.

use crossbeam_channel::{select, tick, unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::InterfaceError;

/// Keyboard modifier state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false, ctrl: false };
    pub const SHIFT: Modifiers = Modifiers { shift: true, ctrl: false };
    pub const CTRL: Modifiers = Modifiers { shift: false, ctrl: true };
}

/// Physical keys the interface understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A letter or digit
    Char(char),
    Space,
    Period,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Tab,
    Plus,
    Equals,
    Minus,
    /// Function key, numbered from 1
    F(u8),
    /// Anything else, by window-system key code
    Other(u32),
}

/// Everything the render loop reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The user asked to quit, eg. by closing the window
    Quit,
    Resize { width: i32, height: i32 },
    Key { key: Key, mods: Modifiers },
    /// Refresh timer
    Tick,
    /// The status line changed
    Status,
    /// Internal request for the render thread to finish
    Shutdown,
}

/// Multi-producer queue with coalescing of synthetic events
pub struct EventQueue {
    tx: Sender<Event>,
    rx: Receiver<Event>,
    tick_pending: AtomicBool,
    status_pending: AtomicBool,
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            tick_pending: AtomicBool::new(false),
            status_pending: AtomicBool::new(false),
        }
    }

    fn pending_flag(&self, event: &Event) -> Option<&AtomicBool> {
        match event {
            Event::Tick => Some(&self.tick_pending),
            Event::Status => Some(&self.status_pending),
            _ => None,
        }
    }

    /// Queue an event; returns false if it was coalesced away
    pub fn push(&self, event: Event) -> bool {
        if let Some(flag) = self.pending_flag(&event) {
            if flag.swap(true, Ordering::AcqRel) {
                return false;
            }
        }

        // The queue owns a receiver, so the channel is never disconnected
        let _ = self.tx.send(event);
        true
    }

    fn taken(&self, event: Event) -> Event {
        if let Some(flag) = self.pending_flag(&event) {
            flag.store(false, Ordering::Release);
        }
        event
    }

    /// Block until the next event
    pub fn wait(&self) -> Event {
        match self.rx.recv() {
            Ok(event) => self.taken(event),
            Err(_) => Event::Shutdown,
        }
    }

    /// Next event if one is queued
    pub fn try_next(&self) -> Option<Event> {
        self.rx.try_recv().ok().map(|event| self.taken(event))
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread posting [`Event::Tick`] at a fixed interval
pub struct Ticker {
    stop_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn start(queue: Arc<EventQueue>, interval: Duration) -> Result<Self, InterfaceError> {
        let (stop_tx, stop_rx) = unbounded::<()>();

        let handle = thread::Builder::new()
            .name("ticker".to_string())
            .spawn(move || {
                let ticks = tick(interval);
                loop {
                    select! {
                        recv(ticks) -> _ => {
                            queue.push(Event::Tick);
                        }
                        recv(stop_rx) -> _ => break,
                    }
                }
            })
            .map_err(|e| InterfaceError::Spawn(e.to_string()))?;

        Ok(Self {
            stop_tx,
            thread_handle: Some(handle),
        })
    }

    pub fn stop(&mut self) {
        let _ = self.stop_tx.send(());

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
