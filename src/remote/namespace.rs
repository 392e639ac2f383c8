//! Per-deck remote control methods
//!
//! Every deck gets the same set of methods under `/deckN/`, with `N`
//! counting from 1. A path may be registered more than once with
//! different typespecs; the first registration whose typespec accepts
//! the message wins, and a registration without a typespec accepts
//! anything. Messages no registration accepts never reach a handler.
//!
//! Handlers run with the rig gate held by the caller. Anything they
//! want to send is returned as a [`Reply`] and sent after the gate is
//! released.

use std::collections::HashMap;
use std::sync::Arc;

use super::message::{Arg, Message};
use crate::constants::MAX_CUES;
use crate::deck::Deck;
use crate::library::Record;
use crate::rig::Rig;

/// Where a reply goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyTarget {
    /// Back to the address the request came from
    Sender,
    /// An explicit host and port named in the request
    Host { host: String, port: u16 },
}

/// A message to send once the gate is released
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub target: ReplyTarget,
    pub message: Message,
}

/// Arguments and context for one handler invocation
struct Call<'a> {
    rig: &'a mut Rig,
    deck: usize,
    args: &'a [Arg],
    replies: &'a mut Vec<Reply>,
}

impl Call<'_> {
    fn deck(&mut self) -> Option<&mut Deck> {
        self.rig.deck_mut(self.deck)
    }

    fn double(&self, i: usize) -> Option<f64> {
        self.args.get(i).and_then(Arg::as_f64)
    }

    fn string(&self, i: usize) -> Option<&str> {
        self.args.get(i).and_then(Arg::as_str)
    }

    /// Cue label from a 1-indexed argument, if in range
    fn label(&self, i: usize) -> Option<usize> {
        let n = self.args.get(i).and_then(Arg::as_i32)?;
        let label = usize::try_from(n.checked_sub(1)?).ok()?;
        (label < MAX_CUES).then_some(label)
    }

    fn reply(&mut self, target: ReplyTarget, path: &str, args: Vec<Arg>) {
        self.replies.push(Reply {
            target,
            message: Message::new(path, args),
        });
    }
}

type Handler = fn(&mut Call<'_>);

struct Method {
    typespec: Option<&'static str>,
    handler: Handler,
    deck: usize,
}

/// The method table for every deck, built once at startup
pub struct Namespace {
    methods: HashMap<String, Vec<Method>>,
}

/// Method suffixes, typespecs and handlers, in registration order
const METHODS: &[(&str, Option<&str>, Handler)] = &[
    ("bpm/get", Some("s"), bpm_get),
    ("bpm/set", Some("d"), bpm_set),
    ("clone", Some("i"), clone),
    ("connect", None, connect),
    ("load", Some("s"), load),
    ("cue", Some("i"), cue),
    ("cue/go", Some("i"), cue_go),
    ("cue/set", Some("i"), cue_set),
    ("cue/set", Some("id"), cue_set),
    ("cue/set", None, cue_set_many),
    ("cue/unset", Some("i"), cue_unset),
    ("pitch", Some("d"), pitch),
    ("play", None, play),
    ("position", Some("d"), position_set),
    ("position/get", Some("s"), position_get),
    ("position/get", Some("siss"), position_get_addressed),
    ("position/set", Some("d"), position_set),
    ("recue", None, recue),
    ("seek", Some("d"), seek),
];

impl Namespace {
    pub fn new(ndeck: usize) -> Self {
        let mut methods: HashMap<String, Vec<Method>> = HashMap::new();

        for deck in 0..ndeck {
            for (suffix, typespec, handler) in METHODS {
                methods
                    .entry(format!("/deck{}/{}", deck + 1, suffix))
                    .or_default()
                    .push(Method {
                        typespec: *typespec,
                        handler: *handler,
                        deck,
                    });
            }
        }

        Self { methods }
    }

    /// Registered paths, sorted
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Run the handler for `msg`, returning what it wants sent
    ///
    /// Returns `None` if no registration accepts the message.
    pub fn dispatch(&self, rig: &mut Rig, msg: &Message) -> Option<Vec<Reply>> {
        let candidates = self.methods.get(&msg.path)?;

        for method in candidates {
            let args = match method.typespec {
                Some(typespec) => match msg.coerce(typespec) {
                    Some(args) => args,
                    None => continue,
                },
                None => msg.args.clone(),
            };

            let mut replies = Vec::new();
            let mut call = Call {
                rig: &mut *rig,
                deck: method.deck,
                args: &args,
                replies: &mut replies,
            };
            (method.handler)(&mut call);

            return Some(replies);
        }

        None
    }
}

fn bpm_get(call: &mut Call<'_>) {
    let Some(bpm) = call.rig.deck(call.deck).and_then(Deck::bpm) else {
        return;
    };
    if let Some(path) = call.string(0).map(str::to_string) {
        call.reply(ReplyTarget::Sender, &path, vec![Arg::Double(bpm)]);
    }
}

fn bpm_set(call: &mut Call<'_>) {
    if let Some(bpm) = call.double(0) {
        if let Some(deck) = call.deck() {
            deck.set_bpm(bpm);
        }
    }
}

fn clone(call: &mut Call<'_>) {
    let Some(n) = call.args.first().and_then(Arg::as_i32) else {
        return;
    };
    if n > 0 && (n as usize) <= call.rig.len() {
        call.rig.clone_deck(call.deck, n as usize - 1);
    }
}

fn connect(call: &mut Call<'_>) {
    if let Some(deck) = call.deck() {
        deck.player.toggle_timecode_control();
    }
}

fn load(call: &mut Call<'_>) {
    let Some(pathname) = call.string(0).map(str::to_string) else {
        return;
    };
    tracing::info!("/deck{}/load: Importing '{}'...", call.deck + 1, pathname);
    call.rig.load(call.deck, Arc::new(Record::from_path(pathname)));
}

fn cue(call: &mut Call<'_>) {
    if let Some(label) = call.label(0) {
        if let Some(deck) = call.deck() {
            deck.cue(label);
        }
    }
}

fn cue_go(call: &mut Call<'_>) {
    if let Some(label) = call.label(0) {
        if let Some(deck) = call.deck() {
            deck.cue_go(label);
        }
    }
}

fn cue_set(call: &mut Call<'_>) {
    let Some(label) = call.label(0) else {
        return;
    };
    let position = call.double(1);
    if let Some(deck) = call.deck() {
        deck.cue_set(label, position);
    }
}

/// Assign every numeric argument to consecutive labels from zero
fn cue_set_many(call: &mut Call<'_>) {
    let positions: Vec<f64> = call
        .args
        .iter()
        .filter_map(Arg::as_f64)
        .take(MAX_CUES)
        .collect();

    if let Some(deck) = call.deck() {
        for (label, position) in positions.into_iter().enumerate() {
            deck.cue_set(label, Some(position));
        }
    }
}

fn cue_unset(call: &mut Call<'_>) {
    if let Some(label) = call.label(0) {
        if let Some(deck) = call.deck() {
            deck.cue_unset(label);
        }
    }
}

fn pitch(call: &mut Call<'_>) {
    if let Some(pitch) = call.double(0) {
        if let Some(deck) = call.deck() {
            deck.set_pitch(pitch);
        }
    }
}

fn play(call: &mut Call<'_>) {
    if let Some(deck) = call.deck() {
        deck.play();
    }
}

fn position_get(call: &mut Call<'_>) {
    let Some(elapsed) = call.rig.deck(call.deck).map(Deck::elapsed) else {
        return;
    };
    if let Some(path) = call.string(0).map(str::to_string) {
        call.reply(ReplyTarget::Sender, &path, vec![Arg::Double(elapsed)]);
    }
}

/// Send the position to `host:port` at `path`, echoing `tag`
fn position_get_addressed(call: &mut Call<'_>) {
    let Some(elapsed) = call.rig.deck(call.deck).map(Deck::elapsed) else {
        return;
    };

    let (Some(host), Some(port), Some(path), Some(tag)) = (
        call.string(0).map(str::to_string),
        call.args.get(1).and_then(Arg::as_i32),
        call.string(2).map(str::to_string),
        call.string(3).map(str::to_string),
    ) else {
        return;
    };

    let Ok(port) = u16::try_from(port) else {
        return;
    };

    call.reply(
        ReplyTarget::Host { host, port },
        &path,
        vec![Arg::Double(elapsed), Arg::Str(tag)],
    );
}

fn position_set(call: &mut Call<'_>) {
    if let Some(seconds) = call.double(0) {
        if let Some(deck) = call.deck() {
            deck.seek_to(seconds);
        }
    }
}

fn recue(call: &mut Call<'_>) {
    if let Some(deck) = call.deck() {
        deck.recue();
    }
}

/// Seek to a fraction of the track
fn seek(call: &mut Call<'_>) {
    if let Some(fraction) = call.double(0) {
        if let Some(deck) = call.deck() {
            deck.seek_fraction(fraction);
        }
    }
}
