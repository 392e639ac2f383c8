//! Network remote control
//!
//! Each deck is addressable as `/deck1/...`, `/deck2/...` and so on.
//! See [`namespace`] for the methods and [`server`] for the transport.

pub mod message;
pub mod namespace;
pub mod server;

pub use message::{Arg, Message};
pub use namespace::{Namespace, Reply, ReplyTarget};
pub use server::RemoteServer;
