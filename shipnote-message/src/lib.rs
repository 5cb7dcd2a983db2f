//! Deferred composition of notification messages.
//!
//! A [`Message`] collects *fragments*: deferred mutations of a payload
//! draft. Nothing runs at registration time; [`Message::resolve`] replays
//! every fragment, in order, against a fresh draft. This is what lets a
//! fragment observe values that only settle after it was registered (the
//! project version bumped by a release step, a changelog written late in the
//! build), and it is why resolving twice replays everything from scratch.
//!
//! Blocks are packaged fragment producers: a block carries its own
//! configuration plus a format step that renders it into a message. See
//! [`block`] for the built-in ones (fields, context, git, publication,
//! changelog).

pub mod block;
mod error;
mod message;
mod project;
mod registry;

pub use error::MessageError;
pub use message::{Draft, Message};
pub use project::ProjectContext;
pub use registry::FragmentRegistry;
