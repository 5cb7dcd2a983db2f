//! Wire model for shipnote notification payloads.
//!
//! This is the subset of the Slack Block Kit schema that the composer needs:
//! an ordered list of layout blocks, one of which is a divider. The composer
//! itself never inspects block contents beyond "is this a divider"; everything
//! here exists so that the final document serializes to the JSON an incoming
//! webhook expects.

pub mod payload;

pub use payload::{ContextElement, LayoutBlock, Payload, SectionBlock, TextObject};
