//! Built-in message blocks.
//!
//! A block is a reusable piece of message content: it carries configuration
//! (set eagerly or lazily, see [`crate::Message::attach`]) and knows how to
//! format itself into a message. Formatting goes through [`FormatStrategy`]
//! so callers can replace the built-in rendering wholesale while keeping the
//! block's configuration and query surface.

pub mod changelog;
pub mod context;
pub mod fields;
pub mod git;
pub mod publication;

use crate::error::MessageError;
use crate::message::Message;
use std::rc::Rc;

pub type FormatFn = Rc<dyn Fn(&mut Message) -> Result<(), MessageError>>;

/// How a block renders itself: its built-in formatting, or a caller-supplied
/// replacement. Exactly one is active; overriding is not additive.
#[derive(Clone, Default)]
pub enum FormatStrategy {
    #[default]
    Default,
    Overridden(FormatFn),
}

impl std::fmt::Debug for FormatStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Overridden(_) => f.write_str("Overridden(..)"),
        }
    }
}

pub trait MessageBlock {
    fn strategy(&self) -> &FormatStrategy;

    fn strategy_mut(&mut self) -> &mut FormatStrategy;

    /// The block's built-in rendering.
    fn default_format(&self, message: &mut Message) -> Result<(), MessageError>;

    /// Replaces the built-in rendering. The block's configuration stays
    /// available through its query methods, so a replacement can still reuse
    /// the values the block would have rendered.
    fn set_format(
        &mut self,
        format: impl Fn(&mut Message) -> Result<(), MessageError> + 'static,
    ) where
        Self: Sized,
    {
        *self.strategy_mut() = FormatStrategy::Overridden(Rc::new(format));
    }

    /// Renders the block into `message` using whichever strategy is active.
    fn format(&self, message: &mut Message) -> Result<(), MessageError> {
        match self.strategy() {
            FormatStrategy::Default => self.default_format(message),
            FormatStrategy::Overridden(format) => format(message),
        }
    }
}
