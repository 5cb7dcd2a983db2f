use crate::block::{FormatStrategy, MessageBlock};
use crate::error::MessageError;
use crate::message::Message;
use shipnote_types::{ContextElement, LayoutBlock};

/// The small print under a message: a row of markdown snippets and images.
#[derive(Clone)]
pub struct ContextBlock {
    elements: Vec<ContextElement>,
    insert_divider: bool,
    strategy: FormatStrategy,
}

impl ContextBlock {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            insert_divider: true,
            strategy: FormatStrategy::Default,
        }
    }

    /// Whether to separate this block from preceding content. On by default.
    pub fn insert_divider(&mut self, insert_divider: bool) {
        self.insert_divider = insert_divider;
    }

    pub fn markdown(&mut self, text: impl Into<String>) {
        self.elements.push(ContextElement::Mrkdwn { text: text.into() });
    }

    pub fn image(&mut self, image_url: impl Into<String>, alt_text: Option<&str>) {
        self.elements.push(ContextElement::Image {
            image_url: image_url.into(),
            alt_text: alt_text.map(str::to_owned),
        });
    }
}

impl Default for ContextBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBlock for ContextBlock {
    fn strategy(&self) -> &FormatStrategy {
        &self.strategy
    }

    fn strategy_mut(&mut self) -> &mut FormatStrategy {
        &mut self.strategy
    }

    fn default_format(&self, message: &mut Message) -> Result<(), MessageError> {
        if self.elements.is_empty() {
            return Ok(());
        }
        let elements = self.elements.clone();
        message.block(self.insert_divider, move || {
            Ok(LayoutBlock::Context {
                elements: elements.clone(),
            })
        });
        Ok(())
    }
}
