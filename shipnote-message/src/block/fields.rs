use crate::block::{FormatStrategy, MessageBlock};
use crate::error::MessageError;
use crate::message::Message;
use shipnote_types::TextObject;

/// A section made of short titled facts, rendered two per row.
///
/// Each field becomes `*title*` on one line and the body on the next. A
/// missing body renders as `_null_` so the gap is visible instead of silently
/// collapsing the row.
#[derive(Clone)]
pub struct FieldsBlock {
    fields: Vec<TextObject>,
    insert_divider: bool,
    strategy: FormatStrategy,
}

impl FieldsBlock {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            insert_divider: true,
            strategy: FormatStrategy::Default,
        }
    }

    /// Whether to separate this block from preceding content. On by default.
    pub fn insert_divider(&mut self, insert_divider: bool) {
        self.insert_divider = insert_divider;
    }

    pub fn field(&mut self, title: &str, body: Option<&str>) {
        let body = body.unwrap_or("_null_");
        self.fields.push(TextObject::mrkdwn(format!("*{title}*\n{body}")));
    }
}

impl Default for FieldsBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBlock for FieldsBlock {
    fn strategy(&self) -> &FormatStrategy {
        &self.strategy
    }

    fn strategy_mut(&mut self) -> &mut FormatStrategy {
        &mut self.strategy
    }

    fn default_format(&self, message: &mut Message) -> Result<(), MessageError> {
        if self.fields.is_empty() {
            return Ok(());
        }
        let fields = self.fields.clone();
        message.section(self.insert_divider, move |section| {
            section.fields = fields.clone();
        });
        Ok(())
    }
}
