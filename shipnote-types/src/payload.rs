use serde::{Deserialize, Serialize};

/// A webhook payload under construction.
///
/// `blocks` starts out unset; the composer initializes it when the first
/// block is appended. The distinction between "unset" and "empty" matters:
/// it is how the composer decides whether a divider may be inserted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// Fallback text for clients that do not render blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<LayoutBlock>>,
}

impl Payload {
    /// Number of blocks appended so far (zero when `blocks` is unset).
    pub fn block_count(&self) -> usize {
        self.blocks.as_ref().map_or(0, Vec::len)
    }
}

/// One layout block of the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutBlock {
    Divider,
    Section(SectionBlock),
    Context { elements: Vec<ContextElement> },
}

impl LayoutBlock {
    pub fn divider() -> Self {
        LayoutBlock::Divider
    }

    pub fn is_divider(&self) -> bool {
        matches!(self, LayoutBlock::Divider)
    }
}

/// A section block: optional body text plus optional two-column fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextObject>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<TextObject>,
}

/// A composition text object, either markdown or plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    Mrkdwn { text: String },
    PlainText { text: String },
}

impl TextObject {
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        TextObject::Mrkdwn { text: text.into() }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        TextObject::PlainText { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            TextObject::Mrkdwn { text } | TextObject::PlainText { text } => text,
        }
    }
}

/// An element of a context block: a text object or an inline image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextElement {
    Mrkdwn {
        text: String,
    },
    PlainText {
        text: String,
    },
    Image {
        image_url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt_text: Option<String>,
    },
}
