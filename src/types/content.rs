//! Content blocks carried in prompts and streamed updates.
//!
//! Only the `text` variant is exercised by this crate's own integration
//! tests, but `image`/`resource_link` are included because the method
//! catalog's `session/prompt` and `session/update` payloads are multi-modal
//! in the protocol being implemented, tagged with `#[serde(tag = "type")]`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    Image {
        data: String,
        mime_type: String,
    },
    ResourceLink {
        uri: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_block_round_trips() {
        let block = ContentBlock::text("Fix the failing tests");
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value, json!({"type": "text", "text": "Fix the failing tests"}));
        let back: ContentBlock = serde_json::from_value(value).unwrap();
        assert_eq!(back.as_text(), Some("Fix the failing tests"));
    }
}
