//! Core types for the agent module.

use serde::{Deserialize, Serialize};

/// The three prompt variables handed to a completion provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionPrompt {
    pub system: String,
    pub context: String,
    pub question: String,
}

impl CompletionPrompt {
    /// The user-turn body: retrieved context followed by the question.
    pub fn user_message(&self) -> String {
        format!(
            "CONTEXT:\n{}\n\nUSER QUESTION:\n{}\n\nReturn the JSON described in the system instructions.",
            self.context, self.question
        )
    }

    /// Full single-string rendering, system policy first
    pub fn render(&self) -> String {
        format!("{}\n\n{}", self.system, self.user_message())
    }
}

/// Message in a conversation with the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }
}

/// Content block within a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    /// Any block kind we do not consume (tool use, thinking, ...)
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_layout() {
        let prompt = CompletionPrompt {
            system: "RULES".to_string(),
            context: "SOURCES: orders.md\n\nOrders(OrderID, ...)".to_string(),
            question: "How many orders?".to_string(),
        };

        let body = prompt.user_message();
        assert!(body.starts_with("CONTEXT:\nSOURCES: orders.md"));
        assert!(body.contains("USER QUESTION:\nHow many orders?"));
        assert!(prompt.render().starts_with("RULES\n\nCONTEXT:"));
    }

    #[test]
    fn test_unknown_content_blocks_are_tolerated() {
        let blocks: Vec<ContentBlock> = serde_json::from_str(
            r#"[{"type":"thinking","thinking":"hmm"},{"type":"text","text":"{}"}]"#,
        )
        .unwrap();

        assert!(matches!(blocks[0], ContentBlock::Other));
        assert!(matches!(&blocks[1], ContentBlock::Text { text } if text == "{}"));
    }
}
