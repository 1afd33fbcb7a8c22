//! Chat-completion proxy.
//!
//! The outbound LLM call is an external collaborator; this module owns the
//! request contract and a deterministic stand-in.

use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MAX_MESSAGES: usize = 50;
pub const MAX_MESSAGE_CHARS: usize = 8_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: ChatMessage,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantError {
    /// Request shape rejected before any call.
    InvalidRequest(String),
    /// Upstream provider failed.
    Upstream(String),
}

impl Display for AssistantError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest(message) => write!(f, "invalid chat request: {message}"),
            Self::Upstream(message) => write!(f, "assistant unavailable: {message}"),
        }
    }
}

impl Error for AssistantError {}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), AssistantError> {
        if self.messages.is_empty() {
            return Err(AssistantError::InvalidRequest(
                "at least one message is required".to_string(),
            ));
        }
        if self.messages.len() > MAX_MESSAGES {
            return Err(AssistantError::InvalidRequest(format!(
                "at most {MAX_MESSAGES} messages are allowed"
            )));
        }
        for (idx, message) in self.messages.iter().enumerate() {
            let chars = message.content.trim().chars().count();
            if chars == 0 {
                return Err(AssistantError::InvalidRequest(format!(
                    "message {idx} has empty content"
                )));
            }
            if chars > MAX_MESSAGE_CHARS {
                return Err(AssistantError::InvalidRequest(format!(
                    "message {idx} exceeds {MAX_MESSAGE_CHARS} characters"
                )));
            }
        }
        Ok(())
    }
}

/// Chat-completion provider seam.
pub trait ChatCompletion {
    fn complete(&self, request: &ChatRequest) -> Result<ChatReply, AssistantError>;
}

/// Offline provider that echoes a short acknowledgement of the last user
/// message.
#[derive(Debug, Clone, Default)]
pub struct StubAssistant;

pub const STUB_MODEL: &str = "stub-assistant";

impl ChatCompletion for StubAssistant {
    fn complete(&self, request: &ChatRequest) -> Result<ChatReply, AssistantError> {
        request.validate()?;
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|message| message.role == ChatRole::User)
            .map(|message| message.content.trim())
            .unwrap_or("");
        let preview: String = last_user.chars().take(80).collect();
        info!(
            "event=assistant_complete module=assistant status=ok messages={}",
            request.messages.len()
        );
        Ok(ChatReply {
            message: ChatMessage {
                role: ChatRole::Assistant,
                content: if preview.is_empty() {
                    "How can I help you plan your day?".to_string()
                } else {
                    format!("You said: {preview}")
                },
            },
            model: STUB_MODEL.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AssistantError, ChatCompletion, ChatMessage, ChatRequest, StubAssistant};

    #[test]
    fn stub_echoes_last_user_message() {
        let request = ChatRequest {
            messages: vec![ChatMessage::user("first"), ChatMessage::user("  plan my week ")],
            model: None,
        };
        let reply = StubAssistant.complete(&request).expect("reply");
        assert_eq!(reply.message.content, "You said: plan my week");
    }

    #[test]
    fn rejects_empty_and_oversized_conversations() {
        let empty = ChatRequest::default();
        assert!(matches!(
            StubAssistant.complete(&empty),
            Err(AssistantError::InvalidRequest(_))
        ));

        let blank = ChatRequest {
            messages: vec![ChatMessage::user("   ")],
            model: None,
        };
        assert!(blank.validate().is_err());

        let long = ChatRequest {
            messages: (0..51).map(|i| ChatMessage::user(format!("m{i}"))).collect(),
            model: None,
        };
        assert!(long.validate().is_err());
    }
}
