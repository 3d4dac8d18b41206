//! Chat message models.

use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Parses a backend role string. The backend sends `USER` / `ASSISTANT`.
    ///
    /// Any other non-empty role is shown as the assistant; only a blank role
    /// is left to positional inference.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => None,
            "user" => Some(Self::User),
            "system" => Some(Self::System),
            _ => Some(Self::Assistant),
        }
    }

    /// Role inferred from the position among displayed messages.
    pub fn from_parity(position: usize) -> Self {
        if position % 2 == 0 {
            Self::User
        } else {
            Self::Assistant
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A history entry as the backend returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl RawMessage {
    pub fn new(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            text: Some(text.to_string()),
        }
    }
}

/// Response of `GET /members/{id}/threads/{threadId}`.
///
/// `messages` is required; a history without it is a format error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadHistory {
    pub messages: Vec<RawMessage>,
}

/// Bookmark affordance of a rendered message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BookmarkState {
    #[default]
    NotBookmarked,
    Bookmarked {
        bookmark_id: String,
    },
}

impl BookmarkState {
    pub fn is_bookmarked(&self) -> bool {
        matches!(self, Self::Bookmarked { .. })
    }

    /// The stored identifier, empty when not bookmarked.
    pub fn bookmark_id(&self) -> &str {
        match self {
            Self::Bookmarked { bookmark_id } => bookmark_id,
            Self::NotBookmarked => "",
        }
    }
}

/// Delivery state of a message sent from this client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    #[default]
    Delivered,
    Pending,
    Failed,
}

/// A message as displayed in the chat view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub bookmark: BookmarkState,
    pub delivery: DeliveryState,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            bookmark: BookmarkState::NotBookmarked,
            delivery: DeliveryState::Delivered,
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// Body of `POST .../messages`.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMessage {
    pub message: String,
}

/// Response of `POST .../messages`. Older backends answer with `text`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SentReply {
    #[serde(default, alias = "text")]
    pub message: Option<String>,
}

impl SentReply {
    /// The reply text, if it is non-empty.
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}
