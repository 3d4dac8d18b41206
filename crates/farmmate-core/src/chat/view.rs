//! Chat view state and the history-to-view transformation.

use serde::Serialize;

use super::message::{BookmarkState, ChatMessage, DeliveryState, RawMessage, Role};
use crate::bookmark::{Bookmark, BookmarkIndex};

/// Marker prefix of backend-emitted system entries hidden from the user.
pub const SYSTEM_MESSAGE_MARKER: &str = "[시스템 메시지]";

/// Question stored with a bookmark when no user message precedes the answer.
pub const NO_QUESTION: &str = "질문 없음";

/// Whether a history entry is a system message that must not be displayed.
pub fn is_system_text(text: &str) -> bool {
    text.contains(SYSTEM_MESSAGE_MARKER)
}

/// Turns a raw thread history into displayable messages.
///
/// Empty entries, system-marked entries and entries with an explicit
/// `system` role are dropped. An explicit role wins, an unknown one counting
/// as the assistant; otherwise the role follows the parity of the position
/// among the messages kept so far, so a filtered entry never shifts the
/// user/assistant alternation.
///
/// Assistant messages are then matched against `bookmarks`: exact
/// (question, answer) pairs first, then answer-only for whatever is left,
/// each bookmark used at most once.
pub fn build_messages(raw: &[RawMessage], bookmarks: &[Bookmark]) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = Vec::with_capacity(raw.len());
    // (message position, preceding question) of every assistant message
    let mut answers: Vec<(usize, Option<&str>)> = Vec::new();
    let mut last_question: Option<&str> = None;

    for entry in raw {
        let text = entry.text.as_deref().unwrap_or_default();
        if text.trim().is_empty() || is_system_text(text) {
            continue;
        }

        let explicit = entry.role.as_deref().and_then(Role::parse);
        if explicit == Some(Role::System) {
            continue;
        }
        let role = explicit.unwrap_or_else(|| Role::from_parity(messages.len()));

        match role {
            Role::User => last_question = Some(text),
            Role::Assistant => answers.push((messages.len(), last_question)),
            Role::System => {}
        }
        messages.push(ChatMessage::new(role, text));
    }

    let mut index = BookmarkIndex::new(bookmarks);
    let mut matched: Vec<Option<&Bookmark>> = vec![None; answers.len()];

    for (slot, &(position, question)) in answers.iter().enumerate() {
        if let Some(question) = question {
            matched[slot] = index.claim_exact(question, &messages[position].text);
        }
    }
    for (slot, &(position, _)) in answers.iter().enumerate() {
        if matched[slot].is_none() {
            matched[slot] = index.claim_answer(&messages[position].text);
        }
    }

    for (&(position, _), bookmark) in answers.iter().zip(matched) {
        if let Some(bookmark) = bookmark {
            messages[position].bookmark = BookmarkState::Bookmarked {
                bookmark_id: bookmark.bookmark_id.clone(),
            };
        }
    }

    messages
}

/// Client state of one chat page: the thread, its rendered messages and
/// the cached bookmark list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatView {
    pub member_id: String,
    pub crop_name: String,
    pub thread_id: String,
    messages: Vec<ChatMessage>,
    bookmarks: Vec<Bookmark>,
}

impl ChatView {
    pub fn new(
        member_id: impl Into<String>,
        crop_name: impl Into<String>,
        thread_id: impl Into<String>,
    ) -> Self {
        Self {
            member_id: member_id.into(),
            crop_name: crop_name.into(),
            thread_id: thread_id.into(),
            messages: Vec::new(),
            bookmarks: Vec::new(),
        }
    }

    /// Rebuilds the messages from a freshly fetched history and bookmark list.
    pub fn replace_history(&mut self, raw: &[RawMessage], bookmarks: Vec<Bookmark>) {
        self.messages = build_messages(raw, &bookmarks);
        self.bookmarks = bookmarks;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn message(&self, index: usize) -> Option<&ChatMessage> {
        self.messages.get(index)
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends a user message awaiting delivery and returns its index.
    pub fn push_user_pending(&mut self, text: impl Into<String>) -> usize {
        let mut message = ChatMessage::new(Role::User, text);
        message.delivery = DeliveryState::Pending;
        self.messages.push(message);
        self.messages.len() - 1
    }

    pub fn mark_delivery(&mut self, index: usize, delivery: DeliveryState) {
        if let Some(message) = self.messages.get_mut(index) {
            message.delivery = delivery;
        }
    }

    /// Appends an assistant reply and returns its index.
    pub fn push_assistant(&mut self, text: impl Into<String>) -> usize {
        self.messages.push(ChatMessage::new(Role::Assistant, text));
        self.messages.len() - 1
    }

    pub fn set_bookmark_state(&mut self, index: usize, state: BookmarkState) {
        if let Some(message) = self.messages.get_mut(index) {
            message.bookmark = state;
        }
    }

    pub fn add_bookmark(&mut self, bookmark: Bookmark) {
        self.bookmarks.push(bookmark);
    }

    /// Drops a bookmark from the cached list. Returns whether it was present.
    pub fn remove_bookmark(&mut self, bookmark_id: &str) -> bool {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|b| b.bookmark_id != bookmark_id);
        self.bookmarks.len() != before
    }

    /// Question paired with the answer at `index`: the nearest preceding user
    /// message, or [`NO_QUESTION`].
    pub fn question_for(&self, index: usize) -> String {
        self.messages[..index.min(self.messages.len())]
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.text.clone())
            .unwrap_or_else(|| NO_QUESTION.to_string())
    }
}
