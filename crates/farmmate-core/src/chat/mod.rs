//! Chat threads: message models and the chat view.

pub mod message;
pub mod view;

pub use message::{
    BookmarkState, ChatMessage, DeliveryState, OutgoingMessage, RawMessage, Role, SentReply,
    ThreadHistory,
};
pub use view::{ChatView, NO_QUESTION, SYSTEM_MESSAGE_MARKER, build_messages, is_system_text};
