//! Chat page use cases: loading a thread and sending messages.

use std::sync::Arc;

use farmmate_core::chat::{ChatView, DeliveryState};
use farmmate_core::{FarmApi, FarmmateError, Result};
use farmmate_infrastructure::LocalCache;

/// Loads chat threads and sends messages.
#[derive(Clone)]
pub struct ChatSync {
    api: Arc<dyn FarmApi>,
    cache: Arc<LocalCache>,
}

impl ChatSync {
    pub fn new(api: Arc<dyn FarmApi>, cache: Arc<LocalCache>) -> Self {
        Self { api, cache }
    }

    /// Opens the chat view of a crop's thread.
    ///
    /// The thread id comes from the local crop catalog. Fails with `NotFound`
    /// when the crop is unknown or has no thread yet.
    pub async fn load_messages(&self, member_id: &str, crop_name: &str) -> Result<ChatView> {
        let thread_id = self.cache.crop_catalog()?.require_thread(crop_name)?;
        let mut view = ChatView::new(member_id, crop_name, thread_id);
        self.reload(&mut view).await?;
        Ok(view)
    }

    /// Refetches the history and the bookmark list of the view's thread.
    ///
    /// A failed bookmark fetch leaves every message unbookmarked instead of
    /// failing the page.
    pub async fn reload(&self, view: &mut ChatView) -> Result<()> {
        let (history, bookmarks) = tokio::join!(
            self.api.get_thread_history(&view.member_id, &view.thread_id),
            self.api.list_bookmarks(&view.member_id, &view.thread_id),
        );

        let history = history?;
        let bookmarks = bookmarks.unwrap_or_else(|e| {
            tracing::warn!(
                thread_id = %view.thread_id,
                error = %e,
                "[ChatSync] Bookmark list unavailable, showing thread without bookmarks"
            );
            Vec::new()
        });

        view.replace_history(&history.messages, bookmarks);
        tracing::debug!(
            thread_id = %view.thread_id,
            messages = view.len(),
            bookmarks = view.bookmarks().len(),
            "[ChatSync] Thread loaded"
        );
        Ok(())
    }

    /// Sends `text` and appends the reply. Returns the index of the reply.
    ///
    /// The user message is shown as pending while the request runs. On
    /// failure it stays in the view marked as failed.
    pub async fn send_message(&self, view: &mut ChatView, text: &str) -> Result<usize> {
        let text = text.trim();
        if text.is_empty() {
            return Err(FarmmateError::user_input("message is empty"));
        }

        let index = view.push_user_pending(text);
        let reply = match self
            .api
            .send_message(&view.member_id, &view.thread_id, text)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                view.mark_delivery(index, DeliveryState::Failed);
                tracing::warn!(thread_id = %view.thread_id, error = %e, "[ChatSync] Send failed");
                return Err(e);
            }
        };

        let Some(answer) = reply.text() else {
            view.mark_delivery(index, DeliveryState::Failed);
            return Err(FarmmateError::data_format("reply carries no message text"));
        };

        view.mark_delivery(index, DeliveryState::Delivered);
        Ok(view.push_assistant(answer))
    }
}
