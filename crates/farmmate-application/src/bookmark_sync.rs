//! Bookmarking of chat answers.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use farmmate_core::bookmark::{Bookmark, NewBookmark};
use farmmate_core::chat::{BookmarkState, ChatView};
use farmmate_core::{FarmApi, FarmmateError, Result};
use farmmate_infrastructure::LocalCache;

#[derive(Clone)]
pub struct BookmarkSync {
    api: Arc<dyn FarmApi>,
    cache: Arc<LocalCache>,
}

impl BookmarkSync {
    pub fn new(api: Arc<dyn FarmApi>, cache: Arc<LocalCache>) -> Self {
        Self { api, cache }
    }

    /// Bookmarks the assistant answer at `index`, or removes its bookmark.
    ///
    /// The view changes only after the backend confirmed the change. Returns
    /// the new state of the message.
    pub async fn toggle_bookmark(
        &self,
        view: &mut ChatView,
        index: usize,
    ) -> Result<BookmarkState> {
        let message = view
            .message(index)
            .ok_or_else(|| FarmmateError::not_found("message", index.to_string()))?;
        if !message.is_assistant() {
            return Err(FarmmateError::user_input("only assistant answers can be bookmarked"));
        }

        let state = match message.bookmark.clone() {
            BookmarkState::NotBookmarked => {
                let answer = message.text.clone();
                self.create(view, index, answer).await?
            }
            BookmarkState::Bookmarked { bookmark_id } => {
                self.api
                    .delete_bookmark(&view.member_id, &view.thread_id, &bookmark_id)
                    .await?;
                view.remove_bookmark(&bookmark_id);
                tracing::info!(bookmark_id = %bookmark_id, "[BookmarkSync] Bookmark removed");
                BookmarkState::NotBookmarked
            }
        };

        view.set_bookmark_state(index, state.clone());
        Ok(state)
    }

    async fn create(
        &self,
        view: &mut ChatView,
        index: usize,
        answer: String,
    ) -> Result<BookmarkState> {
        let bookmark = NewBookmark {
            question: view.question_for(index),
            answer,
            chatted_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let bookmark_id = self
            .api
            .create_bookmark(&view.member_id, &view.thread_id, &bookmark)
            .await?;

        tracing::info!(bookmark_id = %bookmark_id, "[BookmarkSync] Bookmark created");
        view.add_bookmark(Bookmark {
            bookmark_id: bookmark_id.clone(),
            question: bookmark.question,
            answer: bookmark.answer,
            chatted_at: Some(bookmark.chatted_at),
        });
        Ok(BookmarkState::Bookmarked { bookmark_id })
    }

    /// Bookmarks saved in the thread of `crop_name`.
    pub async fn list(&self, member_id: &str, crop_name: &str) -> Result<Vec<Bookmark>> {
        let thread_id = self.cache.crop_catalog()?.require_thread(crop_name)?;
        self.api.list_bookmarks(member_id, &thread_id).await
    }
}
