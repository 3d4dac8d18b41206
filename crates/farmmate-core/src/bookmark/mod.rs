//! Bookmarks of chat answers.

pub mod grouping;
pub mod index;
pub mod model;

pub use grouping::{WeekGroup, group_by_week};
pub use index::BookmarkIndex;
pub use model::{Bookmark, BookmarkCreated, NewBookmark};
