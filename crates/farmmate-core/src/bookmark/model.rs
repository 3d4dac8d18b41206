//! Bookmark domain models.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::serde_util::{id_string, optional_id_string};

/// A saved question/answer pair of a chat thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    #[serde(deserialize_with = "id_string")]
    pub bookmark_id: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chatted_at: Option<String>,
}

impl Bookmark {
    /// Calendar day of `chatted_at`, if it can be parsed.
    ///
    /// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS[.f]` and plain dates.
    pub fn chatted_on(&self) -> Option<NaiveDate> {
        let raw = self.chatted_at.as_deref()?.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.date_naive());
        }
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(ts.date());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }
}

/// Body of `POST .../bookmarks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBookmark {
    pub question: String,
    pub answer: String,
    pub chatted_at: String,
}

/// Response of `POST .../bookmarks`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkCreated {
    #[serde(default, deserialize_with = "optional_id_string")]
    pub bookmark_id: Option<String>,
}
