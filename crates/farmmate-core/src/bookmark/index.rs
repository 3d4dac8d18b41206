//! Matching chat answers to saved bookmarks.

use std::collections::HashMap;

use super::model::Bookmark;

/// Hash index over a bookmark list used while rendering a thread.
///
/// Bookmarks are bucketed by answer text. Within a bucket an exact question
/// match is preferred, then the oldest unclaimed bookmark. Each bookmark can be
/// claimed once, so repeated identical answers in one thread never share a
/// bookmark.
pub struct BookmarkIndex<'a> {
    bookmarks: &'a [Bookmark],
    by_answer: HashMap<&'a str, Vec<usize>>,
    claimed: Vec<bool>,
}

impl<'a> BookmarkIndex<'a> {
    pub fn new(bookmarks: &'a [Bookmark]) -> Self {
        let mut by_answer: HashMap<&str, Vec<usize>> = HashMap::new();
        for (position, bookmark) in bookmarks.iter().enumerate() {
            by_answer
                .entry(bookmark.answer.trim())
                .or_default()
                .push(position);
        }

        Self {
            bookmarks,
            by_answer,
            claimed: vec![false; bookmarks.len()],
        }
    }

    /// Claims an unclaimed bookmark saved for exactly this question and answer.
    pub fn claim_exact(&mut self, question: &str, answer: &str) -> Option<&'a Bookmark> {
        let bookmarks = self.bookmarks;
        let question = question.trim();
        self.claim_where(answer, |position| {
            bookmarks[position].question.trim() == question
        })
    }

    /// Claims the oldest unclaimed bookmark saved for this answer.
    pub fn claim_answer(&mut self, answer: &str) -> Option<&'a Bookmark> {
        self.claim_where(answer, |_| true)
    }

    fn claim_where<F>(&mut self, answer: &str, accept: F) -> Option<&'a Bookmark>
    where
        F: Fn(usize) -> bool,
    {
        let bookmarks = self.bookmarks;
        let bucket = self.by_answer.get(answer.trim())?;
        let claimed = &self.claimed;
        let position = bucket
            .iter()
            .copied()
            .find(|&position| !claimed[position] && accept(position))?;

        self.claimed[position] = true;
        Some(&bookmarks[position])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark(id: &str, question: &str, answer: &str) -> Bookmark {
        Bookmark {
            bookmark_id: id.into(),
            question: question.into(),
            answer: answer.into(),
            chatted_at: None,
        }
    }

    #[test]
    fn test_answer_only_match() {
        let bookmarks = vec![bookmark("B1", "", "A1")];
        let mut index = BookmarkIndex::new(&bookmarks);

        assert!(index.claim_exact("Q?", "A1").is_none());
        assert!(index.claim_answer("A2").is_none());
        assert_eq!(index.claim_answer("A1").unwrap().bookmark_id, "B1");
    }

    #[test]
    fn test_pair_match_wins_over_answer_order() {
        let bookmarks = vec![bookmark("B1", "Q1", "same"), bookmark("B2", "Q2", "same")];
        let mut index = BookmarkIndex::new(&bookmarks);

        assert_eq!(index.claim_exact("Q2", "same").unwrap().bookmark_id, "B2");
        assert_eq!(index.claim_exact("Q1", "same").unwrap().bookmark_id, "B1");
    }

    #[test]
    fn test_bookmark_claimed_once() {
        let bookmarks = vec![bookmark("B1", "Q", "A")];
        let mut index = BookmarkIndex::new(&bookmarks);

        assert!(index.claim_exact("Q", "A").is_some());
        assert!(index.claim_exact("Q", "A").is_none());
        assert!(index.claim_answer("A").is_none());
    }

    #[test]
    fn test_claim_exact_skips_other_questions() {
        let bookmarks = vec![bookmark("B1", "Q1", "A")];
        let mut index = BookmarkIndex::new(&bookmarks);

        assert!(index.claim_exact("Q2", "A").is_none());
        assert_eq!(index.claim_answer("A").unwrap().bookmark_id, "B1");
    }

    #[test]
    fn test_whitespace_is_ignored() {
        let bookmarks = vec![bookmark("B1", " Q ", "A1\n")];
        let mut index = BookmarkIndex::new(&bookmarks);
        assert!(index.claim_exact("Q", "  A1").is_some());
    }
}
