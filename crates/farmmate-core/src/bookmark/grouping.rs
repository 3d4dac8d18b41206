//! Weekly grouping for the bookmark page.

use chrono::{Datelike, Duration, NaiveDate};

use super::model::Bookmark;

/// Bookmarks saved during one calendar week (Sunday to Saturday).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekGroup {
    /// 0 for the current week, 1 for the week before, ...
    pub weeks_ago: i64,
    /// Newest first.
    pub bookmarks: Vec<Bookmark>,
}

impl WeekGroup {
    pub fn title(&self) -> String {
        match self.weeks_ago {
            0 => "이번주".to_string(),
            n => format!("{n}주전"),
        }
    }
}

/// Start (Sunday) of the week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_sunday()))
}

/// How many weeks before the week of `today` the given day falls.
///
/// Days inside the current week, future days and undated bookmarks count as
/// the current week.
pub fn weeks_ago(day: Option<NaiveDate>, today: NaiveDate) -> i64 {
    let start = week_start(today);
    match day {
        Some(day) if day < start => {
            let days_before = (start - day).num_days();
            (days_before + 6) / 7
        }
        _ => 0,
    }
}

/// Groups bookmarks by week relative to `today`, newest group first.
pub fn group_by_week(bookmarks: &[Bookmark], today: NaiveDate) -> Vec<WeekGroup> {
    let mut dated: Vec<(Option<NaiveDate>, usize, &Bookmark)> = bookmarks
        .iter()
        .enumerate()
        .map(|(position, bookmark)| (bookmark.chatted_on(), position, bookmark))
        .collect();

    // Newest first; equal dates keep the later-saved bookmark first.
    dated.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

    let mut groups: Vec<WeekGroup> = Vec::new();
    for (day, _, bookmark) in dated {
        let weeks_ago = weeks_ago(day, today);
        match groups.iter_mut().find(|group| group.weeks_ago == weeks_ago) {
            Some(group) => group.bookmarks.push(bookmark.clone()),
            None => groups.push(WeekGroup {
                weeks_ago,
                bookmarks: vec![bookmark.clone()],
            }),
        }
    }

    groups.sort_by_key(|group| group.weeks_ago);
    groups
}
