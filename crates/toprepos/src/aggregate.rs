//! Commit history to per-day activity.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::platform::RawCommit;

/// Author name recorded for commits that carry none.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Activity for one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayBucket {
    pub commits: usize,
    pub authors: BTreeSet<String>,
}

impl DayBucket {
    fn record(&mut self, author: &str) {
        self.commits += 1;
        self.authors.insert(author.to_string());
    }
}

/// Day buckets keyed by calendar date, ascending.
pub type DailyActivity = BTreeMap<NaiveDate, DayBucket>;

/// Group commits by the calendar date of their author timestamp.
///
/// The date is taken in the offset the timestamp was recorded with, not
/// converted to UTC. Commits without an author name count towards
/// [`UNKNOWN_AUTHOR`].
pub fn aggregate_by_day(commits: &[RawCommit]) -> DailyActivity {
    let mut days = DailyActivity::new();
    for commit in commits {
        let author = commit.author_name.as_deref().unwrap_or(UNKNOWN_AUTHOR);
        days.entry(commit.authored_at.date_naive())
            .or_default()
            .record(author);
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::testing::commit;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
    }

    #[test]
    fn empty_input_gives_empty_map() {
        assert!(aggregate_by_day(&[]).is_empty());
    }

    #[test]
    fn groups_by_day_and_collects_distinct_authors() {
        let commits = vec![
            commit(Some("Alice"), "2024-03-05T10:00:00Z"),
            commit(Some("Alice"), "2024-03-05T14:00:00Z"),
            commit(None, "2024-03-06T09:00:00Z"),
        ];

        let days = aggregate_by_day(&commits);

        assert_eq!(days.len(), 2);
        let first = &days[&date("2024-03-05")];
        assert_eq!(first.commits, 2);
        assert_eq!(first.authors, BTreeSet::from(["Alice".to_string()]));
        let second = &days[&date("2024-03-06")];
        assert_eq!(second.commits, 1);
        assert_eq!(second.authors, BTreeSet::from([UNKNOWN_AUTHOR.to_string()]));
    }

    #[test]
    fn anonymous_commits_collapse_into_one_author() {
        let commits = vec![
            commit(None, "2024-03-05T10:00:00Z"),
            commit(None, "2024-03-05T11:00:00Z"),
        ];

        let days = aggregate_by_day(&commits);
        let bucket = &days[&date("2024-03-05")];
        assert_eq!(bucket.commits, 2);
        assert_eq!(bucket.authors.len(), 1);
        assert!(bucket.authors.contains(UNKNOWN_AUTHOR));
    }

    #[test]
    fn commit_total_is_preserved() {
        let commits = vec![
            commit(Some("a"), "2024-01-01T00:00:00Z"),
            commit(Some("b"), "2024-01-01T23:59:59Z"),
            commit(Some("a"), "2024-01-02T00:00:00Z"),
            commit(None, "2024-01-03T12:00:00Z"),
            commit(Some("c"), "2024-01-03T12:00:00Z"),
        ];

        let days = aggregate_by_day(&commits);
        let total: usize = days.values().map(|b| b.commits).sum();
        assert_eq!(total, commits.len());
        assert!(days.values().all(|b| b.authors.len() <= b.commits));
    }

    #[test]
    fn date_uses_reported_offset() {
        // 23:30 at -02:00 is 01:30 UTC the next day.
        let commits = vec![commit(Some("Night Owl"), "2024-03-05T23:30:00-02:00")];

        let days = aggregate_by_day(&commits);
        assert!(days.contains_key(&date("2024-03-05")));
        assert!(!days.contains_key(&date("2024-03-06")));
    }

    #[test]
    fn same_input_gives_same_output() {
        let commits = vec![
            commit(Some("Bob"), "2024-03-05T10:00:00+05:30"),
            commit(Some("Carol"), "2024-03-05T11:00:00+05:30"),
        ];
        assert_eq!(aggregate_by_day(&commits), aggregate_by_day(&commits));
    }
}
