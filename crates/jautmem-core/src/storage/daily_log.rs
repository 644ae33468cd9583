//! Append-only per-agent, per-day logs.
//!
//! Each day lives in `<agent>/memory/YYYY-MM-DD.md`. There is no update or
//! delete path; old days are archived by hand if at all.

use chrono::{DateTime, Days, NaiveDate, Utc};
use jautmem_storage::paths;
use std::path::{Path, PathBuf};

use super::{append_to, count_markdown_files, read_or_empty};
use crate::error::MemoryResult;
use crate::models::{DailyLog, validate_agent};

const LOGS_DIR: &str = "memory";

/// File-backed daily log store rooted at the memory root directory.
#[derive(Debug, Clone)]
pub struct DailyLogStore {
    root: PathBuf,
}

impl DailyLogStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding an agent's daily logs
    pub fn logs_dir(&self, agent: &str) -> MemoryResult<PathBuf> {
        let agent = validate_agent(agent)?;
        Ok(paths::agent_dir(&self.root, agent).join(LOGS_DIR))
    }

    /// Path of one day's log
    pub fn log_path(&self, agent: &str, date: NaiveDate) -> MemoryResult<PathBuf> {
        Ok(self
            .logs_dir(agent)?
            .join(format!("{}.md", date.format("%Y-%m-%d"))))
    }

    /// Append one entry to the log for the entry's calendar date (UTC).
    ///
    /// The day's file is created with a header on first write. Returns the
    /// file the entry went to.
    pub fn append(
        &self,
        agent: &str,
        timestamp: DateTime<Utc>,
        category: &str,
        text: &str,
    ) -> MemoryResult<PathBuf> {
        let date = timestamp.date_naive();
        let path = self.log_path(agent, date)?;

        if !path.exists() {
            append_to(&path, &day_header(date))?;
        }

        let entry = format!(
            "\n## {} - {}\n\n{}\n",
            timestamp.format("%H:%M:%S"),
            category.trim(),
            text.trim_end()
        );
        append_to(&path, &entry)?;

        tracing::debug!(
            agent = %agent,
            date = %date,
            category = %category,
            "Appended daily log entry"
        );

        Ok(path)
    }

    /// Logs for the last `n_days` calendar days up to today (UTC), oldest first.
    pub fn read_recent(&self, agent: &str, n_days: u32) -> MemoryResult<Vec<DailyLog>> {
        self.read_recent_as_of(agent, Utc::now().date_naive(), n_days)
    }

    /// Logs for `today` and the `n_days - 1` days before it, oldest first.
    ///
    /// Days without a log, or whose log has no entries, are skipped.
    pub fn read_recent_as_of(
        &self,
        agent: &str,
        today: NaiveDate,
        n_days: u32,
    ) -> MemoryResult<Vec<DailyLog>> {
        let mut logs = Vec::new();

        for offset in (0..n_days).rev() {
            let Some(date) = today.checked_sub_days(Days::new(u64::from(offset))) else {
                continue;
            };
            let path = self.log_path(agent, date)?;
            if let Some(content) = read_entries(&path)? {
                logs.push(DailyLog { date, content });
            }
        }

        Ok(logs)
    }

    /// Number of daily log files an agent has
    pub fn count_logs(&self, agent: &str) -> MemoryResult<u32> {
        count_markdown_files(&self.logs_dir(agent)?)
    }
}

fn day_header(date: NaiveDate) -> String {
    format!(
        "# Daily Log - {}\n\n> Raw observations and activities for the day.\n> Important things get promoted to memory.md\n",
        date.format("%Y-%m-%d")
    )
}

/// Entries of a day file with the header stripped, or `None` if there are none.
fn read_entries(path: &Path) -> MemoryResult<Option<String>> {
    let content = read_or_empty(path)?;
    let entries_start = if content.starts_with("## ") {
        Some(0)
    } else {
        content.find("\n## ").map(|index| index + 1)
    };

    Ok(entries_start.map(|start| content[start..].trim_end().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_append_creates_day_file_with_header() {
        let tmp = tempdir().unwrap();
        let store = DailyLogStore::new(tmp.path());

        let path = store
            .append("Cynix", at(2025, 1, 31, 9), "Activity", "Posted about coffee")
            .unwrap();
        store
            .append("Cynix", at(2025, 1, 31, 10), "Comment", "Replied to Nova")
            .unwrap();

        assert!(path.ends_with("agents/Cynix/memory/2025-01-31.md"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Daily Log - 2025-01-31"));
        assert!(content.contains("\n## 09:00:00 - Activity\n\nPosted about coffee\n"));
        assert!(content.contains("\n## 10:00:00 - Comment\n\nReplied to Nova\n"));
        assert_eq!(content.matches("# Daily Log").count(), 1);
    }

    #[test]
    fn test_read_recent_returns_only_window_oldest_first() {
        let tmp = tempdir().unwrap();
        let store = DailyLogStore::new(tmp.path());

        for day in 25..=31 {
            store
                .append("Cynix", at(2025, 1, day, 12), "Activity", &format!("day {day}"))
                .unwrap();
        }

        let logs = store
            .read_recent_as_of("Cynix", date(2025, 1, 31), 2)
            .unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].date, date(2025, 1, 30));
        assert_eq!(logs[1].date, date(2025, 1, 31));
        assert!(logs[0].content.starts_with("## 12:00:00 - Activity"));
        assert!(logs[0].content.contains("day 30"));
        assert!(!logs[0].content.contains("Daily Log"));
        assert!(logs[1].content.contains("day 31"));
    }

    #[test]
    fn test_read_recent_skips_missing_days() {
        let tmp = tempdir().unwrap();
        let store = DailyLogStore::new(tmp.path());
        store
            .append("Cynix", at(2025, 1, 29, 12), "Activity", "older")
            .unwrap();
        store
            .append("Cynix", at(2025, 1, 31, 12), "Activity", "today")
            .unwrap();

        let logs = store
            .read_recent_as_of("Cynix", date(2025, 1, 31), 3)
            .unwrap();
        let dates: Vec<_> = logs.iter().map(|log| log.date).collect();
        assert_eq!(dates, [date(2025, 1, 29), date(2025, 1, 31)]);
    }

    #[test]
    fn test_brand_new_agent_has_no_logs() {
        let tmp = tempdir().unwrap();
        let store = DailyLogStore::new(tmp.path());
        assert!(store.read_recent("Fresh", 2).unwrap().is_empty());
        assert_eq!(store.count_logs("Fresh").unwrap(), 0);
    }

    #[test]
    fn test_count_logs() {
        let tmp = tempdir().unwrap();
        let store = DailyLogStore::new(tmp.path());
        store.append("Cynix", at(2025, 1, 30, 12), "A", "x").unwrap();
        store.append("Cynix", at(2025, 1, 31, 12), "A", "y").unwrap();
        store.append("Cynix", at(2025, 1, 31, 13), "A", "z").unwrap();
        assert_eq!(store.count_logs("Cynix").unwrap(), 2);
    }

    #[test]
    fn test_invalid_agent_rejected() {
        let tmp = tempdir().unwrap();
        let store = DailyLogStore::new(tmp.path());
        assert!(store.append("../x", at(2025, 1, 31, 12), "A", "x").is_err());
    }
}
