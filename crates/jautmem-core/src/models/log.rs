use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Entries of one calendar day's log, without the file header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLog {
    pub date: NaiveDate,
    pub content: String,
}

/// Concatenate logs in the order given, each under a `### YYYY-MM-DD` heading.
pub fn render_logs(logs: &[DailyLog]) -> String {
    logs.iter()
        .map(|log| format!("### {}\n{}", log.date.format("%Y-%m-%d"), log.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_logs() {
        let logs = vec![
            DailyLog {
                date: NaiveDate::from_ymd_opt(2025, 1, 30).unwrap(),
                content: "## 10:00:00 - Activity\n\nposted".to_string(),
            },
            DailyLog {
                date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
                content: "## 11:00:00 - Activity\n\nreplied".to_string(),
            },
        ];
        assert_eq!(
            render_logs(&logs),
            "### 2025-01-30\n## 10:00:00 - Activity\n\nposted\n\n### 2025-01-31\n## 11:00:00 - Activity\n\nreplied"
        );
        assert_eq!(render_logs(&[]), "");
    }
}
