//! Commit log parsing.
//!
//! The bridge asks git for one line per commit using [`LOG_PRETTY_FORMAT`], which wraps
//! every line in double quotes and separates hash, date, author and subject with
//! [`FIELD_DELIMITER`]. The delimiter was picked because it practically never shows up in
//! author names or commit subjects.

use chrono::{Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Separator between the fields of one log line.
pub const FIELD_DELIMITER: &str = " $|$ ";

/// `--pretty` argument for commit logs. The quotes are literal: git prints them.
pub const LOG_PRETTY_FORMAT: &str = "--pretty=format:\"%h $|$ %ad $|$ %an $|$ %s\"";

/// `--date` argument matching [`DATE_FORMAT`].
pub const LOG_DATE_FORMAT: &str = "--date=format-local:%Y-%m-%d %H:%M:%S";

/// chrono format of the `%ad` field produced by [`LOG_DATE_FORMAT`].
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp stored when the date field cannot be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub hash: String,
    /// ISO-8601 UTC timestamp, or [`INVALID_DATE`].
    pub timestamp: String,
    pub author: String,
    pub message: String,
}

/// Parse one log line. Returns `None` when the line has fewer than four fields.
///
/// Only the first three delimiters split fields; anything after the author is the
/// message, including literal delimiter tokens inside it.
pub fn parse_commit_line(line: &str) -> Option<CommitRecord> {
    let line = line.trim();
    let line = line.strip_prefix('"').unwrap_or(line);
    let line = line.strip_suffix('"').unwrap_or(line);

    let mut fields = line.splitn(4, FIELD_DELIMITER);
    let hash = fields.next()?;
    let date = fields.next()?;
    let author = fields.next()?;
    let message = fields.next()?;

    Some(CommitRecord {
        hash: hash.trim().to_string(),
        timestamp: normalize_timestamp(date),
        author: author.trim().to_string(),
        message: message.to_string(),
    })
}

/// Convert a local `YYYY-MM-DD HH:MM:SS` date into an ISO-8601 UTC timestamp.
pub fn normalize_timestamp(date: &str) -> String {
    let Ok(naive) = NaiveDateTime::parse_from_str(date.trim(), DATE_FORMAT) else {
        return INVALID_DATE.to_string();
    };
    // Ambiguous local times (DST fold) resolve to the earlier instant.
    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => local
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        None => INVALID_DATE.to_string(),
    }
}

/// Lazy iterator over the commit records of a log output.
///
/// Lines that do not have the expected shape are skipped with a warning.
pub struct CommitLog<I> {
    lines: I,
}

impl<'a, I> Iterator for CommitLog<I>
where
    I: Iterator<Item = &'a str>,
{
    type Item = CommitRecord;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_commit_line(line) {
                Some(record) => return Some(record),
                None => log::warn!("Skipping unexpected log line: {line:?}"),
            }
        }
        None
    }
}

/// Build a fresh [`CommitLog`] over borrowed output lines.
pub fn commit_log<'a, S>(lines: &'a [S]) -> CommitLog<impl Iterator<Item = &'a str>>
where
    S: AsRef<str> + 'a,
{
    CommitLog {
        lines: lines.iter().map(|line| line.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quoted_line() {
        let line = "\"abc123 $|$ 2024-01-15 10:30:00 $|$ Jane Doe $|$ Fix bug $|$ in parser\"";
        let record = parse_commit_line(line).unwrap();
        assert_eq!(record.hash, "abc123");
        assert_eq!(record.author, "Jane Doe");
        assert_eq!(record.message, "Fix bug $|$ in parser");
        assert_ne!(record.timestamp, INVALID_DATE);
    }

    #[test]
    fn test_parse_unquoted_line() {
        let record =
            parse_commit_line("9f8e7d6 $|$ 2023-12-31 23:59:59 $|$ Bob $|$ Year end").unwrap();
        assert_eq!(record.hash, "9f8e7d6");
        assert_eq!(record.author, "Bob");
        assert_eq!(record.message, "Year end");
    }

    #[test]
    fn test_message_keeps_partial_delimiter_text() {
        let record =
            parse_commit_line("\"a1 $|$ 2024-02-01 08:00:00 $|$ Ann $|$ cost is $5|$6\"").unwrap();
        assert_eq!(record.message, "cost is $5|$6");
    }

    #[test]
    fn test_invalid_date_is_kept_as_marker() {
        let record = parse_commit_line("\"a1 $|$ not-a-date $|$ Ann $|$ msg\"").unwrap();
        assert_eq!(record.timestamp, INVALID_DATE);
        assert_eq!(record.message, "msg");
    }

    #[test]
    fn test_timestamp_is_iso_utc() {
        let timestamp = normalize_timestamp("2024-01-15 10:30:00");
        assert!(timestamp.ends_with('Z'), "got {timestamp}");
        assert!(chrono::DateTime::parse_from_rfc3339(&timestamp).is_ok());
        assert_eq!(timestamp.len(), "2024-01-15T10:30:00.000Z".len());
    }

    #[test]
    fn test_short_line_is_rejected() {
        assert!(parse_commit_line("\"abc123 $|$ 2024-01-15 10:30:00\"").is_none());
        assert!(parse_commit_line("").is_none());
    }

    #[test]
    fn test_commit_log_skips_bad_lines_and_restarts() {
        let lines = vec![
            "\"a1 $|$ 2024-01-01 00:00:00 $|$ Ann $|$ first\"".to_string(),
            "garbage".to_string(),
            String::new(),
            "\"b2 $|$ 2024-01-02 00:00:00 $|$ Ben $|$ second\"".to_string(),
        ];
        let hashes: Vec<_> = commit_log(&lines).map(|c| c.hash).collect();
        assert_eq!(hashes, vec!["a1", "b2"]);

        // A new call starts from the top again.
        assert_eq!(commit_log(&lines).count(), 2);
    }
}
