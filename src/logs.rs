//! Cycle log files.
//!
//! Two append-only files under the log directory, both truncated when the
//! process starts:
//!
//! - `seenUserData.log` — one timestamped pretty-JSON array per cycle,
//!   listing every candidate seen and whether it was selected this time;
//! - `errors.log` — timestamped `{ message, detail }` entries for any
//!   fetch/invite/persistence failure.
//!
//! Entry format is `<RFC 3339>: <pretty JSON>\n`, matching the historical
//! log layout. Note `invitedThisTime` records filter selection, written
//! before submission is confirmed; a later submission failure does not
//! rewrite the entry.

use crate::api::Candidate;
use crate::error::{InviteError, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One seen-users log row.
#[derive(Debug, Serialize)]
pub struct SeenUser {
    pub name: String,
    #[serde(rename = "invitedThisTime")]
    pub invited_this_time: bool,
    pub lvl: u32,
    pub logins: u32,
    pub class: String,
    pub language: String,
    pub id: String,
}

impl SeenUser {
    /// Build a row from a candidate and its filter outcome.
    pub fn from_candidate(candidate: &Candidate, invited_this_time: bool) -> Self {
        Self {
            name: candidate.profile.name.clone(),
            invited_this_time,
            lvl: candidate.stats.lvl,
            logins: candidate.login_incentives,
            class: candidate.stats.class.clone(),
            language: candidate.preferences.language.clone(),
            id: candidate.id.clone(),
        }
    }
}

/// Writers for the seen-users and error logs.
#[derive(Debug)]
pub struct CycleLogs {
    seen_path: PathBuf,
    error_path: PathBuf,
}

impl CycleLogs {
    /// Create the log directory and truncate both files.
    pub fn open(log_dir: impl AsRef<Path>) -> Result<Self> {
        let log_dir = log_dir.as_ref();
        std::fs::create_dir_all(log_dir)
            .map_err(|e| InviteError::Log(format!("cannot create log dir: {e}")))?;

        let seen_path = log_dir.join("seenUserData.log");
        let error_path = log_dir.join("errors.log");
        std::fs::write(&seen_path, "")
            .map_err(|e| InviteError::Log(format!("cannot truncate seen log: {e}")))?;
        std::fs::write(&error_path, "")
            .map_err(|e| InviteError::Log(format!("cannot truncate error log: {e}")))?;

        Ok(Self {
            seen_path,
            error_path,
        })
    }

    /// Append this cycle's seen-users entry.
    pub fn record_seen(&self, users: &[SeenUser]) -> Result<()> {
        let json = serde_json::to_string_pretty(users)
            .map_err(|e| InviteError::Log(format!("cannot serialize seen users: {e}")))?;
        append_entry(&self.seen_path, &json)
            .map_err(|e| InviteError::Log(format!("cannot write seen log: {e}")))
    }

    /// Append an error entry. Best-effort: a failing error log must never
    /// fail the cycle, so write problems are only warned about.
    pub fn record_error(&self, context: &str, error: &InviteError) {
        let entry = serde_json::json!({
            "message": context,
            "detail": error.to_string(),
        });
        let json = match serde_json::to_string_pretty(&entry) {
            Ok(json) => json,
            Err(e) => {
                warn!("cannot serialize error log entry: {e}");
                return;
            }
        };
        if let Err(e) = append_entry(&self.error_path, &json) {
            warn!("cannot write error log: {e}");
        }
    }
}

fn append_entry(path: &Path, json: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}: {json}", Utc::now().to_rfc3339())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn seen(id: &str, invited: bool) -> SeenUser {
        SeenUser {
            name: format!("user {id}"),
            invited_this_time: invited,
            lvl: 10,
            logins: 20,
            class: "healer".to_owned(),
            language: "en".to_owned(),
            id: id.to_owned(),
        }
    }

    #[test]
    fn open_truncates_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("seenUserData.log"), "stale").unwrap();
        std::fs::write(dir.path().join("errors.log"), "stale").unwrap();

        let _logs = CycleLogs::open(dir.path()).unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("seenUserData.log")).unwrap(),
            ""
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("errors.log")).unwrap(),
            ""
        );
    }

    #[test]
    fn seen_entries_accumulate_with_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let logs = CycleLogs::open(dir.path()).unwrap();

        logs.record_seen(&[seen("a", true), seen("b", false)]).unwrap();
        logs.record_seen(&[seen("a", false)]).unwrap();

        let contents = std::fs::read_to_string(dir.path().join("seenUserData.log")).unwrap();
        assert_eq!(contents.matches("\"invitedThisTime\": true").count(), 1);
        assert_eq!(contents.matches("\"invitedThisTime\": false").count(), 2);
        // Each entry opens with an RFC 3339 UTC timestamp.
        assert_eq!(contents.matches("+00:00: [").count(), 2);
    }

    #[test]
    fn error_entries_carry_message_and_detail() {
        let dir = tempfile::tempdir().unwrap();
        let logs = CycleLogs::open(dir.path()).unwrap();

        logs.record_error(
            "failed to fetch LFP users",
            &InviteError::Fetch("timed out".to_owned()),
        );

        let contents = std::fs::read_to_string(dir.path().join("errors.log")).unwrap();
        assert!(contents.contains("failed to fetch LFP users"));
        assert!(contents.contains("fetch error: timed out"));
    }
}
