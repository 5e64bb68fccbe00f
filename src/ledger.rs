//! Persisted invite ledger.
//!
//! A flat map of user id → last-invite record, stored as pretty-printed
//! JSON. Loaded once at startup (missing file ⇒ empty ledger) and fully
//! rewritten after every successful invite batch. Rewrites go through a
//! temp-file-then-rename so a crash mid-write cannot truncate the file.
//!
//! On-disk field names (`lastInviteUTC`, `lvl`, `logins`) match the
//! historical ledger format, so existing files load unchanged.

use crate::error::{InviteError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One previously-invited user. Overwritten on re-invite, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteRecord {
    /// Instant of the most recent invite.
    #[serde(rename = "lastInviteUTC")]
    pub last_invite_utc: DateTime<Utc>,
    /// Display name at invite time.
    pub name: String,
    /// Level at invite time.
    pub lvl: u32,
    /// Login-incentive count at invite time.
    pub logins: u32,
}

/// Durable record of who has recently been invited.
#[derive(Debug, Default)]
pub struct Ledger {
    entries: BTreeMap<String, InviteRecord>,
    path: Option<PathBuf>,
}

impl Ledger {
    /// In-memory ledger with no backing file; saves are no-ops.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the ledger from `path`. A missing file yields an empty ledger
    /// bound to that path; an unreadable or unparsable file is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                InviteError::Ledger(format!("cannot parse {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(InviteError::Ledger(format!(
                    "cannot read {}: {e}",
                    path.display()
                )));
            }
        };

        Ok(Self {
            entries,
            path: Some(path),
        })
    }

    /// Instant of the last invite sent to `id`, if any.
    pub fn last_invite(&self, id: &str) -> Option<DateTime<Utc>> {
        self.entries.get(id).map(|record| record.last_invite_utc)
    }

    /// Full record for `id`, if any.
    pub fn get(&self, id: &str) -> Option<&InviteRecord> {
        self.entries.get(id)
    }

    /// Insert or refresh the record for `id`. Does not persist.
    pub fn record(&mut self, id: impl Into<String>, record: InviteRecord) {
        self.entries.insert(id.into(), record);
    }

    /// Number of users ever invited.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no user has ever been invited.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite the backing file wholesale via temp-file-then-rename.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        write_atomic(path, &self.entries)
    }
}

/// Serialize `entries` to pretty JSON and atomically replace `path`.
fn write_atomic(path: &Path, entries: &BTreeMap<String, InviteRecord>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| InviteError::Ledger(format!("cannot create ledger dir: {e}")))?;
    }

    let json = serde_json::to_string_pretty(entries)
        .map_err(|e| InviteError::Ledger(format!("cannot serialize ledger: {e}")))?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, &json)
        .map_err(|e| InviteError::Ledger(format!("cannot write ledger tmp: {e}")))?;
    std::fs::rename(&tmp_path, path)
        .map_err(|e| InviteError::Ledger(format!("cannot rename ledger: {e}")))?;

    Ok(())
}
