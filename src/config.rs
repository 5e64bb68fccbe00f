//! Startup configuration built once from command-line arguments.
//!
//! All settings are immutable after parsing; the rest of the crate
//! receives them by reference or by value, never through globals.

use crate::error::{InviteError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Minimum allowed polling interval, matching Habitica's API rate policy.
pub const MIN_FETCH_INTERVAL_SECS: u64 = 30;

/// Default polling interval in seconds.
pub const DEFAULT_FETCH_INTERVAL_SECS: u64 = 60;

/// Cooldown before a previously-invited user may be invited again.
///
/// This is a courtesy to potential invitees; do not reduce it.
pub const COOLDOWN_HOURS: i64 = 36;

/// A Habitica API identity (user id + key), passed through opaquely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiIdentity {
    pub api_user: String,
    pub api_key: String,
}

/// Candidate acceptance thresholds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Criteria {
    /// Minimum character level.
    pub min_level: u32,
    /// Minimum login-incentive count.
    pub min_logins: u32,
    /// Required preference language (exact, case-sensitive); `None` accepts any.
    pub language: Option<String>,
}

/// Full startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Identity used for the fetch call (and invites, absent an inviter).
    pub admin: ApiIdentity,
    /// Optional alternate identity used only for the invite call.
    pub inviter: Option<ApiIdentity>,
    /// Seconds between cycles.
    pub fetch_interval_secs: u64,
    /// Filter thresholds.
    pub criteria: Criteria,
    /// Directory holding the invite ledger file.
    pub data_dir: PathBuf,
    /// Directory holding the seen-users and error logs.
    pub log_dir: PathBuf,
}

impl AppConfig {
    /// Parse configuration from CLI arguments (program name already stripped).
    ///
    /// Each flag consumes the following token. Unknown flags, missing
    /// values, missing admin credentials, a half-configured inviter
    /// identity, or an interval below [`MIN_FETCH_INTERVAL_SECS`] are
    /// startup validation errors.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();

        let mut admin_user = String::new();
        let mut admin_key = String::new();
        let mut inviter_user = String::new();
        let mut inviter_key = String::new();
        let mut fetch_interval_secs = DEFAULT_FETCH_INTERVAL_SECS;
        let mut criteria = Criteria::default();
        let mut data_dir = PathBuf::from("data");
        let mut log_dir = PathBuf::from("logs");

        let mut idx = 0;
        while idx < args.len() {
            let flag = args[idx].as_str();
            let value = args.get(idx + 1).cloned().ok_or_else(|| {
                InviteError::Config(format!("flag {flag} requires a value"))
            })?;

            match flag {
                "--admin-api-user" => admin_user = value,
                "--admin-api-key" => admin_key = value,
                "--inviter-api-user" => inviter_user = value,
                "--inviter-api-key" => inviter_key = value,
                "--fetch-interval" => {
                    fetch_interval_secs = value.parse().map_err(|_| {
                        InviteError::Config(format!("invalid --fetch-interval: {value}"))
                    })?;
                }
                "--min-lvl" => {
                    criteria.min_level = value.parse().map_err(|_| {
                        InviteError::Config(format!("invalid --min-lvl: {value}"))
                    })?;
                }
                "--min-logins" => {
                    criteria.min_logins = value.parse().map_err(|_| {
                        InviteError::Config(format!("invalid --min-logins: {value}"))
                    })?;
                }
                "--language" => criteria.language = Some(value),
                "--data-dir" => data_dir = PathBuf::from(value),
                "--log-dir" => log_dir = PathBuf::from(value),
                other => {
                    return Err(InviteError::Config(format!("unknown flag: {other}")));
                }
            }
            idx += 2;
        }

        if fetch_interval_secs < MIN_FETCH_INTERVAL_SECS {
            return Err(InviteError::Config(format!(
                "fetch interval must be at least {MIN_FETCH_INTERVAL_SECS} seconds \
                 (official Habitica API requirement)"
            )));
        }

        if admin_user.is_empty() || admin_key.is_empty() {
            return Err(InviteError::Config(
                "you must provide your API user and key \
                 (use --admin-api-user and --admin-api-key)"
                    .to_owned(),
            ));
        }

        let inviter = match (inviter_user.is_empty(), inviter_key.is_empty()) {
            (true, true) => None,
            (false, false) => Some(ApiIdentity {
                api_user: inviter_user,
                api_key: inviter_key,
            }),
            _ => {
                return Err(InviteError::Config(
                    "--inviter-api-user and --inviter-api-key must be given together"
                        .to_owned(),
                ));
            }
        };

        Ok(Self {
            admin: ApiIdentity {
                api_user: admin_user,
                api_key: admin_key,
            },
            inviter,
            fetch_interval_secs,
            criteria,
            data_dir,
            log_dir,
        })
    }

    /// Path of the persisted invite ledger file.
    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("invitedUsers.json")
    }
}
