//! Cycle driver and scheduling loop.
//!
//! One cycle is fetch → filter → log → invite → persist. The loop runs a
//! cycle immediately at startup and then once per interval, awaiting each
//! cycle to completion before arming the next tick, so cycles can never
//! overlap even when one runs long.

use crate::api::{ApiClient, Candidate};
use crate::config::Criteria;
use crate::error::Result;
use crate::filter::qualifies;
use crate::ledger::{InviteRecord, Ledger};
use crate::logs::{CycleLogs, SeenUser};
use chrono::Utc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Outcome of one completed cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Candidates returned by the fetch.
    pub seen: usize,
    /// Ids submitted in this cycle's invite batch.
    pub invited: Vec<String>,
}

/// Owns the client, ledger, criteria and logs, and runs the polling loop.
pub struct Driver {
    api: ApiClient,
    ledger: Ledger,
    criteria: Criteria,
    logs: CycleLogs,
    fetch_interval: Duration,
}

impl Driver {
    pub fn new(
        api: ApiClient,
        ledger: Ledger,
        criteria: Criteria,
        logs: CycleLogs,
        fetch_interval: Duration,
    ) -> Self {
        Self {
            api,
            ledger,
            criteria,
            logs,
            fetch_interval,
        }
    }

    /// Current ledger state.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Run cycles forever. Errors are logged and never abort the loop;
    /// the process only stops by external termination.
    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(self.fetch_interval);
        // A long cycle delays the next tick instead of bursting to catch up.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // First tick completes immediately, so the first cycle runs at
            // startup.
            interval.tick().await;
            info!("fetching users and inviting them to party");
            match self.run_cycle().await {
                Ok(report) if report.invited.is_empty() => {
                    info!(
                        "no users to invite (saw {} users), retry in {}s",
                        report.seen,
                        self.fetch_interval.as_secs()
                    );
                }
                Ok(report) => {
                    info!(
                        "invited {} user(s), relaunching in {}s",
                        report.invited.len(),
                        self.fetch_interval.as_secs()
                    );
                }
                Err(e) => {
                    error!("cycle failed: {e}");
                    self.logs.record_error("cycle failed", &e);
                }
            }
        }
    }

    /// Execute one cycle against the current ledger snapshot.
    ///
    /// A fetch or invite error propagates with the ledger untouched. The
    /// seen-users entry is written after filtering and before submission,
    /// so `invitedThisTime` reflects selection rather than confirmed
    /// delivery.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let candidates = self.api.fetch_candidates().await?;
        let now = Utc::now();

        let invitees: Vec<&Candidate> = candidates
            .iter()
            .filter(|candidate| qualifies(candidate, &self.criteria, &self.ledger, now))
            .collect();

        if !candidates.is_empty() {
            let rows: Vec<SeenUser> = candidates
                .iter()
                .map(|candidate| {
                    let selected = invitees
                        .iter()
                        .any(|invitee| invitee.id == candidate.id);
                    SeenUser::from_candidate(candidate, selected)
                })
                .collect();
            self.logs.record_seen(&rows)?;
        }

        if invitees.is_empty() {
            return Ok(CycleReport {
                seen: candidates.len(),
                invited: Vec::new(),
            });
        }

        let ids: Vec<String> = invitees.iter().map(|c| c.id.clone()).collect();
        self.api.submit_invites(&ids).await?;

        let invited_at = Utc::now();
        for invitee in &invitees {
            self.ledger.record(
                invitee.id.clone(),
                InviteRecord {
                    last_invite_utc: invited_at,
                    name: invitee.profile.name.clone(),
                    lvl: invitee.stats.lvl,
                    logins: invitee.login_incentives,
                },
            );
        }

        // A failed save is recoverable: the in-memory ledger keeps the new
        // records, and the file catches up on the next successful save.
        if let Err(e) = self.ledger.save() {
            error!("cannot persist ledger: {e}");
            self.logs.record_error("cannot persist ledger", &e);
        }

        Ok(CycleReport {
            seen: candidates.len(),
            invited: ids,
        })
    }
}
