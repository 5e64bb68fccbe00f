//! Candidate acceptance predicate.

use crate::api::Candidate;
use crate::config::{COOLDOWN_HOURS, Criteria};
use crate::ledger::Ledger;
use chrono::{DateTime, Duration, Utc};

/// Re-invite cooldown window.
pub fn cooldown() -> Duration {
    Duration::hours(COOLDOWN_HOURS)
}

/// Decide whether `candidate` should be invited.
///
/// Pure and deterministic given its inputs; `now` is explicit so the
/// cooldown boundary is testable. Rules short-circuit in order: non-empty
/// id, level floor, login floor, optional exact language match, then the
/// cooldown against the ledger.
pub fn qualifies(
    candidate: &Candidate,
    criteria: &Criteria,
    ledger: &Ledger,
    now: DateTime<Utc>,
) -> bool {
    if candidate.id.is_empty() {
        return false;
    }
    if candidate.stats.lvl < criteria.min_level {
        return false;
    }
    if candidate.login_incentives < criteria.min_logins {
        return false;
    }
    if let Some(language) = &criteria.language {
        if &candidate.preferences.language != language {
            return false;
        }
    }
    if let Some(last_invite) = ledger.last_invite(&candidate.id) {
        if now.signed_duration_since(last_invite) < cooldown() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::ledger::InviteRecord;

    fn candidate(id: &str, lvl: u32, logins: u32, language: &str) -> Candidate {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "stats": { "lvl": lvl, "class": "rogue" },
            "loginIncentives": logins,
            "preferences": { "language": language },
            "profile": { "name": format!("user {id}") }
        }))
        .unwrap()
    }

    fn criteria(min_level: u32, min_logins: u32, language: Option<&str>) -> Criteria {
        Criteria {
            min_level,
            min_logins,
            language: language.map(str::to_owned),
        }
    }

    fn ledger_with(id: &str, last_invite_utc: DateTime<Utc>) -> Ledger {
        let mut ledger = Ledger::in_memory();
        ledger.record(
            id,
            InviteRecord {
                last_invite_utc,
                name: "prior".to_owned(),
                lvl: 1,
                logins: 1,
            },
        );
        ledger
    }

    #[test]
    fn empty_id_rejected() {
        let mut user = candidate("x", 50, 50, "en");
        user.id = String::new();
        assert!(!qualifies(
            &user,
            &criteria(0, 0, None),
            &Ledger::in_memory(),
            Utc::now()
        ));
    }

    #[test]
    fn level_below_minimum_rejected_regardless_of_other_fields() {
        let user = candidate("a", 2, 999, "en");
        assert!(!qualifies(
            &user,
            &criteria(3, 0, None),
            &Ledger::in_memory(),
            Utc::now()
        ));
    }

    #[test]
    fn logins_below_minimum_rejected() {
        let user = candidate("a", 99, 4, "en");
        assert!(!qualifies(
            &user,
            &criteria(0, 5, None),
            &Ledger::in_memory(),
            Utc::now()
        ));
    }

    #[test]
    fn language_mismatch_rejected_even_when_stats_pass() {
        let user = candidate("a", 99, 99, "en");
        assert!(!qualifies(
            &user,
            &criteria(3, 5, Some("fr")),
            &Ledger::in_memory(),
            Utc::now()
        ));
    }

    #[test]
    fn language_match_is_case_sensitive() {
        let user = candidate("a", 99, 99, "EN");
        assert!(!qualifies(
            &user,
            &criteria(0, 0, Some("en")),
            &Ledger::in_memory(),
            Utc::now()
        ));
    }

    #[test]
    fn recent_invite_rejected_even_when_all_else_passes() {
        let now = Utc::now();
        let user = candidate("a", 99, 99, "en");
        let ledger = ledger_with("a", now - Duration::hours(1));
        assert!(!qualifies(&user, &criteria(0, 0, None), &ledger, now));
    }

    #[test]
    fn invite_exactly_cooldown_plus_one_second_accepted() {
        let now = Utc::now();
        let user = candidate("a", 99, 99, "en");
        let ledger = ledger_with("a", now - cooldown() - Duration::seconds(1));
        assert!(qualifies(&user, &criteria(0, 0, None), &ledger, now));
    }

    #[test]
    fn invite_one_second_inside_cooldown_rejected() {
        let now = Utc::now();
        let user = candidate("a", 99, 99, "en");
        let ledger = ledger_with("a", now - cooldown() + Duration::seconds(1));
        assert!(!qualifies(&user, &criteria(0, 0, None), &ledger, now));
    }

    #[test]
    fn unknown_user_passes_cooldown_check() {
        let now = Utc::now();
        let user = candidate("b", 10, 10, "en");
        let ledger = ledger_with("a", now);
        assert!(qualifies(&user, &criteria(0, 0, None), &ledger, now));
    }
}
