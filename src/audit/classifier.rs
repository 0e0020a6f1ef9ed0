//! Inactivity classification of directory users.

use std::fmt;

use chrono::{NaiveDateTime, Utc};
use tracing::debug;

use crate::identity::UserRecord;

/// Fixed format of login timestamps reported by the identity domain.
pub const LOGIN_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

const SECONDS_PER_DAY: i64 = 86_400;

/// Activity state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityState {
    /// Logged in within the threshold.
    Active,
    /// Valid login timestamp older than the threshold.
    Dormant,
    /// No usable login timestamp.
    Inactive,
}

impl ActivityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Dormant => "Dormant",
            Self::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived classification of one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub state: ActivityState,

    /// Whole days since last login; `None` when the state is `Inactive`.
    pub days_since_login: Option<i64>,
}

impl Classification {
    fn inactive() -> Self {
        Self {
            state: ActivityState::Inactive,
            days_since_login: None,
        }
    }
}

/// A fetched user paired with its classification and 1-based fetch rank.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedUser {
    pub rank: usize,
    pub record: UserRecord,
    pub classification: Classification,
}

/// Reference instant for a run: UTC, without offset, evaluated once.
pub fn run_clock() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Fixed-width part of a login timestamp; `0` marks a digit.
const LOGIN_TIMESTAMP_PREFIX: &[u8] = b"0000-00-00T00:00:00";

/// Longest accepted fractional-seconds part.
const MAX_FRACTION_DIGITS: usize = 6;

/// Whether `raw` has the exact `YYYY-MM-DDTHH:MM:SS.ffffffZ` shape, with 1 to 6
/// fraction digits and nothing around it.
fn has_login_timestamp_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    if bytes.len() < LOGIN_TIMESTAMP_PREFIX.len() {
        return false;
    }

    let (prefix, rest) = bytes.split_at(LOGIN_TIMESTAMP_PREFIX.len());
    let prefix_ok = prefix
        .iter()
        .zip(LOGIN_TIMESTAMP_PREFIX)
        .all(|(b, expected)| match expected {
            b'0' => b.is_ascii_digit(),
            _ => b == expected,
        });
    if !prefix_ok {
        return false;
    }

    match rest {
        [b'.', fraction @ .., b'Z'] => {
            (1..=MAX_FRACTION_DIGITS).contains(&fraction.len())
                && fraction.iter().all(u8::is_ascii_digit)
        }
        _ => false,
    }
}

/// Parse a login timestamp; `None` if it does not match the fixed format.
pub fn parse_login_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if !has_login_timestamp_shape(raw) {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, LOGIN_TIMESTAMP_FORMAT).ok()
}

/// Classify a single record against `now` and the inactivity threshold.
pub fn classify(record: &UserRecord, now: NaiveDateTime, threshold_days: u32) -> Classification {
    let Some(raw) = record.last_successful_login.as_deref() else {
        return Classification::inactive();
    };

    let Some(last_login) = parse_login_timestamp(raw) else {
        debug!("Unparseable login timestamp for {}: {:?}", record.name, raw);
        return Classification::inactive();
    };

    // Floor division: a login less than a full day ago counts as 0 days
    let days = (now - last_login).num_seconds().div_euclid(SECONDS_PER_DAY);

    let state = if days > i64::from(threshold_days) {
        ActivityState::Dormant
    } else {
        ActivityState::Active
    };

    Classification {
        state,
        days_since_login: Some(days),
    }
}

/// Classify every fetched user, keeping the provider's order.
pub fn classify_all(
    users: Vec<UserRecord>,
    now: NaiveDateTime,
    threshold_days: u32,
) -> Vec<ClassifiedUser> {
    users
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            let classification = classify(&record, now, threshold_days);
            ClassifiedUser {
                rank: idx + 1,
                record,
                classification,
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    pub(crate) fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_milli_opt(12, 0, 0, 0)
            .unwrap()
    }

    pub(crate) fn login_days_ago(days: i64) -> String {
        (fixed_now() - Duration::days(days))
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string()
    }

    pub(crate) fn user(name: &str, active: bool, last_login: Option<String>) -> UserRecord {
        UserRecord {
            id: format!("ocid1.user.oc1..{}", name),
            name: name.to_string(),
            is_active: active,
            last_successful_login: last_login,
            created_at: Some("2023-01-01T00:00:00.000Z".to_string()),
            domain_id: Some("ocid1.domain.oc1..test".to_string()),
        }
    }

    #[test]
    fn test_threshold_boundary_is_active() {
        let record = user("alice", true, Some(login_days_ago(60)));
        let c = classify(&record, fixed_now(), 60);
        assert_eq!(c.state, ActivityState::Active);
        assert_eq!(c.days_since_login, Some(60));
    }

    #[test]
    fn test_one_day_past_threshold_is_dormant() {
        let record = user("bob", true, Some(login_days_ago(61)));
        let c = classify(&record, fixed_now(), 60);
        assert_eq!(c.state, ActivityState::Dormant);
        assert_eq!(c.days_since_login, Some(61));
    }

    #[test]
    fn test_partial_days_truncate() {
        // 60 days and 23 hours is still 60 whole days
        let last = fixed_now() - Duration::days(60) - Duration::hours(23);
        let record = user(
            "carol",
            true,
            Some(last.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
        );
        let c = classify(&record, fixed_now(), 60);
        assert_eq!(c.days_since_login, Some(60));
        assert_eq!(c.state, ActivityState::Active);
    }

    #[test]
    fn test_missing_login_is_inactive() {
        let record = user("dave", true, None);
        let c = classify(&record, fixed_now(), 60);
        assert_eq!(c.state, ActivityState::Inactive);
        assert_eq!(c.days_since_login, None);
    }

    #[test]
    fn test_malformed_login_is_inactive() {
        for raw in [
            "not a date",
            "",
            "2024-01-01",
            "2024-01-01T00:00:00Z",
            "2024-13-01T00:00:00.000Z",
            "2024-01-01 00:00:00.000",
            "2024-01-01T00:00:00.1234567Z",
            " 2024-01-01T00:00:00.000Z",
            "2024-01-01T00:00:00.000Z ",
            "2024-1-1T00:00:00.000Z",
            "2024-01-01T00:00:00.Z",
            "2024-01-01T00:00:00.000",
            "2024-01-01T00:00:00.000+00:00",
        ] {
            let record = user("erin", true, Some(raw.to_string()));
            let c = classify(&record, fixed_now(), 60);
            assert_eq!(c.state, ActivityState::Inactive, "input {:?}", raw);
            assert_eq!(c.days_since_login, None);
        }
    }

    #[test]
    fn test_inactive_regardless_of_active_flag() {
        let record = user("frank", false, Some("garbage".into()));
        assert_eq!(
            classify(&record, fixed_now(), 60).state,
            ActivityState::Inactive
        );
    }

    #[test]
    fn test_future_login_is_active() {
        let last = fixed_now() + Duration::hours(2);
        let record = user(
            "grace",
            true,
            Some(last.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
        );
        let c = classify(&record, fixed_now(), 60);
        assert_eq!(c.state, ActivityState::Active);
        assert_eq!(c.days_since_login, Some(-1));
    }

    #[test]
    fn test_parse_microsecond_precision() {
        assert!(parse_login_timestamp("2023-12-04T10:11:12.123456Z").is_some());
        assert!(parse_login_timestamp("2023-12-04T10:11:12.1Z").is_some());
    }

    #[test]
    fn test_classification_is_idempotent() {
        let users = vec![
            user("a", true, Some(login_days_ago(10))),
            user("b", true, Some(login_days_ago(90))),
            user("c", true, None),
            user("d", false, Some("bad".into())),
        ];

        let first = classify_all(users.clone(), fixed_now(), 60);
        let second = classify_all(users, fixed_now(), 60);
        assert_eq!(first, second);
    }

    #[test]
    fn test_classify_all_ranks_in_fetch_order() {
        let users = vec![
            user("zed", true, None),
            user("amy", true, Some(login_days_ago(1))),
        ];
        let classified = classify_all(users, fixed_now(), 60);

        assert_eq!(classified.len(), 2);
        assert_eq!(classified[0].rank, 1);
        assert_eq!(classified[0].record.name, "zed");
        assert_eq!(classified[1].rank, 2);
        assert_eq!(classified[1].classification.state, ActivityState::Active);
    }
}
