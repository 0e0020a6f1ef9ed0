//! Inactivity audit engine.
//!
//! A run fetches every user once, classifies each against a single clock
//! reading, selects disable candidates and applies the change per user.

pub mod classifier;
pub mod disabler;
pub mod summary;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::error::IdentityError;
use crate::identity::IdentityStore;

pub use classifier::{ActivityState, ClassifiedUser};
pub use disabler::{DisableCandidate, DisableOutcome, DisableStatus};
pub use summary::Summary;

/// Options a run is executed with.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    pub threshold_days: u32,
    pub dry_run: bool,
}

/// State of one audit run.
#[derive(Debug)]
pub struct AuditRun {
    pub options: AuditOptions,
    pub users: Vec<ClassifiedUser>,
    pub summary: Summary,
}

impl AuditRun {
    /// Fetch all users and classify them against `now`.
    ///
    /// A failed listing is fatal for the run.
    pub async fn fetch<S: IdentityStore + ?Sized>(
        store: &S,
        options: AuditOptions,
        now: NaiveDateTime,
    ) -> Result<Self, IdentityError> {
        let records = store.list_users().await?;
        let users = classifier::classify_all(records, now, options.threshold_days);
        let summary = Summary::from_classified(&users);

        for user in &users {
            debug!(
                "#{} {} created={} domain={} -> {} ({:?} days)",
                user.rank,
                user.record.name,
                user.record.created_at.as_deref().unwrap_or("-"),
                user.record.domain_id.as_deref().unwrap_or("-"),
                user.classification.state,
                user.classification.days_since_login
            );
        }

        info!(
            "Classified {} users against a {} day threshold: {}",
            users.len(),
            options.threshold_days,
            summary
        );

        Ok(Self {
            options,
            users,
            summary,
        })
    }

    /// Users that would be disabled by this run.
    pub fn candidates(&self) -> Vec<DisableCandidate> {
        disabler::select_candidates(&self.users)
    }

    /// Disable the candidates, then write provider-confirmed flags back onto
    /// the run's records.
    pub async fn disable<S: IdentityStore + ?Sized>(
        &mut self,
        store: &S,
        candidates: Vec<DisableCandidate>,
    ) -> Vec<DisableOutcome> {
        let outcomes =
            disabler::disable(store, candidates, self.options.dry_run, &mut self.summary).await;

        for outcome in &outcomes {
            if let DisableStatus::Disabled { active, .. } = outcome.status {
                if let Some(user) = self.users.get_mut(outcome.candidate.user.rank - 1) {
                    user.record.is_active = active;
                }
            }
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::classifier::tests::{fixed_now, login_days_ago, user};
    use crate::audit::disabler::tests::FakeStore;

    async fn run(
        store: &FakeStore,
        options: AuditOptions,
        now: NaiveDateTime,
    ) -> Result<(AuditRun, Vec<DisableOutcome>), IdentityError> {
        let mut audit = AuditRun::fetch(store, options, now).await?;
        let candidates = audit.candidates();
        let outcomes = audit.disable(store, candidates).await;
        Ok((audit, outcomes))
    }

    fn options(dry_run: bool) -> AuditOptions {
        AuditOptions {
            threshold_days: 60,
            dry_run,
        }
    }

    #[tokio::test]
    async fn test_scenario_dormant_user_is_disabled() {
        let store = FakeStore::new(vec![user("alice", true, Some(login_days_ago(61)))]);

        let (audit, outcomes) = run(&store, options(false), fixed_now()).await.unwrap();

        assert_eq!(
            audit.users[0].classification.state,
            ActivityState::Dormant
        );
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0].status, DisableStatus::Disabled { .. }));
        assert!(!audit.users[0].record.is_active);
        assert_eq!(audit.summary.disabled, 1);
        assert_eq!(audit.summary.dormant, 0);
    }

    #[tokio::test]
    async fn test_scenario_boundary_user_is_kept() {
        let store = FakeStore::new(vec![user("bob", true, Some(login_days_ago(60)))]);

        let (audit, outcomes) = run(&store, options(false), fixed_now()).await.unwrap();

        assert_eq!(audit.users[0].classification.state, ActivityState::Active);
        assert!(outcomes.is_empty());
        assert!(store.calls().is_empty());
        assert_eq!(audit.summary.active, 1);
    }

    #[tokio::test]
    async fn test_scenario_inactive_failure_stays_inactive() {
        let store = FakeStore::new(vec![
            user("carol", true, None),
            user("dan", true, Some(login_days_ago(200))),
        ])
        .failing_for("ocid1.user.oc1..carol");

        let (audit, outcomes) = run(&store, options(false), fixed_now()).await.unwrap();

        assert_eq!(
            audit.users[0].classification.state,
            ActivityState::Inactive
        );
        assert!(outcomes[0].is_failure());
        assert!(!outcomes[1].is_failure());
        assert!(audit.users[0].record.is_active);
        assert!(!audit.users[1].record.is_active);
        assert_eq!(audit.summary.inactive, 1);
        assert_eq!(audit.summary.disabled, 1);
        assert_eq!(audit.summary.total(), 2);
    }

    #[tokio::test]
    async fn test_scenario_already_disabled_user() {
        let store = FakeStore::new(vec![user("erin", false, None)]);

        let (audit, outcomes) = run(&store, options(false), fixed_now()).await.unwrap();

        assert!(outcomes.is_empty());
        assert!(store.calls().is_empty());
        assert_eq!(audit.summary.disabled, 1);
        assert_eq!(audit.summary.inactive, 0);
    }

    #[tokio::test]
    async fn test_dry_run_leaves_records_untouched() {
        let records = vec![
            user("a", true, Some(login_days_ago(1))),
            user("b", true, Some(login_days_ago(99))),
            user("c", true, None),
            user("d", false, None),
        ];
        let store = FakeStore::new(records.clone());

        let (audit, outcomes) = run(&store, options(true), fixed_now()).await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(store.calls().is_empty());
        for (user, original) in audit.users.iter().zip(&records) {
            assert_eq!(user.record.is_active, original.is_active);
        }
        assert_eq!(audit.summary.total(), records.len());
        assert_eq!(audit.summary.disabled, 1);
    }

    #[tokio::test]
    async fn test_bucket_sum_matches_user_count_on_mixed_run() {
        let mut records = Vec::new();
        for i in 0..12 {
            let last = match i % 4 {
                0 => Some(login_days_ago(i)),
                1 => Some(login_days_ago(100 + i)),
                2 => None,
                _ => Some("corrupt".to_string()),
            };
            records.push(user(&format!("user{}", i), i % 5 != 0, last));
        }
        let store = FakeStore::new(records.clone())
            .failing_for("ocid1.user.oc1..user2")
            .failing_for("ocid1.user.oc1..user7");

        let (audit, _) = run(&store, options(false), fixed_now()).await.unwrap();

        assert_eq!(audit.summary.total(), records.len());
        assert_eq!(audit.summary.failed, 2);
    }

    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let mut store = FakeStore::new(Vec::new());
        store.fail_listing = true;

        let result = run(&store, options(false), fixed_now()).await;
        assert!(matches!(result, Err(IdentityError::Unauthorized)));
    }
}
