//! Disable candidate selection and best-effort execution.

use tracing::{error, info, warn};

use super::classifier::{ActivityState, ClassifiedUser};
use super::summary::{Bucket, Summary};
use crate::error::IdentityError;
use crate::identity::IdentityStore;

/// An active user whose classification is not `Active`.
#[derive(Debug, Clone, PartialEq)]
pub struct DisableCandidate {
    pub user: ClassifiedUser,
}

impl DisableCandidate {
    /// Bucket the candidate sits in until it is disabled.
    pub fn bucket(&self) -> Bucket {
        Bucket::of(&self.user)
    }
}

/// What happened to one candidate.
#[derive(Debug)]
pub enum DisableStatus {
    /// Dry run: the candidate was identified, no call was made.
    Proposed,
    /// The provider accepted the change.
    Disabled {
        active: bool,
        last_modified: Option<String>,
    },
    /// The call failed; the user keeps its pre-run bucket.
    Failed(IdentityError),
}

/// A candidate with the result of its disable attempt.
#[derive(Debug)]
pub struct DisableOutcome {
    pub candidate: DisableCandidate,
    pub status: DisableStatus,
}

impl DisableOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, DisableStatus::Failed(_))
    }
}

/// Select users that were active before the run and are Dormant or Inactive.
pub fn select_candidates(users: &[ClassifiedUser]) -> Vec<DisableCandidate> {
    users
        .iter()
        .filter(|u| u.record.is_active && u.classification.state != ActivityState::Active)
        .map(|u| DisableCandidate { user: u.clone() })
        .collect()
}

/// Disable each candidate in turn, updating `summary` for every success.
///
/// Failures are recorded on the outcome and never stop the remaining candidates.
/// With `dry_run` no call is issued and the summary is left untouched.
pub async fn disable<S: IdentityStore + ?Sized>(
    store: &S,
    candidates: Vec<DisableCandidate>,
    dry_run: bool,
    summary: &mut Summary,
) -> Vec<DisableOutcome> {
    if dry_run {
        info!(
            "Dry run: {} candidates identified, no change applied",
            candidates.len()
        );
        return candidates
            .into_iter()
            .map(|candidate| DisableOutcome {
                candidate,
                status: DisableStatus::Proposed,
            })
            .collect();
    }

    let mut outcomes = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let user_id = candidate.user.record.id.clone();
        let name = candidate.user.record.name.clone();

        let result = store
            .set_user_active(&user_id, false)
            .await
            .and_then(|change| {
                if change.active {
                    Err(IdentityError::StillActive(user_id.clone()))
                } else {
                    Ok(change)
                }
            });

        let status = match result {
            Ok(change) => {
                summary.record_disabled(candidate.bucket());
                info!(
                    "Disabled {} ({}), state {}",
                    name, user_id, candidate.user.classification.state
                );
                DisableStatus::Disabled {
                    active: change.active,
                    last_modified: change.last_modified,
                }
            }
            Err(e) => {
                summary.record_failure();
                if e.is_fatal() {
                    error!("Failed to disable {} ({}): {}", name, user_id, e);
                } else {
                    warn!("Failed to disable {} ({}): {}", name, user_id, e);
                }
                DisableStatus::Failed(e)
            }
        };

        outcomes.push(DisableOutcome { candidate, status });
    }

    let failed = outcomes.iter().filter(|o| o.is_failure()).count();
    info!(
        "Disable pass complete: {} succeeded, {} failed",
        outcomes.len() - failed,
        failed
    );

    outcomes
}
