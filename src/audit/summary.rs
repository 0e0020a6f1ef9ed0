//! End-of-run bucket tally.

use std::fmt;

use super::classifier::{ActivityState, ClassifiedUser};

/// Mutually exclusive summary bucket of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Active,
    Disabled,
    Inactive,
    Dormant,
}

impl Bucket {
    /// Bucket a user belongs to before any disable call.
    pub fn of(user: &ClassifiedUser) -> Self {
        if !user.record.is_active {
            return Self::Disabled;
        }
        match user.classification.state {
            ActivityState::Active => Self::Active,
            ActivityState::Dormant => Self::Dormant,
            ActivityState::Inactive => Self::Inactive,
        }
    }
}

/// Counts per bucket, plus disable calls that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub active: usize,
    pub disabled: usize,
    pub inactive: usize,
    pub dormant: usize,
    pub failed: usize,
}

impl Summary {
    /// Tally the pre-run bucket of every classified user.
    pub fn from_classified(users: &[ClassifiedUser]) -> Self {
        let mut summary = Self::default();
        for user in users {
            *summary.slot(Bucket::of(user)) += 1;
        }
        summary
    }

    fn slot(&mut self, bucket: Bucket) -> &mut usize {
        match bucket {
            Bucket::Active => &mut self.active,
            Bucket::Disabled => &mut self.disabled,
            Bucket::Inactive => &mut self.inactive,
            Bucket::Dormant => &mut self.dormant,
        }
    }

    /// Move one user from its pre-run bucket into `disabled`.
    pub fn record_disabled(&mut self, from: Bucket) {
        if from == Bucket::Disabled {
            return;
        }
        let slot = self.slot(from);
        debug_assert!(*slot > 0, "migrating out of an empty {:?} bucket", from);
        *slot = slot.saturating_sub(1);
        self.disabled += 1;
    }

    /// Note a disable call that failed; bucket membership is unchanged.
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Number of users across all four buckets.
    pub fn total(&self) -> usize {
        self.active + self.disabled + self.inactive + self.dormant
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "active={} disabled={} inactive={} dormant={} failed={}",
            self.active, self.disabled, self.inactive, self.dormant, self.failed
        )
    }
}
