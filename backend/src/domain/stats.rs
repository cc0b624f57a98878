//! Stats aggregation contract.
//!
//! Every enrollment transition that changes {enrolled, completed} membership
//! carries a matched [`StatsDelta`] applied to the owning user's counters in
//! the same atomic unit as the enrollment write. Adapters apply deltas with
//! [`UserStats::apply`]; the clamping semantics live here so every adapter
//! agrees on them.

use super::UserStats;

/// Signed adjustment to a user's enrollment counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsDelta {
    /// Adjustment to `courses_enrolled`.
    pub courses_enrolled: i32,
    /// Adjustment to `courses_completed`.
    pub courses_completed: i32,
}

impl StatsDelta {
    /// Delta applied when an enrollment is first created.
    pub const ENROLL: Self = Self {
        courses_enrolled: 1,
        courses_completed: 0,
    };

    /// Delta applied on the first transition into the completed status.
    ///
    /// The enrolled decrement clamps at zero when applied; completion of an
    /// enrollment whose counter already drifted to zero never goes negative.
    pub const COMPLETE: Self = Self {
        courses_enrolled: -1,
        courses_completed: 1,
    };
}

impl UserStats {
    /// Apply a delta, clamping each counter at zero.
    #[must_use]
    pub fn apply(self, delta: StatsDelta) -> Self {
        Self {
            courses_enrolled: bump(self.courses_enrolled, delta.courses_enrolled),
            courses_completed: bump(self.courses_completed, delta.courses_completed),
            ..self
        }
    }
}

fn bump(value: u32, delta: i32) -> u32 {
    if delta >= 0 {
        value.saturating_add(delta.unsigned_abs())
    } else {
        value.saturating_sub(delta.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(enrolled: u32, completed: u32) -> UserStats {
        UserStats {
            courses_enrolled: enrolled,
            courses_completed: completed,
            ..UserStats::default()
        }
    }

    #[test]
    fn enroll_increments_enrolled_only() {
        let next = stats(2, 1).apply(StatsDelta::ENROLL);
        assert_eq!(next, stats(3, 1));
    }

    #[test]
    fn complete_moves_enrolled_to_completed() {
        let next = stats(1, 0).apply(StatsDelta::COMPLETE);
        assert_eq!(next, stats(0, 1));
    }

    #[test]
    fn complete_clamps_enrolled_at_zero() {
        let next = stats(0, 4).apply(StatsDelta::COMPLETE);
        assert_eq!(next, stats(0, 5));
    }

    #[test]
    fn apply_preserves_unrelated_counters() {
        let start = UserStats {
            courses_enrolled: 1,
            courses_completed: 0,
            certificates_earned: 7,
            study_hours: 42,
        };
        let next = start.apply(StatsDelta::COMPLETE);
        assert_eq!(next.certificates_earned, 7);
        assert_eq!(next.study_hours, 42);
    }
}
