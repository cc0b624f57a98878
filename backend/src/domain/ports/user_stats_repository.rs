//! Read port for per-user counter snapshots.
//!
//! Stats mutations always travel with an enrollment write through
//! [`EnrollmentRepository`](super::EnrollmentRepository); this port only
//! serves snapshot reads for responses that report stats without changing
//! them.

use async_trait::async_trait;

use crate::domain::{UserId, UserStats};

use super::define_port_error;

define_port_error! {
    /// Errors raised by stats snapshot adapters.
    pub enum UserStatsRepositoryError {
        /// Backend could not be reached.
        Connection { message: String } => "user stats connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } => "user stats query failed: {message}",
    }
}

/// Port for reading a user's aggregate counters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStatsRepository: Send + Sync {
    /// Fetch the current counter snapshot. Unknown users read as zeroed
    /// counters rather than an error.
    async fn fetch(&self, user_id: &UserId) -> Result<UserStats, UserStatsRepositoryError>;
}

/// Fixture returning zeroed counters.
#[derive(Debug, Default)]
pub struct FixtureUserStatsRepository;

#[async_trait]
impl UserStatsRepository for FixtureUserStatsRepository {
    async fn fetch(&self, _user_id: &UserId) -> Result<UserStats, UserStatsRepositoryError> {
        Ok(UserStats::default())
    }
}
