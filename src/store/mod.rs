use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::model::attendance::AttendanceRecord;

#[cfg(test)]
pub mod memory;
pub mod mysql;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("attendance record already exists for user {user_id} on {work_date}")]
    Duplicate { user_id: u64, work_date: NaiveDate },

    /// The guarded update found the timestamp already present.
    #[error("attendance record {id} already has this timestamp set")]
    AlreadySet { id: u64 },

    #[error("failed to decode attendance row: {0}")]
    Decode(String),

    #[error("result stream interrupted: {0}")]
    Interrupted(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for attendance rows, keyed by (user, work date).
///
/// Each call is a single statement; callers doing read-then-write must
/// tolerate a concurrent writer in between.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find_by_user_and_date(
        &self,
        user_id: u64,
        work_date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    /// Creates the day's row with `clock_in` set. Returns the new id.
    ///
    /// Fails with [`StoreError::Duplicate`] if the day already has a row.
    async fn insert(
        &self,
        user_id: u64,
        work_date: NaiveDate,
        clock_in: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    /// Sets `clock_in` only while it is still empty.
    ///
    /// Fails with [`StoreError::AlreadySet`] otherwise.
    async fn update_clock_in(&self, id: u64, clock_in: DateTime<Utc>) -> Result<(), StoreError>;

    /// Sets `clock_out` only while it is still empty.
    ///
    /// Fails with [`StoreError::AlreadySet`] otherwise.
    async fn update_clock_out(&self, id: u64, clock_out: DateTime<Utc>)
    -> Result<(), StoreError>;

    /// Rows with `start <= work_date <= end`, ordered by date.
    async fn list_by_user_and_date_range(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        descending: bool,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;
}
