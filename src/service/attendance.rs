use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::error::{AttendanceError, StoreOp};
use crate::model::attendance::{AttendanceState, work_date_of};
use crate::store::{AttendanceStore, StoreError};

pub const DEFAULT_LIST_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockInOutcome {
    pub work_date: NaiveDate,
    pub clock_in: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockOutOutcome {
    pub work_date: NaiveDate,
    pub clock_out: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEntry {
    pub work_date: NaiveDate,
    pub clock_in: Option<DateTime<Utc>>,
    pub clock_out: Option<DateTime<Utc>>,
    pub work_duration_minutes: i64,
}

fn log_store_failure(op: StoreOp, user_id: u64, e: StoreError) -> AttendanceError {
    tracing::error!(error = %e, user_id, ?op, "Attendance store failure");
    AttendanceError::store(op, e)
}

/// Starts the working day for `user_id`.
///
/// A pre-existing row without `clock_in` is filled in rather than rejected.
pub async fn clock_in(
    store: &dyn AttendanceStore,
    user_id: u64,
    now: DateTime<Utc>,
) -> Result<ClockInOutcome, AttendanceError> {
    let work_date = work_date_of(now);

    let existing = store
        .find_by_user_and_date(user_id, work_date)
        .await
        .map_err(|e| log_store_failure(StoreOp::Lookup, user_id, e))?;

    match existing {
        None => match store.insert(user_id, work_date, now).await {
            Ok(id) => {
                tracing::info!(user_id, id, %work_date, "Clocked in");
            }
            // Lost the race against a concurrent clock-in for the same day.
            Err(StoreError::Duplicate { .. }) => {
                tracing::warn!(user_id, %work_date, "Concurrent clock-in rejected");
                return Err(AttendanceError::AlreadyClockedIn);
            }
            Err(e) => return Err(log_store_failure(StoreOp::InsertClockIn, user_id, e)),
        },
        Some(record) if record.clock_in.is_none() => {
            match store.update_clock_in(record.id, now).await {
                Ok(()) => {}
                Err(StoreError::AlreadySet { .. }) => {
                    tracing::warn!(user_id, id = record.id, %work_date, "Concurrent clock-in rejected");
                    return Err(AttendanceError::AlreadyClockedIn);
                }
                Err(e) => return Err(log_store_failure(StoreOp::UpdateClockIn, user_id, e)),
            }
            tracing::info!(user_id, id = record.id, %work_date, "Clocked in on empty row");
        }
        Some(_) => return Err(AttendanceError::AlreadyClockedIn),
    }

    Ok(ClockInOutcome {
        work_date,
        clock_in: now,
    })
}

/// Ends the working day for `user_id`.
pub async fn clock_out(
    store: &dyn AttendanceStore,
    user_id: u64,
    now: DateTime<Utc>,
) -> Result<ClockOutOutcome, AttendanceError> {
    let work_date = work_date_of(now);

    let record = store
        .find_by_user_and_date(user_id, work_date)
        .await
        .map_err(|e| log_store_failure(StoreOp::Lookup, user_id, e))?
        .ok_or(AttendanceError::NoActiveSession)?;

    match record.state() {
        AttendanceState::NoRecord => return Err(AttendanceError::NotYetClockedIn),
        AttendanceState::ClockedOut => return Err(AttendanceError::AlreadyClockedOut),
        AttendanceState::ClockedIn => {}
    }

    match store.update_clock_out(record.id, now).await {
        Ok(()) => {}
        // Another request closed the day between our read and write.
        Err(StoreError::AlreadySet { .. }) => {
            tracing::warn!(user_id, id = record.id, %work_date, "Concurrent clock-out rejected");
            return Err(AttendanceError::AlreadyClockedOut);
        }
        Err(e) => return Err(log_store_failure(StoreOp::UpdateClockOut, user_id, e)),
    }

    tracing::info!(user_id, id = record.id, %work_date, "Clocked out");

    Ok(ClockOutOutcome {
        work_date,
        clock_out: now,
    })
}

/// Reads the `days` query value; absent means [`DEFAULT_LIST_DAYS`].
///
/// Surrounding whitespace is rejected, not trimmed.
pub fn parse_days(raw: Option<&str>) -> Result<i64, AttendanceError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_LIST_DAYS);
    };
    match raw.parse::<i64>() {
        Ok(days) if days > 0 => Ok(days),
        _ => Err(AttendanceError::InvalidRange(raw.to_string())),
    }
}

/// Records from the last `days` calendar days ending at `today`, newest first.
pub async fn list_attendance(
    store: &dyn AttendanceStore,
    user_id: u64,
    days: i64,
    today: NaiveDate,
) -> Result<Vec<AttendanceEntry>, AttendanceError> {
    if days <= 0 {
        return Err(AttendanceError::InvalidRange(days.to_string()));
    }

    let start = today
        .checked_sub_days(Days::new((days - 1) as u64))
        .ok_or_else(|| AttendanceError::InvalidRange(days.to_string()))?;

    let records = store
        .list_by_user_and_date_range(user_id, start, today, true)
        .await
        .map_err(|e| {
            let op = match e {
                StoreError::Decode(_) => StoreOp::Scan,
                StoreError::Interrupted(_) => StoreOp::Rows,
                _ => StoreOp::List,
            };
            log_store_failure(op, user_id, e)
        })?;

    Ok(records
        .into_iter()
        .map(|r| AttendanceEntry {
            work_date: r.work_date,
            clock_in: r.clock_in,
            clock_out: r.clock_out,
            work_duration_minutes: r.duration_minutes(),
        })
        .collect())
}
