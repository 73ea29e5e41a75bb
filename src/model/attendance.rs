use chrono::{DateTime, Local, NaiveDate, TimeDelta, Utc};

/// One row per (user, work date).
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub id: u64,
    pub user_id: u64,
    pub work_date: NaiveDate,
    pub clock_in: Option<DateTime<Utc>>,
    pub clock_out: Option<DateTime<Utc>>,
}

/// Where a user-day stands in the clock-in / clock-out lifecycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AttendanceState {
    NoRecord,
    ClockedIn,
    ClockedOut,
}

impl AttendanceState {
    /// A row without `clock_in` counts as no record at all.
    pub fn of(record: Option<&AttendanceRecord>) -> Self {
        match record {
            Some(AttendanceRecord {
                clock_in: Some(_),
                clock_out: Some(_),
                ..
            }) => AttendanceState::ClockedOut,
            Some(AttendanceRecord {
                clock_in: Some(_), ..
            }) => AttendanceState::ClockedIn,
            _ => AttendanceState::NoRecord,
        }
    }
}

impl AttendanceRecord {
    pub fn state(&self) -> AttendanceState {
        AttendanceState::of(Some(self))
    }

    /// Worked minutes, truncated. Zero until both timestamps are present.
    pub fn duration_minutes(&self) -> i64 {
        match (self.clock_in, self.clock_out) {
            (Some(clock_in), Some(clock_out)) => compute_duration(clock_in, clock_out).num_minutes(),
            _ => 0,
        }
    }
}

/// Elapsed time between clock-in and clock-out, never negative.
pub fn compute_duration(clock_in: DateTime<Utc>, clock_out: DateTime<Utc>) -> TimeDelta {
    if clock_out < clock_in {
        return TimeDelta::zero();
    }
    clock_out - clock_in
}

/// Calendar day an instant falls on, according to the host clock's zone.
pub fn work_date_of(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&Local).date_naive()
}
