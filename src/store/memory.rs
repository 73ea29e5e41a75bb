use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::{AttendanceStore, StoreError};
use crate::model::attendance::AttendanceRecord;

/// Store operations that can be told to fail.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Op {
    Find,
    Insert,
    UpdateClockIn,
    UpdateClockOut,
    List,
}

/// Vec-backed store with the same (user, date) uniqueness as the MySQL table.
#[derive(Default)]
pub struct InMemoryAttendanceStore {
    rows: Mutex<Vec<AttendanceRecord>>,
    failing: Mutex<HashSet<Op>>,
    list_failure: Mutex<Option<fn() -> StoreError>>,
    find_sees_nothing: Mutex<bool>,
}

impl InMemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<AttendanceRecord>) -> Self {
        let store = Self::new();
        *store.rows.lock().unwrap() = rows;
        store
    }

    pub fn rows(&self) -> Vec<AttendanceRecord> {
        self.rows.lock().unwrap().clone()
    }

    pub fn fail_on(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    /// Makes `list_by_user_and_date_range` return the given error.
    pub fn fail_list_with(&self, make: fn() -> StoreError) {
        *self.list_failure.lock().unwrap() = Some(make);
    }

    /// Makes `find_by_user_and_date` report no row, as a read that lost a race would.
    pub fn hide_rows_from_find(&self) {
        *self.find_sees_nothing.lock().unwrap() = true;
    }

    fn check(&self, op: Op) -> Result<(), StoreError> {
        if self.failing.lock().unwrap().contains(&op) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl AttendanceStore for InMemoryAttendanceStore {
    async fn find_by_user_and_date(
        &self,
        user_id: u64,
        work_date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        self.check(Op::Find)?;
        if *self.find_sees_nothing.lock().unwrap() {
            return Ok(None);
        }
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|r| r.user_id == user_id && r.work_date == work_date)
            .cloned())
    }

    async fn insert(
        &self,
        user_id: u64,
        work_date: NaiveDate,
        clock_in: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        self.check(Op::Insert)?;
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|r| r.user_id == user_id && r.work_date == work_date)
        {
            return Err(StoreError::Duplicate { user_id, work_date });
        }
        let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        rows.push(AttendanceRecord {
            id,
            user_id,
            work_date,
            clock_in: Some(clock_in),
            clock_out: None,
        });
        Ok(id)
    }

    async fn update_clock_in(&self, id: u64, clock_in: DateTime<Utc>) -> Result<(), StoreError> {
        self.check(Op::UpdateClockIn)?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
        if row.clock_in.is_some() {
            return Err(StoreError::AlreadySet { id });
        }
        row.clock_in = Some(clock_in);
        Ok(())
    }

    async fn update_clock_out(
        &self,
        id: u64,
        clock_out: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.check(Op::UpdateClockOut)?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
        if row.clock_out.is_some() {
            return Err(StoreError::AlreadySet { id });
        }
        row.clock_out = Some(clock_out);
        Ok(())
    }

    async fn list_by_user_and_date_range(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        descending: bool,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        self.check(Op::List)?;
        if let Some(make) = *self.list_failure.lock().unwrap() {
            return Err(make());
        }
        let mut records: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id && r.work_date >= start && r.work_date <= end)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.work_date);
        if descending {
            records.reverse();
        }
        Ok(records)
    }
}

/// Suspends once after every lookup so that two requests joined together
/// both read before either writes.
pub struct YieldAfterFind<S>(pub S);

#[async_trait]
impl<S: AttendanceStore> AttendanceStore for YieldAfterFind<S> {
    async fn find_by_user_and_date(
        &self,
        user_id: u64,
        work_date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let found = self.0.find_by_user_and_date(user_id, work_date).await;
        actix_web::rt::task::yield_now().await;
        found
    }

    async fn insert(
        &self,
        user_id: u64,
        work_date: NaiveDate,
        clock_in: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        self.0.insert(user_id, work_date, clock_in).await
    }

    async fn update_clock_in(&self, id: u64, clock_in: DateTime<Utc>) -> Result<(), StoreError> {
        self.0.update_clock_in(id, clock_in).await
    }

    async fn update_clock_out(
        &self,
        id: u64,
        clock_out: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.0.update_clock_out(id, clock_out).await
    }

    async fn list_by_user_and_date_range(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        descending: bool,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        self.0
            .list_by_user_and_date_range(user_id, start, end, descending)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[actix_web::test]
    async fn guarded_updates_refuse_to_overwrite() {
        let store = InMemoryAttendanceStore::new();
        let t = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let id = store.insert(1, date(10), t).await.unwrap();

        assert!(matches!(
            store.update_clock_in(id, t).await,
            Err(StoreError::AlreadySet { .. })
        ));
        store.update_clock_out(id, t).await.unwrap();
        assert!(matches!(
            store.update_clock_out(id, t).await,
            Err(StoreError::AlreadySet { .. })
        ));
    }

    #[actix_web::test]
    async fn list_honours_sort_direction() {
        let t = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let store = InMemoryAttendanceStore::new();
        for d in [9, 11, 10] {
            store.insert(1, date(d), t).await.unwrap();
        }

        let asc = store
            .list_by_user_and_date_range(1, date(9), date(11), false)
            .await
            .unwrap();
        let desc = store
            .list_by_user_and_date_range(1, date(9), date(11), true)
            .await
            .unwrap();

        let dates = |rows: &[AttendanceRecord]| rows.iter().map(|r| r.work_date).collect::<Vec<_>>();
        assert_eq!(dates(&asc), vec![date(9), date(10), date(11)]);
        assert_eq!(dates(&desc), vec![date(11), date(10), date(9)]);
    }
}
