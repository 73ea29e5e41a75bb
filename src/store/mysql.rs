use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use futures_util::StreamExt;
use sqlx::{FromRow, MySqlPool};

use super::{AttendanceStore, StoreError};
use crate::model::attendance::AttendanceRecord;

const SELECT_BY_DAY: &str = r#"
    SELECT id, user_id, work_date, clock_in, clock_out
    FROM attendance
    WHERE user_id = ? AND work_date = ?
"#;

const SELECT_RANGE_ASC: &str = r#"
    SELECT id, user_id, work_date, clock_in, clock_out
    FROM attendance
    WHERE user_id = ?
      AND work_date BETWEEN ? AND ?
    ORDER BY work_date ASC
"#;

const SELECT_RANGE_DESC: &str = r#"
    SELECT id, user_id, work_date, clock_in, clock_out
    FROM attendance
    WHERE user_id = ?
      AND work_date BETWEEN ? AND ?
    ORDER BY work_date DESC
"#;

/// MySQL integrity-constraint SQLSTATE, raised by the (user_id, work_date) unique key.
const SQLSTATE_INTEGRITY: &str = "23000";

#[derive(Clone)]
pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn is_duplicate(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(SQLSTATE_INTEGRITY),
        _ => false,
    }
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn find_by_user_and_date(
        &self,
        user_id: u64,
        work_date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let record = sqlx::query_as::<_, AttendanceRecord>(SELECT_BY_DAY)
            .bind(user_id)
            .bind(work_date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn insert(
        &self,
        user_id: u64,
        work_date: NaiveDate,
        clock_in: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (user_id, work_date, clock_in)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(work_date)
        .bind(clock_in)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_duplicate(&e) {
                StoreError::Duplicate { user_id, work_date }
            } else {
                StoreError::Database(e)
            }
        })?;

        Ok(result.last_insert_id())
    }

    async fn update_clock_in(&self, id: u64, clock_in: DateTime<Utc>) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET clock_in = ?
            WHERE id = ?
              AND clock_in IS NULL
            "#,
        )
        .bind(clock_in)
        .bind(id)
        .execute(&self.pool)
        .await?;

        // Zero rows: a concurrent request set it first.
        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadySet { id });
        }
        Ok(())
    }

    async fn update_clock_out(
        &self,
        id: u64,
        clock_out: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET clock_out = ?
            WHERE id = ?
              AND clock_out IS NULL
            "#,
        )
        .bind(clock_out)
        .bind(id)
        .execute(&self.pool)
        .await?;

        // Zero rows: a concurrent request set it first.
        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadySet { id });
        }
        Ok(())
    }

    async fn list_by_user_and_date_range(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        descending: bool,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let sql = if descending {
            SELECT_RANGE_DESC
        } else {
            SELECT_RANGE_ASC
        };

        let mut stream = sqlx::query(sql)
            .bind(user_id)
            .bind(start)
            .bind(end)
            .fetch(&self.pool);

        let mut records = Vec::new();

        // An error before the first row means the query itself failed.
        while let Some(row) = stream.next().await {
            let row = match row {
                Ok(row) => row,
                Err(e) if records.is_empty() => return Err(StoreError::Database(e)),
                Err(e) => return Err(StoreError::Interrupted(e.to_string())),
            };
            let record =
                AttendanceRecord::from_row(&row).map_err(|e| StoreError::Decode(e.to_string()))?;
            records.push(record);
        }

        Ok(records)
    }
}
