use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::clock::Clock;
use crate::config::Config;
use crate::model::attendance::work_date_of;
use crate::service::attendance::{self, AttendanceEntry};
use crate::store::AttendanceStore;

#[derive(Serialize, ToSchema)]
pub struct ClockInResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub work_date: NaiveDate,
    #[schema(example = "2026-01-01T09:00:00+09:00", format = "date-time")]
    pub clock_in: String,
}

#[derive(Serialize, ToSchema)]
pub struct ClockOutResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub work_date: NaiveDate,
    #[schema(example = "2026-01-01T18:00:00+09:00", format = "date-time")]
    pub clock_out: String,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceRecordResponse {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub work_date: NaiveDate,
    /// Absent until the user has clocked in
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "2026-01-01T09:00:00+09:00", format = "date-time")]
    pub clock_in: Option<String>,
    /// Absent until the user has clocked out
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "2026-01-01T18:00:00+09:00", format = "date-time")]
    pub clock_out: Option<String>,
    #[schema(example = 540)]
    pub work_duration_minutes: i64,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "already clocked in")]
    pub error: String,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    /// Number of calendar days to list, ending today (default 7)
    #[param(example = "7")]
    pub days: Option<String>,
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

impl From<AttendanceEntry> for AttendanceRecordResponse {
    fn from(entry: AttendanceEntry) -> Self {
        Self {
            work_date: entry.work_date,
            clock_in: entry.clock_in.map(format_timestamp),
            clock_out: entry.clock_out.map(format_timestamp),
            work_duration_minutes: entry.work_duration_minutes,
        }
    }
}

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/api/clock-in",
    responses(
        (status = 200, description = "Clocked in", body = ClockInResponse),
        (status = 400, description = "Already clocked in today", body = ErrorResponse, example = json!({
            "error": "already clocked in"
        })),
        (status = 500, description = "Store failure", body = ErrorResponse, example = json!({
            "error": "failed to insert clock_in"
        }))
    ),
    tag = "Attendance"
)]
pub async fn clock_in(
    store: web::Data<dyn AttendanceStore>,
    clock: web::Data<dyn Clock>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let outcome = attendance::clock_in(store.get_ref(), config.user_id, clock.now()).await?;

    Ok(HttpResponse::Ok().json(ClockInResponse {
        status: "ok".to_string(),
        work_date: outcome.work_date,
        clock_in: format_timestamp(outcome.clock_in),
    }))
}

/// Clock-out endpoint
#[utoipa::path(
    post,
    path = "/api/clock-out",
    responses(
        (status = 200, description = "Clocked out", body = ClockOutResponse),
        (status = 400, description = "No open attendance for today", body = ErrorResponse, example = json!({
            "error": "not clocked in yet"
        })),
        (status = 500, description = "Store failure", body = ErrorResponse, example = json!({
            "error": "failed to update clock_out"
        }))
    ),
    tag = "Attendance"
)]
pub async fn clock_out(
    store: web::Data<dyn AttendanceStore>,
    clock: web::Data<dyn Clock>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let outcome = attendance::clock_out(store.get_ref(), config.user_id, clock.now()).await?;

    Ok(HttpResponse::Ok().json(ClockOutResponse {
        status: "ok".to_string(),
        work_date: outcome.work_date,
        clock_out: format_timestamp(outcome.clock_out),
    }))
}

/// Recent attendance, newest first
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance for the requested window", body = [AttendanceRecordResponse]),
        (status = 400, description = "days is not a positive integer", body = ErrorResponse, example = json!({
            "error": "invalid days"
        })),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    store: web::Data<dyn AttendanceStore>,
    clock: web::Data<dyn Clock>,
    config: web::Data<Config>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let days = attendance::parse_days(query.days.as_deref())?;
    let today = work_date_of(clock.now());

    let entries =
        attendance::list_attendance(store.get_ref(), config.user_id, days, today).await?;

    let data: Vec<AttendanceRecordResponse> = entries.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(data))
}
