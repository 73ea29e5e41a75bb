use crate::api::attendance::{
    AttendanceRecordResponse, ClockInResponse, ClockOutResponse, ErrorResponse,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance API",
        version = "0.1.0",
        description = r#"
## Attendance

Daily clock-in / clock-out tracking for a single user.

- `POST /api/clock-in` starts today's record
- `POST /api/clock-out` closes it
- `GET /api/attendance?days=N` lists the last N calendar days, newest first

Errors are returned as `{"error": "..."}`; client mistakes are `400`, storage failures `500`.
"#,
    ),
    paths(
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::list_attendance,
        crate::api::site::health,
    ),
    components(
        schemas(
            ClockInResponse,
            ClockOutResponse,
            AttendanceRecordResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "Attendance", description = "Clock-in, clock-out and history"),
        (name = "Health", description = "Liveness"),
    )
)]
pub struct ApiDoc;
