use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Broad class of a failure; decides the HTTP status.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Precondition,
    Store,
}

/// The store step that failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StoreOp {
    Lookup,
    InsertClockIn,
    UpdateClockIn,
    UpdateClockOut,
    List,
    Scan,
    Rows,
}

impl StoreOp {
    fn public_message(self) -> &'static str {
        match self {
            StoreOp::Lookup | StoreOp::List => "db error",
            StoreOp::InsertClockIn => "failed to insert clock_in",
            StoreOp::UpdateClockIn => "failed to update clock_in",
            StoreOp::UpdateClockOut => "failed to update clock_out",
            StoreOp::Scan => "failed to scan",
            StoreOp::Rows => "rows error",
        }
    }
}

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("invalid days: {0:?}")]
    InvalidRange(String),

    #[error("already clocked in")]
    AlreadyClockedIn,

    #[error("already clocked out")]
    AlreadyClockedOut,

    #[error("no attendance record for today")]
    NoActiveSession,

    #[error("not clocked in yet")]
    NotYetClockedIn,

    #[error("store failure during {op:?}: {source}")]
    Store {
        op: StoreOp,
        #[source]
        source: StoreError,
    },
}

impl AttendanceError {
    pub fn store(op: StoreOp, source: StoreError) -> Self {
        AttendanceError::Store { op, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AttendanceError::InvalidRange(_) => ErrorKind::Validation,
            AttendanceError::AlreadyClockedIn | AttendanceError::AlreadyClockedOut => {
                ErrorKind::Conflict
            }
            AttendanceError::NoActiveSession | AttendanceError::NotYetClockedIn => {
                ErrorKind::Precondition
            }
            AttendanceError::Store { .. } => ErrorKind::Store,
        }
    }

    /// Text safe to hand to the caller. Store details stay in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            AttendanceError::InvalidRange(_) => "invalid days",
            AttendanceError::AlreadyClockedIn => "already clocked in",
            AttendanceError::AlreadyClockedOut => "already clocked out",
            AttendanceError::NoActiveSession => "no attendance record for today",
            AttendanceError::NotYetClockedIn => "not clocked in yet",
            AttendanceError::Store { op, .. } => op.public_message(),
        }
    }
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::Conflict | ErrorKind::Precondition => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.public_message()
        }))
    }
}
