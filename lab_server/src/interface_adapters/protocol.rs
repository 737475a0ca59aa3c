use serde::{Deserialize, Serialize};

use crate::domain::entities::{DATE_FORMAT, SessionRecord, SessionStatus, TIME_FORMAT};

// Check-in payload, accepted as JSON or as a urlencoded form.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub register_no: String,
    pub name: String,
    pub department: String,
    pub system_no: String,
    #[serde(default)]
    pub in_date: Option<String>,
    #[serde(default)]
    pub in_time: Option<String>,
}

// Response payload for a successful check-in.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub session_id: String,
    pub name: String,
}

// Request payload for logout.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogoutRequest {
    pub session_id: String,
}

// Response payload for logout.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
    pub checked_out_at: String,
}

// One row of the admin listing.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub register_no: String,
    pub name: String,
    pub department: String,
    pub system_no: String,
    pub in_date: String,
    pub in_time: String,
    pub out_date: Option<String>,
    pub out_time: Option<String>,
    pub status: SessionStatus,
}

// Response payload for the admin listing.
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub total: usize,
    pub active: usize,
    pub today: usize,
    pub sessions: Vec<SessionView>,
}

// Simple error envelope for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl From<SessionRecord> for SessionView {
    fn from(record: SessionRecord) -> Self {
        SessionView {
            in_date: record.checked_in_at.format(DATE_FORMAT).to_string(),
            in_time: record.checked_in_at.format(TIME_FORMAT).to_string(),
            out_date: record
                .checked_out_at
                .map(|at| at.format(DATE_FORMAT).to_string()),
            out_time: record
                .checked_out_at
                .map(|at| at.format(TIME_FORMAT).to_string()),
            session_id: record.session_id,
            register_no: record.register_no,
            name: record.name,
            department: record.department,
            system_no: record.system_no,
            status: record.status,
        }
    }
}
