use thiserror::Error;

use crate::domain::entities::IdentityFormat;

// First violated input rule; messages are shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", register_no_message(.0))]
    RegisterNo(IdentityFormat),
    #[error("Please enter a valid name.")]
    Name,
    #[error("Please select a department.")]
    Department,
    #[error("System number is required.")]
    SystemNo,
    #[error("Check-in date and time must be valid (YYYY-MM-DD and HH:MM:SS).")]
    CheckInTime,
    #[error("Check-in time cannot be in the future.")]
    CheckInInFuture,
    #[error("Session ID is required.")]
    SessionId,
}

fn register_no_message(format: &IdentityFormat) -> &'static str {
    match format {
        IdentityFormat::Alphanumeric12 => {
            "Register number must be exactly 12 alphanumeric characters."
        }
        IdentityFormat::Numeric8 => "Register number must be exactly 8 digits.",
    }
}

// Failure reported by a store or marker adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("store failure: {0}")]
pub struct StoreError(pub String);

// Domain-level errors for the lab session workflows.
#[derive(Debug, Error)]
pub enum LabError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("You are already logged in. Please log out first.")]
    Conflict,
    #[error("Invalid session or already logged out.")]
    NotFound,
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}
