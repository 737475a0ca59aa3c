use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Storage and display formats for the split date/time columns.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

// Lifecycle state of a lab session record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
        }
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(SessionStatus::Active),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(format!("unknown session status: {other}")),
        }
    }
}

// One check-in/check-out row in the lab log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRecord {
    pub session_id: String,
    pub register_no: String,
    pub name: String,
    pub department: String,
    pub system_no: String,
    pub checked_in_at: NaiveDateTime,
    pub checked_out_at: Option<NaiveDateTime>,
    pub status: SessionStatus,
}

impl SessionRecord {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

// Identity number shapes accepted by the two registration modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentityFormat {
    Alphanumeric12,
    Numeric8,
}

impl IdentityFormat {
    // Normalizes raw input into the stored form, or None when it does not match.
    pub fn normalize(self, raw: &str) -> Option<String> {
        let value = raw.trim();
        match self {
            IdentityFormat::Alphanumeric12 => {
                let upper = value.to_ascii_uppercase();
                let valid = upper.len() == 12
                    && upper
                        .chars()
                        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
                valid.then_some(upper)
            }
            IdentityFormat::Numeric8 => {
                let valid = value.len() == 8 && value.chars().all(|c| c.is_ascii_digit());
                valid.then(|| value.to_string())
            }
        }
    }
}

// On-disk shape of the session marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerFormat {
    // `sessionId|identityNumber|name`
    PipeDelimited,
    // Bare `sessionId`.
    SessionIdOnly,
}

// Explicit registration policy; every mode-dependent rule hangs off this.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RegistrationMode {
    #[default]
    Alphanumeric12,
    Numeric8,
}

impl RegistrationMode {
    pub fn identity_format(self) -> IdentityFormat {
        match self {
            RegistrationMode::Alphanumeric12 => IdentityFormat::Alphanumeric12,
            RegistrationMode::Numeric8 => IdentityFormat::Numeric8,
        }
    }

    pub fn rejects_duplicate_active(self) -> bool {
        matches!(self, RegistrationMode::Alphanumeric12)
    }

    pub fn marker_format(self) -> MarkerFormat {
        match self {
            RegistrationMode::Alphanumeric12 => MarkerFormat::PipeDelimited,
            RegistrationMode::Numeric8 => MarkerFormat::SessionIdOnly,
        }
    }

    // When false, logout only clears a marker that names the same session.
    pub fn clears_marker_unconditionally(self) -> bool {
        matches!(self, RegistrationMode::Numeric8)
    }
}

impl FromStr for RegistrationMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "alphanumeric12" => Ok(RegistrationMode::Alphanumeric12),
            "numeric8" => Ok(RegistrationMode::Numeric8),
            other => Err(format!("unknown registration mode: {other}")),
        }
    }
}

impl fmt::Display for RegistrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationMode::Alphanumeric12 => f.write_str("alphanumeric12"),
            RegistrationMode::Numeric8 => f.write_str("numeric8"),
        }
    }
}

// Liveness hint for the shutdown watcher. Not a source of truth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionMarker {
    pub session_id: String,
    pub register_no: Option<String>,
    pub name: Option<String>,
}

impl SessionMarker {
    pub fn encode(&self, format: MarkerFormat) -> String {
        match format {
            MarkerFormat::PipeDelimited => format!(
                "{}|{}|{}",
                self.session_id,
                self.register_no.as_deref().unwrap_or_default(),
                self.name.as_deref().unwrap_or_default()
            ),
            MarkerFormat::SessionIdOnly => self.session_id.clone(),
        }
    }

    // Accepts either marker format; anything else is treated as no session.
    pub fn parse(content: &str) -> Option<Self> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }

        if !content.contains('|') {
            if content.chars().any(char::is_whitespace) {
                return None;
            }
            return Some(SessionMarker {
                session_id: content.to_string(),
                register_no: None,
                name: None,
            });
        }

        let mut parts = content.splitn(3, '|');
        let session_id = parts.next()?.trim();
        let register_no = parts.next()?.trim();
        let name = parts.next()?.trim();
        if session_id.is_empty() {
            return None;
        }

        Some(SessionMarker {
            session_id: session_id.to_string(),
            register_no: Some(register_no.to_string()),
            name: Some(name.to_string()),
        })
    }
}
