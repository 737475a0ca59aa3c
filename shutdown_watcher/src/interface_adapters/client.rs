use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::outcome::LogoutFailure;
use crate::domain::ports::LogoutClient;

#[derive(Debug, Serialize)]
struct LogoutRequest<'a> {
    session_id: &'a str,
}

// Both the success body and the error envelope carry these fields.
#[derive(Debug, Deserialize)]
struct LogoutReply {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Error)]
pub enum LogoutClientError {
    #[error("server unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("session not found or already logged out")]
    NotFound,
    #[error("server rejected logout ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),
}

// Thin reqwest client for the lab server logout endpoint.
#[derive(Clone)]
pub struct LabClient {
    http: reqwest::Client,
    base_url: String,
}

impl LabClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn logout_session(&self, session_id: &str) -> Result<(), LogoutClientError> {
        let url = format!("{}/api/logout", self.base_url);
        let response = self
            .http
            .post(url)
            .json(&LogoutRequest { session_id })
            .send()
            .await
            .map_err(LogoutClientError::Transport)?;

        let status = response.status();
        if status.is_success() {
            let reply = response
                .json::<LogoutReply>()
                .await
                .map_err(LogoutClientError::Decode)?;
            if reply.success {
                return Ok(());
            }
            return Err(LogoutClientError::Rejected {
                status: status.as_u16(),
                message: reply.message.unwrap_or_default(),
            });
        }

        let reply = response.json::<LogoutReply>().await.ok();

        // Only the lab server's own envelope means the session is closed; a bare
        // 404 may come from a proxy or a wrong base URL.
        if status == StatusCode::NOT_FOUND && reply.as_ref().is_some_and(|r| !r.success) {
            return Err(LogoutClientError::NotFound);
        }

        let message = reply
            .and_then(|reply| reply.message)
            .unwrap_or_else(|| status.to_string());
        Err(LogoutClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl LogoutClient for LabClient {
    async fn logout(&self, session_id: &str) -> Result<(), LogoutFailure> {
        self.logout_session(session_id).await.map_err(|e| match e {
            LogoutClientError::NotFound => LogoutFailure::NotFound,
            other => {
                tracing::warn!(error = %other, "logout call failed");
                LogoutFailure::Other(other.to_string())
            }
        })
    }
}
