use crate::domain::entities::{DATE_FORMAT, TIME_FORMAT};
use crate::domain::errors::LabError;
use crate::interface_adapters::admin_page;
use crate::interface_adapters::protocol::{
    ErrorResponse, LogoutRequest, LogoutResponse, RegisterRequest, RegisterResponse,
    SessionListResponse,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::list_sessions::ListSessionsUseCase;
use crate::use_cases::logout::LogoutUseCase;
use crate::use_cases::register::RegisterUseCase;
use axum::{
    Form, Json,
    extract::{
        State,
        rejection::{FormRejection, JsonRejection},
    },
    http::StatusCode,
    response::{Html, Redirect},
};
use tracing::field::Empty;
use tracing::{Span, error, info, warn};

type HandlerError = (StatusCode, Json<ErrorResponse>);

// Handler for a JSON check-in.
#[tracing::instrument(
    name = "register",
    skip_all,
    fields(register_no = Empty, system_no = Empty)
)]
pub async fn register_json(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, HandlerError> {
    let Json(payload) = payload.map_err(|rejection| {
        reject_payload(rejection.status(), rejection.body_text())
    })?;
    register(state, payload).await
}

// Handler for a urlencoded form check-in.
#[tracing::instrument(
    name = "register_form",
    skip_all,
    fields(register_no = Empty, system_no = Empty)
)]
pub async fn register_form(
    State(state): State<AppState>,
    payload: Result<Form<RegisterRequest>, FormRejection>,
) -> Result<Json<RegisterResponse>, HandlerError> {
    let Form(payload) = payload.map_err(|rejection| {
        reject_payload(rejection.status(), rejection.body_text())
    })?;
    register(state, payload).await
}

async fn register(
    state: AppState,
    payload: RegisterRequest,
) -> Result<Json<RegisterResponse>, HandlerError> {
    let span = Span::current();
    span.record("register_no", payload.register_no.as_str());
    span.record("system_no", payload.system_no.as_str());

    let use_case = RegisterUseCase {
        clock: state.clock.clone(),
        store: state.sessions.clone(),
        marker: state.marker.clone(),
        mode: state.mode,
    };

    let result = use_case.execute(payload).await.map_err(map_lab_error)?;
    info!(session_id = %result.session_id, "session registered");

    Ok(Json(RegisterResponse {
        success: true,
        message: "Registration successful!".to_string(),
        session_id: result.session_id,
        name: result.name,
    }))
}

// Handler for closing a session.
#[tracing::instrument(name = "logout", skip_all, fields(session_id = Empty))]
pub async fn logout(
    State(state): State<AppState>,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> Result<Json<LogoutResponse>, HandlerError> {
    let Json(payload) = payload.map_err(|rejection| {
        reject_payload(rejection.status(), rejection.body_text())
    })?;
    Span::current().record("session_id", payload.session_id.as_str());

    let use_case = LogoutUseCase {
        clock: state.clock.clone(),
        store: state.sessions.clone(),
        marker: state.marker.clone(),
        mode: state.mode,
    };

    let result = use_case
        .execute(payload.session_id)
        .await
        .map_err(map_lab_error)?;
    info!(marker_cleared = result.marker_cleared, "session logged out");

    Ok(Json(LogoutResponse {
        success: true,
        message: "Logged out successfully!".to_string(),
        checked_out_at: format!(
            "{} {}",
            result.checked_out_at.format(DATE_FORMAT),
            result.checked_out_at.format(TIME_FORMAT)
        ),
    }))
}

// Handler for the JSON admin listing.
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<SessionListResponse>, HandlerError> {
    load_listing(&state).await.map(Json)
}

// Handler for the HTML admin table.
pub async fn admin_page(State(state): State<AppState>) -> Result<Html<String>, HandlerError> {
    let listing = load_listing(&state).await?;
    Ok(Html(admin_page::render(&listing)))
}

pub async fn home() -> Redirect {
    Redirect::to("/admin")
}

pub async fn health() -> &'static str {
    "ok"
}

async fn load_listing(state: &AppState) -> Result<SessionListResponse, HandlerError> {
    let use_case = ListSessionsUseCase {
        clock: state.clock.clone(),
        store: state.sessions.clone(),
    };

    let listing = use_case.execute().await.map_err(map_lab_error)?;

    Ok(SessionListResponse {
        total: listing.total,
        active: listing.active,
        today: listing.today,
        sessions: listing.records.into_iter().map(Into::into).collect(),
    })
}

// Helper to build a JSON error response.
fn error_response(status: StatusCode, message: &str) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            success: false,
            message: message.to_string(),
        }),
    )
}

// Malformed bodies keep axum's status and text inside the JSON envelope.
fn reject_payload(status: StatusCode, message: String) -> HandlerError {
    warn!(%status, %message, "rejected request payload");
    error_response(status, &message)
}

// Maps domain errors to HTTP responses; storage details stay in the logs.
fn map_lab_error(err: LabError) -> HandlerError {
    match err {
        LabError::Validation(rule) => {
            error_response(StatusCode::BAD_REQUEST, &rule.to_string())
        }
        LabError::Conflict => {
            error_response(StatusCode::CONFLICT, &LabError::Conflict.to_string())
        }
        LabError::NotFound => {
            error_response(StatusCode::NOT_FOUND, &LabError::NotFound.to_string())
        }
        LabError::Persistence(source) => {
            error!(error = %source, "session store failure");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage error")
        }
    }
}
