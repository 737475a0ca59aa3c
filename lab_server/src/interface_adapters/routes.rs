use crate::interface_adapters::handlers::{
    admin_page, health, home, list_sessions, logout, register_form, register_json,
};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/register", post(register_form))
        .route("/api/register", post(register_json))
        .route("/api/logout", post(logout))
        .route("/api/sessions", get(list_sessions))
        .route("/admin", get(admin_page))
        .with_state(state)
}
