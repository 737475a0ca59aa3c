pub mod admin_page;
pub mod handlers;
pub mod marker_file;
pub mod protocol;
pub mod routes;
pub mod sqlite_store;
pub mod state;
