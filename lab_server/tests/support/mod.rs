// Boots a real lab server per test on an ephemeral port.
use std::{path::PathBuf, sync::Arc};

use lab_server::domain::entities::RegistrationMode;
use lab_server::frameworks::db;
use lab_server::interface_adapters::marker_file::FileMarkerStore;
use lab_server::interface_adapters::sqlite_store::SqliteSessionStore;
use lab_server::interface_adapters::state::{AppState, SystemClock};

pub struct TestServer {
    pub base_url: String,
    pub marker_path: PathBuf,
    // Keeps the marker directory alive for the duration of the test.
    _dir: tempfile::TempDir,
}

pub async fn spawn_server(mode: RegistrationMode) -> TestServer {
    spawn(mode, false).await
}

// Same server over a database file, so requests run on separate pooled
// connections.
pub async fn spawn_server_with_file_database(mode: RegistrationMode) -> TestServer {
    spawn(mode, true).await
}

async fn spawn(mode: RegistrationMode, file_database: bool) -> TestServer {
    let dir = tempfile::tempdir().expect("create temp dir");
    let marker_path = dir.path().join("current_session.txt");
    let database_url = if file_database {
        format!("sqlite://{}", dir.path().join("logs.db").display())
    } else {
        "sqlite::memory:".to_string()
    };

    let pool = db::connect_pool(&database_url)
        .await
        .expect("open in-memory database");
    db::run_migrations(&pool).await.expect("run migrations");

    let state = AppState {
        sessions: Arc::new(SqliteSessionStore::new(pool)),
        marker: Arc::new(FileMarkerStore::new(&marker_path)),
        clock: Arc::new(SystemClock),
        mode,
    };

    // Bind to an ephemeral port to avoid collisions with local services.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        lab_server::run(listener, state).await.expect("server failed");
    });

    TestServer {
        base_url: format!("http://{addr}"),
        marker_path,
        _dir: dir,
    }
}
