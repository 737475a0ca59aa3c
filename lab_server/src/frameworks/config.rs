use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use crate::domain::entities::RegistrationMode;

// Runtime/server settings, read from the environment (and `.env`).

pub fn http_addr() -> SocketAddr {
    let host: IpAddr = env::var("LAB_SERVER_HOST")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    let port: u16 = env::var("LAB_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5000);
    SocketAddr::new(host, port)
}

pub fn database_url() -> String {
    env::var("LAB_DATABASE_URL").unwrap_or_else(|_| "sqlite://logs.db".to_string())
}

pub fn marker_path() -> PathBuf {
    env::var("LAB_MARKER_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("current_session.txt"))
}

// A typo here must not silently switch validation rules.
pub fn registration_mode() -> Result<RegistrationMode, String> {
    match env::var("LAB_REGISTRATION_MODE") {
        Ok(value) => value.parse(),
        Err(_) => Ok(RegistrationMode::default()),
    }
}
