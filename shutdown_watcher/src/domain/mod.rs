pub mod outcome;
pub mod ports;
pub mod session;
