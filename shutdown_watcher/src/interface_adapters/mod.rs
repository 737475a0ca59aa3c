pub mod client;
pub mod diagnostic_log;
pub mod marker_file;
pub mod notifiers;
