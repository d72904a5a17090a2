//! Tracing initialization
//!
//! Installs the global subscriber once per process.

mod init_basic;

pub use init_basic::{default_filter, init_telemetry};
