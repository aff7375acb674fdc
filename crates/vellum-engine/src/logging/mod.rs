//! Logger setup for binaries and tests built on the engine.
//!
//! The library itself only emits through the `log` facade.

mod init;

pub use init::{init_logging, LoggingConfig};
