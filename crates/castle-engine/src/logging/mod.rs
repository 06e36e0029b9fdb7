//! Logging bootstrap over the `log` facade.
//!
//! Engine code only uses `log` macros; binaries call [`init_logging`] once
//! early in `main` to install `env_logger`.

mod init;

pub use init::{init_logging, LoggingConfig};
