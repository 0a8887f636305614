//! Provides helper function to initialize logging to stderr through the
//! env_logger crate.
//!
//! Messages are printed as `[LEVEL][module::path] message`. The level passed to
//! `init` is a default, `RUST_LOG` overrides it when set.
//!
//! # Examples
//!
//! ```no_run
//! use chip8_host::logger::{init, LevelFilter};
//! use log::{debug, info};
//!
//! init(LevelFilter::Info).unwrap();
//!
//! info!("Shutdown procedure started");
//! debug!("Value of V0: {}", 0x12);
//! ```

use std::io::Write;

use env_logger::Builder;

pub use log::{LevelFilter, SetLoggerError};

/// Install stderr logger as the `log` facade backend
///
/// Fails if a logger has already been installed.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    builder(level).try_init()
}

fn builder(level: LevelFilter) -> Builder {
    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{:5}][{}] {}",
                record.level(),
                record.module_path().unwrap_or_default(),
                record.args()
            )
        })
        .parse_default_env();
    builder
}
