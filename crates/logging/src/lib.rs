//! Logging initialization for hosts embedding the engine.
//!
//! Two modes: Cli logs to STDOUT; Embedded logs to STDERR so a host
//! speaking a protocol on STDOUT keeps that stream clean. The filter
//! defaults to `info` and honors `RUST_LOG`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

pub enum LogMode {
    Cli,
    Embedded,
}

pub fn init(mode: LogMode, verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    match mode {
        LogMode::Cli => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .init();
        }
        LogMode::Embedded => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .init();
        }
    }
    Ok(())
}
