//! Log file setup.
//!
//! Every harvest appends to a log file, one line per event:
//!
//! ```text
//! 2025-06-01 14:03:22,518 INFO archived 104738320183729841
//! ```

use chrono::Local;
use log::{Level, LevelFilter};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Format of each line's timestamp.
const TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Sends log messages for this crate to the file at `path`, appending if
/// it already exists.
///
/// Messages below `level` are discarded. Other crates only log warnings
/// and errors. If `warnings` is true, warnings and errors are also echoed
/// to standard error.
///
/// Only the first call in a process installs a logger; later calls still
/// open `path` but are otherwise ignored.
pub fn init(path: &Path, level: LevelFilter, warnings: bool) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Warn.min(level))
        .filter_module(env!("CARGO_CRATE_NAME"), level)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format(move |buf, record| {
            if warnings && record.level() <= Level::Warn {
                eprintln!("{}: {}", record.level(), record.args());
            }
            writeln!(
                buf,
                "{} {} {}",
                Local::now().format(TIMESTAMP),
                record.level(),
                record.args()
            )
        })
        .try_init();

    Ok(())
}
