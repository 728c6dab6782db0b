// src/log.rs
//! Logging setup: `tracing` events go to `.store/debug.log`, stamped with
//! time since start. The CLI can mirror them to stderr.

use std::{
    fmt,
    fs::{self, OpenOptions},
    path::Path,
    sync::{Mutex, OnceLock},
    time::Instant,
};

use tracing_subscriber::{
    fmt::{format::Writer, time::FormatTime, writer::BoxMakeWriter},
    prelude::*,
    EnvFilter,
};

use crate::config::consts::LOG_FILE;

static START: OnceLock<Instant> = OnceLock::new();

fn start() -> Instant {
    *START.get_or_init(Instant::now)
}

fn fmt_elapsed(ms: u128) -> String {
    let total_ms = ms as u64;
    let h = total_ms / 3_600_000;
    let m = (total_ms % 3_600_000) / 60_000;
    let s = (total_ms % 60_000) / 1_000;
    let ms = total_ms % 1_000;
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// `[hh:mm:ss.mmm]` since the process started logging.
struct Elapsed;

impl FormatTime for Elapsed {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "[{}]", fmt_elapsed(start().elapsed().as_millis()))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `default_filter`
/// (e.g. `"ptr_claim=info"`). Safe to call more than once; later calls
/// are ignored.
pub fn init(store_dir: &Path, default_filter: &str, to_stderr: bool) {
    start();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_writer = fs::create_dir_all(store_dir)
        .and_then(|_| OpenOptions::new().create(true).append(true).open(store_dir.join(LOG_FILE)));
    let (writer, to_file) = match file_writer {
        Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), true),
        Err(_) => (BoxMakeWriter::new(std::io::stderr), false),
    };

    let file_layer = tracing_subscriber::fmt::layer()
        .with_timer(Elapsed)
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer);

    let stderr_layer = (to_stderr && to_file).then(|| {
        tracing_subscriber::fmt::layer()
            .with_timer(Elapsed)
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_format() {
        assert_eq!(fmt_elapsed(0), "00:00:00.000");
        assert_eq!(fmt_elapsed(3_723_004), "01:02:03.004");
    }
}
