//! Logging Infrastructure
//!
//! Console logging by default, daily rolling files when a log directory is set.

use std::path::Path;

/// Initialize the logger with optional file output
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level.parse().unwrap_or(tracing::Level::INFO))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        match std::fs::create_dir_all(log_path) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::daily(log_path, "pos-server");
                subscriber.with_ansi(false).with_writer(file_appender).init();
                return;
            }
            Err(e) => eprintln!("Cannot create log dir {}: {}, logging to stdout", dir, e),
        }
    }

    subscriber.init();
}
