use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::prelude::*;
use log::{LevelFilter, Log, Metadata, Record};

use crate::error::Result;

const CRATE_TARGET: &str = "sparkify_etl";

/// Appends this crate's log records to a file.
pub struct Logger {
    file: Mutex<File>,
    level: LevelFilter,
}

impl Logger {
    pub fn open(path: &Path, level: LevelFilter) -> Result<Logger> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Logger {
            file: Mutex::new(file),
            level,
        })
    }
}

fn format_line(record: &Record) -> String {
    let mut target = record.target();

    if target.starts_with("sparkify_etl::") {
        target = &target[CRATE_TARGET.len() + 2..];
    }

    format!(
        "{} {:<5} {}: {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        record.level(),
        target,
        record.args()
    )
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with(CRATE_TARGET)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_line(record);

        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

pub fn init(path: &Path, level: LevelFilter) -> Result<()> {
    let logger = Logger::open(path, level)?;

    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use log::Level;
    use tempfile::TempDir;

    fn emit(logger: &Logger, level: Level, target: &str, message: &str) {
        logger.log(
            &Record::builder()
                .args(format_args!("{}", message))
                .level(level)
                .target(target)
                .build(),
        );
    }

    #[test]
    fn appends_crate_records_at_level() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("etl.log");
        fs::write(&path, "earlier run\n").unwrap();

        let logger = Logger::open(&path, LevelFilter::Error).unwrap();
        emit(&logger, Level::Error, "sparkify_etl::scan", "can't process 'a.json'");
        emit(&logger, Level::Info, "sparkify_etl::scan", "2 files found");
        emit(&logger, Level::Error, "rusqlite", "not ours");
        logger.flush();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "earlier run");
        assert!(lines[1].ends_with("ERROR scan: can't process 'a.json'"));
    }
}
