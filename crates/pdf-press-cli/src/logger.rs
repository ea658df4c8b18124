use chrono::Local;
use log::{LevelFilter, Metadata, Record};
use std::io::Write;

/// Writes timestamped log lines to stderr
pub struct StderrLogger {
    level: LevelFilter,
}

impl StderrLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// `-q` keeps errors only; each `-v` opens one more level past warnings
    pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
        if quiet {
            return LevelFilter::Error;
        }
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut stderr = std::io::stderr().lock();
            // Nowhere left to report a failed write to stderr
            let _ = writeln!(
                stderr,
                "{} {:<5} {}: {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(StderrLogger::level_for(0, false), LevelFilter::Warn);
        assert_eq!(StderrLogger::level_for(1, false), LevelFilter::Info);
        assert_eq!(StderrLogger::level_for(2, false), LevelFilter::Debug);
        assert_eq!(StderrLogger::level_for(7, false), LevelFilter::Trace);
        assert_eq!(StderrLogger::level_for(3, true), LevelFilter::Error);
    }
}
