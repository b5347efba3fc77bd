// Logger - Backend for the `log` facade
//
// Provides:
// - Verbosity ladder driven by repeated `-v` flags
// - Output to stderr, optionally mirrored into a file
// - A bounded in-memory buffer of recent lines

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// No logging
    None,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warning,
    /// Info, warnings, and errors
    Info,
    /// Debug information (frame timing, SPI buffer dumps)
    Debug,
    /// Verbose trace logging (sensor values, braille previews)
    Trace,
}

impl LogLevel {
    /// Level for a count of `-v` flags
    ///
    /// Warnings are always shown; each flag adds one level up to `Trace`.
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => LogLevel::Warning,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Matching `log` filter
    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::None => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Logger
///
/// Formats records from the `log` macros and writes them to stderr, an
/// optional log file and a memory buffer.
pub struct Logger {
    /// Current log level
    log_level: LogLevel,

    /// Whether lines also go to stderr
    to_stderr: bool,

    /// Recently logged lines
    buffer: Mutex<Vec<String>>,

    /// Maximum number of lines in the buffer (0 = unlimited)
    max_buffer_size: usize,

    /// Output file
    output_file: Option<Mutex<File>>,
}

impl Logger {
    /// Create a logger writing to stderr
    ///
    /// # Arguments
    ///
    /// * `level` - Most verbose level that is emitted
    pub fn new(level: LogLevel) -> Self {
        Logger {
            log_level: level,
            to_stderr: true,
            buffer: Mutex::new(Vec::new()),
            max_buffer_size: 256,
            output_file: None,
        }
    }

    /// Create a logger that only keeps lines in memory
    pub fn in_memory(level: LogLevel) -> Self {
        Logger {
            to_stderr: false,
            ..Logger::new(level)
        }
    }

    /// Mirror every line into a file, truncating it first
    ///
    /// # Returns
    ///
    /// The logger, or the error from creating the file
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> std::io::Result<Self> {
        let file = File::create(path)?;
        self.output_file = Some(Mutex::new(file));
        Ok(self)
    }

    /// Set maximum buffer size
    ///
    /// When the buffer exceeds this size, old lines are removed.
    /// Set to 0 for unlimited size.
    pub fn with_max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size;
        self
    }

    /// Get the current log level
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Lines currently held in the buffer, oldest first
    pub fn entries(&self) -> Vec<String> {
        match self.buffer.lock() {
            Ok(buffer) => buffer.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Register as the global `log` backend
    ///
    /// # Returns
    ///
    /// An error if another logger was installed first
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        let filter = self.log_level.to_filter();
        log::set_logger(Box::leak(Box::new(self)))?;
        log::set_max_level(filter);
        Ok(())
    }

    /// Render one record as a log line
    pub fn format_record(record: &log::Record<'_>) -> String {
        format!(
            "[{}] {:<5} {}: {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    }

    /// Add a line to the buffer and optionally write it to stderr and file
    fn add_entry(&self, line: String) {
        if self.to_stderr {
            eprintln!("{}", line);
        }

        if let Some(file) = &self.output_file {
            if let Ok(mut file) = file.lock() {
                let _ = writeln!(file, "{}", line);
            }
        }

        let mut buffer = match self.buffer.lock() {
            Ok(buffer) => buffer,
            Err(poisoned) => poisoned.into_inner(),
        };
        buffer.push(line);

        // Trim buffer if needed
        if self.max_buffer_size > 0 && buffer.len() > self.max_buffer_size {
            buffer.remove(0);
        }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= self.log_level.to_filter()
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.add_entry(Self::format_record(record));
    }

    fn flush(&self) {
        if let Some(file) = &self.output_file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    fn record<'a>(level: log::Level, args: std::fmt::Arguments<'a>) -> log::Record<'a> {
        log::Record::builder()
            .level(level)
            .target("pironman_lite::test")
            .args(args)
            .build()
    }

    #[test]
    fn test_from_verbosity() {
        assert_eq!(LogLevel::from_verbosity(0), LogLevel::Warning);
        assert_eq!(LogLevel::from_verbosity(1), LogLevel::Info);
        assert_eq!(LogLevel::from_verbosity(2), LogLevel::Debug);
        assert_eq!(LogLevel::from_verbosity(3), LogLevel::Trace);
        assert_eq!(LogLevel::from_verbosity(200), LogLevel::Trace);
    }

    #[test]
    fn test_level_filtering() {
        let logger = Logger::in_memory(LogLevel::Info);

        logger.log(&record(log::Level::Info, format_args!("shown")));
        logger.log(&record(log::Level::Debug, format_args!("hidden")));
        logger.log(&record(log::Level::Error, format_args!("also shown")));

        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].ends_with("INFO  pironman_lite::test: shown"));
        assert!(entries[1].contains("ERROR"));
    }

    #[test]
    fn test_none_level_drops_everything() {
        let logger = Logger::in_memory(LogLevel::None);
        logger.log(&record(log::Level::Error, format_args!("dropped")));
        assert!(logger.entries().is_empty());
    }

    #[test]
    fn test_buffer_trimming() {
        let logger = Logger::in_memory(LogLevel::Trace).with_max_buffer_size(3);
        for i in 0..5 {
            logger.log(&record(log::Level::Info, format_args!("line {}", i)));
        }

        let entries = logger.entries();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].ends_with("line 2"));
        assert!(entries[2].ends_with("line 4"));
    }

    #[test]
    fn test_log_file_output() {
        let path = std::env::temp_dir().join(format!("pironman-log-{}.txt", std::process::id()));
        let logger = Logger::in_memory(LogLevel::Warning)
            .with_log_file(&path)
            .expect("log file");

        logger.log(&record(log::Level::Warn, format_args!("to file")));
        logger.flush();

        let contents = std::fs::read_to_string(&path).expect("log file readable");
        assert!(contents.contains("WARN  pironman_lite::test: to file"));

        let _ = std::fs::remove_file(&path);
    }
}
