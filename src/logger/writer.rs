//! Log writer module
//!
//! Process-wide sinks for info and error lines: stdout/stderr by default,
//! append-mode files when configured.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

enum Sink {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

impl Sink {
    fn open(path: Option<&str>, fallback: Self) -> io::Result<Self> {
        match path {
            Some(path) => Ok(Self::File(Mutex::new(open_log_file(path)?))),
            None => Ok(fallback),
        }
    }

    fn write_line(&self, line: &str) {
        match self {
            Self::Stdout => println!("{line}"),
            Self::Stderr => eprintln!("{line}"),
            Self::File(file) => {
                let mut file = file.lock().unwrap_or_else(PoisonError::into_inner);
                let _ = writeln!(file, "{line}");
            }
        }
    }
}

/// Info and error sinks
pub struct LogWriter {
    info: Sink,
    error: Sink,
}

impl LogWriter {
    fn new(info_file: Option<&str>, error_file: Option<&str>) -> io::Result<Self> {
        Ok(Self {
            info: Sink::open(info_file, Sink::Stdout)?,
            error: Sink::open(error_file, Sink::Stderr)?,
        })
    }

    pub fn write_info(&self, line: &str) {
        self.info.write_line(line);
    }

    pub fn write_error(&self, line: &str) {
        self.error.write_line(line);
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global writer; fails if called twice
pub fn init(info_file: Option<&str>, error_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter::new(info_file, error_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Global writer, if `init` has run
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}
