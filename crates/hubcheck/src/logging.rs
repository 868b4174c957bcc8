//! Process-wide log setup.
//!
//! Two sinks share one `EnvFilter` (`RUST_LOG` wins over the configured
//! level): colored lines on stdout and plain lines in a size-rotated file.
//!
//! ```text
//! logs/tests.log      <- current
//! logs/tests.log.1    <- newest backup
//! ...
//! logs/tests.log.5    <- oldest kept, dropped on next rotation
//! ```

use crate::result::{HarnessError, HarnessResult};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Rotate once the file would exceed this many bytes (10 MB)
pub const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;
/// Rotated files kept next to the current one
pub const LOG_BACKUPS: usize = 5;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Log sink settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Directory holding the log file
    pub dir: PathBuf,
    /// File name inside `dir`
    pub file_name: String,
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Rotation threshold in bytes
    pub max_bytes: u64,
    /// Rotated files to keep
    pub backups: usize,
    /// Also log to stdout
    pub stdout: bool,
    /// Color stdout output
    pub ansi: bool,
}

impl LogConfig {
    /// Settings for `dir/file_name` at `info`
    #[must_use]
    pub fn new(dir: PathBuf, file_name: &str) -> Self {
        Self {
            dir,
            file_name: file_name.to_string(),
            level: "info".to_string(),
            max_bytes: MAX_LOG_BYTES,
            backups: LOG_BACKUPS,
            stdout: true,
            ansi: true,
        }
    }

    /// Full path of the current log file
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Set the default filter directive
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the log directory
    #[must_use]
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Set the rotation threshold
    #[must_use]
    pub const fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Enable or disable stdout output
    #[must_use]
    pub const fn with_stdout(mut self, stdout: bool) -> Self {
        self.stdout = stdout;
        self
    }

    /// Enable or disable colors on stdout
    #[must_use]
    pub const fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }
}

/// Install the global subscriber. Fails if one is already set.
pub fn init(config: &LogConfig) -> HarnessResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let file = RollingFile::open(config.path(), config.max_bytes, config.backups)?;

    let file_layer = fmt::layer()
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(Mutex::new(file));

    let stdout_layer = config.stdout.then(|| {
        fmt::layer()
            .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
            .with_ansi(config.ansi)
            .with_file(true)
            .with_line_number(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| HarnessError::config(format!("logging already initialized: {e}")))
}

/// Append-only file that rotates by size
#[derive(Debug)]
pub struct RollingFile {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    backups: usize,
}

impl RollingFile {
    /// Open (or create) `path`, creating parent directories
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backups: usize) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            file,
            written,
            max_bytes,
            backups,
        })
    }

    /// Path of the current file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.backups == 0 {
            self.file = File::create(&self.path)?;
        } else {
            let oldest = self.backup_path(self.backups);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for index in (1..self.backups).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
            self.file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
        }
        self.written = 0;
        Ok(())
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
