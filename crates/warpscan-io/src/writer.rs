//! Append-only result row sinks shared by concurrent batch workers.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info, instrument, warn};

use crate::row::{HEADER, ResultRow};
use crate::IoError;

/// Destination for result rows.
///
/// Implementations are shared by reference across worker threads and must
/// serialise appends internally. A failed append is returned, never dropped.
pub trait RowSink: Sync {
    /// Append one row.
    ///
    /// # Errors
    ///
    /// Implementation-specific; [`CsvResultSink`] returns
    /// [`IoError::AppendRow`] once its retries are exhausted.
    fn append(&self, row: &ResultRow) -> Result<(), IoError>;
}

/// Writes result rows as CSV with the fixed [`HEADER`].
///
/// Each row is rendered to bytes first and then written and flushed under
/// one lock, so a crash loses at most the row in flight. A failed write is
/// retried up to `retries` extra times, resuming after the last byte the
/// writer accepted.
pub struct CsvResultSink<W: Write = File> {
    path: PathBuf,
    retries: usize,
    writer: Mutex<W>,
}

impl CsvResultSink<File> {
    /// Create (or truncate) the CSV file at `path` and write the header.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::CreateOutput`] | The directory or file cannot be created |
    /// | [`IoError::AppendRow`] | The header cannot be written |
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn create(path: &Path) -> Result<Self, IoError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| IoError::CreateOutput {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let file = File::create(path).map_err(|e| IoError::CreateOutput {
            path: path.to_path_buf(),
            source: e,
        })?;
        let sink = Self::from_writer(file, path.to_path_buf())?;
        info!("result file created");
        Ok(sink)
    }
}

impl<W: Write> CsvResultSink<W> {
    /// Wrap an arbitrary writer and write the header. `path` is used only in
    /// log fields and error messages.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::AppendRow`] if the header cannot be written.
    pub fn from_writer(writer: W, path: PathBuf) -> Result<Self, IoError> {
        let sink = Self {
            path,
            retries: 2,
            writer: Mutex::new(writer),
        };
        let header = sink.render(&HEADER)?;
        {
            let mut writer = sink.lock()?;
            sink.write_with_retry(&mut writer, &header)?;
        }
        debug!(path = %sink.path.display(), "header written");
        Ok(sink)
    }

    /// Set how many times a failed write is retried before giving up.
    #[must_use]
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// Return the output path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, W>, IoError> {
        self.writer.lock().map_err(|_| IoError::SinkPoisoned {
            path: self.path.clone(),
        })
    }

    /// Encode one record, quoting included, into a standalone buffer.
    ///
    /// Nothing reaches the shared writer unless the whole record encodes.
    fn render<I, T>(&self, record: I) -> Result<Vec<u8>, IoError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let append_error = |source: io::Error| IoError::AppendRow {
            path: self.path.clone(),
            attempts: 1,
            source,
        };
        let mut encoder = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        encoder
            .write_record(record)
            .map_err(|e| append_error(e.into()))?;
        encoder
            .into_inner()
            .map_err(|e| append_error(io::Error::new(e.error().kind(), e.to_string())))
    }

    /// Write `bytes` and flush, retrying failures from the first unwritten
    /// byte so a short write followed by an error never repeats data.
    fn write_with_retry(&self, writer: &mut W, bytes: &[u8]) -> Result<(), IoError> {
        let mut written = 0;
        let mut attempts = 1;
        loop {
            match write_tail(writer, bytes, &mut written) {
                Ok(()) => return Ok(()),
                Err(e) if attempts <= self.retries => {
                    warn!(
                        path = %self.path.display(),
                        attempt = attempts,
                        written,
                        error = %e,
                        "row write failed, retrying"
                    );
                    attempts += 1;
                }
                Err(e) => {
                    return Err(IoError::AppendRow {
                        path: self.path.clone(),
                        attempts,
                        source: e,
                    });
                }
            }
        }
    }
}

/// Write `bytes[*written..]`, advancing `written` past every accepted byte,
/// then flush.
fn write_tail<W: Write>(writer: &mut W, bytes: &[u8], written: &mut usize) -> io::Result<()> {
    while *written < bytes.len() {
        match writer.write(&bytes[*written..]) {
            Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero)),
            Ok(n) => *written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    writer.flush()
}

impl<W: Write + Send> RowSink for CsvResultSink<W> {
    fn append(&self, row: &ResultRow) -> Result<(), IoError> {
        let bytes = self.render(&row.to_record())?;
        let mut writer = self.lock()?;
        self.write_with_retry(&mut writer, &bytes)
    }
}

/// Collects rows in memory, in append order.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Mutex<Vec<ResultRow>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the sink and return the collected rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<ResultRow> {
        self.rows.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the number of rows collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.lock().map_or(0, |rows| rows.len())
    }

    /// Return true if no rows have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RowSink for MemorySink {
    fn append(&self, row: &ResultRow) -> Result<(), IoError> {
        self.rows
            .lock()
            .map_err(|_| IoError::SinkPoisoned {
                path: PathBuf::from("<memory>"),
            })?
            .push(row.clone());
        Ok(())
    }
}
