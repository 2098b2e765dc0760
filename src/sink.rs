//! Append-only persistence of addresses found alive.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("cannot open result file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed writing {address}: {source}")]
    Write {
        address: String,
        #[source]
        source: io::Error,
    },
    #[error("failed flushing results: {source}")]
    Flush {
        #[source]
        source: io::Error,
    },
}

/// Destination for accepted addresses. Owned by the aggregator alone.
pub trait ResultSink {
    /// Appends `address` as one newline-terminated line.
    fn append(&mut self, address: &str) -> Result<(), SinkError>;

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Result file opened once for the run. Existing content is never truncated,
/// so re-running over the same input appends duplicates.
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = open_append(&path).map_err(|source| SinkError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn open_append(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl ResultSink for FileSink {
    fn append(&mut self, address: &str) -> Result<(), SinkError> {
        writeln!(self.writer, "{address}").map_err(|source| SinkError::Write {
            address: address.to_string(),
            source,
        })
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer
            .flush()
            .map_err(|source| SinkError::Flush { source })
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Err(err) = self.writer.flush() {
            tracing::error!(path = %self.path.display(), error = %err, "result file not flushed");
        }
    }
}

impl ResultSink for Vec<String> {
    fn append(&mut self, address: &str) -> Result<(), SinkError> {
        self.push(address.to_string());
        Ok(())
    }
}
