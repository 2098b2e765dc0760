//! Line-oriented address input.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot open address list {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed reading address list: {source}")]
    Read {
        #[source]
        source: io::Error,
    },
}

/// Reads every candidate address from the file at `path`.
pub fn read_addresses_from_path(path: &Path) -> Result<Vec<String>, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_addresses(BufReader::new(file))
}

/// Reads one address per line. Lines are decoded lossily and trimmed; blank
/// lines are skipped. Malformed lines are kept: deciding they are dead is the
/// resolver's job, not the reader's.
pub fn read_addresses<R: BufRead>(mut reader: R) -> Result<Vec<String>, SourceError> {
    let mut addresses = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| SourceError::Read { source })?;
        if read == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if !line.is_empty() {
            addresses.push(line.to_string());
        }
    }
    Ok(addresses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_one_address_per_line() {
        let input = Cursor::new("a@good.com\r\nb@empty.com\n\n   \nc@bad");
        let addresses = read_addresses(input).unwrap();
        assert_eq!(addresses, ["a@good.com", "b@empty.com", "c@bad"]);
    }

    #[test]
    fn empty_source_yields_nothing() {
        let addresses = read_addresses(Cursor::new("")).unwrap();
        assert!(addresses.is_empty());
    }

    #[test]
    fn invalid_utf8_does_not_abort_the_read() {
        let input = Cursor::new(b"ok@example.com\n\xff\xfe@bad\nnext@example.com\n".to_vec());
        let addresses = read_addresses(input).unwrap();
        assert_eq!(addresses.len(), 3);
        assert_eq!(addresses[2], "next@example.com");
    }

    #[test]
    fn missing_file_reports_open_error() {
        let path = std::env::temp_dir().join("mxsweep-definitely-missing-input.txt");
        let err = read_addresses_from_path(&path).expect_err("file does not exist");
        assert!(matches!(err, SourceError::Open { .. }));
    }
}
