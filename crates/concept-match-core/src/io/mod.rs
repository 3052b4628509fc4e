//! File I/O: delimited tables and JSON feeds.
//!
//! Everything the pipeline persists or consumes is flat CSV or JSON so that
//! operators can inspect (and, for checkpoints, delete) state with ordinary
//! tools. That transparency is the resumability mechanism, not an accident.

mod ingest;

pub use ingest::*;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

/// I/O errors.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to parse JSON {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type IoResult<T> = Result<T, IoError>;

/// Read a delimited file into rows of string fields. Rows may vary in width.
pub fn read_rows(path: &Path) -> IoResult<Vec<Vec<String>>> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IoError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IoError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Drop the header row and any blank rows, matching the shape the matchers
/// expect. Call before data reaches the pipeline.
pub fn drop_header_and_blanks(rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    rows.into_iter()
        .filter(|row| !row.is_empty() && !row.iter().all(String::is_empty))
        .skip(1)
        .collect()
}

/// Write rows to a delimited file, overwriting any existing file.
pub fn write_rows<R>(rows: &[R], path: &Path) -> IoResult<()>
where
    R: AsRef<[String]>,
{
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| IoError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
    for row in rows {
        writer
            .write_record(row.as_ref())
            .map_err(|source| IoError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
    }
    writer.flush().map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a JSON array of structured records.
pub fn load_json_array<T: DeserializeOwned>(path: &Path) -> IoResult<Vec<T>> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_header_and_blanks() {
        let rows = vec![
            vec!["code".to_string(), "name".to_string()],
            vec!["".to_string(), "".to_string()],
            vec!["A01".to_string(), "Fiebre tifoidea".to_string()],
        ];
        let cleaned = drop_header_and_blanks(rows);
        assert_eq!(cleaned, vec![vec!["A01", "Fiebre tifoidea"]]);
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        let rows = vec![
            vec!["1".to_string(), "uno, con coma".to_string()],
            vec!["2".to_string(), "dos".to_string(), "extra".to_string()],
        ];

        write_rows(&rows, &path).unwrap();
        let read = read_rows(&path).unwrap();
        assert_eq!(read, rows);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = read_rows(Path::new("/no/such/file.csv")).unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }
}
