// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::OpsError;

/// Tab-separated output appended to an existing or new file.
///
/// Every run writes its header first, so a file reused across runs holds one
/// header per run. Rows are flushed as they are written.
pub struct TsvAppender {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl TsvAppender {
    /// Opens `path` for appending and writes `header`.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::Open` or `OpsError::Write`.
    pub fn open(path: &Path, header: &[&str]) -> Result<Self, OpsError> {
        let file: File = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| OpsError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        let writer: csv::Writer<File> = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(csv::QuoteStyle::Never)
            .has_headers(false)
            .from_writer(file);
        let mut appender: Self = Self {
            path: path.to_path_buf(),
            writer,
        };
        appender.write_row(header)?;
        Ok(appender)
    }

    /// Appends one row.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::Write`.
    pub fn write_row<I, F>(&mut self, fields: I) -> Result<(), OpsError>
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[u8]>,
    {
        self.writer
            .write_record(fields)
            .and_then(|()| self.writer.flush().map_err(csv::Error::from))
            .map_err(|source| OpsError::Write {
                path: self.path.clone(),
                source,
            })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
