//! Append-only action log.
//!
//! Each record is stored as:
//! ```text
//! [u32 length (LE)][bincode serialized ActionLogEntry]
//! ```
//! The entry payload is the action's wire encoding, so a log can be fed back
//! through the same decode path a remote participant uses.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use park_core::Tick;

use super::{RepositoryError, Result};

/// One applied queue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    /// Tick the entry was applied at.
    pub tick: Tick,
    /// Wire encoding of the action.
    pub payload: Vec<u8>,
}

/// Writer half of an action log file.
pub struct ActionLog {
    path: PathBuf,
    writer: BufWriter<File>,
    current_offset: u64,
}

impl ActionLog {
    /// Creates a new log file.
    ///
    /// # Errors
    ///
    /// Refuses to overwrite an existing file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if path.exists() {
            return Err(RepositoryError::LogAlreadyExists(
                path.display().to_string(),
            ));
        }

        let file = OpenOptions::new().create_new(true).write(true).open(&path)?;
        tracing::debug!(target: "park::repository", path = %path.display(), "created action log");

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            current_offset: 0,
        })
    }

    /// Opens a log for appending, creating it if missing.
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let current_offset = file.metadata()?.len();
        tracing::debug!(
            target: "park::repository",
            path = %path.display(),
            offset = current_offset,
            "opened action log"
        );

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            current_offset,
        })
    }

    /// Appends one entry; returns the byte offset it was written at.
    pub fn append(&mut self, entry: &ActionLogEntry) -> Result<u64> {
        let offset = self.current_offset;
        let bytes =
            bincode::serialize(entry).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let len = u32::try_from(bytes.len()).map_err(|_| {
            RepositoryError::Serialization(format!("entry of {} bytes too large", bytes.len()))
        })?;

        self.writer.write_all(&len.to_le_bytes())?;
        self.writer.write_all(&bytes)?;
        self.current_offset += 4 + u64::from(len);
        Ok(offset)
    }

    pub fn append_all<'a>(
        &mut self,
        entries: impl IntoIterator<Item = &'a ActionLogEntry>,
    ) -> Result<()> {
        for entry in entries {
            self.append(entry)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Bytes written so far, including unflushed ones.
    pub fn size(&self) -> u64 {
        self.current_offset
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ActionLog {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(
                target: "park::repository",
                path = %self.path.display(),
                error = %e,
                "failed to flush action log on drop"
            );
        }
    }
}

/// Sequential reader over an action log file.
pub struct ActionLogReader {
    reader: BufReader<File>,
    offset: u64,
}

impl ActionLogReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self {
            reader: BufReader::new(file),
            offset: 0,
        })
    }

    /// Reads every remaining entry.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<ActionLogEntry>> {
        Self::open(path)?.collect()
    }

    /// Reads the next entry, or `None` at a clean end of file.
    ///
    /// # Errors
    ///
    /// A record cut short mid-way is reported as corrupted data.
    pub fn next_entry(&mut self) -> Result<Option<ActionLogEntry>> {
        let mut len_bytes = [0u8; 4];
        match self.reader.read_exact(&mut len_bytes) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        let len = u32::from_le_bytes(len_bytes);

        let mut data = vec![0u8; len as usize];
        self.reader.read_exact(&mut data).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                RepositoryError::CorruptedData(format!(
                    "truncated record at offset {}",
                    self.offset
                ))
            } else {
                RepositoryError::Io(e)
            }
        })?;

        let entry = bincode::deserialize(&data)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        self.offset += 4 + u64::from(len);
        Ok(Some(entry))
    }

    /// Byte offset of the next record.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl Iterator for ActionLogReader {
    type Item = Result<ActionLogEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}
