use std::fs::{self, File};
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Read position in an append-only file
///
/// Only complete lines are consumed. A trailing line without its newline is
/// left in place and returned once the writer finishes it.
#[derive(Debug)]
pub struct TailCursor {
    path: PathBuf,
    reader: BufReader<File>,
    position: u64,
    last_size: u64,
}

impl TailCursor {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::LogNotFound(path.display().to_string()));
        }
        let file = File::open(path)?;
        let last_size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            position: 0,
            last_size,
        })
    }

    /// Reopen and continue from `position` if the file still reaches it
    ///
    /// A file shorter than `position` was truncated while it was closed, so
    /// the cursor starts from the beginning instead.
    pub fn resume(path: &Path, position: u64) -> Result<Self> {
        let mut cursor = Self::open(path)?;
        if position > 0 && cursor.last_size >= position {
            cursor.reader.seek(SeekFrom::Start(position))?;
            cursor.position = position;
        }
        Ok(cursor)
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn last_size(&self) -> u64 {
        self.last_size
    }

    /// Next complete line including its terminator, or `None` if none is ready
    pub fn next_line(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        let read = self.reader.read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Ok(None);
        }

        if buf.last() != Some(&b'\n') {
            // Partial line: rewind and wait for the rest
            self.reader.seek(SeekFrom::Start(self.position))?;
            return Ok(None);
        }

        self.position += read as u64;
        if self.position > self.last_size {
            self.last_size = self.position;
        }
        Ok(Some(buf))
    }

    /// Reopen from the start if the file shrank since the last check
    pub fn check_rotation(&mut self) -> Result<bool> {
        let size = fs::metadata(&self.path)?.len();
        let rotated = size < self.last_size || size < self.position;

        if rotated {
            let file = File::open(&self.path)?;
            self.reader = BufReader::new(file);
            self.position = 0;
        }
        self.last_size = size;
        Ok(rotated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_reads_complete_lines() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "first\nsecond\n").unwrap();

        let mut cursor = TailCursor::open(file.path()).unwrap();
        assert_eq!(cursor.next_line().unwrap().unwrap(), b"first\n");
        assert_eq!(cursor.next_line().unwrap().unwrap(), b"second\n");
        assert!(cursor.next_line().unwrap().is_none());
        assert_eq!(cursor.position(), 13);
    }

    #[test]
    fn test_partial_line_is_not_consumed() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "done\npart").unwrap();
        file.flush().unwrap();

        let mut cursor = TailCursor::open(file.path()).unwrap();
        assert_eq!(cursor.next_line().unwrap().unwrap(), b"done\n");
        assert!(cursor.next_line().unwrap().is_none());
        assert_eq!(cursor.position(), 5);

        write!(file, "ial\n").unwrap();
        file.flush().unwrap();
        assert_eq!(cursor.next_line().unwrap().unwrap(), b"partial\n");
    }

    #[test]
    fn test_truncation_reopens_at_start() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "old line one\nold line two\n").unwrap();
        file.flush().unwrap();

        let mut cursor = TailCursor::open(file.path()).unwrap();
        while cursor.next_line().unwrap().is_some() {}
        assert!(!cursor.check_rotation().unwrap());

        fs::write(file.path(), "new\n").unwrap();
        assert!(cursor.check_rotation().unwrap());
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.next_line().unwrap().unwrap(), b"new\n");
    }

    #[test]
    fn test_resume_continues_after_last_line() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "seen\nnext\n").unwrap();
        file.flush().unwrap();

        let mut cursor = TailCursor::resume(file.path(), 5).unwrap();
        assert_eq!(cursor.position(), 5);
        assert_eq!(cursor.next_line().unwrap().unwrap(), b"next\n");
    }

    #[test]
    fn test_resume_past_end_starts_over() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "new\n").unwrap();
        file.flush().unwrap();

        let mut cursor = TailCursor::resume(file.path(), 100).unwrap();
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.next_line().unwrap().unwrap(), b"new\n");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = TailCursor::open(&dir.path().join("Game.log"));
        assert!(matches!(result, Err(Error::LogNotFound(_))));
    }
}
