//! Follows a single log file from its current end, detecting rotation and
//! truncation by inode and size.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use tracing::{debug, info, warn};

use crate::error::Result;

/// Identifies a file uniquely enough to notice rotation. On non-Unix
/// platforms inode numbers are unavailable; size-only comparison still
/// catches truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct FileIdentity {
    inode: u64,
    size: u64,
}

fn stat_identity(path: &Path) -> std::io::Result<FileIdentity> {
    let meta = std::fs::metadata(path)?;
    #[cfg(unix)]
    let inode = meta.ino();
    #[cfg(not(unix))]
    let inode = 0;
    Ok(FileIdentity {
        inode,
        size: meta.len(),
    })
}

/// Tails one file, re-opening transparently across rotation/truncation.
pub struct Tailer {
    path: PathBuf,
    file: Option<BufReader<File>>,
    identity: FileIdentity,
    position: u64,
}

impl Tailer {
    /// Opens `path`. If `seek_end` is true, starts reading from the current
    /// end of file; otherwise from the beginning.
    pub fn open(path: impl Into<PathBuf>, seek_end: bool) -> Result<Self> {
        let path = path.into();
        let mut file = File::open(&path)?;
        let identity = stat_identity(&path)?;
        let position = if seek_end {
            file.seek(SeekFrom::End(0))?
        } else {
            file.seek(SeekFrom::Start(0))?
        };
        info!(path = %path.display(), %position, "tailer opened");
        Ok(Self {
            path,
            file: Some(BufReader::new(file)),
            identity,
            position,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn inode(&self) -> u64 {
        self.identity.inode
    }

    /// Reads all lines appended since the last call. Returns an empty
    /// vector (never an error) on transient I/O trouble; the caller should
    /// just retry on the next tick.
    pub fn read_new_lines(&mut self) -> Vec<String> {
        match self.read_new_lines_inner() {
            Ok(lines) => lines,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "transient tailer read failure");
                Vec::new()
            }
        }
    }

    fn read_new_lines_inner(&mut self) -> std::io::Result<Vec<String>> {
        if self.detect_rotation()? {
            self.reopen()?;
        }

        let Some(reader) = self.file.as_mut() else {
            return Ok(Vec::new());
        };

        let mut lines = Vec::new();
        loop {
            let mut buf = String::new();
            let bytes_read = reader.read_line(&mut buf)?;
            if bytes_read == 0 {
                break;
            }
            if buf.ends_with('\n') {
                buf.pop();
                if buf.ends_with('\r') {
                    buf.pop();
                }
                self.position += bytes_read as u64;
                lines.push(buf);
            } else {
                // Partial line at EOF: rewind so it is re-read whole next time.
                reader.seek_relative(-(bytes_read as i64))?;
                break;
            }
        }
        Ok(lines)
    }

    /// True if the file at `self.path` is no longer the same file (rotated,
    /// replaced) or has been truncated below the recorded read position.
    fn detect_rotation(&self) -> std::io::Result<bool> {
        let current = match stat_identity(&self.path) {
            Ok(id) => id,
            Err(_) => return Ok(true), // file gone: treat as rotation
        };
        Ok(current.inode != self.identity.inode || current.size < self.position)
    }

    fn reopen(&mut self) -> std::io::Result<()> {
        info!(path = %self.path.display(), "log rotation detected, reopening at offset 0");
        let mut file = File::open(&self.path)?;
        let identity = stat_identity(&self.path)?;
        file.seek(SeekFrom::Start(0))?;
        self.file = Some(BufReader::new(file));
        self.identity = identity;
        self.position = 0;
        Ok(())
    }

    pub fn close(&mut self) {
        debug!(path = %self.path.display(), "tailer closed");
        self.file = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(path: &Path, contents: &str) {
        let mut f = File::create(path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn seek_end_then_append_yields_new_lines_in_order() {
        let dir = tempdir();
        let path = dir.join("test.log");
        write_file(&path, "old line 1\nold line 2\n");

        let mut tailer = Tailer::open(&path, true).unwrap();
        assert!(tailer.read_new_lines().is_empty());

        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(f, "A").unwrap();
        writeln!(f, "B").unwrap();
        writeln!(f, "C").unwrap();

        let lines = tailer.read_new_lines();
        assert_eq!(lines, vec!["A", "B", "C"]);
    }

    #[test]
    fn rotation_reopens_at_new_inode() {
        let dir = tempdir();
        let path = dir.join("rotate.log");
        write_file(&path, "before1\nbefore2\n");

        let mut tailer = Tailer::open(&path, true).unwrap();

        // simulate rotation: remove and recreate the file at the same path
        std::fs::remove_file(&path).unwrap();
        write_file(&path, "after1\nafter2\n");

        let lines = tailer.read_new_lines();
        assert_eq!(lines, vec!["after1", "after2"]);
    }

    #[test]
    fn truncation_below_position_reopens_at_zero() {
        let dir = tempdir();
        let path = dir.join("trunc.log");
        write_file(&path, "0123456789\n");

        let mut tailer = Tailer::open(&path, false).unwrap();
        let _ = tailer.read_new_lines();

        write_file(&path, "ab\n");
        let lines = tailer.read_new_lines();
        assert_eq!(lines, vec!["ab"]);
    }

    fn tempdir() -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("tailer-test-{}", std::process::id()));
        let _ = std::fs::create_dir_all(&dir);
        dir.push(format!("{}", rand_suffix()));
        let _ = std::fs::create_dir_all(&dir);
        dir
    }

    fn rand_suffix() -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .subsec_nanos() as u64
    }
}
