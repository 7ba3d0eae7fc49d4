//! Append-only transcript of everything sent and received.
//!
//! One sink per session identity, created under a configurable directory
//! when the session opens. The transcript is an audit artifact: it records
//! every byte in arrival order, including bytes the drain loop later trims
//! from the returned output.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

/// Append-only writer for a session's transcript file.
///
/// A disabled sink accepts appends and drops them, so callers never have to
/// branch on whether transcripts are configured.
pub struct TranscriptSink {
    writer: Option<BufWriter<File>>,
    path: Option<PathBuf>,
}

impl TranscriptSink {
    /// A sink that discards everything.
    pub fn disabled() -> Self {
        Self {
            writer: None,
            path: None,
        }
    }

    /// Open the transcript file for `identity` under `dir`, creating the
    /// directory if absent. The file is opened in append mode so repeated
    /// sessions against the same target accumulate.
    pub fn open(dir: &Path, identity: &str) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.log", identity));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("transcript sink: {}", path.display());
        Ok(Self {
            writer: Some(BufWriter::new(file)),
            path: Some(path),
        })
    }

    /// Append bytes to the transcript.
    pub fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.write_all(bytes),
            None => Ok(()),
        }
    }

    /// Flush buffered bytes to disk.
    pub fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    /// Path of the transcript file, if the sink is enabled.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sshbatch-test-{}-{}", tag, std::process::id()))
    }

    #[test]
    fn test_open_creates_directory_and_file() {
        let dir = scratch_dir("create");
        let _ = std::fs::remove_dir_all(&dir);

        let mut sink = TranscriptSink::open(&dir, "admin@lab-sw1").unwrap();
        sink.append(b"show clock\n").unwrap();
        sink.flush().unwrap();

        let path = sink.path().unwrap().to_path_buf();
        assert_eq!(path, dir.join("admin@lab-sw1.log"));
        assert_eq!(std::fs::read(&path).unwrap(), b"show clock\n");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_reopen_appends() {
        let dir = scratch_dir("append");
        let _ = std::fs::remove_dir_all(&dir);

        let mut sink = TranscriptSink::open(&dir, "admin@lab-sw1").unwrap();
        sink.append(b"first\n").unwrap();
        sink.flush().unwrap();
        drop(sink);

        let mut sink = TranscriptSink::open(&dir, "admin@lab-sw1").unwrap();
        sink.append(b"second\n").unwrap();
        sink.flush().unwrap();

        let contents = std::fs::read(sink.path().unwrap()).unwrap();
        assert_eq!(contents, b"first\nsecond\n");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_disabled_sink_swallows_appends() {
        let mut sink = TranscriptSink::disabled();
        sink.append(b"anything").unwrap();
        sink.flush().unwrap();
        assert!(sink.path().is_none());
    }
}
