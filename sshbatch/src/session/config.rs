//! Per-session configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::transport::{AuthMethod, HostKeyVerification};

/// Whether the session drives a persistent shell or one-shot exec requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// Persistent PTY shell; batches of commands share one channel.
    #[default]
    Shell,

    /// One command per invocation over a fresh exec channel.
    Exec,
}

/// Immutable parameters for one session.
///
/// Created once by [`SessionBuilder`](super::SessionBuilder) and owned by the
/// session for its lifetime; per-batch overrides travel in
/// [`CommandBatch`](super::CommandBatch) instead of mutating this.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// SSH port.
    pub port: u16,

    /// Username for authentication.
    pub username: String,

    /// Authentication method.
    pub auth: AuthMethod,

    /// Shell or exec mode.
    pub mode: SessionMode,

    /// Default prompt substring to count. Empty means never match.
    pub prompt: String,

    /// Default number of prompt occurrences that complete a batch.
    pub prompt_count: u32,

    /// Default read timeout for one drain.
    pub timeout: Duration,

    /// Pause between command sends within a batch.
    pub delay: Duration,

    /// Connection establishment timeout.
    pub connect_timeout: Duration,

    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts file; `None` uses the user default.
    pub known_hosts_path: Option<PathBuf>,

    /// Directory for transcript files; `None` disables the transcript.
    pub transcript_dir: Option<PathBuf>,

    /// Suppress live echo of received output to stdout.
    pub quiet: bool,

    /// Terminal width for the PTY.
    pub terminal_width: u32,

    /// Terminal height for the PTY.
    pub terminal_height: u32,
}

impl SessionConfig {
    /// Identity string used for the transcript file name.
    pub fn identity(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }
}
