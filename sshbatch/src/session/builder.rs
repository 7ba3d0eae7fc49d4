//! Builder for creating sessions.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::Session;
use super::config::{SessionConfig, SessionMode};
use crate::error::{ConfigError, Result};
use crate::transport::{AuthMethod, HostKeyVerification};

/// Builder for constructing a [`Session`].
///
/// # Example
///
/// ```rust,no_run
/// use sshbatch::SessionBuilder;
///
/// # async fn example() -> Result<(), sshbatch::Error> {
/// let session = SessionBuilder::new("192.168.1.1")
///     .username("admin")
///     .password("secret")
///     .prompt("#")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct SessionBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: Option<AuthMethod>,
    mode: SessionMode,
    prompt: String,
    prompt_count: u32,
    timeout: Duration,
    delay: Duration,
    connect_timeout: Duration,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    transcript_dir: Option<PathBuf>,
    quiet: bool,
    terminal_width: u32,
    terminal_height: u32,
}

impl SessionBuilder {
    /// Create a new session builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: None,
            mode: SessionMode::Shell,
            prompt: String::new(),
            prompt_count: 1,
            timeout: Duration::from_secs(5),
            delay: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(10),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            transcript_dir: None,
            quiet: false,
            terminal_width: 511,
            terminal_height: 24,
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = Some(AuthMethod::Password(SecretString::from(password.into())));
        self
    }

    /// Set password authentication from already-wrapped secret material.
    pub fn password_secret(mut self, password: SecretString) -> Self {
        self.auth = Some(AuthMethod::Password(password));
        self
    }

    /// Set private key authentication.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = Some(AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        });
        self
    }

    /// Set private key authentication with passphrase.
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.auth = Some(AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: Some(passphrase.into()),
        });
        self
    }

    /// Set shell or exec mode (default: shell).
    pub fn mode(mut self, mode: SessionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the default prompt substring to count.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Set the default prompt occurrence threshold (default: 1).
    pub fn prompt_count(mut self, count: u32) -> Self {
        self.prompt_count = count;
        self
    }

    /// Set the default drain timeout (default: 5s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the pause between command sends (default: 1s).
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the connection establishment timeout (default: 10s).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the host key verification mode (default: accept-new).
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Set the known_hosts file path.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Enable the transcript sink under the given directory.
    pub fn transcript_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.transcript_dir = Some(dir.into());
        self
    }

    /// Suppress live echo of received output to stdout.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Set terminal dimensions for the PTY.
    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Build the session.
    ///
    /// Validates the configuration but does not connect; call
    /// [`Session::open`] on the result to establish the connection.
    pub fn build(self) -> Result<Session> {
        let username = self.username.ok_or(ConfigError::MissingUsername)?;
        let auth = self.auth.ok_or(ConfigError::MissingAuth)?;

        let config = SessionConfig {
            host: self.host,
            port: self.port,
            username,
            auth,
            mode: self.mode,
            prompt: self.prompt,
            prompt_count: self.prompt_count,
            timeout: self.timeout,
            delay: self.delay,
            connect_timeout: self.connect_timeout,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
            transcript_dir: self.transcript_dir,
            quiet: self.quiet,
            terminal_width: self.terminal_width,
            terminal_height: self.terminal_height,
        };

        Ok(Session::new(config))
    }
}
