//! Session orchestration: lifecycle, batch execution, drain coordination.
//!
//! A [`Session`] owns the SSH connection, the persistent shell channel (in
//! shell mode), and the transcript sink. Lifecycle is a one-way state
//! machine: Disconnected → Connected → ShellOpen → Closed. Batches run
//! strictly one at a time; `run_commands` takes `&mut self`, so the
//! single-drain-per-channel invariant is enforced by the borrow checker.

mod batch;
mod builder;
pub mod config;
mod drain;
mod response;

pub use batch::{CommandBatch, CommandUnit, sequence};
pub use builder::SessionBuilder;
pub use config::{SessionConfig, SessionMode};
pub use response::{BatchResponse, Outcome};

use std::time::Instant;

use log::{debug, info, warn};

use crate::channel::{ByteChannel, PromptCounter, SshChannel};
use crate::error::{Result, SessionError};
use crate::transcript::TranscriptSink;
use crate::transport::{SshConfig, SshTransport};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Disconnected,
    Connected,
    ShellOpen,
    Closed,
}

impl SessionState {
    fn name(self) -> &'static str {
        match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connected => "connected",
            SessionState::ShellOpen => "shell-open",
            SessionState::Closed => "closed",
        }
    }
}

/// An SSH session that runs command batches with prompt-count completion.
///
/// Built by [`SessionBuilder`]; connect with [`open`](Self::open), run one or
/// more batches with [`run_commands`](Self::run_commands), then
/// [`close`](Self::close). In shell mode the persistent channel is opened
/// lazily on the first batch and reused by later ones.
///
/// A `TimedOut` batch does not tear the channel down; the caller may keep
/// issuing batches on the same session.
pub struct Session {
    config: SessionConfig,
    state: SessionState,
    transport: Option<SshTransport>,
    shell: Option<SshChannel>,
    transcript: TranscriptSink,
}

impl Session {
    pub(crate) fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Disconnected,
            transport: None,
            shell: None,
            transcript: TranscriptSink::disabled(),
        }
    }

    /// The session's configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether the session is connected (shell open or not).
    pub fn is_open(&self) -> bool {
        matches!(
            self.state,
            SessionState::Connected | SessionState::ShellOpen
        )
    }

    /// Whether the underlying SSH session is still alive.
    pub fn is_alive(&self) -> bool {
        self.transport
            .as_ref()
            .map(|t| !t.is_closed())
            .unwrap_or(false)
    }

    /// Establish the connection and authenticate.
    ///
    /// Also opens the transcript sink for the target identity when a
    /// transcript directory is configured.
    pub async fn open(&mut self) -> Result<()> {
        if self.state != SessionState::Disconnected {
            return Err(SessionError::InvalidState {
                operation: "open",
                state: self.state.name(),
            }
            .into());
        }

        let transcript = match &self.config.transcript_dir {
            Some(dir) => TranscriptSink::open(dir, &self.config.identity()).map_err(|e| {
                SessionError::Transcript {
                    path: dir.clone(),
                    source: e,
                }
            })?,
            None => TranscriptSink::disabled(),
        };

        let transport = SshTransport::connect(self.ssh_config()).await?;
        info!(
            "connected to {}:{} as {}",
            self.config.host, self.config.port, self.config.username
        );

        self.transport = Some(transport);
        self.transcript = transcript;
        self.state = SessionState::Connected;
        Ok(())
    }

    /// Run one batch of commands and drain the response.
    ///
    /// Batch overrides (prompt, threshold, timeout) take precedence over the
    /// session defaults. In exec mode the batch must contain exactly one
    /// unit. The returned [`BatchResponse`] always carries whatever output
    /// was accumulated, whichever way the drain ended.
    pub async fn run_commands(&mut self, batch: CommandBatch) -> Result<BatchResponse> {
        let units = batch.units();

        // Precondition on the arguments, checked before lifecycle state so
        // a misshapen batch is reported as such and provably sends nothing
        if self.config.mode == SessionMode::Exec && units.len() > 1 {
            return Err(SessionError::UnsupportedBatch {
                units: units.len(),
            }
            .into());
        }

        if !self.is_open() {
            return Err(SessionError::InvalidState {
                operation: "run commands",
                state: self.state.name(),
            }
            .into());
        }

        let prompt = batch
            .prompt
            .clone()
            .unwrap_or_else(|| self.config.prompt.clone());
        let prompt_count = batch.prompt_count.unwrap_or(self.config.prompt_count);
        let timeout = batch.timeout.unwrap_or(self.config.timeout);

        match self.config.mode {
            SessionMode::Shell => {
                self.run_shell_batch(units, prompt, prompt_count, timeout)
                    .await
            }
            SessionMode::Exec => self.run_exec(units, timeout).await,
        }
    }

    /// Close the session: shell channel first, then the connection.
    ///
    /// Idempotent, and always succeeds from the caller's perspective;
    /// close-time errors are logged and swallowed. Flushes the transcript.
    pub async fn close(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }

        if let Some(mut shell) = self.shell.take() {
            if let Err(e) = shell.close().await {
                warn!("error closing shell channel: {}", e);
            }
        }
        if let Some(transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                warn!("error closing connection: {}", e);
            }
        }
        if let Err(e) = self.transcript.flush() {
            warn!("error flushing transcript: {}", e);
        }

        self.state = SessionState::Closed;
        info!("session closed");
        Ok(())
    }

    /// Open the persistent shell channel if it is not open yet.
    async fn ensure_shell(&mut self) -> Result<()> {
        if self.shell.is_some() {
            return Ok(());
        }
        let transport = self.transport.as_ref().ok_or(SessionError::InvalidState {
            operation: "open shell",
            state: self.state.name(),
        })?;
        let channel = transport.open_shell_channel().await?;
        self.shell = Some(SshChannel::new(channel));
        self.state = SessionState::ShellOpen;
        debug!("shell channel opened");
        Ok(())
    }

    async fn run_shell_batch(
        &mut self,
        units: Vec<CommandUnit>,
        prompt: String,
        prompt_count: u32,
        timeout: std::time::Duration,
    ) -> Result<BatchResponse> {
        self.ensure_shell().await?;

        let start = Instant::now();

        let shell = self.shell.as_mut().ok_or(SessionError::InvalidState {
            operation: "run commands",
            state: "shell closed",
        })?;

        // Send every unit before draining; output is attributed to the
        // batch as a whole, not to individual commands
        let unit_count = units.len();
        for (i, unit) in units.into_iter().enumerate() {
            let wire = unit.wire_form();
            if let Err(e) = self.transcript.append(wire.as_bytes()) {
                warn!("transcript write failed: {}", e);
            }
            shell
                .send(wire.as_bytes())
                .await
                .map_err(crate::error::Error::Transport)?;
            debug!("sent unit {}/{}", i + 1, unit_count);

            if i + 1 < unit_count {
                tokio::time::sleep(self.config.delay).await;
            }
        }

        let mut counter = PromptCounter::new(prompt, prompt_count);
        let (output, outcome) = drain::drain_until_prompt(
            shell,
            &mut counter,
            timeout,
            &mut self.transcript,
            self.config.quiet,
        )
        .await;

        let elapsed = start.elapsed();
        info!("batch finished in {:?}: {}", elapsed, outcome);

        Ok(BatchResponse {
            output,
            outcome,
            elapsed,
        })
    }

    async fn run_exec(
        &mut self,
        units: Vec<CommandUnit>,
        timeout: std::time::Duration,
    ) -> Result<BatchResponse> {
        let command = match units.into_iter().next() {
            Some(CommandUnit::Command(cmd)) => cmd,
            _ => String::new(),
        };

        let transport = self.transport.as_ref().ok_or(SessionError::InvalidState {
            operation: "run commands",
            state: self.state.name(),
        })?;

        let start = Instant::now();

        if let Err(e) = self
            .transcript
            .append(format!("{}\n", command).as_bytes())
        {
            warn!("transcript write failed: {}", e);
        }

        let mut channel = SshChannel::new(transport.open_exec_channel(&command).await?);

        let (output, outcome) = drain::drain_until_idle(
            &mut channel,
            timeout,
            &mut self.transcript,
            self.config.quiet,
        )
        .await;

        if let Err(e) = channel.close().await {
            debug!("error closing exec channel: {}", e);
        }

        let elapsed = start.elapsed();
        info!("exec finished in {:?}: {}", elapsed, outcome);

        Ok(BatchResponse {
            output,
            outcome,
            elapsed,
        })
    }

    fn ssh_config(&self) -> SshConfig {
        SshConfig {
            host: self.config.host.clone(),
            port: self.config.port,
            username: self.config.username.clone(),
            auth: self.config.auth.clone(),
            connect_timeout: self.config.connect_timeout,
            terminal_width: self.config.terminal_width,
            terminal_height: self.config.terminal_height,
            host_key_verification: self.config.host_key_verification.clone(),
            known_hosts_path: self.config.known_hosts_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn shell_session() -> Session {
        SessionBuilder::new("lab-sw1")
            .username("admin")
            .password("secret")
            .prompt("#")
            .build()
            .unwrap()
    }

    fn exec_session() -> Session {
        SessionBuilder::new("lab-sw1")
            .username("admin")
            .password("secret")
            .mode(SessionMode::Exec)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_exec_mode_rejects_multi_command_batch() {
        let mut session = exec_session();
        let err = session
            .run_commands(CommandBatch::new("show version,show clock"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Session(SessionError::UnsupportedBatch { units: 2 })
        ));
    }

    #[tokio::test]
    async fn test_run_commands_requires_open_session() {
        let mut session = shell_session();
        let err = session
            .run_commands(CommandBatch::new("show clock"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Session(SessionError::InvalidState {
                state: "disconnected",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_run_commands_after_close_is_invalid() {
        let mut session = shell_session();
        session.close().await.unwrap();
        let err = session
            .run_commands(CommandBatch::new("show clock"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Session(SessionError::InvalidState {
                state: "closed",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut session = shell_session();
        session.close().await.unwrap();
        session.close().await.unwrap();
        assert!(!session.is_open());
        assert!(!session.is_alive());
    }

    #[tokio::test]
    async fn test_open_after_close_is_invalid() {
        let mut session = shell_session();
        session.close().await.unwrap();
        let err = session.open().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Session(SessionError::InvalidState {
                operation: "open",
                ..
            })
        ));
    }
}
