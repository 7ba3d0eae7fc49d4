//! Error types for sshbatch.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sshbatch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad or missing session parameters, surfaced before connecting
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// SSH transport-level errors (connection, authentication)
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Session lifecycle and batch errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Template parsing errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Configuration errors. These are always fatal and are reported
/// before any connection attempt is made.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No password given and no fallback source was set either
    #[error("No credential: no explicit password and no fallback source")]
    MissingCredential,

    /// Username is required for every session
    #[error("Username is required")]
    MissingUsername,

    /// No authentication method was configured on the builder
    #[error("No authentication method configured")]
    MissingAuth,
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// The host key changed since it was recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// The host key is not in known_hosts and the policy is strict
    #[error("Unknown host key for {host}:{port}")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts file could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Session orchestration errors (lifecycle, batch shape).
#[derive(Error, Debug)]
pub enum SessionError {
    /// Exec mode supports exactly one command per invocation
    #[error("Batch of {units} commands not supported in exec mode")]
    UnsupportedBatch { units: usize },

    /// Operation invoked in the wrong lifecycle state
    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// Failed to open or write the transcript sink
    #[error("Transcript sink at {path}: {source}")]
    Transcript {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Template parsing errors.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The template file does not exist
    #[error("Template file {path} not found")]
    TemplateNotFound { path: PathBuf },

    /// The template file could not be read
    #[error("Failed to read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The template source failed to compile
    #[error("Invalid template: {message}")]
    InvalidTemplate { message: String },

    /// Parsing the raw text against the template failed
    #[error("Parse failed: {message}")]
    ParseFailed { message: String },
}

/// Result type alias using sshbatch's Error.
pub type Result<T> = std::result::Result<T, Error>;
