//! SSH connection configuration.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
#[derive(Debug, Clone, Default)]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys. Connection fails if the host
    /// is not already in known_hosts.
    Strict,

    /// Accept and auto-learn unknown keys, but reject changed keys.
    /// This is the default and matches common SSH client behavior.
    #[default]
    AcceptNew,

    /// Accept all keys without checking. For testing and lab use only.
    Disabled,
}

/// SSH connection configuration.
#[derive(Debug, Clone)]
pub struct SshConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// SSH port (default: 22).
    pub port: u16,

    /// Username for authentication.
    pub username: String,

    /// Authentication method.
    pub auth: AuthMethod,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,

    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts file.
    pub known_hosts_path: Option<PathBuf>,
}

impl SshConfig {
    /// Get the socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Authentication method for SSH connections.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// No authentication (for testing only).
    None,

    /// Password authentication.
    Password(SecretString),

    /// Private key authentication.
    PrivateKey {
        /// Path to the private key file.
        path: PathBuf,
        /// Optional passphrase for encrypted keys.
        passphrase: Option<String>,
    },
}

/// Resolve a password from an ordered list of sources, first present wins.
///
/// `explicit` is a password supplied directly (CLI flag, builder call);
/// `fallback` is whatever the caller read from its fallback source, usually
/// the `SSHBATCH_PASSWORD` environment variable. Neither present is a
/// configuration error.
pub fn resolve_password(
    explicit: Option<String>,
    fallback: Option<String>,
) -> Result<SecretString, ConfigError> {
    explicit
        .or(fallback)
        .map(SecretString::from)
        .ok_or(ConfigError::MissingCredential)
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_explicit_password_wins() {
        let secret =
            resolve_password(Some("cli".to_string()), Some("env".to_string())).unwrap();
        assert_eq!(secret.expose_secret(), "cli");
    }

    #[test]
    fn test_fallback_password_used_when_no_explicit() {
        let secret = resolve_password(None, Some("env".to_string())).unwrap();
        assert_eq!(secret.expose_secret(), "env");
    }

    #[test]
    fn test_no_credential_is_config_error() {
        assert!(matches!(
            resolve_password(None, None),
            Err(ConfigError::MissingCredential)
        ));
    }

    #[test]
    fn test_default_host_key_mode_is_accept_new() {
        assert!(matches!(
            HostKeyVerification::default(),
            HostKeyVerification::AcceptNew
        ));
    }
}
