//! # sshbatch
//!
//! Async SSH batch command runner with prompt-count completion detection.
//!
//! Network device CLIs do not terminate output with a machine-readable
//! sentinel. sshbatch sends a batch of commands over an interactive SSH
//! shell and decides the batch is done by counting occurrences of a
//! user-supplied prompt substring in the streamed output, with a timeout
//! fallback for when the prompt never (or insufficiently) appears.
//!
//! ## Features
//!
//! - Async SSH via russh, password or private-key authentication
//! - Persistent shell mode for multi-batch sessions, exec mode for one-shots
//! - Prompt-count completion with per-batch prompt/threshold/timeout overrides
//! - Partial output preserved on timeout, channel close, and read errors
//! - Append-only per-session transcript for audit
//! - TextFSM template parsing of collected output
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sshbatch::{CommandBatch, SessionBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sshbatch::Error> {
//!     let mut session = SessionBuilder::new("172.16.1.101")
//!         .username("cisco")
//!         .password("cisco")
//!         .prompt("#")
//!         .build()?;
//!
//!     session.open().await?;
//!
//!     let response = session
//!         .run_commands(CommandBatch::new("term len 0,show clock").prompt_count(2))
//!         .await?;
//!     println!("{}", response.output);
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod error;
pub mod parse;
pub mod session;
pub mod transcript;
pub mod transport;

// Re-export main types for convenience
pub use error::Error;
pub use session::{
    BatchResponse, CommandBatch, CommandUnit, Outcome, Session, SessionBuilder, SessionConfig,
    SessionMode,
};
pub use transcript::TranscriptSink;
pub use transport::{AuthMethod, HostKeyVerification, resolve_password};
