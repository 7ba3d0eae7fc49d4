//! Channel layer: byte-stream abstraction and prompt matching.
//!
//! This module owns the pieces the drain loop is built from: the
//! `ByteChannel` contract over a live russh channel and the prompt
//! occurrence counter that decides batch completion.

pub mod prompt;
mod shell;

pub use prompt::PromptCounter;
pub use shell::{ByteChannel, RecvEvent, SshChannel};
