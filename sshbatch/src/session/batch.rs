//! Command batch specification and sequencing.

use std::time::Duration;

/// One discrete unit of a batch.
///
/// An empty unit in the batch string ("press enter") becomes `BareNewline`,
/// used to clear a stuck prompt or advance pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandUnit {
    /// A command to send, newline-terminated on the wire.
    Command(String),

    /// A bare newline with no command text.
    BareNewline,
}

impl CommandUnit {
    /// The exact bytes to put on the wire for this unit.
    pub fn wire_form(&self) -> String {
        match self {
            CommandUnit::Command(cmd) => format!("{}\n", cmd),
            CommandUnit::BareNewline => "\n".to_string(),
        }
    }
}

/// Split a comma-delimited batch string into ordered command units.
///
/// Units are trimmed of surrounding whitespace; an empty unit maps to
/// [`CommandUnit::BareNewline`]. Quote characters are stripped from each
/// unit before sending, since remote shells tend to misinterpret them.
/// Order is preserved and duplicates are kept.
pub fn sequence(batch: &str) -> Vec<CommandUnit> {
    batch
        .split(',')
        .map(|raw| {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                CommandUnit::BareNewline
            } else {
                let cleaned: String =
                    trimmed.chars().filter(|c| *c != '"' && *c != '\'').collect();
                if cleaned.is_empty() {
                    CommandUnit::BareNewline
                } else {
                    CommandUnit::Command(cleaned)
                }
            }
        })
        .collect()
}

/// An ordered batch of commands for one `run_commands` call, with optional
/// overrides of the session defaults.
///
/// The batch is consumed by the call; per-batch settings live here rather
/// than as mutable session fields so repeated invocations stay independent.
#[derive(Debug, Clone)]
pub struct CommandBatch {
    /// Comma-delimited command specification.
    commands: String,

    /// Prompt substring override for this batch.
    pub prompt: Option<String>,

    /// Prompt occurrence threshold override for this batch.
    pub prompt_count: Option<u32>,

    /// Read timeout override for this batch.
    pub timeout: Option<Duration>,
}

impl CommandBatch {
    /// Create a batch from a comma-delimited command string.
    pub fn new(commands: impl Into<String>) -> Self {
        Self {
            commands: commands.into(),
            prompt: None,
            prompt_count: None,
            timeout: None,
        }
    }

    /// Override the session's prompt substring for this batch.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Override the session's prompt threshold for this batch.
    pub fn prompt_count(mut self, count: u32) -> Self {
        self.prompt_count = Some(count);
        self
    }

    /// Override the session's read timeout for this batch.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sequence the batch into ordered command units.
    pub fn units(&self) -> Vec<CommandUnit> {
        sequence(&self.commands)
    }

    /// The raw comma-delimited command string.
    pub fn commands(&self) -> &str {
        &self.commands
    }
}
