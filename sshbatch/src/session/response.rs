//! Response type for batch execution results.

use std::time::Duration;

use crate::error::TransportError;

/// How a drain operation ended.
///
/// These are results, not errors: every variant is paired with whatever
/// output was accumulated before the drain stopped, so callers can inspect
/// partial output and decide whether to keep using the session.
#[derive(Debug)]
pub enum Outcome {
    /// The prompt threshold was reached before the deadline.
    Completed {
        /// Prompt occurrences observed.
        prompts_seen: u32,
    },

    /// The deadline passed before enough prompts appeared.
    TimedOut {
        /// Prompt occurrences observed before the deadline.
        prompts_seen: u32,
    },

    /// The remote side closed the channel mid-drain.
    ChannelClosed,

    /// An I/O error aborted the read loop.
    ReadFailed {
        /// The underlying transport error.
        source: TransportError,
    },
}

impl Outcome {
    /// Whether the batch completed via the prompt threshold.
    pub fn is_complete(&self) -> bool {
        matches!(self, Outcome::Completed { .. })
    }

    /// Prompt occurrences observed during the drain, where applicable.
    pub fn prompts_seen(&self) -> u32 {
        match self {
            Outcome::Completed { prompts_seen } | Outcome::TimedOut { prompts_seen } => {
                *prompts_seen
            }
            _ => 0,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Completed { prompts_seen } => {
                write!(f, "completed ({} prompts)", prompts_seen)
            }
            Outcome::TimedOut { prompts_seen } => {
                write!(f, "timed out ({} prompts seen)", prompts_seen)
            }
            Outcome::ChannelClosed => write!(f, "channel closed"),
            Outcome::ReadFailed { source } => write!(f, "read failed: {}", source),
        }
    }
}

/// Result of one `run_commands` call: the aggregated output of the whole
/// batch plus how the drain ended.
///
/// Output is not attributed to individual commands; the stream of an
/// interactive shell interleaves echoes and responses freely.
#[derive(Debug)]
pub struct BatchResponse {
    /// Aggregated output, line endings normalized.
    pub output: String,

    /// How the drain ended.
    pub outcome: Outcome,

    /// Time from first send to drain completion.
    pub elapsed: Duration,
}

impl BatchResponse {
    /// Whether the batch completed via the prompt threshold.
    pub fn is_complete(&self) -> bool {
        self.outcome.is_complete()
    }

    /// The output lines as an iterator.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.output.lines()
    }

    /// Check if the output contains a substring.
    pub fn contains(&self, pattern: &str) -> bool {
        self.output.contains(pattern)
    }
}

impl std::fmt::Display for BatchResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_is_complete() {
        let outcome = Outcome::Completed { prompts_seen: 2 };
        assert!(outcome.is_complete());
        assert_eq!(outcome.prompts_seen(), 2);
    }

    #[test]
    fn test_timed_out_carries_count() {
        let outcome = Outcome::TimedOut { prompts_seen: 1 };
        assert!(!outcome.is_complete());
        assert_eq!(outcome.prompts_seen(), 1);
    }

    #[test]
    fn test_response_helpers() {
        let response = BatchResponse {
            output: "line one\nrouter# done\n".to_string(),
            outcome: Outcome::Completed { prompts_seen: 1 },
            elapsed: Duration::from_millis(40),
        };
        assert!(response.is_complete());
        assert!(response.contains("router#"));
        assert_eq!(response.lines().count(), 2);
        assert_eq!(format!("{}", response), response.output);
    }
}
