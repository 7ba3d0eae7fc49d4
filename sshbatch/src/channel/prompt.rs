//! Prompt occurrence counting for completion detection.
//!
//! Device CLIs do not terminate output with a sentinel, so a batch is
//! considered complete once the configured prompt substring has been seen a
//! configured number of times, once per command the shell echoed a prompt
//! for. The match is a literal, case-sensitive substring test per line.

use memchr::memmem;

/// Counts prompt occurrences in streamed output lines toward a threshold.
///
/// An empty needle never matches, which degrades completion detection to the
/// drain timeout alone. A threshold of zero is clamped to one.
#[derive(Debug, Clone)]
pub struct PromptCounter {
    needle: String,
    required: u32,
    seen: u32,
}

impl PromptCounter {
    /// Create a counter looking for `required` occurrences of `needle`.
    pub fn new(needle: impl Into<String>, required: u32) -> Self {
        Self {
            needle: needle.into(),
            required: required.max(1),
            seen: 0,
        }
    }

    /// Feed one line of output. Returns `true` once the threshold is reached.
    ///
    /// A line containing the needle more than once still counts once; the
    /// shell prints one prompt per line.
    pub fn observe_line(&mut self, line: &str) -> bool {
        if !self.needle.is_empty()
            && memmem::find(line.as_bytes(), self.needle.as_bytes()).is_some()
        {
            self.seen += 1;
        }
        self.is_complete()
    }

    /// Whether the required number of occurrences has been observed.
    pub fn is_complete(&self) -> bool {
        self.seen >= self.required
    }

    /// Number of occurrences observed so far.
    pub fn seen(&self) -> u32 {
        self.seen
    }

    /// The occurrence threshold.
    pub fn required(&self) -> u32 {
        self.required
    }
}
