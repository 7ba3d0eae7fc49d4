//! The drain loops: timed reads until prompt-count completion or timeout.
//!
//! This is the timing-sensitive heart of the crate. A drain owns the channel
//! for its duration and uses a single bounded-wait-then-read pattern: the
//! only suspension point is a receive whose wait never exceeds the remaining
//! time budget, so elapsed-time accounting stays exact and no detached reader
//! task can outlive the channel.
//!
//! Shell-mode drains run against one absolute deadline computed at start.
//! Exec-mode drains use an inactivity budget per read instead, since a
//! one-shot command has no prompt to count.

use std::io::Write;
use std::time::Duration;

use log::{debug, trace, warn};

use super::response::Outcome;
use crate::channel::{ByteChannel, PromptCounter, RecvEvent};
use crate::transcript::TranscriptSink;

/// Strip terminal escapes and carriage returns from a received chunk.
///
/// Device terminal emulation pads output with ANSI sequences and CRLF line
/// endings; both would break literal line matching.
fn normalize_chunk(raw: &[u8]) -> String {
    let cleaned = strip_ansi_escapes::strip(raw);
    let text = String::from_utf8_lossy(&cleaned);
    text.replace('\r', "")
}

/// Echo a chunk to stdout as it arrives, unless the session is quiet.
fn echo(quiet: bool, text: &str) {
    if !quiet {
        print!("{}", text);
        let _ = std::io::stdout().flush();
    }
}

/// Drain the channel until the prompt counter reaches its threshold or the
/// deadline passes.
///
/// Every received chunk is normalized, appended to the transcript, echoed,
/// and scanned line by line. The moment a line completes the threshold the
/// drain stops: the returned output ends at that line and later bytes from
/// the same chunk are not included (the transcript still records them).
///
/// Never fails: read errors are folded into [`Outcome::ReadFailed`] together
/// with the output accumulated so far.
pub(crate) async fn drain_until_prompt<C: ByteChannel>(
    channel: &mut C,
    counter: &mut PromptCounter,
    timeout: Duration,
    transcript: &mut TranscriptSink,
    quiet: bool,
) -> (String, Outcome) {
    let deadline = tokio::time::Instant::now() + timeout;
    let mut output = String::new();

    loop {
        let now = tokio::time::Instant::now();
        if now >= deadline {
            debug!(
                "drain deadline passed with {}/{} prompts",
                counter.seen(),
                counter.required()
            );
            return (
                output,
                Outcome::TimedOut {
                    prompts_seen: counter.seen(),
                },
            );
        }

        match channel.recv(deadline - now).await {
            Ok(RecvEvent::Data(chunk)) => {
                let text = normalize_chunk(&chunk);
                trace!("drain chunk: {} bytes", text.len());

                if let Err(e) = transcript.append(text.as_bytes()) {
                    warn!("transcript write failed: {}", e);
                }
                echo(quiet, &text);

                let mut offset = 0;
                for line in text.split('\n') {
                    let line_end = offset + line.len();
                    if counter.observe_line(line) {
                        output.push_str(&text[..line_end]);
                        debug!("prompt threshold reached ({})", counter.seen());
                        return (
                            output,
                            Outcome::Completed {
                                prompts_seen: counter.seen(),
                            },
                        );
                    }
                    offset = line_end + 1;
                }
                output.push_str(&text);
            }

            Ok(RecvEvent::Idle) => {
                debug!(
                    "drain idle at deadline with {}/{} prompts",
                    counter.seen(),
                    counter.required()
                );
                return (
                    output,
                    Outcome::TimedOut {
                        prompts_seen: counter.seen(),
                    },
                );
            }

            Ok(RecvEvent::Closed) => {
                debug!("channel closed mid-drain");
                return (output, Outcome::ChannelClosed);
            }

            Err(e) => {
                warn!("read failed mid-drain: {}", e);
                return (output, Outcome::ReadFailed { source: e });
            }
        }
    }
}

/// Drain the channel until it goes idle for `idle_timeout` or closes.
///
/// Used for exec mode, where a one-shot command produces output and stops;
/// there is no prompt cycling to count. Any output before the channel went
/// idle counts as completion, nothing at all is a timeout.
pub(crate) async fn drain_until_idle<C: ByteChannel>(
    channel: &mut C,
    idle_timeout: Duration,
    transcript: &mut TranscriptSink,
    quiet: bool,
) -> (String, Outcome) {
    let mut output = String::new();

    loop {
        match channel.recv(idle_timeout).await {
            Ok(RecvEvent::Data(chunk)) => {
                let text = normalize_chunk(&chunk);
                trace!("exec drain chunk: {} bytes", text.len());

                if let Err(e) = transcript.append(text.as_bytes()) {
                    warn!("transcript write failed: {}", e);
                }
                echo(quiet, &text);
                output.push_str(&text);
            }

            Ok(RecvEvent::Idle) | Ok(RecvEvent::Closed) => break,

            Err(e) => {
                warn!("read failed mid-drain: {}", e);
                return (output, Outcome::ReadFailed { source: e });
            }
        }
    }

    let outcome = if output.is_empty() {
        Outcome::TimedOut { prompts_seen: 0 }
    } else {
        Outcome::Completed { prompts_seen: 0 }
    };
    (output, outcome)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;

    use super::*;
    use crate::error::TransportError;

    /// Scripted in-memory channel: each step becomes available `after` its
    /// delay, which a bounded-wait recv consumes incrementally.
    struct FakeChannel {
        script: VecDeque<Step>,
        sent: Vec<u8>,
        closed: bool,
    }

    enum Step {
        Data(Duration, &'static [u8]),
        Close(Duration),
        Fail(Duration),
    }

    impl Step {
        fn delay(&self) -> Duration {
            match self {
                Step::Data(d, _) | Step::Close(d) | Step::Fail(d) => *d,
            }
        }

        fn shorten(&mut self, by: Duration) {
            match self {
                Step::Data(d, _) | Step::Close(d) | Step::Fail(d) => {
                    *d = d.saturating_sub(by);
                }
            }
        }
    }

    impl FakeChannel {
        fn new(script: Vec<Step>) -> Self {
            Self {
                script: script.into(),
                sent: Vec::new(),
                closed: false,
            }
        }
    }

    impl ByteChannel for FakeChannel {
        async fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
            self.sent.extend_from_slice(bytes);
            Ok(())
        }

        async fn recv(&mut self, max_wait: Duration) -> Result<RecvEvent, TransportError> {
            if self.closed {
                return Ok(RecvEvent::Closed);
            }
            let Some(front) = self.script.front_mut() else {
                tokio::time::sleep(max_wait).await;
                return Ok(RecvEvent::Idle);
            };
            let delay = front.delay();
            if delay > max_wait {
                front.shorten(max_wait);
                tokio::time::sleep(max_wait).await;
                return Ok(RecvEvent::Idle);
            }
            tokio::time::sleep(delay).await;
            match self.script.pop_front().unwrap() {
                Step::Data(_, bytes) => Ok(RecvEvent::Data(bytes.into())),
                Step::Close(_) => {
                    self.closed = true;
                    Ok(RecvEvent::Closed)
                }
                Step::Fail(_) => Err(TransportError::Io(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "reset",
                ))),
            }
        }

        fn is_closed(&self) -> bool {
            self.closed
        }

        async fn close(&mut self) -> Result<(), TransportError> {
            self.closed = true;
            Ok(())
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_completes_at_threshold_and_excludes_later_bytes() {
        let mut channel = FakeChannel::new(vec![
            Step::Data(ms(10), b"term len 0\nswitch# \n"),
            Step::Data(ms(50), b"show clock\n12:00:00 UTC\nswitch# \nNEVER-RETURNED"),
        ]);
        let mut counter = PromptCounter::new("#", 2);
        let mut sink = TranscriptSink::disabled();

        let (output, outcome) =
            drain_until_prompt(&mut channel, &mut counter, ms(5000), &mut sink, true).await;

        assert!(matches!(outcome, Outcome::Completed { prompts_seen: 2 }));
        assert!(output.contains("term len 0"));
        assert!(output.contains("12:00:00 UTC"));
        assert!(output.ends_with("switch# "));
        assert!(!output.contains("NEVER-RETURNED"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_when_prompt_never_appears() {
        let mut channel = FakeChannel::new(vec![Step::Data(ms(10), b"no prompt here\n")]);
        let mut counter = PromptCounter::new("#", 1);
        let mut sink = TranscriptSink::disabled();

        let start = tokio::time::Instant::now();
        let (output, outcome) =
            drain_until_prompt(&mut channel, &mut counter, ms(2000), &mut sink, true).await;
        let elapsed = start.elapsed();

        assert!(matches!(outcome, Outcome::TimedOut { prompts_seen: 0 }));
        assert_eq!(output, "no prompt here\n");
        assert!(elapsed >= ms(2000));
        assert!(elapsed < ms(2100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reports_partial_prompt_count() {
        let mut channel = FakeChannel::new(vec![Step::Data(ms(10), b"switch# \n")]);
        let mut counter = PromptCounter::new("#", 5);
        let mut sink = TranscriptSink::disabled();

        let (output, outcome) =
            drain_until_prompt(&mut channel, &mut counter, ms(2000), &mut sink, true).await;

        assert!(matches!(outcome, Outcome::TimedOut { prompts_seen: 1 }));
        assert!(output.contains("switch#"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_channel_close_keeps_partial_output() {
        let mut channel = FakeChannel::new(vec![
            Step::Data(ms(10), b"partial output\n"),
            Step::Close(ms(10)),
        ]);
        let mut counter = PromptCounter::new("#", 1);
        let mut sink = TranscriptSink::disabled();

        let (output, outcome) =
            drain_until_prompt(&mut channel, &mut counter, ms(5000), &mut sink, true).await;

        assert!(matches!(outcome, Outcome::ChannelClosed));
        assert_eq!(output, "partial output\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_error_keeps_partial_output() {
        let mut channel = FakeChannel::new(vec![
            Step::Data(ms(10), b"before the fault\n"),
            Step::Fail(ms(10)),
        ]);
        let mut counter = PromptCounter::new("#", 1);
        let mut sink = TranscriptSink::disabled();

        let (output, outcome) =
            drain_until_prompt(&mut channel, &mut counter, ms(5000), &mut sink, true).await;

        assert!(matches!(outcome, Outcome::ReadFailed { .. }));
        assert_eq!(output, "before the fault\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_normalizes_ansi_and_carriage_returns() {
        let mut channel = FakeChannel::new(vec![Step::Data(
            ms(10),
            b"\x1b[32mgreen\x1b[0m\r\nswitch#\r\n",
        )]);
        let mut counter = PromptCounter::new("switch#", 1);
        let mut sink = TranscriptSink::disabled();

        let (output, outcome) =
            drain_until_prompt(&mut channel, &mut counter, ms(5000), &mut sink, true).await;

        assert!(outcome.is_complete());
        assert!(output.starts_with("green\n"));
        assert!(!output.contains('\r'));
        assert!(!output.contains('\x1b'));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_prompt_degrades_to_timeout_only() {
        let mut channel = FakeChannel::new(vec![Step::Data(ms(10), b"switch# anything\n")]);
        let mut counter = PromptCounter::new("", 1);
        let mut sink = TranscriptSink::disabled();

        let (output, outcome) =
            drain_until_prompt(&mut channel, &mut counter, ms(1000), &mut sink, true).await;

        assert!(matches!(outcome, Outcome::TimedOut { prompts_seen: 0 }));
        assert!(output.contains("switch# anything"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_command_batch_scenario() {
        // prompt "#", threshold 2, timeout 5s: each command echo is followed
        // by a prompt line, well inside the deadline
        let mut channel = FakeChannel::new(vec![
            Step::Data(ms(100), b"term len 0\nswitch# "),
            Step::Data(ms(200), b"show clock\n*10:01:02.000 UTC\nswitch# "),
        ]);
        let mut counter = PromptCounter::new("#", 2);
        let mut sink = TranscriptSink::disabled();

        let start = tokio::time::Instant::now();
        let (output, outcome) =
            drain_until_prompt(&mut channel, &mut counter, ms(5000), &mut sink, true).await;

        assert!(matches!(outcome, Outcome::Completed { prompts_seen: 2 }));
        assert!(output.contains("term len 0"));
        assert!(output.contains("show clock"));
        assert!(start.elapsed() < ms(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exec_drain_completes_after_idle() {
        let mut channel = FakeChannel::new(vec![
            Step::Data(ms(10), b"Linux host 6.1.0\n"),
            Step::Data(ms(50), b"x86_64 GNU/Linux\n"),
        ]);
        let mut sink = TranscriptSink::disabled();

        let (output, outcome) =
            drain_until_idle(&mut channel, ms(1000), &mut sink, true).await;

        assert!(outcome.is_complete());
        assert_eq!(output, "Linux host 6.1.0\nx86_64 GNU/Linux\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_exec_drain_times_out_with_no_output() {
        let mut channel = FakeChannel::new(vec![]);
        let mut sink = TranscriptSink::disabled();

        let (output, outcome) =
            drain_until_idle(&mut channel, ms(1000), &mut sink, true).await;

        assert!(matches!(outcome, Outcome::TimedOut { .. }));
        assert!(output.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_exec_drain_slow_trickle_stays_alive() {
        // Inactivity-based policy: steady output slower than the idle budget
        // would die under a fixed deadline, but each chunk resets the wait.
        let mut channel = FakeChannel::new(vec![
            Step::Data(ms(800), b"a"),
            Step::Data(ms(800), b"b"),
            Step::Data(ms(800), b"c"),
        ]);
        let mut sink = TranscriptSink::disabled();

        let (output, outcome) =
            drain_until_idle(&mut channel, ms(1000), &mut sink, true).await;

        assert!(outcome.is_complete());
        assert_eq!(output, "abc");
    }
}
