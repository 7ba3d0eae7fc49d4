//! Byte-stream channel abstraction over russh channels.
//!
//! The orchestrator only needs four things from a live channel: send bytes,
//! wait a bounded time for more bytes, know whether the peer is gone, and
//! close. `ByteChannel` captures that contract so the drain loops can run
//! against an in-memory channel in tests; `SshChannel` is the russh-backed
//! implementation used for both shell and exec channels.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use log::trace;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};

use crate::error::TransportError;

/// One observation from a bounded-wait receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecvEvent {
    /// A chunk of bytes arrived.
    Data(Bytes),

    /// The wait budget elapsed with nothing to read.
    Idle,

    /// The peer closed the channel; no more data will arrive.
    Closed,
}

/// Minimal contract a drain loop needs from a bidirectional byte stream.
pub trait ByteChannel: Send {
    /// Send raw bytes down the channel.
    fn send(&mut self, bytes: &[u8])
    -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Wait up to `max_wait` for incoming bytes.
    ///
    /// This is the single suspension point of a drain loop: it blocks the
    /// calling task until data arrives, the budget elapses, or the channel
    /// closes.
    fn recv(
        &mut self,
        max_wait: Duration,
    ) -> impl Future<Output = Result<RecvEvent, TransportError>> + Send;

    /// Whether the channel has reported closed.
    fn is_closed(&self) -> bool;

    /// Close the channel. Safe to call more than once.
    fn close(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// A russh channel (shell or exec) seen as a plain byte stream.
pub struct SshChannel {
    channel: Channel<Msg>,
    closed: bool,
}

impl SshChannel {
    /// Wrap an already-established russh channel.
    pub fn new(channel: Channel<Msg>) -> Self {
        Self {
            channel,
            closed: false,
        }
    }
}

impl ByteChannel for SshChannel {
    async fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.channel.data(bytes).await.map_err(TransportError::Ssh)
    }

    async fn recv(&mut self, max_wait: Duration) -> Result<RecvEvent, TransportError> {
        if self.closed {
            return Ok(RecvEvent::Closed);
        }

        let deadline = tokio::time::Instant::now() + max_wait;
        loop {
            match tokio::time::timeout_at(deadline, self.channel.wait()).await {
                Err(_) => return Ok(RecvEvent::Idle),

                Ok(None) => {
                    self.closed = true;
                    return Ok(RecvEvent::Closed);
                }

                Ok(Some(msg)) => match msg {
                    ChannelMsg::Data { ref data } => {
                        return Ok(RecvEvent::Data(Bytes::copy_from_slice(data)));
                    }
                    // Remote stderr is part of the session output too
                    ChannelMsg::ExtendedData { ref data, .. } => {
                        return Ok(RecvEvent::Data(Bytes::copy_from_slice(data)));
                    }
                    ChannelMsg::Eof | ChannelMsg::Close => {
                        self.closed = true;
                        return Ok(RecvEvent::Closed);
                    }
                    ChannelMsg::ExitStatus { exit_status } => {
                        trace!("remote exit status: {}", exit_status);
                    }
                    other => {
                        trace!("ignoring channel message: {:?}", other);
                    }
                },
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.channel.eof().await.map_err(TransportError::Ssh)?;
        self.channel.close().await.map_err(TransportError::Ssh)
    }
}
