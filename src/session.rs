//! Per-connection state machine.
//!
//! A session walks one connection through connect, send,
//! receive-until-closed and disconnect. Each phase is an async method whose
//! return is the phase-completion signal; failures come back as
//! [`SessionError`] values instead of escaping across the async boundary.
//! A session serves exactly one exchange and is discarded afterwards, so a
//! later transaction can never read a predecessor's buffered bytes.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::SessionError;

/// Reads are chunked through a fixed buffer of this size.
const RECV_CHUNK: usize = 1024;

/// Where a session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Connecting,
    Connected,
    Sending,
    SentAwaitingAck,
    Receiving,
    Closed,
}

/// One connection's lifecycle, generic over the byte stream so transport
/// faults can be exercised without a socket.
#[derive(Debug)]
pub struct Session<S = TcpStream> {
    state: State,
    stream: Option<S>,
    buffer: Vec<u8>,
}

impl Session<TcpStream> {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            stream: None,
            buffer: Vec::new(),
        }
    }

    /// `Idle -> Connecting -> Connected`, or `Closed` with
    /// [`SessionError::Connect`] when the address does not resolve or the
    /// peer refuses.
    pub async fn connect(&mut self, addr: &str) -> Result<(), SessionError> {
        self.expect(State::Idle, "connect")?;
        self.state = State::Connecting;
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = State::Connected;
                Ok(())
            }
            Err(e) => {
                self.state = State::Closed;
                Err(SessionError::Connect(e))
            }
        }
    }
}

impl Default for Session<TcpStream> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Session<S> {
    /// Wraps an already-established stream. The driver only ever goes
    /// through [`Session::connect`]; this seam exists for alternative
    /// transports and for exercising send/receive in tests.
    pub fn attached(stream: S) -> Self {
        Self {
            state: State::Connected,
            stream: Some(stream),
            buffer: Vec::new(),
        }
    }

    /// `Connected -> Sending -> SentAwaitingAck`.
    ///
    /// Issues a single write of the full payload and reports the byte count
    /// actually taken; fewer bytes than requested is a
    /// [`SessionError::ShortWrite`], never silent success. After a full
    /// write the session closes its write half, which is the end-of-request
    /// marker the peer reads up to.
    pub async fn send(&mut self, payload: &[u8]) -> Result<usize, SessionError> {
        self.expect(State::Connected, "send")?;
        self.state = State::Sending;
        let stream = self.stream.as_mut().ok_or(SessionError::OutOfOrder {
            op: "send",
            state: State::Closed,
        })?;
        let written = match stream.write(payload).await {
            Ok(n) => n,
            Err(e) => {
                self.state = State::Closed;
                return Err(SessionError::Transport(e));
            }
        };
        if written < payload.len() {
            self.state = State::Closed;
            return Err(SessionError::ShortWrite {
                written,
                expected: payload.len(),
            });
        }
        if let Err(e) = stream.shutdown().await {
            self.state = State::Closed;
            return Err(SessionError::Transport(e));
        }
        self.state = State::SentAwaitingAck;
        Ok(written)
    }

    /// `SentAwaitingAck -> Receiving -> Closed`.
    ///
    /// Reads fixed-size chunks, appending each one to the accumulation
    /// buffer in arrival order, until the peer closes its write half (a
    /// zero-length read, the end-of-reply marker). Returns the finalized
    /// buffer; it may be empty, and classifying that is the codec's call.
    pub async fn receive(&mut self) -> Result<Vec<u8>, SessionError> {
        self.expect(State::SentAwaitingAck, "receive")?;
        self.state = State::Receiving;
        let stream = self.stream.as_mut().ok_or(SessionError::OutOfOrder {
            op: "receive",
            state: State::Closed,
        })?;
        let mut chunk = [0u8; RECV_CHUNK];
        loop {
            match stream.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
                Err(e) => {
                    self.state = State::Closed;
                    return Err(SessionError::Transport(e));
                }
            }
        }
        self.state = State::Closed;
        Ok(std::mem::take(&mut self.buffer))
    }

    /// Orderly release. Best-effort: tolerates sessions that already failed
    /// or never connected, and never reports an error back.
    pub async fn disconnect(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
        self.state = State::Closed;
    }

    pub fn state(&self) -> State {
        self.state
    }

    fn expect(&self, wanted: State, op: &'static str) -> Result<(), SessionError> {
        if self.state != wanted {
            return Err(SessionError::OutOfOrder {
                op,
                state: self.state,
            });
        }
        Ok(())
    }
}
