use bytes::Bytes;
use std::io::{self, Write};

use crate::http::response::Response;

/// Progress of a single non-blocking write attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteProgress {
    /// Some bytes were accepted by the transport (possibly fewer than asked).
    Partial(usize),
    /// The whole serialized response has been sent.
    Complete,
    /// The transport accepted zero bytes; the peer is gone.
    Closed,
}

/// Streams a serialized response to the client across multiple non-blocking
/// writes, tracking how many bytes the transport has already accepted.
pub struct ResponseWriter {
    buffer: Bytes,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: response.wire(),
            written: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.written == self.buffer.len()
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn total(&self) -> usize {
        self.buffer.len()
    }

    /// Attempts to send the remaining bytes starting at the cursor. Short
    /// writes advance the cursor and are expected, not an error; `WouldBlock`
    /// propagates to the caller so the reactor can wait for write-readiness.
    pub fn write_some(&mut self, stream: &mut impl Write) -> io::Result<WriteProgress> {
        if self.is_complete() {
            return Ok(WriteProgress::Complete);
        }

        let n = stream.write(&self.buffer[self.written..])?;
        if n == 0 {
            return Ok(WriteProgress::Closed);
        }

        self.written += n;
        if self.is_complete() {
            Ok(WriteProgress::Complete)
        } else {
            Ok(WriteProgress::Partial(n))
        }
    }
}
