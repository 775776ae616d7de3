use bytes::Bytes;
use mio::net::TcpStream;
use std::io::{self, Read};
use std::net::SocketAddr;

use crate::http::buffer::RecvBuffer;
use crate::http::parser::{self, RequestError};
use crate::http::response::Response;
use crate::http::writer::{ResponseWriter, WriteProgress};
use crate::static_files::{FileError, StaticFiles};

/// Per-request bounds enforced while draining a readable descriptor.
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    pub max_request_size: usize,
    pub max_target_len: usize,
}

pub enum ConnectionState {
    Reading,
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

/// What the reactor should do with the descriptor after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Keep the current interest registration.
    Stay,
    /// A response is ready; register for write-readiness.
    StartWriting,
    /// The response is fully sent; re-register for edge-triggered reads.
    BackToReading,
    /// Deregister and drop the descriptor.
    Close,
}

pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    state: ConnectionState,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self {
            stream,
            peer,
            state: ConnectionState::Reading,
        }
    }

    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Drains the socket until it would block, then parses the accumulated
    /// bytes and builds the response.
    ///
    /// The drain-to-exhaustion loop is mandatory: the descriptor is registered
    /// edge-triggered, so a single read would lose the notification for data
    /// the kernel has already queued.
    pub fn on_readable(
        &mut self,
        scratch: &mut [u8],
        limits: &RequestLimits,
        files: &StaticFiles,
    ) -> Transition {
        if !matches!(self.state, ConnectionState::Reading) {
            return Transition::Stay;
        }

        let mut buffer: Option<RecvBuffer> = None;
        let mut overflow = false;

        loop {
            match self.stream.read(scratch) {
                Ok(0) => {
                    // Peer closed; any partial buffer is discarded.
                    tracing::debug!("client on {} disconnected", self.peer);
                    self.state = ConnectionState::Closed;
                    return Transition::Close;
                }
                Ok(n) => {
                    let buf = buffer.get_or_insert_with(|| RecvBuffer::new(scratch.len()));
                    if let Err(e) = buf.append(&scratch[..n]) {
                        tracing::warn!(peer = %self.peer, error = ?e, "dropping connection, receive buffer failed");
                        self.state = ConnectionState::Closed;
                        return Transition::Close;
                    }
                    if buf.len() > limits.max_request_size {
                        overflow = true;
                        break;
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::debug!(peer = %self.peer, error = %e, "read failed");
                    self.state = ConnectionState::Closed;
                    return Transition::Close;
                }
            }
        }

        if overflow {
            // Unread request bytes stay queued in the kernel, so the
            // connection cannot be reused after the reply.
            tracing::debug!(peer = %self.peer, "request exceeds configured bound, replying 413");
            let response = Response::payload_too_large();
            self.state = ConnectionState::Writing(ResponseWriter::new(&response), false);
            return Transition::StartWriting;
        }

        let Some(buffer) = buffer else {
            // Spurious wake-up: readable event with nothing to read.
            return Transition::Stay;
        };

        let response = build_response(buffer.into_bytes(), limits, files);
        self.state = ConnectionState::Writing(ResponseWriter::new(&response), true);
        Transition::StartWriting
    }

    /// Streams response bytes until the transport would block or the response
    /// completes, advancing the writer's offset cursor by whatever the
    /// transport accepted.
    pub fn on_writable(&mut self) -> Transition {
        let ConnectionState::Writing(writer, keep_alive) = &mut self.state else {
            return Transition::Stay;
        };

        loop {
            match writer.write_some(&mut self.stream) {
                Ok(WriteProgress::Complete) => {
                    // Release the response; the descriptor goes back to
                    // serving requests unless it was marked for closing.
                    if *keep_alive {
                        self.state = ConnectionState::Reading;
                        return Transition::BackToReading;
                    }
                    self.state = ConnectionState::Closed;
                    return Transition::Close;
                }
                Ok(WriteProgress::Partial(_)) => continue,
                Ok(WriteProgress::Closed) => {
                    tracing::debug!("client on {} closed mid-response", self.peer);
                    self.state = ConnectionState::Closed;
                    return Transition::Close;
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return Transition::Stay,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::debug!(peer = %self.peer, error = %e, "write failed");
                    self.state = ConnectionState::Closed;
                    return Transition::Close;
                }
            }
        }
    }
}

/// Parses the drained request and picks the most specific response for it.
fn build_response(bytes: Bytes, limits: &RequestLimits, files: &StaticFiles) -> Response {
    match parser::parse_request(&bytes, limits.max_target_len) {
        Err(err) => {
            tracing::debug!(error = ?err, "rejecting unparseable request");
            Response::bad_request()
        }
        Ok(request) => match request.primary_error() {
            Some(RequestError::UnsupportedMethod) => Response::not_implemented(),
            Some(RequestError::TargetTooLong) => Response::payload_too_large(),
            Some(_) => Response::bad_request(),
            None => {
                let Some(target) = request.target.as_deref() else {
                    return Response::bad_request();
                };
                match files.lookup(target) {
                    Ok(file) => Response::ok(file.bytes, file.mime),
                    Err(FileError::NotFound) => Response::not_found(),
                    Err(FileError::Io(e)) => {
                        tracing::warn!(path = target, error = %e, "file lookup failed");
                        Response::internal_error()
                    }
                }
            }
        },
    }
}
