//! HTTP protocol implementation.
//!
//! This module implements the protocol side of the server: request
//! accumulation, parsing, response construction and non-blocking streaming.
//!
//! # Architecture
//!
//! - **`buffer`**: Growable per-request receive buffer fed by the read drain loop
//! - **`parser`**: Parses accumulated bytes into a structured request
//! - **`request`**: Request representation (method, target, soft parse errors)
//! - **`response`**: Response representation with builder pattern and canned replies
//! - **`writer`**: Streams a serialized response to the client with an offset cursor
//! - **`connection`**: The per-descriptor state machine driven by the reactor
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Drain the socket until it would block
//!        └──────┬──────┘
//!               │ Request drained → parse, build response
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Stream response bytes on write-readiness
//!        └──────┬───────────┘
//!               │ Response fully sent
//!               ├─ Re-arm read → Reading (same connection)
//!               └─ Oversized request / peer gone → Closed
//! ```
//!
//! The socket is registered edge-triggered, so both the read and the write
//! paths must run to exhaustion (`WouldBlock`) before returning to the
//! reactor's wait call, or readiness notifications are lost.

pub mod buffer;
pub mod connection;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
