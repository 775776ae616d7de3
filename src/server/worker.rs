use mio::event::Event;
use mio::net::TcpStream;
use mio::{Events, Interest, Poll, Token, Waker};
use slab::Slab;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::config::ServerConfig;
use crate::http::connection::{Connection, RequestLimits, Transition};
use crate::static_files::StaticFiles;

/// Token reserved for the cross-thread waker. Connection tokens are slab keys
/// and never reach this value.
const WAKER: Token = Token(usize::MAX);

/// Dispatcher-side handle to a worker: hands off connections, stops the loop.
pub struct WorkerHandle {
    id: usize,
    sender: Sender<(TcpStream, SocketAddr)>,
    waker: Arc<Waker>,
    active: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn id(&self) -> usize {
        self.id
    }

    /// Hands a freshly accepted connection to this worker's reactor. The
    /// stream is owned by the worker from here on.
    pub fn assign(&self, stream: TcpStream, peer: SocketAddr) -> io::Result<()> {
        self.sender
            .send((stream, peer))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "worker thread is gone"))?;
        self.waker.wake()
    }

    /// Clears the liveness flag and wakes the reactor so the flag is seen.
    pub fn shutdown(&self) {
        self.active.store(false, Ordering::Release);
        let _ = self.waker.wake();
    }

    pub fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// One reactor thread: an exclusive `Poll`, a connection table, and a scratch
/// read buffer. No state is shared with other workers.
pub struct Worker {
    id: usize,
    poll: Poll,
    conns: Slab<Connection>,
    inbox: Receiver<(TcpStream, SocketAddr)>,
    scratch: Vec<u8>,
    limits: RequestLimits,
    max_connections: usize,
    events_capacity: usize,
    files: StaticFiles,
    active: Arc<AtomicBool>,
}

impl Worker {
    /// Spawns the worker's event-loop thread and returns its handle.
    pub fn spawn(id: usize, cfg: &ServerConfig, files: StaticFiles) -> io::Result<WorkerHandle> {
        let poll = Poll::new()?;
        let waker = Arc::new(Waker::new(poll.registry(), WAKER)?);
        let (sender, inbox) = mpsc::channel();
        let active = Arc::new(AtomicBool::new(true));

        let mut worker = Worker {
            id,
            poll,
            conns: Slab::with_capacity(cfg.max_connections),
            inbox,
            scratch: vec![0u8; cfg.chunk_size],
            limits: RequestLimits {
                max_request_size: cfg.max_request_size,
                max_target_len: cfg.max_target_len,
            },
            max_connections: cfg.max_connections,
            events_capacity: cfg.max_events,
            files,
            active: Arc::clone(&active),
        };

        let thread = thread::Builder::new()
            .name(format!("edgehog-worker-{id}"))
            .spawn(move || worker.run())?;

        Ok(WorkerHandle {
            id,
            sender,
            waker,
            active,
            thread: Some(thread),
        })
    }

    /// The event loop. Blocks on the reactor with no timeout; the only way in
    /// is a readiness event or a waker, the only way out is the liveness flag.
    fn run(&mut self) {
        let mut events = Events::with_capacity(self.events_capacity);
        tracing::debug!(worker = self.id, "event loop started");

        while self.active.load(Ordering::Acquire) {
            if let Err(e) = self.poll.poll(&mut events, None) {
                if e.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                tracing::error!(worker = self.id, error = %e, "reactor wait failed");
                break;
            }

            for event in events.iter() {
                match event.token() {
                    WAKER => self.drain_inbox(),
                    token => self.on_connection_event(token, event),
                }
            }
        }

        tracing::debug!(worker = self.id, "event loop stopped");
    }

    /// Registers every connection the dispatcher handed over since the wake.
    fn drain_inbox(&mut self) {
        while let Ok((stream, peer)) = self.inbox.try_recv() {
            if self.conns.len() >= self.max_connections {
                tracing::warn!(worker = self.id, %peer, "connection table full, refusing connection");
                continue;
            }

            let entry = self.conns.vacant_entry();
            let key = entry.key();
            let conn = entry.insert(Connection::new(stream, peer));
            let registered = self.poll.registry().register(
                conn.stream_mut(),
                Token(key),
                Interest::READABLE,
            );
            if let Err(e) = registered {
                tracing::warn!(worker = self.id, %peer, error = %e, "cannot register connection");
                self.conns.remove(key);
                continue;
            }

            tracing::debug!(worker = self.id, token = key, %peer, "connection registered");
        }
    }

    fn on_connection_event(&mut self, token: Token, event: &Event) {
        if !self.conns.contains(token.0) {
            return; // stale event for an already-closed connection
        }

        if !event.is_readable() && !event.is_writable() {
            // Hang-up or error condition reported without readiness.
            self.close(token);
            return;
        }

        let mut transition = Transition::Stay;
        if event.is_readable() {
            let conn = &mut self.conns[token.0];
            transition = conn.on_readable(&mut self.scratch, &self.limits, &self.files);
        }
        if transition == Transition::Stay && event.is_writable() {
            let conn = &mut self.conns[token.0];
            transition = conn.on_writable();
        }

        self.apply(token, transition);
    }

    fn apply(&mut self, token: Token, transition: Transition) {
        let result = match transition {
            Transition::Stay => Ok(()),
            Transition::StartWriting => self.reregister(token, Interest::WRITABLE),
            Transition::BackToReading => self.reregister(token, Interest::READABLE),
            Transition::Close => {
                self.close(token);
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::warn!(worker = self.id, error = %e, "cannot update interest, closing connection");
            self.close(token);
        }
    }

    fn reregister(&mut self, token: Token, interest: Interest) -> io::Result<()> {
        let conn = &mut self.conns[token.0];
        self.poll
            .registry()
            .reregister(conn.stream_mut(), token, interest)
    }

    fn close(&mut self, token: Token) {
        if !self.conns.contains(token.0) {
            return;
        }
        let mut conn = self.conns.remove(token.0);
        if let Err(e) = self.poll.registry().deregister(conn.stream_mut()) {
            tracing::trace!(worker = self.id, error = %e, "deregister failed");
        }
        tracing::debug!(worker = self.id, peer = %conn.peer(), "connection closed");
        // Dropping the stream closes the descriptor.
    }
}
