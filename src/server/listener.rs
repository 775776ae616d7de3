use anyhow::{Context, Result};
use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Token, Waker};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::Config;
use crate::server::worker::{Worker, WorkerHandle};
use crate::static_files::StaticFiles;

const LISTENER: Token = Token(0);
const WAKER: Token = Token(1);

/// Round-robin worker selector. Only the dispatcher thread touches it, so a
/// plain counter needs no synchronization.
struct RoundRobin {
    next: usize,
    len: usize,
}

impl RoundRobin {
    fn new(len: usize) -> Self {
        Self { next: 0, len }
    }

    fn next(&mut self) -> usize {
        let picked = self.next;
        self.next = (self.next + 1) % self.len;
        picked
    }
}

/// The dispatcher: owns the listening socket and its own reactor, accepts new
/// connections and spreads them across the worker pool. It never touches
/// application bytes.
pub struct Server {
    poll: Poll,
    listener: TcpListener,
    local_addr: SocketAddr,
    workers: Vec<WorkerHandle>,
    selector: RoundRobin,
    active: Arc<AtomicBool>,
    waker: Arc<Waker>,
    events_capacity: usize,
}

/// Stops a running server from another thread.
#[derive(Clone)]
pub struct ServerHandle {
    active: Arc<AtomicBool>,
    waker: Arc<Waker>,
}

impl ServerHandle {
    /// Clears the dispatcher's liveness flag and wakes it out of its wait;
    /// the dispatcher then stops and joins the workers.
    pub fn shutdown(&self) {
        self.active.store(false, Ordering::Release);
        let _ = self.waker.wake();
    }
}

impl Server {
    /// Spawns the worker pool and binds the listening socket. Failing to bind
    /// is the only startup error worth dying for.
    pub fn bind(cfg: &Config) -> Result<Self> {
        anyhow::ensure!(cfg.server.workers > 0, "worker pool must not be empty");

        let files = StaticFiles::new(&cfg.static_files);
        let mut workers = Vec::with_capacity(cfg.server.workers);
        for id in 0..cfg.server.workers {
            let worker = Worker::spawn(id, &cfg.server, files.clone())
                .with_context(|| format!("cannot spawn worker {id}"))?;
            workers.push(worker);
        }

        let addr: SocketAddr = cfg
            .server
            .listen_addr
            .parse()
            .with_context(|| format!("invalid listen address {}", cfg.server.listen_addr))?;
        // mio sockets are created non-blocking.
        let mut listener =
            TcpListener::bind(addr).with_context(|| format!("cannot bind {addr}"))?;
        let local_addr = listener.local_addr().context("cannot read local address")?;

        let poll = Poll::new().context("cannot create dispatcher reactor")?;
        poll.registry()
            .register(&mut listener, LISTENER, Interest::READABLE)
            .context("cannot register listener")?;
        let waker =
            Arc::new(Waker::new(poll.registry(), WAKER).context("cannot create dispatcher waker")?);

        Ok(Self {
            poll,
            listener,
            local_addr,
            selector: RoundRobin::new(workers.len()),
            workers,
            active: Arc::new(AtomicBool::new(true)),
            waker,
            events_capacity: cfg.server.max_events,
        })
    }

    /// The address the listener actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            active: Arc::clone(&self.active),
            waker: Arc::clone(&self.waker),
        }
    }

    /// Runs the accept loop until the server is shut down, then stops and
    /// joins the worker pool.
    pub fn run(&mut self) -> Result<()> {
        let mut events = Events::with_capacity(self.events_capacity);
        tracing::info!("Listening on {}", self.local_addr);

        while self.active.load(Ordering::Acquire) {
            if let Err(e) = self.poll.poll(&mut events, None) {
                if e.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(e).context("dispatcher wait failed");
            }

            for event in events.iter() {
                if event.token() == LISTENER {
                    self.accept_ready();
                }
                // WAKER events only break the wait so the flag is rechecked.
            }
        }

        tracing::info!("Shutting down worker pool");
        for worker in &self.workers {
            worker.shutdown();
        }
        for worker in &mut self.workers {
            worker.join();
        }

        Ok(())
    }

    /// Accepts until the listener would block, mirroring the edge-triggered
    /// drain discipline the workers use on their descriptors.
    fn accept_ready(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    tracing::info!("Accepted connection from {}", peer);
                    let picked = self.selector.next();
                    if let Err(e) = self.workers[picked].assign(stream, peer) {
                        tracing::error!(worker = self.workers[picked].id(), error = %e, "cannot hand off connection");
                    } else {
                        tracing::debug!(worker = self.workers[picked].id(), %peer, "connection assigned");
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RoundRobin;

    #[test]
    fn selector_cycles_through_workers_in_order() {
        let mut selector = RoundRobin::new(4);
        let picks: Vec<usize> = (0..9).map(|_| selector.next()).collect();
        assert_eq!(picks, vec![0, 1, 2, 3, 0, 1, 2, 3, 0]);
    }

    #[test]
    fn selector_with_single_worker_always_picks_it() {
        let mut selector = RoundRobin::new(1);
        assert_eq!(selector.next(), 0);
        assert_eq!(selector.next(), 0);
    }
}
