//! Edgehog - Edge-Triggered HTTP Server
//!
//! A small HTTP server built directly on an epoll-style reactor: one event
//! loop per worker thread, edge-triggered readiness, and non-blocking
//! resumable response streaming.

pub mod config;
pub mod http;
pub mod server;
pub mod static_files;
