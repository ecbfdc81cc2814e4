//! # otpd-server
//!
//! TCP server for otpd.
//!
//! This crate provides:
//! - An acceptor loop dispatching each connection to its own task
//! - Per-connection request handling: receive, validate tag, decrypt, respond
//! - The rejection sentinel for sibling-protocol clients
//! - Configuration with file and environment layering

pub mod config;
pub mod error;
pub mod handler;
pub mod server;

pub use config::{Config, NetworkConfig};
pub use error::ServerError;
pub use handler::{handle_request, Reply};
pub use server::{Server, ServerConfig, ServerStats};
