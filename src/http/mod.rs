//! HTTP server module.
//!
//! Serves the application on plain HTTP, expecting TLS to be terminated by a
//! reverse proxy in front of it. The server includes:
//! - Graceful shutdown on SIGTERM/SIGINT with connection draining
//! - Theme static files with fallback to the default theme

mod server;
mod shutdown;
pub mod static_files;

pub use server::{start_server, ServerError};
