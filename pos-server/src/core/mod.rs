//! Core module - configuration, state and errors
//!
//! - [`Config`] - server configuration
//! - [`ServerState`] - shared state with the injected printer backend
//! - [`Server`] - HTTP server
//! - [`ServerError`] - handler errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
