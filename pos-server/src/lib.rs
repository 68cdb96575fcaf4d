//! POS Print Server - HTTP front end for raw receipt printing
//!
//! Thin glue around [`pos_printer`]: request parsing, CORS, access logging
//! and health reporting. All printing goes through the injected
//! [`pos_printer::RawPrinter`] held in [`ServerState`].
//!
//! ```text
//! pos-server/src/
//! ├── core/          # config, state, errors, listener
//! ├── api/           # routes
//! └── utils/         # logging
//! ```

pub mod api;
pub mod core;
pub mod utils;

pub use core::{Config, Server, ServerError, ServerState};
pub use utils::logger::init_logger_with_file;

/// Load `.env` from the working directory, if present
pub fn setup_environment() {
    dotenv::dotenv().ok();
}
