use std::sync::Arc;
use std::time::Instant;

use pos_printer::{PrintResult, RawPrinter};

use crate::core::{Config, Result, ServerError};

/// Shared server state
///
/// Cheap to clone; the printer backend is injected so tests can swap it.
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub printer: Arc<dyn RawPrinter>,
    pub started_at: Instant,
}

impl ServerState {
    pub fn new(config: Config, printer: Arc<dyn RawPrinter>) -> Self {
        Self {
            config: Arc::new(config),
            printer,
            started_at: Instant::now(),
        }
    }

    /// Run a printer call on the blocking pool
    ///
    /// With `PRINT_TIMEOUT_MS` set the caller stops waiting after the
    /// deadline; the backend call itself keeps running to completion.
    pub async fn with_printer<T, F>(&self, call: F) -> Result<T>
    where
        F: FnOnce(&dyn RawPrinter) -> PrintResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let printer = self.printer.clone();
        let task = tokio::task::spawn_blocking(move || call(printer.as_ref()));

        let joined = match self.config.print_timeout() {
            Some(deadline) => tokio::time::timeout(deadline, task)
                .await
                .map_err(|_| ServerError::Timeout(self.config.print_timeout_ms))?,
            None => task.await,
        };

        let result =
            joined.map_err(|e| anyhow::anyhow!("Printer task join failed: {}", e))?;
        Ok(result?)
    }
}
