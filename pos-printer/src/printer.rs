//! Printer contract shared by every backend
//!
//! A backend takes a queue name and an opaque byte payload and hands the
//! payload to the OS unmodified. It also reports the queues the OS knows.

use crate::error::{PrintError, PrintResult};

/// Trait for raw printer backends
///
/// Calls are synchronous and may block for as long as the OS (or an external
/// tool) takes. Async callers should run them on a blocking thread pool.
pub trait RawPrinter: Send + Sync {
    /// Send `data` verbatim to the queue named `printer_name`
    fn submit_raw_bytes(&self, printer_name: &str, data: &[u8]) -> PrintResult<()>;

    /// List the queues currently known to the OS, in the order it reports them
    fn list_printers(&self) -> PrintResult<Vec<String>>;

    /// Short backend identifier for diagnostics
    fn backend_name(&self) -> &'static str;
}

/// Reject names no backend can address
pub(crate) fn check_printer_name(name: &str) -> PrintResult<()> {
    if name.is_empty() || name.contains('\0') {
        return Err(PrintError::InvalidPrinterName(name.to_string()));
    }
    Ok(())
}
