//! # pos-printer
//!
//! Raw receipt printing through the host operating system.
//!
//! ## Scope
//!
//! This crate delivers an opaque byte payload (typically ESC/POS) to a named
//! OS print queue without driver translation, and lists the queues the OS
//! knows about. It does not build or inspect the payload.
//!
//! Backends:
//! - Windows: the print spooler (`OpenPrinterW` .. `ClosePrinter`, `EnumPrintersW`)
//! - Everything else: CUPS command-line tools (`lp -o raw`, `lpstat -p`)
//!
//! Exactly one backend is the [`SystemPrinter`] of a build. Callers should
//! hold it as `Arc<dyn RawPrinter>` so tests and alternative deployments can
//! inject a different implementation.
//!
//! ## Example
//!
//! ```ignore
//! use pos_printer::{RawPrinter, system_printer};
//!
//! let printer = system_printer();
//! for name in printer.list_printers()? {
//!     println!("{name}");
//! }
//! printer.submit_raw_bytes("POS-80", &[0x1B, 0x40, b'O', b'K', 0x0A])?;
//! ```

mod cups;
mod error;
mod printer;
mod record;
mod spooler;

#[cfg(windows)]
mod win32;

use std::sync::Arc;

// Re-exports
pub use cups::{CupsBackend, parse_lpstat};
pub use error::{OsError, PrintError, PrintResult, Stage, WriteFailure};
pub use printer::RawPrinter;
pub use record::{PointerWidth, PrinterRecord, RecordLayout, decode_records};
pub use spooler::{DOC_NAME, EnumCall, RAW_DATATYPE, SpoolerApi, SpoolerBackend};

#[cfg(windows)]
pub use win32::Win32Spooler;

/// Backend compiled for this target
#[cfg(windows)]
pub type SystemPrinter = SpoolerBackend<Win32Spooler>;

/// Backend compiled for this target
#[cfg(not(windows))]
pub type SystemPrinter = CupsBackend;

/// Create the backend for this target
pub fn system_printer() -> Arc<dyn RawPrinter> {
    #[cfg(windows)]
    let printer = SpoolerBackend::new(Win32Spooler);
    #[cfg(not(windows))]
    let printer = CupsBackend::new();

    Arc::new(printer)
}
