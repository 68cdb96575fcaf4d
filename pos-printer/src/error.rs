//! Error types for the printer library

use std::fmt;
use std::process::ExitStatus;

use thiserror::Error;

/// Raw error code reported by the operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsError(pub u32);

impl fmt::Display for OsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "os error {}", self.0)
    }
}

impl std::error::Error for OsError {}

/// Why the write stage failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteFailure {
    /// The spooler rejected the write call
    Os(OsError),
    /// The spooler accepted fewer bytes than the payload holds
    Short { written: u32, expected: usize },
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteFailure::Os(code) => write!(f, "{}", code),
            WriteFailure::Short { written, expected } => {
                write!(f, "short write: {} of {} bytes", written, expected)
            }
        }
    }
}

/// Lifecycle stage that failed (start or end of a document/page)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    End,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Start => f.write_str("start"),
            Stage::End => f.write_str("end"),
        }
    }
}

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// Empty name or a name the OS cannot represent
    #[error("Invalid printer name: {0:?}")]
    InvalidPrinterName(String),

    /// Could not open a handle to the print queue
    #[error("Failed to open printer {printer}: {source}")]
    HandleOpen { printer: String, source: OsError },

    #[error("Document {stage} failed: {source}")]
    DocumentLifecycle { stage: Stage, source: OsError },

    #[error("Page {stage} failed: {source}")]
    PageLifecycle { stage: Stage, source: OsError },

    #[error("Write failed: {0}")]
    Write(WriteFailure),

    /// Size query of the printer enumeration failed
    #[error("Printer enumeration query failed: {0}")]
    EnumerationQuery(OsError),

    /// Buffer fetch or decode of the printer enumeration failed
    #[error("Printer enumeration failed: {0}")]
    EnumerationBuffer(String),

    /// Temporary staging file could not be prepared
    #[error("Failed to stage print data: {0}")]
    Staging(#[source] std::io::Error),

    #[error("Failed to run {program}: {source}")]
    SubprocessInvocation {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {output}")]
    SubprocessNonZeroExit {
        program: String,
        status: ExitStatus,
        output: String,
    },
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
