//! Native spooler backend
//!
//! Submission walks the spooler lifecycle
//! `open -> start doc -> start page -> write -> end page -> end doc -> close`.
//! Each stage that was entered is held by a guard, so any early return
//! unwinds the entered stages in reverse order.
//!
//! Listing uses the two-phase enumeration protocol: ask for the required
//! buffer size, then fetch into a buffer of exactly that size and decode the
//! fixed-stride records.

use tracing::{debug, info, instrument, warn};

use crate::error::{OsError, PrintError, PrintResult, Stage, WriteFailure};
use crate::printer::{RawPrinter, check_printer_name};
use crate::record::{PointerWidth, PrinterRecord, RecordLayout, decode_records};

/// Document name shown in the OS queue
pub const DOC_NAME: &str = "POS Print";
/// Datatype that bypasses driver translation
pub const RAW_DATATYPE: &str = "RAW";
/// Enumeration level whose records carry name, port, driver and status
pub const ENUM_LEVEL: u32 = 2;

/// Outcome of one enumeration call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumCall {
    pub result: Result<(), OsError>,
    /// Bytes the spooler needs for the full listing
    pub needed: u32,
    /// Records written into the buffer
    pub returned: u32,
}

/// Spooler entry points
///
/// One method per native call. Implementations translate the OS result into
/// `Ok`/`Err(OsError)` and do nothing else.
pub trait SpoolerApi: Send + Sync {
    type Handle: Copy;

    fn open_printer(&self, name: &str) -> Result<Self::Handle, OsError>;
    fn start_doc(&self, handle: Self::Handle, doc_name: &str, datatype: &str)
    -> Result<(), OsError>;
    fn start_page(&self, handle: Self::Handle) -> Result<(), OsError>;
    /// Returns the number of bytes the spooler accepted
    fn write(&self, handle: Self::Handle, data: &[u8]) -> Result<u32, OsError>;
    fn end_page(&self, handle: Self::Handle) -> Result<(), OsError>;
    fn end_doc(&self, handle: Self::Handle) -> Result<(), OsError>;
    fn close_printer(&self, handle: Self::Handle) -> Result<(), OsError>;

    /// Enumerate local and connected printers at `level` into `buf`
    ///
    /// An empty `buf` is the size query.
    fn enum_printers(&self, level: u32, buf: &mut [u8]) -> EnumCall;

    /// Address the OS sees for `buf`, used to resolve in-buffer pointers
    fn buffer_base(&self, buf: &[u8]) -> usize {
        buf.as_ptr() as usize
    }
}

/// Open queue handle, closed on drop
struct OpenPrinter<'a, A: SpoolerApi> {
    api: &'a A,
    handle: A::Handle,
    closed: bool,
}

impl<'a, A: SpoolerApi> OpenPrinter<'a, A> {
    fn open(api: &'a A, name: &str) -> PrintResult<Self> {
        let handle = api
            .open_printer(name)
            .map_err(|source| PrintError::HandleOpen {
                printer: name.to_string(),
                source,
            })?;
        Ok(Self {
            api,
            handle,
            closed: false,
        })
    }

    fn close(mut self) {
        self.closed = true;
        if let Err(e) = self.api.close_printer(self.handle) {
            warn!(error = %e, "ClosePrinter failed after successful write");
        }
    }
}

impl<A: SpoolerApi> Drop for OpenPrinter<'_, A> {
    fn drop(&mut self) {
        if !self.closed
            && let Err(e) = self.api.close_printer(self.handle)
        {
            warn!(error = %e, "ClosePrinter failed during unwind");
        }
    }
}

/// Started document, ended on drop
struct OpenDocument<'a, A: SpoolerApi> {
    api: &'a A,
    handle: A::Handle,
    ended: bool,
}

impl<'a, A: SpoolerApi> OpenDocument<'a, A> {
    fn start(printer: &OpenPrinter<'a, A>) -> PrintResult<Self> {
        printer
            .api
            .start_doc(printer.handle, DOC_NAME, RAW_DATATYPE)
            .map_err(|source| PrintError::DocumentLifecycle {
                stage: Stage::Start,
                source,
            })?;
        Ok(Self {
            api: printer.api,
            handle: printer.handle,
            ended: false,
        })
    }

    fn end(mut self) -> PrintResult<()> {
        self.ended = true;
        self.api
            .end_doc(self.handle)
            .map_err(|source| PrintError::DocumentLifecycle {
                stage: Stage::End,
                source,
            })
    }
}

impl<A: SpoolerApi> Drop for OpenDocument<'_, A> {
    fn drop(&mut self) {
        if !self.ended
            && let Err(e) = self.api.end_doc(self.handle)
        {
            warn!(error = %e, "EndDocPrinter failed during unwind");
        }
    }
}

/// Started page, ended on drop
struct OpenPage<'a, A: SpoolerApi> {
    api: &'a A,
    handle: A::Handle,
    ended: bool,
}

impl<'a, A: SpoolerApi> OpenPage<'a, A> {
    fn start(document: &OpenDocument<'a, A>) -> PrintResult<Self> {
        document
            .api
            .start_page(document.handle)
            .map_err(|source| PrintError::PageLifecycle {
                stage: Stage::Start,
                source,
            })?;
        Ok(Self {
            api: document.api,
            handle: document.handle,
            ended: false,
        })
    }

    fn write(&self, data: &[u8]) -> PrintResult<()> {
        let written = self
            .api
            .write(self.handle, data)
            .map_err(|e| PrintError::Write(WriteFailure::Os(e)))?;

        if written as usize != data.len() {
            return Err(PrintError::Write(WriteFailure::Short {
                written,
                expected: data.len(),
            }));
        }
        Ok(())
    }

    fn end(mut self) -> PrintResult<()> {
        self.ended = true;
        self.api
            .end_page(self.handle)
            .map_err(|source| PrintError::PageLifecycle {
                stage: Stage::End,
                source,
            })
    }
}

impl<A: SpoolerApi> Drop for OpenPage<'_, A> {
    fn drop(&mut self) {
        if !self.ended
            && let Err(e) = self.api.end_page(self.handle)
        {
            warn!(error = %e, "EndPagePrinter failed during unwind");
        }
    }
}

/// Raw printer backed by the OS spooler
#[derive(Debug)]
pub struct SpoolerBackend<A> {
    api: A,
    layout: RecordLayout,
}

impl<A: SpoolerApi> SpoolerBackend<A> {
    pub fn new(api: A) -> Self {
        Self::with_layout(api, RecordLayout::printer_info_2(PointerWidth::native()))
    }

    /// Use an explicit record layout (e.g. a 32-bit spooler buffer)
    pub fn with_layout(api: A, layout: RecordLayout) -> Self {
        Self { api, layout }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Full enumeration records, in spooler order
    #[instrument(skip(self))]
    pub fn printer_records(&self) -> PrintResult<Vec<PrinterRecord>> {
        let probe = self.api.enum_printers(ENUM_LEVEL, &mut []);
        if let Err(code) = probe.result
            && probe.needed == 0
        {
            return Err(PrintError::EnumerationQuery(code));
        }

        if probe.needed == 0 {
            debug!("Spooler reports no printers");
            return Ok(Vec::new());
        }

        let mut buf = vec![0u8; probe.needed as usize];
        let fetch = self.api.enum_printers(ENUM_LEVEL, &mut buf);
        fetch.result.map_err(|code| {
            PrintError::EnumerationBuffer(format!(
                "EnumPrintersW failed with {} byte buffer: {}",
                buf.len(),
                code
            ))
        })?;

        debug!(
            needed = probe.needed,
            returned = fetch.returned,
            "Decoding printer records"
        );
        decode_records(&buf, self.api.buffer_base(&buf), fetch.returned, self.layout)
    }
}

impl<A: SpoolerApi> RawPrinter for SpoolerBackend<A> {
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    fn submit_raw_bytes(&self, printer_name: &str, data: &[u8]) -> PrintResult<()> {
        check_printer_name(printer_name)?;

        let printer = OpenPrinter::open(&self.api, printer_name)?;
        let document = OpenDocument::start(&printer)?;
        let page = OpenPage::start(&document)?;

        page.write(data)?;

        page.end()?;
        document.end()?;
        printer.close();

        info!("Print job sent successfully");
        Ok(())
    }

    fn list_printers(&self) -> PrintResult<Vec<String>> {
        let names = self
            .printer_records()?
            .into_iter()
            .map(|record| record.name)
            .filter(|name| !name.is_empty())
            .collect();
        Ok(names)
    }

    fn backend_name(&self) -> &'static str {
        "spooler"
    }
}
