//! winspool entry points
//!
//! Thin `SpoolerApi` over the Win32 printing API. All lifecycle and decoding
//! logic lives in [`crate::spooler`]; this module only converts arguments and
//! return codes.

use core::ffi::c_void;

use windows::Win32::Foundation::GetLastError;
use windows::Win32::Graphics::Printing::{
    ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, EnumPrintersW, OpenPrinterW,
    PRINTER_ENUM_CONNECTIONS, PRINTER_ENUM_LOCAL, PRINTER_HANDLE, StartDocPrinterW,
    StartPagePrinter, WritePrinter,
};
use windows::core::{PCWSTR, PWSTR};

use crate::error::OsError;
use crate::spooler::{EnumCall, SpoolerApi};

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn last_error() -> OsError {
    // SAFETY: reads thread-local error state only
    OsError(unsafe { GetLastError() }.0)
}

/// Unwrap `HRESULT_FROM_WIN32` back to the plain Win32 code
fn os_error(e: windows::core::Error) -> OsError {
    let hr = e.code().0 as u32;
    if hr & 0xFFFF_0000 == 0x8007_0000 {
        OsError(hr & 0xFFFF)
    } else {
        OsError(hr)
    }
}

/// Win32 print spooler (winspool.drv)
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Spooler;

impl SpoolerApi for Win32Spooler {
    type Handle = PRINTER_HANDLE;

    fn open_printer(&self, name: &str) -> Result<PRINTER_HANDLE, OsError> {
        let name_w = to_wide(name);
        let mut handle = PRINTER_HANDLE::default();
        // SAFETY: name_w is NUL-terminated and outlives the call
        unsafe { OpenPrinterW(PCWSTR::from_raw(name_w.as_ptr()), &mut handle, None) }
            .map_err(os_error)?;
        Ok(handle)
    }

    fn start_doc(
        &self,
        handle: PRINTER_HANDLE,
        doc_name: &str,
        datatype: &str,
    ) -> Result<(), OsError> {
        let doc_name_w = to_wide(doc_name);
        let datatype_w = to_wide(datatype);
        let doc_info = DOC_INFO_1W {
            pDocName: PWSTR(doc_name_w.as_ptr() as *mut _),
            pOutputFile: PWSTR::null(),
            pDatatype: PWSTR(datatype_w.as_ptr() as *mut _),
        };

        // SAFETY: doc_info and its strings live until the call returns
        let job = unsafe { StartDocPrinterW(handle, 1, &doc_info as *const DOC_INFO_1W) };
        if job == 0 {
            return Err(last_error());
        }
        Ok(())
    }

    fn start_page(&self, handle: PRINTER_HANDLE) -> Result<(), OsError> {
        // SAFETY: handle came from OpenPrinterW
        if unsafe { StartPagePrinter(handle) }.as_bool() {
            Ok(())
        } else {
            Err(last_error())
        }
    }

    fn write(&self, handle: PRINTER_HANDLE, data: &[u8]) -> Result<u32, OsError> {
        let len = u32::try_from(data.len()).unwrap_or(u32::MAX);
        let mut written: u32 = 0;
        // SAFETY: the spooler reads at most `len` bytes from `data`
        let ok = unsafe {
            WritePrinter(handle, data.as_ptr() as *const c_void, len, &mut written)
        };
        if ok.as_bool() {
            Ok(written)
        } else {
            Err(last_error())
        }
    }

    fn end_page(&self, handle: PRINTER_HANDLE) -> Result<(), OsError> {
        // SAFETY: handle came from OpenPrinterW
        if unsafe { EndPagePrinter(handle) }.as_bool() {
            Ok(())
        } else {
            Err(last_error())
        }
    }

    fn end_doc(&self, handle: PRINTER_HANDLE) -> Result<(), OsError> {
        // SAFETY: handle came from OpenPrinterW
        if unsafe { EndDocPrinter(handle) }.as_bool() {
            Ok(())
        } else {
            Err(last_error())
        }
    }

    fn close_printer(&self, handle: PRINTER_HANDLE) -> Result<(), OsError> {
        // SAFETY: handle came from OpenPrinterW and is closed once
        unsafe { ClosePrinter(handle) }.map_err(os_error)
    }

    fn enum_printers(&self, level: u32, buf: &mut [u8]) -> EnumCall {
        let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
        let mut needed: u32 = 0;
        let mut returned: u32 = 0;
        let out = if buf.is_empty() { None } else { Some(buf) };

        // SAFETY: the spooler writes at most `buf.len()` bytes into `out`
        let result = unsafe { EnumPrintersW(flags, None, level, out, &mut needed, &mut returned) }
            .map_err(os_error);

        EnumCall {
            result,
            needed,
            returned,
        }
    }
}
