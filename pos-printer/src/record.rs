//! Spooler enumeration records
//!
//! `EnumPrintersW` fills a caller buffer with `returned` fixed-size records
//! followed by the strings they point at. Records are decoded here field by
//! field at declared offsets; a string pointer is only followed when it lands
//! inside the same buffer.

use crate::error::{PrintError, PrintResult};

/// Pointer size of the process that filled the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerWidth {
    Bits32,
    Bits64,
}

impl PointerWidth {
    /// Pointer width of the running process
    pub const fn native() -> Self {
        if cfg!(target_pointer_width = "64") {
            PointerWidth::Bits64
        } else {
            PointerWidth::Bits32
        }
    }

    pub const fn bytes(self) -> usize {
        match self {
            PointerWidth::Bits32 => 4,
            PointerWidth::Bits64 => 8,
        }
    }
}

// PRINTER_INFO_2: 13 pointer fields, then 8 DWORDs
const INFO_2_POINTERS: usize = 13;
const INFO_2_DWORDS: usize = 8;

const PTR_PRINTER_NAME: usize = 1;
const PTR_SHARE_NAME: usize = 2;
const PTR_PORT_NAME: usize = 3;
const PTR_DRIVER_NAME: usize = 4;
const PTR_COMMENT: usize = 5;
const PTR_LOCATION: usize = 6;

const DWORD_ATTRIBUTES: usize = 0;
const DWORD_PRIORITY: usize = 1;
const DWORD_STATUS: usize = 5;
const DWORD_JOBS: usize = 6;

/// Field layout of one enumeration record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    width: PointerWidth,
    stride: usize,
}

impl RecordLayout {
    /// Layout of `PRINTER_INFO_2W` (enumeration level 2)
    pub const fn printer_info_2(width: PointerWidth) -> Self {
        let align = width.bytes();
        let raw = INFO_2_POINTERS * align + INFO_2_DWORDS * 4;
        Self {
            width,
            stride: raw.div_ceil(align) * align,
        }
    }

    /// Byte distance between consecutive records
    pub const fn stride(&self) -> usize {
        self.stride
    }

    fn pointer_offset(&self, index: usize) -> usize {
        index * self.width.bytes()
    }

    fn dword_offset(&self, index: usize) -> usize {
        INFO_2_POINTERS * self.width.bytes() + index * 4
    }
}

/// One printer as reported by the spooler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrinterRecord {
    pub name: String,
    pub share_name: String,
    pub port_name: String,
    pub driver_name: String,
    pub comment: String,
    pub location: String,
    pub attributes: u32,
    pub priority: u32,
    pub status: u32,
    pub jobs: u32,
}

/// Decode `returned` records from an enumeration buffer
///
/// `base` is the address the OS saw for `buf[0]`; string pointers are
/// resolved relative to it.
pub fn decode_records(
    buf: &[u8],
    base: usize,
    returned: u32,
    layout: RecordLayout,
) -> PrintResult<Vec<PrinterRecord>> {
    let count = returned as usize;
    let span = count.checked_mul(layout.stride).ok_or_else(|| {
        PrintError::EnumerationBuffer(format!("record count overflow: {}", returned))
    })?;

    if span > buf.len() {
        return Err(PrintError::EnumerationBuffer(format!(
            "{} records of {} bytes exceed buffer of {} bytes",
            count,
            layout.stride,
            buf.len()
        )));
    }

    let reader = RecordReader { buf, base, layout };
    Ok((0..count)
        .map(|i| reader.record(i * layout.stride))
        .collect())
}

struct RecordReader<'a> {
    buf: &'a [u8],
    base: usize,
    layout: RecordLayout,
}

impl RecordReader<'_> {
    fn record(&self, start: usize) -> PrinterRecord {
        let text = |field| self.string_field(start + self.layout.pointer_offset(field));
        let dword = |field| {
            read_u32(self.buf, start + self.layout.dword_offset(field)).unwrap_or_default()
        };

        PrinterRecord {
            name: text(PTR_PRINTER_NAME),
            share_name: text(PTR_SHARE_NAME),
            port_name: text(PTR_PORT_NAME),
            driver_name: text(PTR_DRIVER_NAME),
            comment: text(PTR_COMMENT),
            location: text(PTR_LOCATION),
            attributes: dword(DWORD_ATTRIBUTES),
            priority: dword(DWORD_PRIORITY),
            status: dword(DWORD_STATUS),
            jobs: dword(DWORD_JOBS),
        }
    }

    /// Follow a string pointer; null or out-of-buffer targets read as empty
    fn string_field(&self, offset: usize) -> String {
        let Some(addr) = self.read_pointer(offset) else {
            return String::new();
        };
        let Some(target) = addr
            .checked_sub(self.base as u64)
            .and_then(|rel| usize::try_from(rel).ok())
            .filter(|rel| *rel < self.buf.len())
        else {
            return String::new();
        };
        read_wide_string(&self.buf[target..]).unwrap_or_default()
    }

    fn read_pointer(&self, offset: usize) -> Option<u64> {
        let addr = match self.layout.width {
            PointerWidth::Bits32 => read_u32(self.buf, offset)? as u64,
            PointerWidth::Bits64 => {
                let bytes: [u8; 8] = self.buf.get(offset..offset + 8)?.try_into().ok()?;
                u64::from_le_bytes(bytes)
            }
        };
        (addr != 0).then_some(addr)
    }
}

fn read_u32(buf: &[u8], offset: usize) -> Option<u32> {
    let bytes: [u8; 4] = buf.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

/// NUL-terminated UTF-16LE; `None` when the terminator is missing
fn read_wide_string(bytes: &[u8]) -> Option<String> {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|unit| *unit != 0)
        .collect();

    // take_while stopped early only if it hit the terminator
    if units.len() * 2 + 2 > bytes.len() {
        return None;
    }
    Some(String::from_utf16_lossy(&units))
}
