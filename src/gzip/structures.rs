use std::fmt::Display;

use chrono::{Local, TimeZone};

/// Member magic bytes (ID1, ID2)
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// The only compression method defined by RFC 1952
pub const CM_DEFLATE: u8 = 8;

/// Fixed header - 10 bytes
pub const HEADER_SIZE: usize = 10;

/// Trailer: CRC32 (4) + ISIZE (4)
pub const TRAILER_SIZE: usize = 8;

pub const FTEXT: u8 = 0x01;
pub const FHCRC: u8 = 0x02;
pub const FEXTRA: u8 = 0x04;
pub const FNAME: u8 = 0x08;
pub const FCOMMENT: u8 = 0x10;
/// Bits 5..7 of FLG must be zero
pub const FRESERVED: u8 = 0xe0;

/// Progress of header decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderStatus {
    /// Not enough input has been seen to decide
    #[default]
    Incomplete,
    /// A well-formed header was decoded
    Complete,
    /// The stream carries no gzip header
    Unavailable,
}

impl HeaderStatus {
    pub fn code(&self) -> i32 {
        match self {
            HeaderStatus::Incomplete => 0,
            HeaderStatus::Complete => 1,
            HeaderStatus::Unavailable => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        status_label(self.code())
    }
}

/// Describe a raw header status code.
///
/// Only 0, 1 and 2 are ever produced; any other value maps to `"undefined"`.
pub fn status_label(code: i32) -> &'static str {
    match code {
        0 => "incomplete",
        1 => "complete",
        2 => "unavailable",
        _ => "undefined",
    }
}

/// Operating system that produced the member (OS byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Fat,
    Amiga,
    Vms,
    Unix,
    VmCms,
    AtariTos,
    Hpfs,
    Macintosh,
    ZSystem,
    CpM,
    Tops20,
    Ntfs,
    Qdos,
    AcornRiscos,
    Unknown,
    Other(u8),
}

impl Os {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Os::Fat,
            1 => Os::Amiga,
            2 => Os::Vms,
            3 => Os::Unix,
            4 => Os::VmCms,
            5 => Os::AtariTos,
            6 => Os::Hpfs,
            7 => Os::Macintosh,
            8 => Os::ZSystem,
            9 => Os::CpM,
            10 => Os::Tops20,
            11 => Os::Ntfs,
            12 => Os::Qdos,
            13 => Os::AcornRiscos,
            255 => Os::Unknown,
            _ => Os::Other(value),
        }
    }
}

/// Decoded member header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GzHeader {
    pub status: HeaderStatus,
    /// Seconds since the Unix epoch, `0` when not set
    pub mtime: u32,
    /// Original file name, `None` when FNAME is not set
    pub file_name: Option<String>,
    pub flags: u8,
    pub extra_flags: u8,
    pub os: Os,
    /// XLEN of the extra field when FEXTRA is set
    pub extra_len: Option<u16>,
    pub has_comment: bool,
    pub has_header_crc: bool,
}

impl Default for GzHeader {
    fn default() -> Self {
        Self {
            status: HeaderStatus::Incomplete,
            mtime: 0,
            file_name: None,
            flags: 0,
            extra_flags: 0,
            os: Os::Unknown,
            extra_len: None,
            has_comment: false,
            has_header_crc: false,
        }
    }
}

impl GzHeader {
    /// Modification time rendered in the local time zone
    pub fn mtime_local(&self) -> String {
        asctime(&Local, self.mtime)
    }
}

/// Render `secs` like C's `asctime`, without the trailing newline.
pub fn asctime<Tz>(tz: &Tz, secs: u32) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match tz.timestamp_opt(i64::from(secs), 0).earliest() {
        Some(t) => t.format("%a %b %e %H:%M:%S %Y").to_string(),
        None => String::from("(invalid time)"),
    }
}

/// Member trailer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
    pub crc32: u32,
    /// Uncompressed size modulo 2^32
    pub isize: u32,
}

/// One decoded member and its location in the source
#[derive(Debug, Clone)]
pub struct Member {
    /// 1-based ordinal
    pub index: usize,
    pub start: u64,
    /// Exclusive end offset
    pub end: u64,
    pub header: GzHeader,
    /// Length of the member header in bytes
    pub header_len: u64,
    pub decompressed_size: u64,
    /// `None` when the source ended before the trailer
    pub trailer: Option<Trailer>,
}

impl Member {
    /// Offset of the member's final byte
    pub fn last_byte(&self) -> u64 {
        self.end.saturating_sub(1)
    }
}
