//! Multi-member gzip scanning.
//!
//! A gzip file may hold several members back to back (RFC 1952 §2.2), for
//! example when files are compressed separately and concatenated. Nothing in
//! a member records its compressed length, so the only way to find where one
//! member ends and the next begins is to decode it.
//!
//! ## Architecture
//!
//! - [`structures`]: header, trailer and member types plus format constants
//! - [`parser`]: header decoding and the [`GzInflater`] engine
//! - [`extractor`]: decodes and reports a single member
//! - [`locator`]: walks the source from offset 0, member after member
//!
//! ## Limitations
//!
//! - The header CRC16 is skipped, not verified
//! - Comments and extra fields are detected but not stored
//! - Input must support positional reads

mod error;
mod extractor;
mod locator;
mod parser;
mod structures;

pub use error::*;
pub use extractor::{
    DEFAULT_CHUNK_SIZE, DEFAULT_NAME_MAX, HeaderExtractor, OUTBUF_MULT, ScanOptions,
};
pub use locator::MemberLocator;
pub use parser::{GzInflater, InflateFlush, InflateStatus, Progress, parse_header};
pub use structures::*;
