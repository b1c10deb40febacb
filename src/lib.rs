//! # gzscan
//!
//! Locate and describe every member of a multi-member gzip file.
//!
//! For each member the scanner reports its original file name, modification
//! time, header status, decompressed size and the byte range it occupies in
//! the file. Members are found by decoding: a member ends where its trailer
//! ends, and the next one starts on the following byte.
//!
//! ## Features
//!
//! - Decodes RFC 1952 headers, including headers split across reads
//! - Skips extra fields, comments and header CRCs
//! - Verifies each member's CRC32 and length trailer
//! - Works on files or any in-memory buffer through [`ReadAt`]
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use gzscan::{LocalFileReader, MemberLocator};
//!
//! fn main() -> anyhow::Result<()> {
//!     let reader = LocalFileReader::new(Path::new("logs.gz"))?;
//!
//!     let mut report = Vec::new();
//!     let members = MemberLocator::new(&reader, "logs.gz").scan(&mut report)?;
//!     for member in &members {
//!         println!("{}: {}..={}", member.index, member.start, member.last_byte());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod gzip;
pub mod io;

pub use cli::Cli;
pub use gzip::{GzError, GzHeader, HeaderStatus, Member, MemberLocator, ScanOptions};
pub use io::{LocalFileReader, ReadAt};
