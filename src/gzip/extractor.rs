use std::io::{self, Write};

use crate::io::ReadAt;

use super::error::{GzError, Z_BUF_ERROR};
use super::parser::{GzInflater, InflateFlush, InflateStatus};
use super::structures::{GzHeader, Member};

/// Default size of each raw read (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Default number of file name bytes kept from a header
pub const DEFAULT_NAME_MAX: usize = 511;

/// Output buffer size as a multiple of the input chunk size
pub const OUTBUF_MULT: usize = 5;

/// Tuning knobs for member scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Maximum number of bytes read from the source at once
    pub chunk_size: usize,
    /// Maximum number of file name bytes kept
    pub name_max: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            name_max: DEFAULT_NAME_MAX,
        }
    }
}

/// Decodes one member at a time and reports its header.
///
/// The extractor never keeps a cursor of its own: every call receives the
/// member's start offset and reports the member's end in the returned
/// [`Member`].
pub struct HeaderExtractor<'a, R: ReadAt + ?Sized> {
    reader: &'a R,
    source_name: &'a str,
    options: ScanOptions,
}

impl<'a, R: ReadAt + ?Sized> HeaderExtractor<'a, R> {
    pub fn new(reader: &'a R, source_name: &'a str, options: ScanOptions) -> Self {
        Self {
            reader,
            source_name,
            options,
        }
    }

    /// Decode the member starting at `start` and write its report to `out`.
    ///
    /// `budget` is the number of bytes between `start` and the end of the
    /// source; reads never go past it. The header lines are written as soon
    /// as the header is decoded, the decompressed size once the member ends.
    ///
    /// Chunks are read until the whole header is decoded, however long it
    /// is. The member ends when the engine reads its trailer or when the
    /// source runs out after the header, whichever comes first.
    ///
    /// # Errors
    ///
    /// * [`GzError::EngineInit`] for unusable [`ScanOptions`]
    /// * [`GzError::Read`] / [`GzError::EmptyRead`] when the first read fails
    ///   or returns nothing
    /// * [`GzError::Format`] for anything the engine rejects, including a
    ///   source that ends inside the header
    pub fn extract<W: Write>(
        &self,
        start: u64,
        budget: u64,
        index: usize,
        out: &mut W,
    ) -> Result<Member, GzError> {
        let chunk_size = self.options.chunk_size;
        if chunk_size == 0 {
            return Err(GzError::EngineInit("chunk size must be non-zero"));
        }
        let out_size = chunk_size
            .checked_mul(OUTBUF_MULT)
            .ok_or(GzError::EngineInit("chunk size too large"))?;

        let mut engine = GzInflater::new(self.options.name_max);
        let mut input = vec![0u8; chunk_size];
        let mut output = vec![0u8; out_size];
        let mut read_total = 0u64;

        let mut filled = self.read_chunk(start, budget, &mut read_total, &mut input)?;
        if filled == 0 {
            return Err(GzError::EmptyRead { offset: start });
        }

        // Header only; no payload is decoded yet. A header may span chunks.
        let mut pos = 0;
        loop {
            let head = engine.inflate(&input[pos..filled], &mut output, InflateFlush::Block)?;
            pos += head.consumed;
            if !engine.is_header_pending() {
                break;
            }

            filled = self.read_chunk(start, budget, &mut read_total, &mut input)?;
            if filled == 0 {
                return Err(GzError::format(Z_BUF_ERROR, "unexpected end of file"));
            }
            pos = 0;
        }
        let header_len = engine.total_in();
        self.write_header(out, index, engine.header())?;

        loop {
            let progress = engine.inflate(&input[pos..filled], &mut output, InflateFlush::None)?;
            pos += progress.consumed;

            if progress.status == InflateStatus::StreamEnd {
                break;
            }
            // Output full: drain before feeding more input
            if progress.produced == output.len() || pos < filled {
                continue;
            }

            filled = self.read_chunk(start, budget, &mut read_total, &mut input)?;
            if filled == 0 {
                break;
            }
            pos = 0;
        }

        writeln!(out, "Decompressed size of member is: {}", engine.total_out())?;

        let consumed = engine.total_in();
        debug_assert!(consumed <= read_total && read_total <= budget);

        Ok(Member {
            index,
            start,
            end: start + consumed,
            header: engine.header().clone(),
            header_len,
            decompressed_size: engine.total_out(),
            trailer: engine.trailer(),
        })
    }

    fn write_header<W: Write>(
        &self,
        out: &mut W,
        index: usize,
        header: &GzHeader,
    ) -> io::Result<()> {
        writeln!(out, "GZHeader for member {} of file {}", index, self.source_name)?;
        writeln!(
            out,
            "GZHeader Time Field is: {} ({})",
            header.mtime,
            header.mtime_local()
        )?;
        match &header.file_name {
            Some(name) => writeln!(out, "GZHeader Name Field is: {name}")?,
            None => writeln!(out, "GZHeader Name Field is: (absent)")?,
        }
        writeln!(
            out,
            "GZHeader Done Field is: {} (Header is {}.)",
            header.status.code(),
            header.status.label()
        )
    }

    /// Read the next chunk of the member, staying within `budget`.
    fn read_chunk(
        &self,
        start: u64,
        budget: u64,
        read_total: &mut u64,
        buf: &mut [u8],
    ) -> Result<usize, GzError> {
        let remaining = budget - *read_total;
        let want = buf
            .len()
            .min(usize::try_from(remaining).unwrap_or(usize::MAX));
        if want == 0 {
            return Ok(0);
        }

        let offset = start + *read_total;
        let n = loop {
            match self.reader.read_at(offset, &mut buf[..want]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => return Err(GzError::Read { offset, source }),
            }
        };
        *read_total += n as u64;
        Ok(n)
    }
}
