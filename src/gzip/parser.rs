//! Gzip member decoding engine.
//!
//! [`GzInflater`] wraps `flate2`'s raw DEFLATE [`Decompress`] in the RFC 1952
//! envelope: it decodes the member header, inflates the payload and checks
//! the trailer. Input may arrive in arbitrarily small chunks; a header split
//! across chunks is buffered until it can be decoded.
//!
//! ## Member Layout
//!
//! ```text
//! +---+---+---+---+---+---+---+---+---+---+
//! |ID1|ID2|CM |FLG|     MTIME     |XFL|OS |
//! +---+---+---+---+---+---+---+---+---+---+
//! [XLEN + extra] [name\0] [comment\0] [CRC16]
//! compressed blocks...
//! CRC32 (4) + ISIZE (4)
//! ```
//!
//! Only the gzip envelope is accepted. Raw DEFLATE and zlib streams fail the
//! magic check on their first bytes.

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use flate2::{Crc, Decompress, FlushDecompress, Status};
use std::io::{self, BufRead, Cursor};

use super::error::{GzError, Z_BUF_ERROR, Z_DATA_ERROR};
use super::structures::*;

/// How far a single [`GzInflater::inflate`] call may go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InflateFlush {
    /// Return as soon as the header has been decoded, before any payload.
    Block,
    /// Decode as much as input and output space allow.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InflateStatus {
    /// More input (or output space) is needed to finish the member
    Ok,
    /// The member's trailer has been read and verified
    StreamEnd,
}

/// Result of one [`GzInflater::inflate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub status: InflateStatus,
    /// Input bytes consumed by this call
    pub consumed: usize,
    /// Output bytes written by this call
    pub produced: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Header,
    Body,
    Trailer,
    Done,
}

/// Incremental decoder for a single gzip member.
pub struct GzInflater {
    phase: Phase,
    /// Maximum number of file name bytes kept
    name_max: usize,
    /// Header or trailer bytes seen so far but not yet decodable
    pending: Vec<u8>,
    header: GzHeader,
    trailer: Option<Trailer>,
    deflate: Decompress,
    crc: Crc,
    total_in: u64,
}

impl GzInflater {
    /// Create an engine that only accepts gzip members.
    ///
    /// File names longer than `name_max` bytes are truncated; comments and
    /// extra fields are skipped without being stored.
    pub fn new(name_max: usize) -> Self {
        Self {
            phase: Phase::Header,
            name_max,
            pending: Vec::new(),
            header: GzHeader::default(),
            trailer: None,
            deflate: Decompress::new(false),
            crc: Crc::new(),
            total_in: 0,
        }
    }

    pub fn header(&self) -> &GzHeader {
        &self.header
    }

    pub fn trailer(&self) -> Option<Trailer> {
        self.trailer
    }

    /// Raw bytes consumed across all calls, header and trailer included
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Decompressed bytes produced across all calls
    pub fn total_out(&self) -> u64 {
        self.deflate.total_out()
    }

    pub fn is_header_pending(&self) -> bool {
        self.phase == Phase::Header
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Feed `input` to the engine, writing decompressed data to `output`.
    ///
    /// The call returns when the input is exhausted, the output is full, the
    /// member ends, or (with [`InflateFlush::Block`]) the header is decoded.
    /// Bytes past the end of the member are never consumed.
    pub fn inflate(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: InflateFlush,
    ) -> Result<Progress, GzError> {
        let mut progress = Progress {
            status: InflateStatus::Ok,
            consumed: 0,
            produced: 0,
        };
        let result = self.run(input, output, flush, &mut progress);
        self.total_in += progress.consumed as u64;
        result.map(|()| progress)
    }

    fn run(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: InflateFlush,
        p: &mut Progress,
    ) -> Result<(), GzError> {
        loop {
            match self.phase {
                Phase::Header => {
                    let rest = &input[p.consumed..];
                    if rest.is_empty() {
                        return Ok(());
                    }

                    let buffered = self.pending.len();
                    self.pending.extend_from_slice(rest);

                    match parse_header(&self.pending, self.name_max)? {
                        Some((len, header)) => {
                            // `buffered` bytes were already counted by earlier calls
                            p.consumed += len - buffered;
                            self.pending.clear();
                            self.header = header;
                            self.phase = Phase::Body;
                            if flush == InflateFlush::Block {
                                return Ok(());
                            }
                        }
                        None => {
                            p.consumed = input.len();
                            return Ok(());
                        }
                    }
                }
                Phase::Body => {
                    let before_in = self.deflate.total_in();
                    let before_out = self.deflate.total_out();

                    let status = self
                        .deflate
                        .decompress(
                            &input[p.consumed..],
                            &mut output[p.produced..],
                            FlushDecompress::None,
                        )
                        .map_err(|e| GzError::format(Z_DATA_ERROR, e.to_string()))?;

                    let used_in = (self.deflate.total_in() - before_in) as usize;
                    let used_out = (self.deflate.total_out() - before_out) as usize;
                    self.crc.update(&output[p.produced..p.produced + used_out]);
                    p.consumed += used_in;
                    p.produced += used_out;

                    match status {
                        Status::StreamEnd => self.phase = Phase::Trailer,
                        Status::Ok | Status::BufError => {
                            if p.consumed == input.len() || p.produced == output.len() {
                                return Ok(());
                            }
                            if used_in == 0 && used_out == 0 {
                                return Err(GzError::format(Z_BUF_ERROR, "inflate stalled"));
                            }
                        }
                    }
                }
                Phase::Trailer => {
                    let take = (TRAILER_SIZE - self.pending.len()).min(input.len() - p.consumed);
                    self.pending.extend_from_slice(&input[p.consumed..p.consumed + take]);
                    p.consumed += take;

                    if self.pending.len() < TRAILER_SIZE {
                        return Ok(());
                    }

                    let trailer = Trailer {
                        crc32: LittleEndian::read_u32(&self.pending[0..4]),
                        isize: LittleEndian::read_u32(&self.pending[4..8]),
                    };
                    self.pending.clear();

                    if trailer.crc32 != self.crc.sum() {
                        return Err(GzError::format(Z_DATA_ERROR, "incorrect data check"));
                    }
                    if trailer.isize != self.crc.amount() {
                        return Err(GzError::format(Z_DATA_ERROR, "incorrect length check"));
                    }

                    self.trailer = Some(trailer);
                    self.phase = Phase::Done;
                }
                Phase::Done => {
                    p.status = InflateStatus::StreamEnd;
                    return Ok(());
                }
            }
        }
    }
}

/// Decode a member header from the start of `buf`.
///
/// Returns the header and its length in bytes, or `None` when `buf` ends
/// before the header does.
///
/// # Errors
///
/// Fails as soon as the available bytes show the input is not a gzip
/// member: bad magic, unknown compression method or reserved flag bits.
pub fn parse_header(buf: &[u8], name_max: usize) -> Result<Option<(usize, GzHeader)>, GzError> {
    check_prefix(buf)?;

    let mut cursor = Cursor::new(buf);
    match read_header(&mut cursor, name_max) {
        Ok(header) => Ok(Some((cursor.position() as usize, header))),
        // A cursor over a slice only fails on a short read
        Err(_) => Ok(None),
    }
}

/// Validate whichever of the first four bytes are present.
fn check_prefix(buf: &[u8]) -> Result<(), GzError> {
    if buf.iter().zip(GZIP_MAGIC.iter()).any(|(a, b)| a != b) {
        return Err(GzError::format(Z_DATA_ERROR, "incorrect header check"));
    }
    if let Some(&cm) = buf.get(2)
        && cm != CM_DEFLATE
    {
        return Err(GzError::format(Z_DATA_ERROR, "unknown compression method"));
    }
    if let Some(&flags) = buf.get(3)
        && flags & FRESERVED != 0
    {
        return Err(GzError::format(Z_DATA_ERROR, "unknown header flags set"));
    }
    Ok(())
}

fn read_header(cursor: &mut Cursor<&[u8]>, name_max: usize) -> io::Result<GzHeader> {
    // ID1, ID2 and CM were checked by `check_prefix`
    cursor.set_position(3);
    let flags = cursor.read_u8()?;
    let mtime = cursor.read_u32::<LittleEndian>()?;
    let extra_flags = cursor.read_u8()?;
    let os = Os::from_u8(cursor.read_u8()?);

    let extra_len = if flags & FEXTRA != 0 {
        let xlen = cursor.read_u16::<LittleEndian>()?;
        skip(cursor, u64::from(xlen))?;
        Some(xlen)
    } else {
        None
    };

    let file_name = if flags & FNAME != 0 {
        let raw = read_zero_terminated(cursor)?;
        let kept = &raw[..raw.len().min(name_max)];
        Some(String::from_utf8_lossy(kept).into_owned())
    } else {
        None
    };

    let has_comment = flags & FCOMMENT != 0;
    if has_comment {
        read_zero_terminated(cursor)?;
    }

    // CRC16 of the header; skipped, not verified
    let has_header_crc = flags & FHCRC != 0;
    if has_header_crc {
        skip(cursor, 2)?;
    }

    Ok(GzHeader {
        status: HeaderStatus::Complete,
        mtime,
        file_name,
        flags,
        extra_flags,
        os,
        extra_len,
        has_comment,
        has_header_crc,
    })
}

fn skip(cursor: &mut Cursor<&[u8]>, n: u64) -> io::Result<()> {
    let end = cursor.position() + n;
    if end > cursor.get_ref().len() as u64 {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    cursor.set_position(end);
    Ok(())
}

fn read_zero_terminated(cursor: &mut Cursor<&[u8]>) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    cursor.read_until(0, &mut bytes)?;
    if bytes.pop() != Some(0) {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gzip::ErrorKind;
    use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};
    use flate2::{Compression, GzBuilder};
    use std::io::Write;

    fn gzip_member(name: Option<&str>, mtime: u32, payload: &[u8]) -> Vec<u8> {
        let mut builder = GzBuilder::new().mtime(mtime);
        if let Some(name) = name {
            builder = builder.filename(name);
        }
        let mut encoder = builder.write(Vec::new(), Compression::default());
        encoder.write_all(payload).unwrap();
        encoder.finish().unwrap()
    }

    /// Member with every optional header field present.
    fn full_header_member(payload: &[u8]) -> (Vec<u8>, usize) {
        let mut data = vec![0x1f, 0x8b, CM_DEFLATE, FTEXT | FHCRC | FEXTRA | FNAME | FCOMMENT];
        data.extend_from_slice(&1000u32.to_le_bytes());
        data.extend_from_slice(&[2, 3]);
        data.extend_from_slice(&3u16.to_le_bytes());
        data.extend_from_slice(b"abc");
        data.extend_from_slice(b"notes.txt\0");
        data.extend_from_slice(b"a comment\0");
        data.extend_from_slice(&[0xaa, 0xbb]);
        let header_len = data.len();

        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(payload).unwrap();
        data.extend_from_slice(&encoder.finish().unwrap());

        let mut crc = Crc::new();
        crc.update(payload);
        data.extend_from_slice(&crc.sum().to_le_bytes());
        data.extend_from_slice(&crc.amount().to_le_bytes());
        (data, header_len)
    }

    fn format_error(result: Result<Option<(usize, GzHeader)>, GzError>) -> (i32, String) {
        match result {
            Err(GzError::Format { code, msg }) => (code, msg),
            other => panic!("expected a format error, got {other:?}"),
        }
    }

    #[test]
    fn parses_name_and_mtime() {
        let data = gzip_member(Some("example.txt"), 1420070400, b"hello");
        let (len, header) = parse_header(&data, 511).unwrap().unwrap();

        assert_eq!(len, HEADER_SIZE + "example.txt".len() + 1);
        assert_eq!(header.status, HeaderStatus::Complete);
        assert_eq!(header.mtime, 1420070400);
        assert_eq!(header.file_name.as_deref(), Some("example.txt"));
        assert_eq!(header.extra_len, None);
        assert!(!header.has_comment);
    }

    #[test]
    fn missing_name_flag_leaves_name_absent() {
        let data = gzip_member(None, 0, b"hello");
        let (len, header) = parse_header(&data, 511).unwrap().unwrap();

        assert_eq!(len, HEADER_SIZE);
        assert_eq!(header.file_name, None);
        assert_eq!(header.mtime, 0);
    }

    #[test]
    fn skips_extra_comment_and_header_crc() {
        let (data, header_len) = full_header_member(b"payload");
        let (len, header) = parse_header(&data, 511).unwrap().unwrap();

        assert_eq!(len, header_len);
        assert_eq!(header.extra_len, Some(3));
        assert_eq!(header.file_name.as_deref(), Some("notes.txt"));
        assert!(header.has_comment);
        assert!(header.has_header_crc);
        assert_eq!(header.flags & FTEXT, FTEXT);
        assert_eq!(header.extra_flags, 2);
        assert_eq!(header.os, Os::Unix);
    }

    #[test]
    fn every_header_prefix_is_incomplete() {
        let (data, header_len) = full_header_member(b"payload");
        for end in 0..header_len {
            assert!(
                parse_header(&data[..end], 511).unwrap().is_none(),
                "prefix of {end} bytes decoded"
            );
        }
    }

    #[test]
    fn truncates_long_names() {
        let data = gzip_member(Some("abcdefgh"), 0, b"");
        let (len, header) = parse_header(&data, 3).unwrap().unwrap();

        assert_eq!(header.file_name.as_deref(), Some("abc"));
        assert_eq!(len, HEADER_SIZE + 9);
    }

    #[test]
    fn rejects_non_gzip_prefixes() {
        assert_eq!(
            format_error(parse_header(b"\x1f", 511)),
            (Z_DATA_ERROR, String::from("incorrect header check"))
        );
        assert_eq!(format_error(parse_header(b"\x00", 511)).0, Z_DATA_ERROR);
        assert_eq!(
            format_error(parse_header(b"\x1f\x8b\x07", 511)).1,
            "unknown compression method"
        );
        assert_eq!(
            format_error(parse_header(b"\x1f\x8b\x08\x20", 511)).1,
            "unknown header flags set"
        );
    }

    #[test]
    fn rejects_zlib_streams() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"not gzip").unwrap();
        let data = encoder.finish().unwrap();

        let mut engine = GzInflater::new(511);
        let mut out = [0u8; 64];
        let err = engine
            .inflate(&data, &mut out, InflateFlush::Block)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn block_flush_stops_after_header() {
        let payload = b"hello hello hello hello";
        let mut data = gzip_member(Some("a.txt"), 1000, payload);
        let member_len = data.len();
        data.extend_from_slice(b"trailing bytes");

        let mut engine = GzInflater::new(511);
        let mut out = vec![0u8; 256];

        let first = engine
            .inflate(&data, &mut out, InflateFlush::Block)
            .unwrap();
        assert_eq!(first.status, InflateStatus::Ok);
        assert_eq!(first.consumed, HEADER_SIZE + 6);
        assert_eq!(first.produced, 0);
        assert_eq!(engine.header().file_name.as_deref(), Some("a.txt"));

        let rest = engine
            .inflate(&data[first.consumed..], &mut out, InflateFlush::None)
            .unwrap();
        assert_eq!(rest.status, InflateStatus::StreamEnd);
        assert_eq!(&out[..rest.produced], payload);
        assert_eq!(engine.total_in(), member_len as u64);
        assert_eq!(engine.total_out(), payload.len() as u64);
        assert_eq!(
            engine.trailer().map(|t| t.isize),
            Some(payload.len() as u32)
        );
    }

    #[test]
    fn decodes_one_byte_at_a_time() {
        let payload: Vec<u8> = (0..4000u32).map(|i| (i % 251) as u8).collect();
        let (data, header_len) = full_header_member(&payload);

        let mut engine = GzInflater::new(511);
        let mut out = [0u8; 7];
        let mut produced = 0;
        let mut pos = 0;

        loop {
            let end = (pos + 1).min(data.len());
            let p = engine
                .inflate(&data[pos..end], &mut out, InflateFlush::None)
                .unwrap();
            pos += p.consumed;
            produced += p.produced;
            if p.status == InflateStatus::StreamEnd {
                break;
            }
            if pos == header_len {
                assert!(!engine.is_header_pending());
            }
        }

        assert!(engine.is_done());
        assert_eq!(pos, data.len());
        assert_eq!(produced, payload.len());
        assert_eq!(engine.total_in(), data.len() as u64);
        assert_eq!(engine.header().file_name.as_deref(), Some("notes.txt"));
    }

    #[test]
    fn corrupt_crc_is_a_data_error() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"some text").unwrap();
        let mut data = encoder.finish().unwrap();
        let crc_at = data.len() - TRAILER_SIZE;
        data[crc_at] ^= 0xff;

        let mut engine = GzInflater::new(511);
        let mut out = [0u8; 64];
        match engine.inflate(&data, &mut out, InflateFlush::None) {
            Err(GzError::Format { code, msg }) => {
                assert_eq!(code, Z_DATA_ERROR);
                assert_eq!(msg, "incorrect data check");
            }
            other => panic!("expected a data error, got {other:?}"),
        }
    }
}
