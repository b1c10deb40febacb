//! Walks a source member by member.

use std::io::Write;

use crate::io::ReadAt;

use super::error::GzError;
use super::extractor::{HeaderExtractor, ScanOptions};
use super::structures::Member;

const DELIMITER: &str = "----------------";

/// Drives a [`HeaderExtractor`] over every member of a source.
pub struct MemberLocator<'a, R: ReadAt + ?Sized> {
    reader: &'a R,
    source_name: &'a str,
    options: ScanOptions,
    size: u64,
}

impl<'a, R: ReadAt + ?Sized> MemberLocator<'a, R> {
    /// `source_name` is only used in the report.
    pub fn new(reader: &'a R, source_name: &'a str) -> Self {
        Self {
            reader,
            source_name,
            options: ScanOptions::default(),
            size: reader.size(),
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Report every member to `out` and return them in file order.
    ///
    /// Each member starts where the previous one ended; scanning stops once
    /// the position reaches the size of the source. An empty source has no
    /// members.
    pub fn scan<W: Write>(&self, out: &mut W) -> Result<Vec<Member>, GzError> {
        let extractor = HeaderExtractor::new(self.reader, self.source_name, self.options);
        let mut members = Vec::new();
        let mut position = 0u64;
        let mut index = 1usize;

        while position < self.size {
            writeln!(out, "{DELIMITER}")?;
            writeln!(
                out,
                "Byte position (0-based) of beginning of member {index} is {position}."
            )?;

            let member = extractor.extract(position, self.size - position, index, out)?;
            debug_assert!(member.end > position && member.end <= self.size);
            position = member.end;

            writeln!(
                out,
                "Byte position (0-based) of end of member {} is {}.",
                index,
                member.last_byte()
            )?;
            writeln!(out, "{DELIMITER}")?;

            members.push(member);
            index += 1;
        }

        Ok(members)
    }
}
