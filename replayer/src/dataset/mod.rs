//! Dataset Module - recorded package capture
//!
//! Reads the CSV capture row by row (header required, columns matched by
//! name) and decodes each row into the wire form sent to the ingest server.

pub mod record;

#[cfg(test)]
mod tests;

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub use record::{decode, DecodeError, RawRow, WirePackage};

/// Open a CSV capture on disk
pub fn open(path: &Path) -> io::Result<csv::Reader<File>> {
    Ok(reader(File::open(path)?))
}

/// Wrap any byte source as a CSV capture
pub fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

/// Lazily yield raw rows in file order. A row that cannot be read is
/// yielded as an error so the caller can skip it and carry on.
pub fn rows<R: Read>(reader: csv::Reader<R>) -> impl Iterator<Item = Result<RawRow, DecodeError>> {
    reader
        .into_deserialize::<RawRow>()
        .map(|row| row.map_err(DecodeError::from))
}
