use std::fs::File;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::errors::SparsifyError;

/// One coordinate-list triple of the sparse symmetric distance matrix.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct SparseEntry {
    pub x: u64,
    pub y: u64,
    pub distance: f64,
}

/// Append-only sink for sparse entries.
///
/// The header row is written up front so that empty and single-observation
/// inputs still produce a well-formed (header-only) output file. Entries for
/// one observation are flushed before the next is consumed, which keeps
/// buffering bounded by window size rather than input size.
pub struct SparseWriter<W: io::Write> {
    writer: csv::Writer<W>,
    entries_written: u64,
}

impl SparseWriter<File> {
    pub fn from_path(path: impl AsRef<Path>) -> Result<SparseWriter<File>, SparsifyError> {
        let file = File::create(path)?;
        SparseWriter::from_writer(file)
    }
}

impl<W: io::Write> SparseWriter<W> {
    pub fn from_writer(writer: W) -> Result<SparseWriter<W>, SparsifyError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        writer.write_record(["x", "y", "distance"])?;
        Ok(SparseWriter {
            writer,
            entries_written: 0,
        })
    }

    /// Writes both directions of one qualifying pair.
    pub fn emit_symmetric(
        &mut self,
        x: u64,
        y: u64,
        distance: f64,
    ) -> Result<(), SparsifyError> {
        self.writer.serialize(SparseEntry { x, y, distance })?;
        self.writer.serialize(SparseEntry {
            x: y,
            y: x,
            distance,
        })?;
        self.entries_written += 2;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), SparsifyError> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn entries_written(&self) -> u64 {
        self.entries_written
    }

    pub fn into_inner(self) -> Result<W, SparsifyError> {
        self.writer
            .into_inner()
            .map_err(|e| SparsifyError::Io(e.into_error()))
    }
}
