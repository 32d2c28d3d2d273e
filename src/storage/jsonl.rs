use crate::extract::ListingRecord;
use crate::storage::traits::{ListingSink, StorageResult};
use std::io::Write;

/// Writes one JSON object per line to any writer
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of records written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ListingSink for JsonLinesSink<W> {
    fn accept(&mut self, record: &ListingRecord) -> StorageResult<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Forwards each record to several sinks
///
/// Every sink sees every record even if an earlier one fails; the first
/// failure is returned.
pub struct SinkSet<'a> {
    sinks: Vec<&'a mut dyn ListingSink>,
}

impl<'a> SinkSet<'a> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with(mut self, sink: &'a mut dyn ListingSink) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Default for SinkSet<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingSink for SinkSet<'_> {
    fn accept(&mut self, record: &ListingRecord) -> StorageResult<()> {
        let mut first_error = None;
        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.accept(record) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn flush(&mut self) -> StorageResult<()> {
        let mut first_error = None;
        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.flush() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
