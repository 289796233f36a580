//! Append-only record log.
//!
//! Implements [`PersistenceSink`] by postcard-encoding each [`Record`] and
//! writing it as one length-prefixed frame (see [`crate::codec`]).  The
//! writer is generic so the same adapter backs a file, stdout or a
//! `Vec<u8>` in tests.

use std::io::{Read, Write};

use log::{debug, warn};

use crate::app::ports::{PersistenceSink, Record};
use crate::codec::{FrameDecoder, encode_frame};
use crate::error::StorageError;

const READ_CHUNK: usize = 1024;

pub struct RecordLog<W: Write> {
    writer: W,
    /// Refuse writes past this many bytes (`None` = unbounded).
    limit: Option<u64>,
    written: u64,
    records: u64,
}

impl<W: Write> RecordLog<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            limit: None,
            written: 0,
            records: 0,
        }
    }

    /// Refuse records once `bytes` have been written.
    pub fn with_limit(mut self, bytes: u64) -> Self {
        self.limit = Some(bytes);
        self
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    pub fn records_written(&self) -> u64 {
        self.records
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PersistenceSink for RecordLog<W> {
    fn store(&mut self, record: &Record) -> Result<(), StorageError> {
        let payload = postcard::to_allocvec(record).map_err(|_| StorageError::Encoding)?;
        let mut frame = Vec::with_capacity(payload.len() + crate::codec::HEADER_SIZE);
        let len = encode_frame(&payload, &mut frame).ok_or(StorageError::Encoding)?;

        if let Some(limit) = self.limit {
            if self.written + len as u64 > limit {
                return Err(StorageError::Full);
            }
        }

        self.writer.write_all(&frame).map_err(|e| {
            warn!("RecordLog: write failed: {}", e);
            StorageError::Io
        })?;
        self.written += len as u64;
        self.records += 1;
        Ok(())
    }
}

/// Read every record from a log stream.  Frames that do not decode as a
/// [`Record`] are skipped.
pub fn read_records(mut reader: impl Read) -> Result<Vec<Record>, StorageError> {
    let mut decoder = FrameDecoder::new();
    let mut records = Vec::new();
    let mut skipped = 0usize;
    let mut buf = [0u8; READ_CHUNK];

    loop {
        let n = reader.read(&mut buf).map_err(|_| StorageError::Io)?;
        if n == 0 {
            break;
        }
        let mut chunk = &buf[..n];
        while !chunk.is_empty() {
            let (used, frame) = decoder.feed(chunk);
            if let Some(bytes) = frame {
                match postcard::from_bytes::<Record>(bytes) {
                    Ok(r) => records.push(r),
                    Err(_) => skipped += 1,
                }
            }
            chunk = &chunk[used..];
        }
    }

    if skipped > 0 || !decoder.is_idle() {
        debug!(
            "RecordLog: skipped {} undecodable frames, trailing partial={}",
            skipped,
            !decoder.is_idle()
        );
    }
    Ok(records)
}
