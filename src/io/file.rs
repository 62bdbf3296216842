use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};

use crate::core::error::Result;
use crate::io::{DataInput, DataOutput, RandomAccessInput, TrackingOutput};

/// Buffered sequential writer over a single OS file handle, claimed
/// exclusively for the lifetime of the segment file being written
/// (`storage::segment_writer::SegmentWriter` follows the same ownership
/// rule for the raw `fdt`/`fdx` files).
pub struct FileDataOutput {
    writer: BufWriter<File>,
    position: u64,
}

impl FileDataOutput {
    pub fn new(file: File) -> Self {
        FileDataOutput {
            writer: BufWriter::new(file),
            position: 0,
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn sync_all(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(())
    }
}

impl DataOutput for FileDataOutput {
    fn write_byte(&mut self, b: u8) -> Result<()> {
        self.writer.write_all(&[b])?;
        self.position += 1;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }
}

impl TrackingOutput for FileDataOutput {
    fn position(&self) -> u64 {
        self.position
    }
}

/// Buffered random-access reader over a single OS file handle. Cloning a
/// stored-fields reader slice means opening a fresh handle that shares the
/// same underlying file but owns its own cursor, matching the "clone
/// shares the file, not the cursor" rule in the concurrency model.
pub struct FileDataInput {
    reader: BufReader<File>,
    position: u64,
    len: u64,
}

impl FileDataInput {
    pub fn new(file: File) -> Result<Self> {
        let len = file.metadata()?.len();
        Ok(FileDataInput {
            reader: BufReader::new(file),
            position: 0,
            len,
        })
    }
}

impl DataInput for FileDataInput {
    fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.reader.read_exact(&mut buf)?;
        self.position += 1;
        Ok(buf[0])
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        self.reader.read_exact(buf)?;
        self.position += buf.len() as u64;
        Ok(())
    }
}

impl RandomAccessInput for FileDataInput {
    fn seek(&mut self, pos: u64) -> Result<()> {
        self.reader.seek(SeekFrom::Start(pos))?;
        self.position = pos;
        Ok(())
    }

    fn position(&mut self) -> Result<u64> {
        Ok(self.position)
    }

    fn len(&self) -> u64 {
        self.len
    }
}
