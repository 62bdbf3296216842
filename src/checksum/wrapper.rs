use crate::checksum::Crc32;
use crate::core::error::Result;
use crate::io::{DataInput, DataOutput, TrackingOutput};

/// Wraps any [`DataOutput`], hashing every byte written through it so the
/// caller can finish with a footer checksum without a second pass over the
/// buffer (`SegmentWriter::flush` in the base crate hashes the same
/// buffer it is about to write for the same reason).
pub struct ChecksumDataOutput<O> {
    inner: O,
    hasher: Crc32,
    position: u64,
}

impl<O: DataOutput> ChecksumDataOutput<O> {
    pub fn new(inner: O) -> Self {
        ChecksumDataOutput {
            inner,
            hasher: Crc32::new(),
            position: 0,
        }
    }

    pub fn checksum(self) -> u32 {
        self.hasher.finalize()
    }

    pub fn into_inner(self) -> O {
        self.inner
    }

    /// Consumes the wrapper, returning both the finalized checksum and the
    /// wrapped output so the caller can keep writing (e.g. a footer) to it.
    pub fn finish(self) -> (O, u32) {
        (self.inner, self.hasher.finalize())
    }

    pub fn position(&self) -> u64 {
        self.position
    }
}

impl<O: DataOutput> DataOutput for ChecksumDataOutput<O> {
    fn write_byte(&mut self, b: u8) -> Result<()> {
        self.hasher.update(&[b]);
        self.position += 1;
        self.inner.write_byte(b)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.hasher.update(bytes);
        self.position += bytes.len() as u64;
        self.inner.write_bytes(bytes)
    }
}

impl<O: TrackingOutput> TrackingOutput for ChecksumDataOutput<O> {
    fn position(&self) -> u64 {
        self.inner.position()
    }
}

/// Read-side counterpart of [`ChecksumDataOutput`]: hashes every byte read
/// so the final `check_footer` call can compare against it.
pub struct ChecksumDataInput<I> {
    inner: I,
    hasher: Crc32,
}

impl<I: DataInput> ChecksumDataInput<I> {
    pub fn new(inner: I) -> Self {
        ChecksumDataInput {
            inner,
            hasher: Crc32::new(),
        }
    }

    pub fn checksum(&self) -> u32 {
        self.hasher.snapshot()
    }

    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: DataInput> DataInput for ChecksumDataInput<I> {
    fn read_byte(&mut self) -> Result<u8> {
        let b = self.inner.read_byte()?;
        self.hasher.update(&[b]);
        Ok(b)
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_into(buf)?;
        self.hasher.update(buf);
        Ok(())
    }
}
