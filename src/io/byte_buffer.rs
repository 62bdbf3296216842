use crate::core::error::{Error, ErrorKind, Result};
use crate::io::{DataInput, DataOutput, RandomAccessInput, TrackingOutput};

/// In-memory growable output, the in-RAM counterpart of [`FileDataOutput`](super::FileDataOutput).
#[derive(Debug, Default, Clone)]
pub struct ByteArrayDataOutput {
    buf: Vec<u8>,
}

impl ByteArrayDataOutput {
    pub fn new() -> Self {
        ByteArrayDataOutput { buf: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        ByteArrayDataOutput {
            buf: Vec::with_capacity(cap),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

impl DataOutput for ByteArrayDataOutput {
    fn write_byte(&mut self, b: u8) -> Result<()> {
        self.buf.push(b);
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }
}

impl TrackingOutput for ByteArrayDataOutput {
    fn position(&self) -> u64 {
        self.buf.len() as u64
    }
}

/// Cursor over an in-memory byte slice.
#[derive(Debug, Clone)]
pub struct ByteArrayDataInput<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteArrayDataInput<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteArrayDataInput { data, pos: 0 }
    }
}

impl<'a> DataInput for ByteArrayDataInput<'a> {
    fn read_byte(&mut self) -> Result<u8> {
        if self.pos >= self.data.len() {
            return Err(Error::new(
                ErrorKind::UnexpectedEof,
                "read past end of byte buffer".to_string(),
            ));
        }
        let b = self.data[self.pos];
        self.pos += 1;
        Ok(b)
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        let end = self.pos + buf.len();
        if end > self.data.len() {
            return Err(Error::new(
                ErrorKind::UnexpectedEof,
                "read past end of byte buffer".to_string(),
            ));
        }
        buf.copy_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(())
    }
}

impl<'a> RandomAccessInput for ByteArrayDataInput<'a> {
    fn seek(&mut self, pos: u64) -> Result<()> {
        if pos > self.data.len() as u64 {
            return Err(Error::index_out_of_range(pos, self.data.len()));
        }
        self.pos = pos as usize;
        Ok(())
    }

    fn position(&mut self) -> Result<u64> {
        Ok(self.pos as u64)
    }

    fn len(&self) -> u64 {
        self.data.len() as u64
    }
}
