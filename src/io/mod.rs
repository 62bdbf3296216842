//! Sequential/random-access byte streams used by every on-disk codec in
//! this crate, plus the variable-length integer encodings they share.
//!
//! Mirrors the base crate's `SegmentWriter`/`SegmentReader` pair
//! (`storage/segment_writer.rs`, `storage/segment_reader.rs`), generalized
//! from "one segment's own file" to a reusable input/output abstraction so
//! the packed-int, bit-vector, and stored-fields codecs can all frame
//! their bytes the same way. The vint scheme is the base crate's
//! `compression::vbyte::VByteEncoder` continuation-bit encoding,
//! extended to 64-bit values.

mod byte_buffer;
mod file;

pub use byte_buffer::{ByteArrayDataInput, ByteArrayDataOutput};
pub use file::{FileDataInput, FileDataOutput};

use crate::core::error::{Error, ErrorKind, Result};

/// Sequential byte sink with the fixed-width and variable-length integer
/// encodings every codec in this crate frames its output with.
pub trait DataOutput {
    fn write_byte(&mut self, b: u8) -> Result<()>;

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        for &b in bytes {
            self.write_byte(b)?;
        }
        Ok(())
    }

    fn write_u16(&mut self, v: u16) -> Result<()> {
        self.write_bytes(&v.to_be_bytes())
    }

    fn write_i32(&mut self, v: i32) -> Result<()> {
        self.write_bytes(&v.to_be_bytes())
    }

    fn write_u32(&mut self, v: u32) -> Result<()> {
        self.write_bytes(&v.to_be_bytes())
    }

    fn write_i64(&mut self, v: i64) -> Result<()> {
        self.write_bytes(&v.to_be_bytes())
    }

    fn write_u64(&mut self, v: u64) -> Result<()> {
        self.write_bytes(&v.to_be_bytes())
    }

    fn write_f32(&mut self, v: f32) -> Result<()> {
        self.write_u32(v.to_bits())
    }

    fn write_f64(&mut self, v: f64) -> Result<()> {
        self.write_u64(v.to_bits())
    }

    /// Continuation-bit variable length encoding: 7 payload bits per byte,
    /// high bit set on every byte but the last. At most 5 bytes for a u32.
    fn write_vint32(&mut self, mut value: u32) -> Result<()> {
        while value >= 0x80 {
            self.write_byte((value & 0x7f) as u8 | 0x80)?;
            value >>= 7;
        }
        self.write_byte(value as u8)
    }

    /// Same scheme extended to u64, at most 10 bytes.
    fn write_vint64(&mut self, mut value: u64) -> Result<()> {
        while value >= 0x80 {
            self.write_byte((value & 0x7f) as u8 | 0x80)?;
            value >>= 7;
        }
        self.write_byte(value as u8)
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        let bytes = s.as_bytes();
        self.write_vint32(bytes.len() as u32)?;
        self.write_bytes(bytes)
    }
}

/// Sequential byte source, the read-side counterpart of [`DataOutput`].
pub trait DataInput {
    fn read_byte(&mut self) -> Result<u8>;

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_into(&mut buf)?;
        Ok(buf)
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        for slot in buf.iter_mut() {
            *slot = self.read_byte()?;
        }
        Ok(())
    }

    fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_into(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn read_i32(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_into(&mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_into(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    fn read_i64(&mut self) -> Result<i64> {
        let mut buf = [0u8; 8];
        self.read_into(&mut buf)?;
        Ok(i64::from_be_bytes(buf))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_into(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    fn read_vint32(&mut self) -> Result<u32> {
        let mut value: u32 = 0;
        let mut shift = 0u32;
        loop {
            let b = self.read_byte()?;
            value |= ((b & 0x7f) as u32) << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 28 {
                return Err(Error::new(ErrorKind::Corrupt, "vint32 overflow".to_string()));
            }
        }
    }

    fn read_vint64(&mut self) -> Result<u64> {
        let mut value: u64 = 0;
        let mut shift = 0u32;
        loop {
            let b = self.read_byte()?;
            value |= ((b & 0x7f) as u64) << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 63 {
                return Err(Error::new(ErrorKind::Corrupt, "vint64 overflow".to_string()));
            }
        }
    }

    fn read_string(&mut self) -> Result<String> {
        let len = self.read_vint32()? as usize;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes)
            .map_err(|e| Error::new(ErrorKind::Corrupt, format!("invalid utf8: {e}")))
    }

    fn skip_bytes(&mut self, count: u64) -> Result<()> {
        for _ in 0..count {
            self.read_byte()?;
        }
        Ok(())
    }
}

/// A [`DataInput`] that additionally supports seeking, used for the random
/// access `fdx`/`fdt` document lookups need.
pub trait RandomAccessInput: DataInput {
    fn seek(&mut self, pos: u64) -> Result<()>;
    fn position(&mut self) -> Result<u64>;
    fn len(&self) -> u64;
}

/// A [`DataOutput`] that tracks the number of bytes written so far, used to
/// record `fdx` offsets while writing `fdt`.
pub trait TrackingOutput: DataOutput {
    fn position(&self) -> u64;
}

impl<T: DataOutput + ?Sized> DataOutput for &mut T {
    fn write_byte(&mut self, b: u8) -> Result<()> {
        (**self).write_byte(b)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(bytes)
    }
}

impl<T: DataInput + ?Sized> DataInput for &mut T {
    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_into(buf)
    }
}
