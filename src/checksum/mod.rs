//! Checksum framing shared by every persisted artifact: a codec header
//! (magic, version, codec name) followed by the payload, followed by a
//! codec footer (magic, algorithm id, checksum). Generalizes the
//! `crc32fast::Hasher` the base crate already buffers updates into inside
//! `storage::segment_writer::SegmentWriter` (`self.hasher.update(&buffer)`)
//! into a reusable wrapper any codec's `DataOutput`/`DataInput` can sit
//! behind.

mod wrapper;

pub use wrapper::{ChecksumDataInput, ChecksumDataOutput};

use crate::core::error::{Error, ErrorKind, Result};
use crate::io::{DataInput, DataOutput};

pub const CODEC_HEADER_MAGIC: u32 = 0x3FD7_6C17;
pub const CODEC_FOOTER_MAGIC: u32 = 0xC028_93E8;

/// The only checksum algorithm this crate's codecs emit.
pub const CRC32_ALGO_ID: i32 = 0;

/// Thin wrapper over `crc32fast::Hasher` giving a stable `u32` digest over
/// buffered updates, mirroring the base crate's per-writer hasher.
#[derive(Default, Clone)]
pub struct Crc32 {
    hasher: crc32fast::Hasher,
}

impl Crc32 {
    pub fn new() -> Self {
        Crc32 {
            hasher: crc32fast::Hasher::new(),
        }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    pub fn finalize(self) -> u32 {
        self.hasher.finalize()
    }

    /// Checksum of everything seen so far, without consuming the hasher.
    pub fn snapshot(&self) -> u32 {
        self.hasher.clone().finalize()
    }
}

/// Write `magic || vint32 version || utf8Len codecName`.
pub fn write_header<O: DataOutput>(out: &mut O, codec_name: &str, version: u32) -> Result<()> {
    out.write_u32(CODEC_HEADER_MAGIC)?;
    out.write_vint32(version)?;
    out.write_string(codec_name)
}

/// Read and validate a codec header, returning the on-disk version.
/// `min_version..=max_version` bounds the versions this reader accepts;
/// anything outside is `Corrupt`, never a panic.
pub fn check_header<I: DataInput>(
    input: &mut I,
    expected_name: &str,
    min_version: u32,
    max_version: u32,
) -> Result<u32> {
    let magic = input.read_u32()?;
    if magic != CODEC_HEADER_MAGIC {
        return Err(Error::corrupt(format!(
            "bad codec header magic: {magic:#x}, expected {CODEC_HEADER_MAGIC:#x}"
        )));
    }
    let version = input.read_vint32()?;
    let actual_name = input.read_string()?;
    if actual_name != expected_name {
        return Err(Error::corrupt(format!(
            "codec name mismatch: expected {expected_name}, got {actual_name}"
        )));
    }
    if version < min_version || version > max_version {
        return Err(Error::corrupt(format!(
            "unsupported {expected_name} version {version}, expected [{min_version}, {max_version}]"
        )));
    }
    Ok(version)
}

/// Write `magic || i32 algoId || i64 checksum`.
pub fn write_footer<O: DataOutput>(out: &mut O, checksum: u32) -> Result<()> {
    out.write_u32(CODEC_FOOTER_MAGIC)?;
    out.write_i32(CRC32_ALGO_ID)?;
    out.write_i64(checksum as i64)
}

/// Read and verify a codec footer against a checksum computed over
/// everything read so far (typically from a [`ChecksumDataInput`]).
pub fn check_footer<I: DataInput>(input: &mut I, computed_checksum: u32) -> Result<()> {
    let magic = input.read_u32()?;
    if magic != CODEC_FOOTER_MAGIC {
        return Err(Error::corrupt(format!(
            "bad codec footer magic: {magic:#x}, expected {CODEC_FOOTER_MAGIC:#x}"
        )));
    }
    let algo_id = input.read_i32()?;
    if algo_id != CRC32_ALGO_ID {
        return Err(Error::corrupt(format!("unsupported checksum algorithm id {algo_id}")));
    }
    let expected = input.read_i64()? as u64 as u32;
    if expected != computed_checksum {
        return Err(Error::new(
            ErrorKind::ChecksumMismatch,
            format!("checksum mismatch: expected {expected:#x}, computed {computed_checksum:#x}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{ByteArrayDataInput, ByteArrayDataOutput};

    #[test]
    fn header_round_trips() {
        let mut out = ByteArrayDataOutput::new();
        write_header(&mut out, "TestCodec", 3).unwrap();
        let bytes = out.into_bytes();
        let mut input = ByteArrayDataInput::new(&bytes);
        let version = check_header(&mut input, "TestCodec", 0, 3).unwrap();
        assert_eq!(version, 3);
    }

    #[test]
    fn header_rejects_wrong_name() {
        let mut out = ByteArrayDataOutput::new();
        write_header(&mut out, "TestCodec", 0).unwrap();
        let bytes = out.into_bytes();
        let mut input = ByteArrayDataInput::new(&bytes);
        assert!(check_header(&mut input, "OtherCodec", 0, 0).is_err());
    }

    #[test]
    fn footer_detects_corruption() {
        let mut out = ByteArrayDataOutput::new();
        write_footer(&mut out, 0xDEAD_BEEF).unwrap();
        let bytes = out.into_bytes();
        let mut input = ByteArrayDataInput::new(&bytes);
        assert!(check_footer(&mut input, 0xDEAD_BEEF).is_ok());

        let mut input = ByteArrayDataInput::new(&bytes);
        assert!(check_footer(&mut input, 0x1234_5678).is_err());
    }
}
