//! Fixed-width packed integer arrays: random read/write of non-negative
//! values at bit widths 1..64 with no per-element overhead beyond the
//! chosen layout's bit-packing. Generalizes the base crate's
//! `compression::vbyte`/`compression::delta` integer encoders (which are
//! one-shot stream encode/decode) into a random-access `Mutable` array
//! with its own framed on-disk format.

mod direct;
mod packed64;
mod paged;

pub use direct::{Direct16, Direct32, Direct64, Direct8};
pub use packed64::{Packed64, Packed64SingleBlock};
pub use paged::{GrowableWriter, PagedMutable};

use crate::checksum::{check_header, write_header};
use crate::core::error::{Error, ErrorKind, Result};
use crate::io::{DataInput, DataOutput};

pub const CODEC_NAME: &str = "PackedInts";
pub const VERSION: u32 = 1;

/// Physical layout chosen for a given `bitsPerValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// General bit-packed layout over 64-bit words; a value may straddle
    /// a word boundary. Works for any `bitsPerValue in [1, 64]`.
    Packed,
    /// Bit-packed layout chosen so that `lcm(64, bitsPerValue) == 64`,
    /// i.e. `bitsPerValue` divides 64: no value ever crosses a word
    /// boundary, which lets bulk decode run branch-free.
    PackedSingleBlock,
    /// Direct 8/16/32/64-bit storage, one element per slot, zero
    /// overhead and the fastest possible random access.
    Direct,
}

impl Format {
    pub fn id(self) -> u32 {
        match self {
            Format::Packed => 0,
            Format::PackedSingleBlock => 1,
            Format::Direct => 2,
        }
    }

    pub fn from_id(id: u32) -> Result<Self> {
        match id {
            0 => Ok(Format::Packed),
            1 => Ok(Format::PackedSingleBlock),
            2 => Ok(Format::Direct),
            other => Err(Error::corrupt(format!("unknown PackedInts format id {other}"))),
        }
    }
}

/// Random read/write fixed-width integer array. Every stored value must
/// satisfy `0 <= v < 2^bits_per_value()`.
pub trait Mutable {
    fn size(&self) -> usize;
    fn bits_per_value(&self) -> u32;

    fn get(&self, index: usize) -> Result<u64>;
    fn set(&mut self, index: usize, value: u64) -> Result<()>;

    /// Copy up to `out.len()` values starting at `index`, returning the
    /// number actually copied (always >= 1 when `index` is in range).
    fn bulk_get(&self, index: usize, out: &mut [u64]) -> Result<usize> {
        let n = out.len().min(self.size().saturating_sub(index));
        for (i, slot) in out.iter_mut().enumerate().take(n) {
            *slot = self.get(index + i)?;
        }
        Ok(n)
    }

    /// Write `values.len()` values starting at `index`, returning the
    /// number actually written.
    fn bulk_set(&mut self, index: usize, values: &[u64]) -> Result<usize> {
        let n = values.len().min(self.size().saturating_sub(index));
        for (i, &v) in values.iter().enumerate().take(n) {
            self.set(index + i, v)?;
        }
        Ok(n)
    }

    fn fill(&mut self, from: usize, to: usize, value: u64) -> Result<()> {
        for i in from..to {
            self.set(i, value)?;
        }
        Ok(())
    }

    fn write<O: DataOutput>(&self, out: &mut O) -> Result<()>
    where
        Self: Sized;
}

fn check_index(index: usize, size: usize) -> Result<()> {
    if index >= size {
        return Err(Error::index_out_of_range(index, size));
    }
    Ok(())
}

fn check_value(value: u64, bits_per_value: u32) -> Result<()> {
    if bits_per_value < 64 && value >= (1u64 << bits_per_value) {
        return Err(Error::value_too_large(value, bits_per_value));
    }
    Ok(())
}

/// Choose a zero-overhead [`Format::Direct`] layout for `bitsPerValue in
/// {8, 16, 32, 64}`, a branch-free [`Format::PackedSingleBlock`] layout
/// when `bitsPerValue` divides 64, and the general [`Format::Packed`]
/// layout otherwise. `acceptable_overhead in [0.0, 7.0]` is reserved for
/// future layout tiers (e.g. choosing a wider single-block width to trade
/// RAM for speed); it is accepted and validated but does not currently
/// change the chosen format beyond the zero-overhead direct case.
pub fn create(value_count: usize, bits_per_value: u32, acceptable_overhead: f32) -> Result<Box<dyn MutableArray>> {
    if !(1..=64).contains(&bits_per_value) {
        return Err(Error::new(
            ErrorKind::InvalidArgument,
            format!("bits_per_value must be in [1, 64], got {bits_per_value}"),
        ));
    }
    if !(0.0..=7.0).contains(&acceptable_overhead) {
        return Err(Error::new(
            ErrorKind::InvalidArgument,
            format!("acceptable_overhead must be in [0.0, 7.0], got {acceptable_overhead}"),
        ));
    }

    match bits_per_value {
        8 => Ok(Box::new(Direct8::new(value_count))),
        16 => Ok(Box::new(Direct16::new(value_count))),
        32 => Ok(Box::new(Direct32::new(value_count))),
        64 => Ok(Box::new(Direct64::new(value_count))),
        b if 64 % b == 0 => Ok(Box::new(Packed64SingleBlock::new(value_count, b))),
        b => Ok(Box::new(Packed64::new(value_count, b))),
    }
}

/// Object-safe counterpart of [`Mutable`] used by the `create` dispatcher
/// (trait objects cannot name `Self: Sized` methods like generic `write`).
pub trait MutableArray {
    fn size(&self) -> usize;
    fn bits_per_value(&self) -> u32;
    fn get(&self, index: usize) -> Result<u64>;
    fn set(&mut self, index: usize, value: u64) -> Result<()>;
    fn bulk_get(&self, index: usize, out: &mut [u64]) -> Result<usize>;
    fn bulk_set(&mut self, index: usize, values: &[u64]) -> Result<usize>;
    fn fill(&mut self, from: usize, to: usize, value: u64) -> Result<()>;
    fn format(&self) -> Format;
    fn write_dyn(&self, out: &mut dyn DataOutput) -> Result<()>;

    /// Returns a new array of `new_size`, content copied from
    /// `min(old_size, new_size)` positions; higher indices are zero.
    fn resized(&self, new_size: usize) -> Box<dyn MutableArray>;
}

/// Write the full framed PackedInts stream: header, then
/// `(valueCount, bitsPerValue, formatId)`, then the format-specific body.
pub fn write_packed<O: DataOutput>(array: &dyn MutableArray, out: &mut O) -> Result<()> {
    write_header(out, CODEC_NAME, VERSION)?;
    out.write_vint32(array.size() as u32)?;
    out.write_vint32(array.bits_per_value())?;
    out.write_vint32(array.format().id())?;
    array.write_dyn(out)
}

/// Read a framed PackedInts stream back into a concrete array, sized and
/// formatted exactly as the header describes so the reader never guesses
/// a buffer size. The body is the format's raw backing words, matching
/// what [`write_packed`] emitted byte-for-byte.
pub fn read_packed<I: DataInput>(input: &mut I) -> Result<Box<dyn MutableArray>> {
    check_header(input, CODEC_NAME, VERSION, VERSION)?;
    let value_count = input.read_vint32()? as usize;
    let bits_per_value = input.read_vint32()?;
    let format = Format::from_id(input.read_vint32()?)?;

    let array: Box<dyn MutableArray> = match format {
        Format::Direct => match bits_per_value {
            8 => Box::new(Direct8::read_raw(value_count, input)?),
            16 => Box::new(Direct16::read_raw(value_count, input)?),
            32 => Box::new(Direct32::read_raw(value_count, input)?),
            64 => Box::new(Direct64::read_raw(value_count, input)?),
            other => return Err(Error::corrupt(format!("Direct format with bits_per_value={other}"))),
        },
        Format::PackedSingleBlock => Box::new(Packed64SingleBlock::read_raw(value_count, bits_per_value, input)?),
        Format::Packed => Box::new(Packed64::read_raw(value_count, bits_per_value, input)?),
    };

    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{ByteArrayDataInput, ByteArrayDataOutput};
    use rand::Rng;

    #[test]
    fn round_trips_bit_width_5() {
        let values = [0u64, 31, 5, 17, 0];
        let mut arr = create(values.len(), 5, 1.0).unwrap();
        for (i, &v) in values.iter().enumerate() {
            arr.set(i, v).unwrap();
        }
        let mut buf = [0u64; 5];
        let n = arr.bulk_get(0, &mut buf).unwrap();
        assert_eq!(n, 5);
        assert_eq!(buf, values);
    }

    #[test]
    fn write_then_read_round_trips_for_every_bit_width() {
        let mut rng = rand::thread_rng();
        for bits in 1u32..=64 {
            for &count in &[0usize, 1, 63, 64, 65, 1023, 1024, 1025, 10_000] {
                let max = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
                let values: Vec<u64> = (0..count)
                    .map(|_| if max == 0 { 0 } else { rng.gen_range(0..=max) })
                    .collect();

                let mut arr = create(count, bits, 1.0).unwrap();
                for (i, &v) in values.iter().enumerate() {
                    arr.set(i, v).unwrap();
                }

                let mut out = ByteArrayDataOutput::new();
                write_packed(arr.as_ref(), &mut out).unwrap();
                let bytes = out.into_bytes();

                let mut input = ByteArrayDataInput::new(&bytes);
                let read_back = read_packed(&mut input).unwrap();
                assert_eq!(read_back.size(), count);
                for (i, &v) in values.iter().enumerate() {
                    assert_eq!(read_back.get(i).unwrap(), v, "bits={bits} count={count} i={i}");
                }
            }
        }
    }

    #[test]
    fn resize_preserves_prefix_and_zero_fills_tail() {
        let mut arr = create(4, 8, 1.0).unwrap();
        for i in 0..4 {
            arr.set(i, (i as u64 + 1) * 10).unwrap();
        }
        let resized = arr.resized(6);
        for i in 0..4 {
            assert_eq!(resized.get(i).unwrap(), (i as u64 + 1) * 10);
        }
        assert_eq!(resized.get(4).unwrap(), 0);
        assert_eq!(resized.get(5).unwrap(), 0);

        let shrunk = arr.resized(2);
        assert_eq!(shrunk.size(), 2);
        assert_eq!(shrunk.get(1).unwrap(), 20);
    }

    #[test]
    fn out_of_range_index_is_an_error_not_a_panic() {
        let arr = create(3, 8, 1.0).unwrap();
        assert!(arr.get(3).is_err());
    }
}
