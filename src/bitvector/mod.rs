//! Packed bit set over `[0, N)` with cached population count and a
//! self-chosen sparse (d-gaps) vs dense on-disk encoding. Generalizes the
//! base crate's `storage::segment_writer::SegmentWriter` pattern of
//! framing a payload with a `crc32fast` footer checksum
//! (`checksum::{write_footer, check_footer}`) to a second, independent
//! codec.

use crate::checksum::{check_footer, check_header, write_footer, write_header, ChecksumDataInput, ChecksumDataOutput};
use crate::core::error::{Error, Result};
use crate::io::{DataInput, DataOutput};

pub const CODEC_NAME: &str = "BitVector";
/// Current writer version: d-gaps encode *cleared* bits.
pub const VERSION_CURRENT: u32 = 2;
/// Legacy version whose d-gaps encoded *set* bits; read-only, corrected
/// with a post-load [`BitVector::invert_all`].
pub const VERSION_LEGACY_SET_GAPS: u32 = 1;

const SPARSE_SENTINEL: i32 = -1;

/// Packed set over `[0, size)` with a cached population count. `count ==
/// -1` means "stale, recompute from bytes on next read".
#[derive(Debug, Clone)]
pub struct BitVector {
    bits: Vec<u8>,
    size: usize,
    count: i64,
}

impl BitVector {
    pub fn new(size: usize) -> Self {
        BitVector {
            bits: vec![0u8; (size + 7) / 8],
            size,
            count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn check(&self, index: usize) -> Result<()> {
        if index >= self.size {
            return Err(Error::index_out_of_range(index, self.size));
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<bool> {
        self.check(index)?;
        Ok(self.bits[index / 8] & (1 << (index % 8)) != 0)
    }

    pub fn set(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        let byte = index / 8;
        let mask = 1u8 << (index % 8);
        if self.bits[byte] & mask == 0 {
            self.bits[byte] |= mask;
            if self.count >= 0 {
                self.count += 1;
            }
        }
        Ok(())
    }

    pub fn clear(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        let byte = index / 8;
        let mask = 1u8 << (index % 8);
        if self.bits[byte] & mask != 0 {
            self.bits[byte] &= !mask;
            if self.count >= 0 {
                self.count -= 1;
            }
        }
        Ok(())
    }

    /// Returns the prior value, then sets the bit.
    pub fn get_and_set(&mut self, index: usize) -> Result<bool> {
        let prior = self.get(index)?;
        if !prior {
            self.set(index)?;
        }
        Ok(prior)
    }

    /// Returns the prior value, then clears the bit.
    pub fn get_and_clear(&mut self, index: usize) -> Result<bool> {
        let prior = self.get(index)?;
        if prior {
            self.clear(index)?;
        }
        Ok(prior)
    }

    /// Cached population count, recomputed by scanning `bits` once if the
    /// cache was invalidated.
    pub fn count(&mut self) -> usize {
        if self.count < 0 {
            self.count = self.bits.iter().map(|b| b.count_ones() as i64).sum();
        }
        self.count as usize
    }

    fn trailing_mask(&self) -> u8 {
        let used_bits_in_last_byte = self.size % 8;
        if used_bits_in_last_byte == 0 {
            0xFF
        } else {
            (1u8 << used_bits_in_last_byte) - 1
        }
    }

    fn mask_trailing_bits(&mut self) {
        if let Some(last) = self.bits.last_mut() {
            *last &= self.trailing_mask();
        }
    }

    /// Sets every in-range bit to 1, `O(N/8)`.
    pub fn set_all(&mut self) {
        for b in self.bits.iter_mut() {
            *b = 0xFF;
        }
        self.mask_trailing_bits();
        self.count = self.size as i64;
    }

    /// Flips every in-range bit, `O(N/8)`, preserving the "trailing bits
    /// of the last byte are always zero" invariant.
    pub fn invert_all(&mut self) {
        for b in self.bits.iter_mut() {
            *b = !*b;
        }
        self.mask_trailing_bits();
        if self.count >= 0 {
            self.count = self.size as i64 - self.count;
        }
    }

    /// Exact sparseness heuristic from the on-disk format design: let `C`
    /// be the cleared-bit count and `L` the backing byte-array length.
    /// Estimate the average gap as `L / C`, derive the expected vint size
    /// `e` from it, and compare the expected d-gap stream size against
    /// the dense size. The final comparison measures both sides in bits
    /// derived from `L` (`8 * L`), not the logical bit count `size`,
    /// since the dense format's actual on-disk footprint is the `L`-byte
    /// array, and `size` can read up to 7 bits smaller than `8 * L`.
    ///
    /// Note: because `expected_bits` grows linearly with `C`, this can
    /// never select d-gaps once cleared bits are the majority (a fully
    /// cleared byte still costs one `(gap, mask)` entry, so d-gaps stops
    /// paying for itself well before `C` approaches `size`) — see the
    /// `heavily_cleared_vector_still_round_trips_even_though_dense_is_chosen`
    /// test below.
    pub fn is_sparse(&mut self) -> bool {
        let n = self.size as u64;
        let set = self.count() as u64;
        let cleared = n - set;
        if cleared == 0 {
            // No cleared bits at all: the d-gap stream is just the
            // framing, trivially smaller than the dense byte array.
            return true;
        }
        let l = self.bits.len() as u64;
        let avg_gap = l / cleared.max(1);
        let e: u64 = if avg_gap < (1 << 7) {
            1
        } else if avg_gap < (1 << 14) {
            2
        } else if avg_gap < (1 << 21) {
            3
        } else if avg_gap < (1 << 28) {
            4
        } else {
            5
        };
        let expected_bits = 32 + 8 * (e + 1) * cleared;
        10 * expected_bits < 8 * l
    }

    /// Writes the framed on-disk form, choosing dense or d-gaps per
    /// [`is_sparse`], followed by a checksum footer.
    pub fn write<O: DataOutput>(&mut self, out: &mut O) -> Result<()> {
        let mut checked = ChecksumDataOutput::new(out);
        write_header(&mut checked, CODEC_NAME, VERSION_CURRENT)?;

        if self.is_sparse() {
            let mut entries = Vec::new();
            let mut last_byte: i64 = -1;
            for (byte_index, &byte) in self.bits.iter().enumerate() {
                let cleared_mask = !byte & self.byte_validity_mask(byte_index);
                if cleared_mask != 0 {
                    let gap = byte_index as i64 - last_byte;
                    entries.push((gap as u32, cleared_mask));
                    last_byte = byte_index as i64;
                }
            }

            checked.write_i32(SPARSE_SENTINEL)?;
            checked.write_i32(self.size as i32)?;
            checked.write_i32(self.count() as i32)?;
            checked.write_vint32(entries.len() as u32)?;
            for (gap, mask) in entries {
                checked.write_vint32(gap)?;
                checked.write_byte(mask)?;
            }
        } else {
            checked.write_i32(self.size as i32)?;
            checked.write_i32(self.count() as i32)?;
            checked.write_bytes(&self.bits)?;
        }

        let (out, checksum) = checked.finish();
        write_footer(out, checksum)
    }

    fn byte_validity_mask(&self, byte_index: usize) -> u8 {
        if byte_index + 1 == self.bits.len() {
            self.trailing_mask()
        } else {
            0xFF
        }
    }

    /// Reads the framed on-disk form, dense or d-gaps, verifying the
    /// checksum footer and applying the legacy-version correction.
    pub fn read<I: DataInput>(input: &mut I) -> Result<Self> {
        let mut checked = ChecksumDataInput::new(input);
        let version = check_header(&mut checked, CODEC_NAME, VERSION_LEGACY_SET_GAPS, VERSION_CURRENT)?;

        let leading = checked.read_i32()?;
        let mut vector = if leading == SPARSE_SENTINEL {
            let size = checked.read_i32()? as usize;
            let count = checked.read_i32()?;
            let num_entries = checked.read_vint32()?;
            let mut vector = BitVector::new(size);
            vector.set_all();
            let mut last_byte: i64 = -1;
            for _ in 0..num_entries {
                let gap = checked.read_vint32()? as i64;
                let mask = checked.read_byte()?;
                let byte_index = (last_byte + gap) as usize;
                if byte_index >= vector.bits.len() {
                    return Err(Error::corrupt("BitVector d-gap entry points past backing array"));
                }
                vector.bits[byte_index] &= !mask;
                last_byte = byte_index as i64;
            }
            vector.count = count as i64;
            vector
        } else {
            let size = leading as usize;
            let count = checked.read_i32()?;
            let num_bytes = (size + 7) / 8;
            let bytes = checked.read_bytes(num_bytes)?;
            BitVector { bits: bytes, size, count: count as i64 }
        };

        if version == VERSION_LEGACY_SET_GAPS {
            vector.invert_all();
        }

        let computed = checked.checksum();
        check_footer(checked.into_inner(), computed)?;
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{ByteArrayDataInput, ByteArrayDataOutput};
    use rand::Rng;

    fn round_trip(vector: &mut BitVector) -> BitVector {
        let mut out = ByteArrayDataOutput::new();
        vector.write(&mut out).unwrap();
        let bytes = out.into_bytes();
        let mut input = ByteArrayDataInput::new(&bytes);
        BitVector::read(&mut input).unwrap()
    }

    #[test]
    fn set_clear_and_get_and_set_behave() {
        let mut v = BitVector::new(10);
        assert!(!v.get(3).unwrap());
        v.set(3).unwrap();
        assert!(v.get(3).unwrap());
        assert_eq!(v.count(), 1);

        let prior = v.get_and_clear(3).unwrap();
        assert!(prior);
        assert!(!v.get(3).unwrap());
        assert_eq!(v.count(), 0);

        let prior = v.get_and_set(7).unwrap();
        assert!(!prior);
        assert!(v.get(7).unwrap());
    }

    #[test]
    fn invert_all_flips_every_bit_and_count() {
        let mut v = BitVector::new(100);
        for i in [3usize, 50, 99] {
            v.set(i).unwrap();
        }
        assert_eq!(v.count(), 3);
        v.invert_all();
        assert_eq!(v.count(), 97);
        assert!(!v.get(3).unwrap());
        assert!(v.get(4).unwrap());
    }

    #[test]
    fn set_all_marks_every_bit_live() {
        let mut v = BitVector::new(13);
        v.set_all();
        assert_eq!(v.count(), 13);
        for i in 0..13 {
            assert!(v.get(i).unwrap());
        }
    }

    #[test]
    fn dense_vector_round_trips() {
        let mut v = BitVector::new(37);
        for i in (0..37).step_by(2) {
            v.set(i).unwrap();
        }
        let before_count = v.count();
        let mut restored = round_trip(&mut v);
        assert_eq!(restored.count(), before_count);
        for i in 0..37 {
            assert_eq!(restored.get(i).unwrap(), v.get(i).unwrap());
        }
    }

    #[test]
    fn nearly_all_live_vector_round_trips() {
        let mut v = BitVector::new(500);
        v.set_all();
        for i in [0usize, 17, 499] {
            v.clear(i).unwrap();
        }
        let before_count = v.count();
        let mut restored = round_trip(&mut v);
        assert_eq!(restored.count(), before_count);
        for i in 0..500 {
            assert_eq!(restored.get(i).unwrap(), v.get(i).unwrap());
        }
    }

    #[test]
    fn random_vectors_at_several_cleared_ratios_round_trip() {
        let mut rng = rand::thread_rng();
        for &cleared_ratio in &[0.01f64, 0.5, 0.99] {
            let size = 2000usize;
            let mut v = BitVector::new(size);
            v.set_all();
            for i in 0..size {
                if rng.gen_bool(cleared_ratio) {
                    v.clear(i).unwrap();
                }
            }
            let before: Vec<bool> = (0..size).map(|i| v.get(i).unwrap()).collect();
            let mut restored = round_trip(&mut v);
            let after: Vec<bool> = (0..size).map(|i| restored.get(i).unwrap()).collect();
            assert_eq!(before, after, "cleared_ratio={cleared_ratio}");
            assert_eq!(restored.count(), v.count());
        }
    }

    #[test]
    fn empty_vector_round_trips() {
        let mut v = BitVector::new(0);
        let restored = round_trip(&mut v);
        assert_eq!(restored.len(), 0);
    }

    #[test]
    fn out_of_range_access_is_an_error() {
        let v = BitVector::new(4);
        assert!(v.get(4).is_err());
    }

    #[test]
    fn sparse_encoding_is_chosen_when_cleared_bits_are_a_small_minority() {
        let mut v = BitVector::new(10_000);
        v.set_all();
        for i in [1usize, 2500, 9999] {
            v.clear(i).unwrap();
        }
        assert!(v.is_sparse());
        let before_count = v.count();
        let mut restored = round_trip(&mut v);
        assert_eq!(restored.count(), before_count);
        for i in 0..10_000 {
            assert_eq!(restored.get(i).unwrap(), v.get(i).unwrap());
        }
    }

    #[test]
    fn heavily_cleared_vector_still_round_trips_even_though_dense_is_chosen() {
        // Concrete scenario from the format design: N=100, only bits {3,
        // 50, 99} set (97% cleared). A d-gap entry costs one (gap, mask)
        // byte pair per byte touched, so at this cleared ratio nearly
        // every one of the 13 backing bytes needs an entry — 26 bytes of
        // d-gaps versus 13 bytes of dense bitset, so dense is genuinely
        // smaller here and is what gets chosen. Round-tripping must
        // still reproduce the vector exactly regardless of which form
        // was written.
        let mut v = BitVector::new(100);
        for i in [3usize, 50, 99] {
            v.set(i).unwrap();
        }
        assert_eq!(v.count(), 3);
        assert!(!v.is_sparse());
        let mut restored = round_trip(&mut v);
        assert_eq!(restored.count(), 3);
        for i in 0..100 {
            assert_eq!(restored.get(i).unwrap(), v.get(i).unwrap());
        }
        v.invert_all();
        assert_eq!(v.count(), 97);
    }
}
