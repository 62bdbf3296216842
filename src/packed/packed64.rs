use crate::core::error::Result;
use crate::io::{DataInput, DataOutput};
use crate::packed::{check_index, check_value, Format, Mutable, MutableArray};

fn mask_for(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

fn num_blocks(value_count: usize, bits_per_value: u32) -> usize {
    let total_bits = value_count as u64 * bits_per_value as u64;
    ((total_bits + 63) / 64) as usize
}

/// General bit-packed array over 64-bit words: value `i` occupies bits
/// `[i*bits, i*bits+bits)` of a conceptual little-endian bitstream, which
/// may straddle a word boundary. Works for any `bits_per_value in [1,64]`,
/// at the cost of a branch on every access.
#[derive(Debug, Clone)]
pub struct Packed64 {
    blocks: Vec<u64>,
    value_count: usize,
    bits_per_value: u32,
    mask: u64,
}

impl Packed64 {
    pub fn new(value_count: usize, bits_per_value: u32) -> Self {
        Packed64 {
            blocks: vec![0u64; num_blocks(value_count, bits_per_value)],
            value_count,
            bits_per_value,
            mask: mask_for(bits_per_value),
        }
    }

    pub fn read_raw<I: DataInput>(value_count: usize, bits_per_value: u32, input: &mut I) -> Result<Self> {
        let mut arr = Packed64::new(value_count, bits_per_value);
        for block in arr.blocks.iter_mut() {
            *block = input.read_u64()?;
        }
        Ok(arr)
    }

    pub fn write_raw<O: DataOutput>(&self, out: &mut O) -> Result<()> {
        for &block in &self.blocks {
            out.write_u64(block)?;
        }
        Ok(())
    }

    fn bit_position(&self, index: usize) -> (usize, u32) {
        let bit_index = index as u64 * self.bits_per_value as u64;
        ((bit_index / 64) as usize, (bit_index % 64) as u32)
    }
}

impl Mutable for Packed64 {
    fn size(&self) -> usize {
        self.value_count
    }

    fn bits_per_value(&self) -> u32 {
        self.bits_per_value
    }

    fn get(&self, index: usize) -> Result<u64> {
        check_index(index, self.value_count)?;
        let (block_index, bit_offset) = self.bit_position(index);
        let bits = self.bits_per_value;
        if bit_offset + bits <= 64 {
            Ok((self.blocks[block_index] >> bit_offset) & self.mask)
        } else {
            let bits_in_first = 64 - bit_offset;
            let low = self.blocks[block_index] >> bit_offset;
            let bits_in_second = bits - bits_in_first;
            let high = self.blocks[block_index + 1] & mask_for(bits_in_second);
            Ok(low | (high << bits_in_first))
        }
    }

    fn set(&mut self, index: usize, value: u64) -> Result<()> {
        check_index(index, self.value_count)?;
        check_value(value, self.bits_per_value)?;
        let (block_index, bit_offset) = self.bit_position(index);
        let bits = self.bits_per_value;
        if bit_offset + bits <= 64 {
            let clear_mask = !(self.mask << bit_offset);
            self.blocks[block_index] = (self.blocks[block_index] & clear_mask) | (value << bit_offset);
        } else {
            let bits_in_first = 64 - bit_offset;
            let bits_in_second = bits - bits_in_first;
            let first_clear = !(mask_for(bits_in_first) << bit_offset);
            self.blocks[block_index] =
                (self.blocks[block_index] & first_clear) | ((value << bit_offset) & (u64::MAX << bit_offset));
            let second_clear = !mask_for(bits_in_second);
            self.blocks[block_index + 1] =
                (self.blocks[block_index + 1] & second_clear) | (value >> bits_in_first);
        }
        Ok(())
    }

    fn write<O: DataOutput>(&self, out: &mut O) -> Result<()> {
        self.write_raw(out)
    }
}

impl MutableArray for Packed64 {
    fn size(&self) -> usize {
        Mutable::size(self)
    }
    fn bits_per_value(&self) -> u32 {
        Mutable::bits_per_value(self)
    }
    fn get(&self, index: usize) -> Result<u64> {
        Mutable::get(self, index)
    }
    fn set(&mut self, index: usize, value: u64) -> Result<()> {
        Mutable::set(self, index, value)
    }
    fn bulk_get(&self, index: usize, out: &mut [u64]) -> Result<usize> {
        let n = out.len().min(self.value_count.saturating_sub(index));
        for (i, slot) in out.iter_mut().enumerate().take(n) {
            *slot = self.get(index + i)?;
        }
        Ok(n)
    }
    fn bulk_set(&mut self, index: usize, values: &[u64]) -> Result<usize> {
        let n = values.len().min(self.value_count.saturating_sub(index));
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
    fn format(&self) -> Format {
        Format::Packed
    }
    fn write_dyn(&self, out: &mut dyn DataOutput) -> Result<()> {
        self.write_raw(out)
    }
    fn resized(&self, new_size: usize) -> Box<dyn MutableArray> {
        let mut new = Packed64::new(new_size, self.bits_per_value);
        for i in 0..new_size.min(self.value_count) {
            let _ = new.set(i, self.get(i).unwrap());
        }
        Box::new(new)
    }
}

/// Bit-packed array chosen so `64 % bits_per_value == 0`: each 64-bit word
/// holds exactly `64 / bits_per_value` values and no value crosses a word
/// boundary, so bulk decode has no branch on the inner loop.
#[derive(Debug, Clone)]
pub struct Packed64SingleBlock {
    blocks: Vec<u64>,
    value_count: usize,
    bits_per_value: u32,
    values_per_block: u32,
    mask: u64,
}

impl Packed64SingleBlock {
    pub fn new(value_count: usize, bits_per_value: u32) -> Self {
        assert!(64 % bits_per_value == 0, "bits_per_value must divide 64");
        let values_per_block = 64 / bits_per_value;
        let blocks_needed = (value_count + values_per_block as usize - 1) / values_per_block as usize;
        Packed64SingleBlock {
            blocks: vec![0u64; blocks_needed],
            value_count,
            bits_per_value,
            values_per_block,
            mask: mask_for(bits_per_value),
        }
    }

    pub fn read_raw<I: DataInput>(value_count: usize, bits_per_value: u32, input: &mut I) -> Result<Self> {
        let mut arr = Packed64SingleBlock::new(value_count, bits_per_value);
        for block in arr.blocks.iter_mut() {
            *block = input.read_u64()?;
        }
        Ok(arr)
    }

    pub fn write_raw<O: DataOutput>(&self, out: &mut O) -> Result<()> {
        for &block in &self.blocks {
            out.write_u64(block)?;
        }
        Ok(())
    }
}

impl Mutable for Packed64SingleBlock {
    fn size(&self) -> usize {
        self.value_count
    }

    fn bits_per_value(&self) -> u32 {
        self.bits_per_value
    }

    fn get(&self, index: usize) -> Result<u64> {
        check_index(index, self.value_count)?;
        let block_index = index / self.values_per_block as usize;
        let offset = (index % self.values_per_block as usize) as u32 * self.bits_per_value;
        Ok((self.blocks[block_index] >> offset) & self.mask)
    }

    fn set(&mut self, index: usize, value: u64) -> Result<()> {
        check_index(index, self.value_count)?;
        check_value(value, self.bits_per_value)?;
        let block_index = index / self.values_per_block as usize;
        let offset = (index % self.values_per_block as usize) as u32 * self.bits_per_value;
        let clear_mask = !(self.mask << offset);
        self.blocks[block_index] = (self.blocks[block_index] & clear_mask) | (value << offset);
        Ok(())
    }

    fn write<O: DataOutput>(&self, out: &mut O) -> Result<()> {
        self.write_raw(out)
    }
}

impl MutableArray for Packed64SingleBlock {
    fn size(&self) -> usize {
        Mutable::size(self)
    }
    fn bits_per_value(&self) -> u32 {
        Mutable::bits_per_value(self)
    }
    fn get(&self, index: usize) -> Result<u64> {
        Mutable::get(self, index)
    }
    fn set(&mut self, index: usize, value: u64) -> Result<()> {
        Mutable::set(self, index, value)
    }
    fn bulk_get(&self, index: usize, out: &mut [u64]) -> Result<usize> {
        let n = out.len().min(self.value_count.saturating_sub(index));
        for (i, slot) in out.iter_mut().enumerate().take(n) {
            *slot = self.get(index + i)?;
        }
        Ok(n)
    }
    fn bulk_set(&mut self, index: usize, values: &[u64]) -> Result<usize> {
        let n = values.len().min(self.value_count.saturating_sub(index));
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
    fn format(&self) -> Format {
        Format::PackedSingleBlock
    }
    fn write_dyn(&self, out: &mut dyn DataOutput) -> Result<()> {
        self.write_raw(out)
    }
    fn resized(&self, new_size: usize) -> Box<dyn MutableArray> {
        let mut new = Packed64SingleBlock::new(new_size, self.bits_per_value);
        for i in 0..new_size.min(self.value_count) {
            let _ = new.set(i, self.get(i).unwrap());
        }
        Box::new(new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed64_handles_straddling_values() {
        let mut arr = Packed64::new(5, 5);
        let values = [0u64, 31, 5, 17, 0];
        for (i, &v) in values.iter().enumerate() {
            arr.set(i, v).unwrap();
        }
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(arr.get(i).unwrap(), v);
        }
    }

    #[test]
    fn single_block_round_trips() {
        let mut arr = Packed64SingleBlock::new(10, 4);
        for i in 0..10 {
            arr.set(i, (i as u64) % 16).unwrap();
        }
        for i in 0..10 {
            assert_eq!(arr.get(i).unwrap(), (i as u64) % 16);
        }
    }

    #[test]
    fn rejects_values_too_large() {
        let mut arr = Packed64::new(1, 3);
        assert!(arr.set(0, 8).is_err());
        assert!(arr.set(0, 7).is_ok());
    }
}
