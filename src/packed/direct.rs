use crate::core::error::Result;
use crate::io::{DataInput, DataOutput};
use crate::packed::{check_index, check_value, Format, Mutable, MutableArray};

macro_rules! direct_impl {
    ($name:ident, $elem:ty, $bits:expr) => {
        /// Zero-overhead direct storage: one `
        #[doc = stringify!($elem)]
        /// ` per logical value.
        #[derive(Debug, Clone)]
        pub struct $name {
            values: Vec<$elem>,
        }

        impl $name {
            pub fn new(value_count: usize) -> Self {
                $name {
                    values: vec![0 as $elem; value_count],
                }
            }

            pub fn read_raw<I: DataInput>(value_count: usize, input: &mut I) -> Result<Self> {
                let mut values = Vec::with_capacity(value_count);
                for _ in 0..value_count {
                    values.push(Self::read_one(input)?);
                }
                Ok($name { values })
            }

            pub fn write_raw<O: DataOutput>(&self, out: &mut O) -> Result<()> {
                for &v in &self.values {
                    Self::write_one(out, v)?;
                }
                Ok(())
            }
        }

        impl Mutable for $name {
            fn size(&self) -> usize {
                self.values.len()
            }

            fn bits_per_value(&self) -> u32 {
                $bits
            }

            fn get(&self, index: usize) -> Result<u64> {
                check_index(index, self.values.len())?;
                Ok(self.values[index] as u64)
            }

            fn set(&mut self, index: usize, value: u64) -> Result<()> {
                check_index(index, self.values.len())?;
                check_value(value, $bits)?;
                self.values[index] = value as $elem;
                Ok(())
            }

            fn write<O: DataOutput>(&self, out: &mut O) -> Result<()> {
                self.write_raw(out)
            }
        }

        impl MutableArray for $name {
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
                let n = out.len().min(self.values.len().saturating_sub(index));
                for (i, slot) in out.iter_mut().enumerate().take(n) {
                    *slot = self.values[index + i] as u64;
                }
                Ok(n)
            }
            fn bulk_set(&mut self, index: usize, values: &[u64]) -> Result<usize> {
                let n = values.len().min(self.values.len().saturating_sub(index));
                for (i, &v) in values.iter().enumerate().take(n) {
                    check_value(v, $bits)?;
                    self.values[index + i] = v as $elem;
                }
                Ok(n)
            }
            fn fill(&mut self, from: usize, to: usize, value: u64) -> Result<()> {
                check_value(value, $bits)?;
                for slot in &mut self.values[from..to] {
                    *slot = value as $elem;
                }
                Ok(())
            }
            fn format(&self) -> Format {
                Format::Direct
            }
            fn write_dyn(&self, out: &mut dyn DataOutput) -> Result<()> {
                self.write_raw(out)
            }
            fn resized(&self, new_size: usize) -> Box<dyn MutableArray> {
                let mut new = $name::new(new_size);
                let n = new_size.min(self.values.len());
                new.values[..n].copy_from_slice(&self.values[..n]);
                Box::new(new)
            }
        }
    };
}

direct_impl!(Direct8, u8, 8);
direct_impl!(Direct16, u16, 16);
direct_impl!(Direct32, u32, 32);
direct_impl!(Direct64, u64, 64);

impl Direct8 {
    fn read_one<I: DataInput>(input: &mut I) -> Result<u8> {
        input.read_byte()
    }
    fn write_one<O: DataOutput>(out: &mut O, v: u8) -> Result<()> {
        out.write_byte(v)
    }
}

impl Direct16 {
    fn read_one<I: DataInput>(input: &mut I) -> Result<u16> {
        input.read_u16()
    }
    fn write_one<O: DataOutput>(out: &mut O, v: u16) -> Result<()> {
        out.write_u16(v)
    }
}

impl Direct32 {
    fn read_one<I: DataInput>(input: &mut I) -> Result<u32> {
        input.read_u32()
    }
    fn write_one<O: DataOutput>(out: &mut O, v: u32) -> Result<()> {
        out.write_u32(v)
    }
}

impl Direct64 {
    fn read_one<I: DataInput>(input: &mut I) -> Result<u64> {
        input.read_u64()
    }
    fn write_one<O: DataOutput>(out: &mut O, v: u64) -> Result<()> {
        out.write_u64(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct32_round_trips() {
        let mut arr = Direct32::new(5);
        for (i, v) in [10u64, 20, 30, 40, 50].into_iter().enumerate() {
            arr.set(i, v).unwrap();
        }
        assert_eq!(arr.get(2).unwrap(), 30);
        assert!(arr.set(0, 1u64 << 40).is_err());
    }
}
