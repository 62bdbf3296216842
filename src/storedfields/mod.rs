//! Per-document field values (the `fdt`/`fdx` codec): [`FieldInfos`], the
//! tagged-union value encoding, and the writer/reader pair. Grounded in the
//! base crate's `storage::segment_writer`/`segment_reader` pair (length-
//! prefixed records behind a header, read back by linear scan), replacing
//! the whole-document `bincode` blob with a field-at-a-time codec and an
//! `fdx` offset index for random-access lookup instead of a linear scan.

pub mod field_infos;
pub mod reader;
pub mod writer;

pub use field_infos::FieldInfos;
pub use reader::{RawDocRange, StoredFieldVisitor, StoredFieldsReader, VisitStatus};
pub use writer::{CheckAbort, NoopCheckAbort, StoredFieldsWriter};

use crate::core::error::{Error, Result};
use crate::io::{DataInput, DataOutput};

pub const FDX_CODEC_NAME: &str = "Lucene40StoredFieldsIndex";
pub const FDT_CODEC_NAME: &str = "Lucene40StoredFieldsData";
pub const VERSION_CURRENT: u32 = 0;

/// Caps one raw bulk-copy during [`writer::StoredFieldsWriter::merge`] to
/// this many contiguous live documents.
pub const MAX_RAW_MERGE_DOCS: u32 = 4192;

const IS_BINARY_BIT: u8 = 0b0000_0010;
const NUMERIC_SHIFT: u8 = 3;
const NUMERIC_MASK: u8 = 0b0011_1000;

const NUMERIC_NONE: u8 = 0;
const NUMERIC_INT32: u8 = 1;
const NUMERIC_INT64: u8 = 2;
const NUMERIC_FLOAT32: u8 = 3;
const NUMERIC_FLOAT64: u8 = 4;

/// A single stored field's value, tagged so the reader knows how to
/// decode the payload that follows without consulting [`FieldInfos`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoredFieldValue {
    String(String),
    Binary(Vec<u8>),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
}

fn bits_for(value: &StoredFieldValue) -> u8 {
    match value {
        StoredFieldValue::String(_) => 0,
        StoredFieldValue::Binary(_) => IS_BINARY_BIT,
        StoredFieldValue::Int32(_) => NUMERIC_INT32 << NUMERIC_SHIFT,
        StoredFieldValue::Int64(_) => NUMERIC_INT64 << NUMERIC_SHIFT,
        StoredFieldValue::Float32(_) => NUMERIC_FLOAT32 << NUMERIC_SHIFT,
        StoredFieldValue::Float64(_) => NUMERIC_FLOAT64 << NUMERIC_SHIFT,
    }
}

pub(crate) fn write_value<O: DataOutput>(out: &mut O, value: &StoredFieldValue) -> Result<()> {
    out.write_byte(bits_for(value))?;
    match value {
        StoredFieldValue::String(s) => out.write_string(s),
        StoredFieldValue::Binary(b) => {
            out.write_vint32(b.len() as u32)?;
            out.write_bytes(b)
        }
        StoredFieldValue::Int32(v) => out.write_i32(*v),
        StoredFieldValue::Int64(v) => out.write_i64(*v),
        StoredFieldValue::Float32(v) => out.write_f32(*v),
        StoredFieldValue::Float64(v) => out.write_f64(*v),
    }
}

pub(crate) fn read_value<I: DataInput>(input: &mut I) -> Result<StoredFieldValue> {
    let bits = input.read_byte()?;
    if bits & IS_BINARY_BIT != 0 {
        let len = input.read_vint32()? as usize;
        return Ok(StoredFieldValue::Binary(input.read_bytes(len)?));
    }
    match (bits & NUMERIC_MASK) >> NUMERIC_SHIFT {
        NUMERIC_NONE => Ok(StoredFieldValue::String(input.read_string()?)),
        NUMERIC_INT32 => Ok(StoredFieldValue::Int32(input.read_i32()?)),
        NUMERIC_INT64 => Ok(StoredFieldValue::Int64(input.read_i64()?)),
        NUMERIC_FLOAT32 => Ok(StoredFieldValue::Float32(input.read_f32()?)),
        NUMERIC_FLOAT64 => Ok(StoredFieldValue::Float64(input.read_f64()?)),
        other => Err(Error::corrupt(format!("unknown stored field numeric tag {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{ByteArrayDataInput, ByteArrayDataOutput};

    #[test]
    fn string_value_round_trips() {
        let mut out = ByteArrayDataOutput::new();
        write_value(&mut out, &StoredFieldValue::String("hello".into())).unwrap();
        let bytes = out.into_bytes();
        let mut input = ByteArrayDataInput::new(&bytes);
        assert_eq!(read_value(&mut input).unwrap(), StoredFieldValue::String("hello".into()));
    }

    #[test]
    fn numeric_values_round_trip() {
        for value in [
            StoredFieldValue::Int32(42),
            StoredFieldValue::Int64(-9_000_000_000),
            StoredFieldValue::Float32(1.5),
            StoredFieldValue::Float64(-2.25),
            StoredFieldValue::Binary(vec![1, 2, 3]),
        ] {
            let mut out = ByteArrayDataOutput::new();
            write_value(&mut out, &value).unwrap();
            let bytes = out.into_bytes();
            let mut input = ByteArrayDataInput::new(&bytes);
            assert_eq!(read_value(&mut input).unwrap(), value);
        }
    }

    #[test]
    fn exact_byte_sequence_for_title_and_int_field() {
        // title="hello" (string tag=0), n=42 (int32 tag=1<<3=8).
        let mut out = ByteArrayDataOutput::new();
        write_value(&mut out, &StoredFieldValue::String("hello".into())).unwrap();
        write_value(&mut out, &StoredFieldValue::Int32(42)).unwrap();
        let bytes = out.into_bytes();
        let mut expected = vec![0u8, 5, b'h', b'e', b'l', b'l', b'o'];
        expected.push(NUMERIC_INT32 << NUMERIC_SHIFT);
        expected.extend_from_slice(&42i32.to_be_bytes());
        assert_eq!(bytes, expected);
    }
}
