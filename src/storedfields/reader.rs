//! Random-access `fdt`/`fdx` reader: seeks `fdx` to the document's offset
//! slot, follows it into `fdt`, and decodes each field record through a
//! caller-supplied visitor so a query that only needs a couple of fields
//! never pays for the rest.

use crate::checksum::check_header;
use crate::core::error::{Error, Result};
use crate::core::types::FieldNumber;
use crate::io::RandomAccessInput;
use crate::storedfields::{read_value, StoredFieldValue, FDT_CODEC_NAME, FDX_CODEC_NAME, VERSION_CURRENT};

/// What a [`StoredFieldsReader::document`] caller wants done with the next
/// field record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitStatus {
    /// Decode the value and report it via [`StoredFieldVisitor::value`].
    Store,
    /// Skip past the value without materializing it.
    Skip,
    /// Stop visiting the remaining fields of this document entirely.
    Stop,
}

pub trait StoredFieldVisitor {
    fn needs_field(&mut self, field: FieldNumber) -> VisitStatus;
    fn value(&mut self, field: FieldNumber, value: StoredFieldValue);
}

/// Collects every field of a document, used by merge's decode/re-encode
/// fallback path.
#[derive(Debug, Default)]
pub struct CollectAllVisitor {
    pub fields: Vec<(FieldNumber, StoredFieldValue)>,
}

impl StoredFieldVisitor for CollectAllVisitor {
    fn needs_field(&mut self, _field: FieldNumber) -> VisitStatus {
        VisitStatus::Store
    }

    fn value(&mut self, field: FieldNumber, value: StoredFieldValue) {
        self.fields.push((field, value));
    }
}

/// A contiguous run of raw `fdt` bytes covering several documents, plus
/// each document's record offset relative to the start of `bytes` — used
/// to bulk-copy live documents during merge without decoding them.
pub struct RawDocRange {
    pub bytes: Vec<u8>,
    pub fdt_offsets: Vec<u64>,
}

pub struct StoredFieldsReader<R> {
    fdx: R,
    fdt: R,
    fdx_header_len: u64,
    num_docs: u32,
}

impl<R: RandomAccessInput> StoredFieldsReader<R> {
    pub fn open(mut fdx: R, mut fdt: R) -> Result<Self> {
        check_header(&mut fdx, FDX_CODEC_NAME, VERSION_CURRENT, VERSION_CURRENT)?;
        let fdx_header_len = fdx.position()?;
        check_header(&mut fdt, FDT_CODEC_NAME, VERSION_CURRENT, VERSION_CURRENT)?;

        let fdx_len = fdx.len();
        if (fdx_len - fdx_header_len) % 8 != 0 {
            return Err(Error::corrupt("fdx length is not header + 8*N"));
        }
        let num_docs = ((fdx_len - fdx_header_len) / 8) as u32;

        Ok(StoredFieldsReader { fdx, fdt, fdx_header_len, num_docs })
    }

    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    fn offset_for(&mut self, doc_id: u32) -> Result<u64> {
        if doc_id >= self.num_docs {
            return Err(Error::index_out_of_range(doc_id, self.num_docs));
        }
        self.fdx.seek(self.fdx_header_len + 8 * doc_id as u64)?;
        Ok(self.fdx.read_i64()? as u64)
    }

    pub fn document(&mut self, doc_id: u32, visitor: &mut dyn StoredFieldVisitor) -> Result<()> {
        let offset = self.offset_for(doc_id)?;
        self.fdt.seek(offset)?;
        let num_fields = self.fdt.read_vint32()?;
        for _ in 0..num_fields {
            let field = FieldNumber::new(self.fdt.read_vint32()?);
            match visitor.needs_field(field) {
                VisitStatus::Stop => return Ok(()),
                VisitStatus::Skip => {
                    read_value(&mut self.fdt)?;
                }
                VisitStatus::Store => {
                    let value = read_value(&mut self.fdt)?;
                    visitor.value(field, value);
                }
            }
        }
        Ok(())
    }

    /// Raw bytes covering `count` documents starting at `start_doc`,
    /// used for merge's bulk-copy path. Does not check liveness; the
    /// caller is responsible for only requesting live, contiguous runs.
    pub fn raw_range(&mut self, start_doc: u32, count: u32) -> Result<RawDocRange> {
        if count == 0 {
            return Ok(RawDocRange { bytes: Vec::new(), fdt_offsets: Vec::new() });
        }
        let start_offset = self.offset_for(start_doc)?;
        let end_offset = if start_doc + count < self.num_docs {
            self.offset_for(start_doc + count)?
        } else {
            self.fdt.len()
        };

        let mut fdt_offsets = Vec::with_capacity(count as usize);
        for i in 0..count {
            fdt_offsets.push(self.offset_for(start_doc + i)? - start_offset);
        }

        self.fdt.seek(start_offset)?;
        let bytes = self.fdt.read_bytes((end_offset - start_offset) as usize)?;
        Ok(RawDocRange { bytes, fdt_offsets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ByteArrayDataOutput;
    use crate::storedfields::writer::StoredFieldsWriter;
    use crate::storedfields::FieldInfos;

    fn build_two_docs() -> (Vec<u8>, Vec<u8>, FieldNumber, FieldNumber) {
        let mut infos = FieldInfos::new();
        let title = infos.add("title");
        let n = infos.add("n");

        let mut writer = StoredFieldsWriter::new(ByteArrayDataOutput::new(), ByteArrayDataOutput::new()).unwrap();
        writer.start_document(2).unwrap();
        writer.write_field(title, &StoredFieldValue::String("hello".into())).unwrap();
        writer.write_field(n, &StoredFieldValue::Int32(42)).unwrap();

        writer.start_document(1).unwrap();
        writer.write_field(title, &StoredFieldValue::String("world".into())).unwrap();

        let (fdx, fdt) = writer.finish(&infos, 2).unwrap();
        (fdx.into_bytes(), fdt.into_bytes(), title, n)
    }

    #[test]
    fn reads_back_written_documents() {
        let (fdx, fdt, title, n) = build_two_docs();
        let mut reader =
            StoredFieldsReader::open(crate::io::ByteArrayDataInput::new(&fdx), crate::io::ByteArrayDataInput::new(&fdt))
                .unwrap();
        assert_eq!(reader.num_docs(), 2);

        let mut visitor = CollectAllVisitor::default();
        reader.document(0, &mut visitor).unwrap();
        assert_eq!(
            visitor.fields,
            vec![
                (title, StoredFieldValue::String("hello".into())),
                (n, StoredFieldValue::Int32(42)),
            ]
        );

        let mut visitor = CollectAllVisitor::default();
        reader.document(1, &mut visitor).unwrap();
        assert_eq!(visitor.fields, vec![(title, StoredFieldValue::String("world".into()))]);
    }

    #[test]
    fn skip_status_omits_the_field_but_advances_past_it() {
        struct SkipFirst(bool);
        impl StoredFieldVisitor for SkipFirst {
            fn needs_field(&mut self, _field: FieldNumber) -> VisitStatus {
                if !self.0 {
                    self.0 = true;
                    VisitStatus::Skip
                } else {
                    VisitStatus::Store
                }
            }
            fn value(&mut self, _field: FieldNumber, _value: StoredFieldValue) {}
        }

        let (fdx, fdt, ..) = build_two_docs();
        let mut reader =
            StoredFieldsReader::open(crate::io::ByteArrayDataInput::new(&fdx), crate::io::ByteArrayDataInput::new(&fdt))
                .unwrap();
        let mut visitor = SkipFirst(false);
        reader.document(0, &mut visitor).unwrap();
    }

    #[test]
    fn out_of_range_doc_id_is_an_error() {
        let (fdx, fdt, ..) = build_two_docs();
        let mut reader =
            StoredFieldsReader::open(crate::io::ByteArrayDataInput::new(&fdx), crate::io::ByteArrayDataInput::new(&fdt))
                .unwrap();
        let mut visitor = CollectAllVisitor::default();
        assert!(reader.document(5, &mut visitor).is_err());
    }
}
