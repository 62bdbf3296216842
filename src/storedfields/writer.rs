//! `fdt`/`fdx` writer: one `fdx` offset per document, one `fdt` record per
//! document holding its field count followed by `(fieldNumber, value)`
//! pairs. `finish` asserts the `fdx` stream ended up exactly
//! `header + 8*numDocs` bytes long — any other length means a document was
//! started but never finished, which this format treats as corruption
//! rather than something to paper over.

use crate::bitvector::BitVector;
use crate::checksum::write_header;
use crate::core::error::{Error, Result};
use crate::core::types::FieldNumber;
use crate::io::{DataOutput, RandomAccessInput, TrackingOutput};
use crate::storedfields::reader::{CollectAllVisitor, StoredFieldsReader};
use crate::storedfields::{write_value, FieldInfos, StoredFieldValue, FDT_CODEC_NAME, FDX_CODEC_NAME, MAX_RAW_MERGE_DOCS, VERSION_CURRENT};

/// Cancellation hook for long-running merges. `work` reports how much
/// progress (in arbitrary units, `300 * docsCopied` for a bulk-copy
/// chunk) just happened; an implementation returns `Err` to cancel.
pub trait CheckAbort {
    fn work(&mut self, units: f64) -> Result<()>;
}

/// A [`CheckAbort`] that never cancels, for callers with no cancellation
/// policy of their own.
pub struct NoopCheckAbort;

impl CheckAbort for NoopCheckAbort {
    fn work(&mut self, _units: f64) -> Result<()> {
        Ok(())
    }
}

pub struct StoredFieldsWriter<X, O> {
    fdx: X,
    fdt: O,
    fdx_header_len: u64,
    num_docs: u32,
    expected_fields: u32,
    written_fields: u32,
}

impl<X: DataOutput + TrackingOutput, O: DataOutput + TrackingOutput> StoredFieldsWriter<X, O> {
    pub fn new(mut fdx: X, mut fdt: O) -> Result<Self> {
        write_header(&mut fdx, FDX_CODEC_NAME, VERSION_CURRENT)?;
        write_header(&mut fdt, FDT_CODEC_NAME, VERSION_CURRENT)?;
        let fdx_header_len = fdx.position();
        Ok(StoredFieldsWriter {
            fdx,
            fdt,
            fdx_header_len,
            num_docs: 0,
            expected_fields: 0,
            written_fields: 0,
        })
    }

    pub fn doc_count(&self) -> u32 {
        self.num_docs
    }

    /// Appends the current `fdt` position to `fdx`, then writes the field
    /// count `numFields` declares for this document's record.
    pub fn start_document(&mut self, num_fields: u32) -> Result<()> {
        if self.num_docs > 0 && self.written_fields != self.expected_fields {
            return Err(Error::invalid_state("previous document did not receive all its declared fields"));
        }
        self.fdx.write_i64(self.fdt.position() as i64)?;
        self.fdt.write_vint32(num_fields)?;
        self.expected_fields = num_fields;
        self.written_fields = 0;
        self.num_docs += 1;
        Ok(())
    }

    pub fn write_field(&mut self, field_number: FieldNumber, value: &StoredFieldValue) -> Result<()> {
        if self.written_fields >= self.expected_fields {
            return Err(Error::invalid_state("wrote more fields than startDocument declared"));
        }
        self.fdt.write_vint32(field_number.0)?;
        write_value(&mut self.fdt, value)?;
        self.written_fields += 1;
        Ok(())
    }

    /// Copies `count` contiguous live documents from `reader` starting at
    /// `start_doc` as one raw byte range, reassigning each one's `fdx`
    /// offset to land in this writer's `fdt` stream.
    fn copy_raw_range<R: RandomAccessInput>(&mut self, reader: &mut StoredFieldsReader<R>, start_doc: u32, count: u32) -> Result<()> {
        let range = reader.raw_range(start_doc, count)?;
        let base = self.fdt.position() as i64;
        for rel in &range.fdt_offsets {
            self.fdx.write_i64(base + *rel as i64)?;
        }
        self.fdt.write_bytes(&range.bytes)?;
        self.num_docs += count;
        Ok(())
    }

    /// Merges every live document from `reader` into this writer. When
    /// `field_numbers_congruent` (the source and destination
    /// [`FieldInfos`] agree on every field number), contiguous runs of up
    /// to [`MAX_RAW_MERGE_DOCS`] live documents are bulk-copied as raw
    /// bytes; otherwise each document is decoded and re-encoded.
    pub fn merge<R: RandomAccessInput>(
        &mut self,
        reader: &mut StoredFieldsReader<R>,
        live_docs: Option<&BitVector>,
        field_numbers_congruent: bool,
        check_abort: &mut dyn CheckAbort,
    ) -> Result<u32> {
        let max_doc = reader.num_docs();
        let mut merged = 0u32;
        let mut doc = 0u32;

        while doc < max_doc {
            let is_live = match live_docs {
                Some(lv) => lv.get(doc as usize)?,
                None => true,
            };
            if !is_live {
                doc += 1;
                continue;
            }

            if field_numbers_congruent {
                let start = doc;
                let mut count = 0u32;
                while doc < max_doc && count < MAX_RAW_MERGE_DOCS {
                    let still_live = match live_docs {
                        Some(lv) => lv.get(doc as usize)?,
                        None => true,
                    };
                    if !still_live {
                        break;
                    }
                    doc += 1;
                    count += 1;
                }
                self.copy_raw_range(reader, start, count)?;
                merged += count;
                check_abort.work(300.0 * count as f64)?;
            } else {
                let mut visitor = CollectAllVisitor::default();
                reader.document(doc, &mut visitor)?;
                self.start_document(visitor.fields.len() as u32)?;
                for (field, value) in visitor.fields.drain(..) {
                    self.write_field(field, &value)?;
                }
                doc += 1;
                merged += 1;
                check_abort.work(300.0)?;
            }
        }

        Ok(merged)
    }

    /// Validates the `fdx` stream came out to exactly `header +
    /// 8*num_docs` bytes (a mismatch is corruption, not a recoverable
    /// state) and returns the two underlying outputs.
    pub fn finish(self, _field_infos: &FieldInfos, num_docs: u32) -> Result<(X, O)> {
        if self.num_docs != num_docs {
            return Err(Error::corrupt(format!(
                "expected {num_docs} documents, wrote {}",
                self.num_docs
            )));
        }
        let expected_len = self.fdx_header_len + 8 * num_docs as u64;
        if self.fdx.position() != expected_len {
            return Err(Error::corrupt("fdx length does not equal header + 8*numDocs"));
        }
        Ok((self.fdx, self.fdt))
    }

    /// Best-effort abandonment: drops the writer without validating
    /// anything. Callers backed by real files own deleting the
    /// now-incomplete `fdt`/`fdx` paths.
    pub fn abort(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{ByteArrayDataInput, ByteArrayDataOutput};
    use crate::storedfields::reader::StoredFieldsReader;

    #[test]
    fn finish_rejects_a_document_missing_fields() {
        let mut writer = StoredFieldsWriter::new(ByteArrayDataOutput::new(), ByteArrayDataOutput::new()).unwrap();
        writer.start_document(2).unwrap();
        writer.write_field(FieldNumber::new(0), &StoredFieldValue::Int32(1)).unwrap();
        let infos = FieldInfos::new();
        assert!(writer.start_document(1).is_err());
        let _ = infos;
    }

    #[test]
    fn finish_rejects_doc_count_mismatch() {
        let mut writer = StoredFieldsWriter::new(ByteArrayDataOutput::new(), ByteArrayDataOutput::new()).unwrap();
        writer.start_document(0).unwrap();
        let infos = FieldInfos::new();
        assert!(writer.finish(&infos, 2).is_err());
    }

    #[test]
    fn merge_with_congruent_numbering_bulk_copies() {
        let mut infos = FieldInfos::new();
        let title = infos.add("title");

        let mut src = StoredFieldsWriter::new(ByteArrayDataOutput::new(), ByteArrayDataOutput::new()).unwrap();
        for text in ["a", "b", "c"] {
            src.start_document(1).unwrap();
            src.write_field(title, &StoredFieldValue::String(text.into())).unwrap();
        }
        let (fdx, fdt) = src.finish(&infos, 3).unwrap();
        let fdx_bytes = fdx.into_bytes();
        let fdt_bytes = fdt.into_bytes();

        let mut live = BitVector::new(3);
        live.set(0).unwrap();
        live.set(2).unwrap();

        let mut reader =
            StoredFieldsReader::open(ByteArrayDataInput::new(&fdx_bytes), ByteArrayDataInput::new(&fdt_bytes)).unwrap();

        let mut dst = StoredFieldsWriter::new(ByteArrayDataOutput::new(), ByteArrayDataOutput::new()).unwrap();
        let mut abort = NoopCheckAbort;
        let merged = dst.merge(&mut reader, Some(&live), true, &mut abort).unwrap();
        assert_eq!(merged, 2);
        let (dst_fdx, dst_fdt) = dst.finish(&infos, 2).unwrap();

        let dst_fdx_bytes = dst_fdx.into_bytes();
        let dst_fdt_bytes = dst_fdt.into_bytes();
        let mut check = StoredFieldsReader::open(
            ByteArrayDataInput::new(&dst_fdx_bytes),
            ByteArrayDataInput::new(&dst_fdt_bytes),
        )
        .unwrap();
        let mut visitor = CollectAllVisitor::default();
        check.document(0, &mut visitor).unwrap();
        assert_eq!(visitor.fields, vec![(title, StoredFieldValue::String("a".into()))]);
        let mut visitor = CollectAllVisitor::default();
        check.document(1, &mut visitor).unwrap();
        assert_eq!(visitor.fields, vec![(title, StoredFieldValue::String("c".into()))]);
    }
}
