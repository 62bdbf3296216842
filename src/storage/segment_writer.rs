use std::fs::File;

use crate::core::error::Result;
use crate::io::{FileDataInput, FileDataOutput};
use crate::storage::layout::StorageLayout;
use crate::storage::segment::{SegmentId, SegmentInfo};
use crate::storedfields::reader::StoredFieldsReader;
use crate::storedfields::writer::{CheckAbort, StoredFieldsWriter};
use crate::storedfields::{FieldInfos, StoredFieldValue};

/// Builds one segment: a `FieldInfos` table, an `fdt`/`fdx` pair written
/// through [`StoredFieldsWriter`], and (on [`Self::finish`]) a `.si`
/// metadata file and a `.fnm` field-table file next to them.
pub struct SegmentWriter {
    id: SegmentId,
    field_infos: FieldInfos,
    writer: StoredFieldsWriter<FileDataOutput, FileDataOutput>,
    doc_count: u32,
}

impl SegmentWriter {
    pub fn new(storage: &StorageLayout, segment_id: SegmentId) -> Result<Self> {
        let fdx = FileDataOutput::new(File::create(storage.fields_index_path(&segment_id))?);
        let fdt = FileDataOutput::new(File::create(storage.fields_data_path(&segment_id))?);
        let writer = StoredFieldsWriter::new(fdx, fdt)?;
        Ok(SegmentWriter {
            id: segment_id,
            field_infos: FieldInfos::new(),
            writer,
            doc_count: 0,
        })
    }

    pub fn doc_count(&self) -> u32 {
        self.doc_count
    }

    pub fn add_document(&mut self, fields: &[(&str, StoredFieldValue)]) -> Result<()> {
        self.writer.start_document(fields.len() as u32)?;
        for (name, value) in fields {
            let number = self.field_infos.add(*name);
            self.writer.write_field(number, value)?;
        }
        self.doc_count += 1;
        Ok(())
    }

    /// Bulk-absorbs every live document of `other` into this segment,
    /// used by segment merging.
    pub fn merge_from(
        &mut self,
        other: &mut StoredFieldsReader<FileDataInput>,
        live_docs: Option<&crate::bitvector::BitVector>,
        field_numbers_congruent: bool,
        check_abort: &mut dyn CheckAbort,
    ) -> Result<u32> {
        let merged = self.writer.merge(other, live_docs, field_numbers_congruent, check_abort)?;
        self.doc_count += merged;
        Ok(merged)
    }

    pub fn finish(self, storage: &StorageLayout) -> Result<SegmentInfo> {
        let (mut fdx, mut fdt) = self.writer.finish(&self.field_infos, self.doc_count)?;
        fdx.sync_all()?;
        fdt.sync_all()?;

        let field_bytes = bincode::serialize(&self.field_infos)?;
        std::fs::write(storage.field_infos_path(&self.id), field_bytes)?;

        let info = SegmentInfo::new(self.id, self.doc_count);
        let info_bytes = bincode::serialize(&info)?;
        std::fs::write(storage.segment_info_path(&self.id), info_bytes)?;

        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::segment_reader::SegmentReader;
    use crate::storedfields::reader::{CollectAllVisitor, StoredFieldVisitor, VisitStatus};

    fn scratch_dir(label: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("drusdenx-core-test-{label}-{}", uuid::Uuid::new_v4()));
        dir
    }

    #[test]
    fn write_then_read_back_a_segment() {
        let base = scratch_dir("segment-roundtrip");
        let storage = StorageLayout::new(base.clone()).unwrap();
        let id = SegmentId::new();

        let mut writer = SegmentWriter::new(&storage, id).unwrap();
        writer
            .add_document(&[("title", StoredFieldValue::String("hello".into()))])
            .unwrap();
        writer
            .add_document(&[("title", StoredFieldValue::String("world".into()))])
            .unwrap();
        let info = writer.finish(&storage).unwrap();
        assert_eq!(info.doc_count, 2);

        let mut reader = SegmentReader::open(&storage, id).unwrap();
        assert_eq!(reader.doc_count(), 2);
        let mut visitor = CollectAllVisitor::default();
        reader.document(0, &mut visitor).unwrap();
        assert_eq!(visitor.fields.len(), 1);

        struct StopImmediately;
        impl StoredFieldVisitor for StopImmediately {
            fn needs_field(&mut self, _field: crate::core::types::FieldNumber) -> VisitStatus {
                VisitStatus::Stop
            }
            fn value(&mut self, _field: crate::core::types::FieldNumber, _value: StoredFieldValue) {}
        }
        reader.document(1, &mut StopImmediately).unwrap();
    }
}
