use std::fs::File;

use crate::bitvector::BitVector;
use crate::core::error::Result;
use crate::core::types::FieldNumber;
use crate::io::{ByteArrayDataInput, ByteArrayDataOutput, FileDataInput};
use crate::storage::layout::StorageLayout;
use crate::storage::segment::{SegmentId, SegmentInfo};
use crate::storedfields::reader::{StoredFieldVisitor, StoredFieldsReader};
use crate::storedfields::FieldInfos;

/// Opens a segment's `.si`/`.fnm`/`fdt`/`fdx` files, plus its `.del`
/// deletion bit-vector if one was ever written, and serves per-document
/// reads through the stored-fields codec.
pub struct SegmentReader {
    id: SegmentId,
    info: SegmentInfo,
    field_infos: FieldInfos,
    stored_fields: StoredFieldsReader<FileDataInput>,
    live_docs: Option<BitVector>,
}

impl SegmentReader {
    pub fn open(storage: &StorageLayout, segment_id: SegmentId) -> Result<Self> {
        let info_bytes = std::fs::read(storage.segment_info_path(&segment_id))?;
        let info: SegmentInfo = bincode::deserialize(&info_bytes)?;

        let field_bytes = std::fs::read(storage.field_infos_path(&segment_id))?;
        let field_infos: FieldInfos = bincode::deserialize(&field_bytes)?;

        let fdx = FileDataInput::new(File::open(storage.fields_index_path(&segment_id))?)?;
        let fdt = FileDataInput::new(File::open(storage.fields_data_path(&segment_id))?)?;
        let stored_fields = StoredFieldsReader::open(fdx, fdt)?;

        let live_docs = if info.has_deletions {
            let bytes = std::fs::read(storage.deletions_path(&segment_id))?;
            let mut input = ByteArrayDataInput::new(&bytes);
            Some(BitVector::read(&mut input)?)
        } else {
            None
        };

        Ok(SegmentReader {
            id: segment_id,
            info,
            field_infos,
            stored_fields,
            live_docs,
        })
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn doc_count(&self) -> u32 {
        self.info.doc_count
    }

    pub fn field_infos(&self) -> &FieldInfos {
        &self.field_infos
    }

    pub fn is_live(&self, doc_id: u32) -> Result<bool> {
        match &self.live_docs {
            Some(lv) => lv.get(doc_id as usize),
            None => Ok(true),
        }
    }

    pub fn stored_fields(&mut self) -> &mut StoredFieldsReader<FileDataInput> {
        &mut self.stored_fields
    }

    pub fn document(&mut self, doc_id: u32, visitor: &mut dyn StoredFieldVisitor) -> Result<()> {
        self.stored_fields.document(doc_id, visitor)
    }

    /// Marks `doc_id` as deleted, materializing an all-live bit-vector
    /// first if this segment had no deletions yet, then rewrites the
    /// `.del` file and flips `SegmentInfo::has_deletions`.
    pub fn delete(&mut self, storage: &StorageLayout, doc_id: u32) -> Result<()> {
        let mut live = match self.live_docs.take() {
            Some(live) => live,
            None => {
                let mut all_live = BitVector::new(self.info.doc_count as usize);
                all_live.set_all();
                all_live
            }
        };
        live.clear(doc_id as usize)?;

        let mut out = ByteArrayDataOutput::new();
        live.write(&mut out)?;
        std::fs::write(storage.deletions_path(&self.id), out.into_bytes())?;

        self.live_docs = Some(live);
        self.info.has_deletions = true;
        std::fs::write(storage.segment_info_path(&self.id), bincode::serialize(&self.info)?)?;
        Ok(())
    }

    /// Number of field-number-bearing records owned by this segment;
    /// used by merge to decide whether two segments' field numbering is
    /// congruent.
    pub fn field_count(&self) -> usize {
        self.field_infos.len()
    }

    pub fn field_number(&self, name: &str) -> Option<FieldNumber> {
        self.field_infos.number_of(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::segment_writer::SegmentWriter;
    use crate::storedfields::StoredFieldValue;

    fn scratch_dir(label: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("drusdenx-core-test-{label}-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn delete_marks_a_document_not_live() {
        let base = scratch_dir("segment-delete");
        let storage = StorageLayout::new(base).unwrap();
        let id = SegmentId::new();

        let mut writer = SegmentWriter::new(&storage, id).unwrap();
        writer.add_document(&[("title", StoredFieldValue::String("a".into()))]).unwrap();
        writer.add_document(&[("title", StoredFieldValue::String("b".into()))]).unwrap();
        writer.finish(&storage).unwrap();

        let mut reader = SegmentReader::open(&storage, id).unwrap();
        assert!(reader.is_live(0).unwrap());
        assert!(reader.is_live(1).unwrap());

        reader.delete(&storage, 0).unwrap();
        assert!(!reader.is_live(0).unwrap());
        assert!(reader.is_live(1).unwrap());

        let reopened = SegmentReader::open(&storage, id).unwrap();
        assert!(!reopened.is_live(0).unwrap());
        assert!(reopened.is_live(1).unwrap());
    }
}
