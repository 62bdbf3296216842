use std::fs;
use std::path::PathBuf;

use crate::core::error::Result;
use crate::storage::segment::SegmentId;

/// Directory structure for data files.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub base_dir: PathBuf,
    pub segments_dir: PathBuf,
    pub idx_dir: PathBuf,
    pub wal_dir: PathBuf,
    pub meta_dir: PathBuf,
}

impl StorageLayout {
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        let segments_dir = base_dir.join("segments");
        let idx_dir = base_dir.join("idx");
        let wal_dir = base_dir.join("wal");
        let meta_dir = base_dir.join("meta");

        fs::create_dir_all(&segments_dir)?;
        fs::create_dir_all(&idx_dir)?;
        fs::create_dir_all(&wal_dir)?;
        fs::create_dir_all(&meta_dir)?;

        Ok(StorageLayout {
            base_dir,
            segments_dir,
            idx_dir,
            wal_dir,
            meta_dir,
        })
    }

    pub fn fields_data_path(&self, id: &SegmentId) -> PathBuf {
        self.segments_dir.join(format!("{}.fdt", id.0))
    }

    pub fn fields_index_path(&self, id: &SegmentId) -> PathBuf {
        self.segments_dir.join(format!("{}.fdx", id.0))
    }

    pub fn field_infos_path(&self, id: &SegmentId) -> PathBuf {
        self.segments_dir.join(format!("{}.fnm", id.0))
    }

    pub fn deletions_path(&self, id: &SegmentId) -> PathBuf {
        self.segments_dir.join(format!("{}.del", id.0))
    }

    pub fn segment_info_path(&self, id: &SegmentId) -> PathBuf {
        self.segments_dir.join(format!("{}.si", id.0))
    }

    /// Reserved for a future on-disk term dictionary / automaton index;
    /// no writer targets this path yet.
    pub fn index_path(&self, id: &SegmentId) -> PathBuf {
        self.idx_dir.join(format!("{}.idx", id.0))
    }

    pub fn wal_path(&self, sequence: u64) -> PathBuf {
        self.wal_dir.join(format!("wal_{:08}.log", sequence))
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.meta_dir.join("checkpoint.bin")
    }

    pub fn wal_dir(&self) -> &PathBuf {
        &self.wal_dir
    }
}
