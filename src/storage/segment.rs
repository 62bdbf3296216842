use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique segment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId(pub Uuid);

impl SegmentId {
    pub fn new() -> Self {
        SegmentId(Uuid::new_v4())
    }
}

impl Default for SegmentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Segment-level metadata persisted as its own small file (`.si`)
/// alongside the segment's `fdt`/`fdx`/`fnm`/`del` files, rather than as
/// a fixed-size header prefixing a single blob — a segment here is a
/// directory of cooperating files, not one file with a jump table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub id: SegmentId,
    pub doc_count: u32,
    pub created_at: DateTime<Utc>,
    pub has_deletions: bool,
}

impl SegmentInfo {
    pub fn new(id: SegmentId, doc_count: u32) -> Self {
        SegmentInfo {
            id,
            doc_count,
            created_at: Utc::now(),
            has_deletions: false,
        }
    }
}
