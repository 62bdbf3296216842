use serde::{Deserialize, Serialize};

/// Document identifier, dense within `[0, maxDoc)` for a single segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub u32);

impl DocId {
    /// Sentinel terminating doc-id iteration.
    pub const NO_MORE_DOCS: DocId = DocId(i32::MAX as u32);

    pub fn new(id: u32) -> Self {
        DocId(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for DocId {
    fn from(id: u32) -> Self {
        DocId(id)
    }
}

/// Per-segment field number, bijective with the field name inside one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldNumber(pub u32);

impl FieldNumber {
    pub fn new(n: u32) -> Self {
        FieldNumber(n)
    }
}
