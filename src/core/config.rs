use std::path::PathBuf;

/// Tunables for the four core subsystems. Segment-level writer/reader
/// concerns beyond these (batching, commit scheduling, segment caps) live
/// one layer up in the index writer this crate does not implement; see
/// DESIGN.md.
#[derive(Debug, Clone)]
pub struct Config {
    pub storage_path: PathBuf,

    /// `acceptableOverhead` passed to `PackedInts::create`, in `[0.0, 7.0]`.
    /// Higher trades RAM for faster bulk get/set.
    pub packed_ints_overhead: f32,

    /// When true, automaton-combining operations (`union`, `intersection`,
    /// `concatenate`, ...) run `minimize` before returning. Off by default;
    /// callers opt in per `AutomatonOps` handle rather than a global toggle.
    pub automaton_minimize_always: bool,

    /// Maximum number of contiguous live documents the stored-fields
    /// merge bulk-copies as one raw byte range.
    pub max_raw_merge_docs: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_path: PathBuf::from("./data"),
            packed_ints_overhead: 1.0,
            automaton_minimize_always: false,
            max_raw_merge_docs: 4192,
        }
    }
}
