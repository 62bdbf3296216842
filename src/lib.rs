//! Core index storage and query subsystem: stored-fields codec, deletion
//! bit-vector codec, packed-integer arrays, a finite-state automaton core,
//! and a tolerant query tokenizer, built on a shared checksummed byte-stream
//! framing.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                         MODULE LAYOUT                              │
//! └────────────────────────────────────────────────────────────────────┘
//!
//! core        error, config, and document/field id types shared by
//!             every other module.
//!
//! io          DataInput/DataOutput byte-stream traits, vint encoding,
//!             byte-array and file-backed implementations.
//!
//! checksum    codec header/footer framing and the ChecksumData{Input,
//!             Output} wrappers every on-disk format sits behind.
//!
//! packed      fixed bit-width packed integer arrays (Direct8/16/32/64,
//!             Packed64, Packed64SingleBlock) plus paged/growable
//!             variants, with their own framed on-disk format.
//!
//! bitvector   packed bit set with cached popcount and a self-chosen
//!             sparse (d-gaps) vs dense on-disk encoding, used for the
//!             live/deleted-document set.
//!
//! automaton   arena-indexed mutable NFA/DFA: construction, combinators
//!             (union, intersection, concatenate, ...), determinize,
//!             minimize, and a Levenshtein fuzzy-matching automaton.
//!
//! storedfields per-document field values (fdt/fdx codec): FieldInfos,
//!             StoredFieldsWriter/Reader.
//!
//! tokenizer   tolerant query-string lexer producing a doubly-linked
//!             token sequence, used ahead of query parsing proper.
//!
//! storage     segment identity and layout tying the codecs above
//!             together into an on-disk segment.
//! ```

pub mod automaton;
pub mod bitvector;
pub mod checksum;
pub mod core;
pub mod io;
pub mod packed;
pub mod storage;
pub mod storedfields;
pub mod tokenizer;
