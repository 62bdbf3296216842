use std::fmt;

#[derive(Debug)]
pub enum ErrorKind {
    Io,
    Parse,
    NotFound,
    InvalidArgument,
    Internal,
    InvalidInput,
    OutOfMemory,
    InvalidState,
    UnsupportedQuery,
    /// Checksum mismatch, bad magic, out-of-range version, or a framing
    /// length mismatch (e.g. `fdx` size != header + 8*numDocs).
    Corrupt,
    /// Codec footer checksum did not match the recomputed checksum.
    ChecksumMismatch,
    /// Stream ended before the expected payload was fully read.
    UnexpectedEof,
    /// A value exceeded `2^bitsPerValue` for a `PackedInts::Mutable::set`.
    ValueTooLarge,
    /// Programmer error: index outside `[0, len)` on a core API.
    IndexOutOfRange,
    /// Merge or write was cancelled via a `CheckAbort` callback.
    Aborted,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: String) -> Self {
        Error { kind, context }
    }

    pub fn corrupt(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Corrupt, context.into())
    }

    pub fn index_out_of_range(index: impl fmt::Display, len: impl fmt::Display) -> Self {
        Error::new(
            ErrorKind::IndexOutOfRange,
            format!("index {} out of range (len {})", index, len),
        )
    }

    pub fn value_too_large(value: u64, bits_per_value: u32) -> Self {
        Error::new(
            ErrorKind::ValueTooLarge,
            format!("value {} does not fit in {} bits", value, bits_per_value),
        )
    }

    pub fn invalid_state(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::InvalidState, context.into())
    }

    pub fn aborted(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Aborted, context.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            return Error {
                kind: ErrorKind::UnexpectedEof,
                context: err.to_string(),
            };
        }
        Error {
            kind: ErrorKind::Io,
            context: err.to_string(),
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error {
            kind: ErrorKind::Parse,
            context: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
