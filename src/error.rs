//! Error taxonomy shared by every layer of the engine.
//!
//! Stream and bit-level failures surface as [`Error::OutOfBounds`] and are
//! propagated unchanged by the decoders built on top of them.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A byte or bit read/seek ran past the available data.  Never partially
    /// applied: the reader that raised it is in its pre-call state.
    #[error("Out of bounds: {wanted} at offset {pos} exceeds size {size}")]
    OutOfBounds { pos: u64, wanted: u64, size: u64 },
    /// Header fields that contradict each other or the input size.
    #[error("Malformed data: {0}")]
    MalformedData(String),
    /// Recognized format, deliberately unimplemented variant.
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),
    #[error("No registered format recognizes this input")]
    UnrecognizedFormat,
    #[error("Unknown format: {0}")]
    UnknownFormat(String),
    #[error("Format registered twice: {0}")]
    DuplicateFormat(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedData(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Error::UnsupportedFeature(msg.into())
    }

    /// True for the bounds family of failures.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Error::OutOfBounds { .. })
    }
}
