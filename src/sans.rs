//! Protocol engine for decoding FIT documents.
//!
//! This module is intended for applications that need fine control over the
//! decoding process. See [`crate::avec`] for functions covering common
//! decoding patterns.
//!
//! # Architecture
//!
//! A [`Decoder`] owns a single decoding session. It reads the document header
//! on construction, then yields one [`Message`](message::Message) per call to
//! [`Decoder::next_message`] until the number of bytes declared by the header
//! has been consumed. The footer is read by [`Decoder::finish`].
//!
//! The decoder reads through a [`Cursor`](cursor::Cursor), which counts
//! consumed bytes and accumulates the running cyclic redundancy check. Any
//! [`Source`](cursor::Source) of bytes can back a cursor: slices are supported
//! directly, and readers through [`cursor::Reader`] (_requires Cargo feature
//! `std`_).
//!
//! Definition messages are stored in a table of sixteen slots, one per local
//! message type, owned by the decoder. A later definition for a local message
//! type replaces the earlier one. Data messages are decoded against the stored
//! definition, field by field, by [`field::decode_field`].
//!
//! Errors are not recoverable. Once a message fails to decode, the decoder
//! yields no further messages.

use alloc::boxed::Box;

use thiserror::Error;

pub mod check;
pub mod cursor;
pub mod decoder;
pub mod field;
pub mod header;
pub mod message;

pub use decoder::Decoder;

use field::{FieldError, FloatDecoding};
use header::HeaderError;

/// Errors occurring while decoding a document.
#[derive(Debug, Error)]
pub enum Error {
    /// Incorrect file header.
    #[error("Incorrect file header: {0}")]
    Header(#[from] HeaderError),
    /// Undecodable field.
    #[error("Undecodable field: {0}")]
    Field(#[from] FieldError),
    /// Fewer bytes remained than a read required. The offset counts only
    /// completed reads.
    #[error("Requested {requested} bytes at offset {offset}, beyond the end of input.")]
    TruncatedInput { requested: usize, offset: usize },
    /// Input ended before the declared number of record bytes were read.
    ///
    /// `consumed` counts record bytes of completed reads; bytes of the read
    /// cut short are not included.
    #[error("Input ended after {consumed} of {expected} record bytes.")]
    TruncatedStream { expected: u32, consumed: usize },
    /// A message extended past the declared number of record bytes.
    #[error("A message ended after {consumed} record bytes, past the declared {expected}.")]
    DataLengthExceeded { expected: u32, consumed: usize },
    /// A data message referenced a local message type with no definition.
    #[error("No definition for local message type {0}.")]
    UndefinedLocalMessageType(u8),
    /// Calculated and found CRC values do not match.
    #[error("Calculated ({calculated}) and found ({found}) CRC values do not match.")]
    ChecksumMismatch { found: u16, calculated: u16 },
    /// The session was used after an earlier error.
    #[error("Decoding was aborted by an earlier error.")]
    Aborted,
    /// An error from the underlying byte source.
    #[error("Error reading input: {0}")]
    Io(Box<dyn core::error::Error + Send + Sync>),
}

/// Whether cyclic redundancy checks are applied.
///
/// Regardless of the policy, CRC values found in the header and footer are
/// reported on [`header::FileHeader`] and [`header::Footer`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Checksum {
    /// Capture CRC values without verifying them.
    #[default]
    Ignore,
    /// Fail with [`Error::ChecksumMismatch`] if a CRC value is wrong. A header
    /// CRC of zero is treated as absent.
    Verify,
}

/// Options for a decoding session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub checksum: Checksum,
    pub floats: FloatDecoding,
}

impl Options {
    pub fn with_checksum(mut self, checksum: Checksum) -> Self {
        self.checksum = checksum;
        self
    }

    pub fn with_floats(mut self, floats: FloatDecoding) -> Self {
        self.floats = floats;
        self
    }
}
