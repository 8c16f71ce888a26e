#![no_std]

//! A decoder for Garmin's Flexible and Interoperable Data Transfer protocol.
//!
//! Freewheel turns a FIT document into a sequence of typed records. Decoding
//! happens in two layers:
//!
//! - [`sans`] holds the protocol engine: a byte cursor, the base type table and
//! field decoder, file header and footer parsing, and the message stream
//! state machine yielding definition and data messages.
//!
//! - [`avec`] holds the convenience layer: the record assembler applying
//! cross-field rewrites (timestamps, manufacturer-specific products), the
//! profile collaborator it consults, and functions driving a whole document
//! into a receiver.
//!
//! Most users should begin with the functions and derive macros in the [`avec`]
//! module. If these prove insufficient, drive a [`sans::Decoder`] directly.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable derive macros (default).
//! - `std`: enable reader-based decoder (default).

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod avec;
pub mod sans;
