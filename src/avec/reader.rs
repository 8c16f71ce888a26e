//! Reader-based decoder implementation.
//!
//! _Requires Cargo feature `std`._

use std::io::Read;

use crate::sans::{Decoder, Error, Options, cursor::Reader};

use super::{BasicProfile, Document, FromRecords, Profile, collect, publish};

/// Decode records from a reader of a document, publishing to a receiver.
///
/// Records are assembled with the [`BasicProfile`] and default [`Options`].
/// The document CRC can only be verified once every record has been read, so
/// with [`Checksum::Verify`](crate::sans::Checksum::Verify) records of a
/// corrupt document may already have been published when the error is
/// returned.
///
/// This method is also re-exported as `freewheel::avec::decode_reader`.
///
/// _Requires Cargo feature `std`._
pub fn decode(r: &mut impl Read, o: &mut impl FromRecords) -> Result<(), Error> {
    decode_with(r, &BasicProfile, Options::default(), o)
}

pub fn decode_with<P: Profile + ?Sized>(
    r: &mut impl Read,
    profile: &P,
    options: Options,
    o: &mut impl FromRecords,
) -> Result<(), Error> {
    publish(Decoder::with_options(Reader(r), options)?, profile, o)?;
    Ok(())
}

/// Decode a reader of a document into a [`Document`].
///
/// This method is also re-exported as `freewheel::avec::read_reader`.
pub fn read(r: &mut impl Read) -> Result<Document, Error> {
    read_with(r, &BasicProfile, Options::default())
}

pub fn read_with<P: Profile + ?Sized>(
    r: &mut impl Read,
    profile: &P,
    options: Options,
) -> Result<Document, Error> {
    collect(Decoder::with_options(Reader(r), options)?, profile)
}
