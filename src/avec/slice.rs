//! Slice-based decoder implementation.

use crate::sans::{
    Checksum, Decoder, Error, Options,
    check::{compute_crc, verify},
};

use super::{BasicProfile, Document, FromRecords, Profile, collect, publish};

/// Decode records from a slice of a document, publishing to a receiver.
///
/// Records are assembled with the [`BasicProfile`] and default [`Options`].
///
/// This method is also re-exported as `freewheel::avec::decode_slice`.
pub fn decode(r: &[u8], o: &mut impl FromRecords) -> Result<(), Error> {
    decode_with(r, &BasicProfile, Options::default(), o)
}

/// Decode records from a slice of a document with a profile and options,
/// publishing to a receiver.
///
/// When verifying checksums, the document CRC is checked before any record is
/// published.
pub fn decode_with<P: Profile + ?Sized>(
    r: &[u8],
    profile: &P,
    options: Options,
    o: &mut impl FromRecords,
) -> Result<(), Error> {
    let decoder = Decoder::with_options(r, options)?;

    if options.checksum == Checksum::Verify {
        check_document(r, &decoder)?;
    }

    publish(decoder, profile, o)?;
    Ok(())
}

/// Decode a slice of a document into a [`Document`].
///
/// This method is also re-exported as `freewheel::avec::read_slice`.
pub fn read(r: &[u8]) -> Result<Document, Error> {
    read_with(r, &BasicProfile, Options::default())
}

pub fn read_with<P: Profile + ?Sized>(
    r: &[u8],
    profile: &P,
    options: Options,
) -> Result<Document, Error> {
    let decoder = Decoder::with_options(r, options)?;

    if options.checksum == Checksum::Verify {
        check_document(r, &decoder)?;
    }

    collect(decoder, profile)
}

/// Apply the document's cyclic redundancy check ahead of decoding records.
fn check_document(r: &[u8], decoder: &Decoder<&[u8]>) -> Result<(), Error> {
    let header = decoder.header();
    let end = usize::from(header.header_length) + header.data_length as usize;

    let Some(records) = r.get(..end) else {
        return Err(Error::TruncatedStream {
            expected: header.data_length,
            consumed: r.len().saturating_sub(header.header_length.into()),
        });
    };

    let found = match r.get(end..end + 2) {
        Some(&[a, b]) => u16::from_le_bytes([a, b]),
        _ => Err(Error::TruncatedInput {
            requested: 2,
            offset: end,
        })?,
    };

    verify(found, compute_crc(0, records))
}
