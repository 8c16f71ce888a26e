mod common;

use common::FitBuilder;
use freewheel::sans::{
    Checksum, Decoder, Error, Options,
    check::compute_crc,
    cursor::Cursor,
    header::{FileHeader, HeaderError, parse_footer, parse_header},
};

#[test]
fn parse_extended_header() {
    let bytes = FitBuilder::new().header(1234);
    let mut cursor = Cursor::new(&bytes[..]);
    let header = parse_header(&mut cursor).unwrap();

    assert_eq!(header.header_length, 14);
    assert_eq!(header.protocol_version, 0x10);
    assert_eq!(header.profile_version, 2132);
    assert_eq!(header.data_length, 1234);
    assert_eq!(header.crc, Some(compute_crc(0, &bytes[..12])));
    assert_eq!(cursor.consumed(), 14);
}

#[test]
fn parse_short_header() {
    let bytes = FitBuilder::new().short_header().header(7);
    let header = parse_header(&mut Cursor::new(&bytes[..])).unwrap();

    assert_eq!(header.header_length, 12);
    assert_eq!(header.data_length, 7);
    assert_eq!(header.crc, None);
}

#[test]
fn header_round_trip() {
    for bytes in [
        FitBuilder::new().header(0xDEAD_BEEF),
        FitBuilder::new().zero_header_crc().header(99),
        FitBuilder::new().short_header().header(0),
    ] {
        let header = parse_header(&mut Cursor::new(&bytes[..])).unwrap();
        assert_eq!(header.to_bytes(), bytes);
    }
}

#[test]
fn calculated_header_crc() {
    let bytes = FitBuilder::new().header(42);
    let header = parse_header(&mut Cursor::new(&bytes[..])).unwrap();
    assert_eq!(header.crc, Some(header.calculated_crc()));
}

#[test]
fn bad_magic_stops_parsing() {
    let mut bytes = FitBuilder::new().header(0);
    bytes[8..12].copy_from_slice(b".XYZ");

    let mut cursor = Cursor::new(&bytes[..]);
    let err = parse_header(&mut cursor).unwrap_err();

    assert!(matches!(
        err,
        Error::Header(HeaderError::BadMagic(magic)) if &magic == b".XYZ"
    ));
    assert_eq!(cursor.consumed(), 12);
}

#[test]
fn bad_header_length() {
    let mut bytes = FitBuilder::new().header(0);
    bytes[0] = 13;

    let err = parse_header(&mut Cursor::new(&bytes[..])).unwrap_err();
    assert!(matches!(err, Error::Header(HeaderError::BadHeaderLength(13))));
}

#[test]
fn truncated_header() {
    let bytes = FitBuilder::new().header(0);

    let err = parse_header(&mut Cursor::new(&bytes[..9])).unwrap_err();
    assert!(matches!(
        err,
        Error::TruncatedInput {
            requested: 12,
            offset: 0
        }
    ));

    let err = parse_header(&mut Cursor::new(&bytes[..13])).unwrap_err();
    assert!(matches!(
        err,
        Error::TruncatedInput {
            requested: 2,
            offset: 12
        }
    ));
}

#[test]
fn parse_footer_crc() {
    let bytes = [0x34, 0x12];
    let footer = parse_footer(&mut Cursor::new(&bytes[..])).unwrap();
    assert_eq!(footer.crc, 0x1234);

    let err = parse_footer(&mut Cursor::new(&bytes[..1])).unwrap_err();
    assert!(matches!(err, Error::TruncatedInput { requested: 2, .. }));
}

#[test]
fn empty_document() {
    let bytes = FitBuilder::new().build();
    assert_eq!(bytes.len(), 16);

    let mut decoder = Decoder::new(&bytes[..]).unwrap();
    assert!(decoder.is_done());
    assert!(decoder.next_message().unwrap().is_none());

    let footer = decoder.finish().unwrap();
    assert_eq!(footer.crc, compute_crc(0, &bytes[..14]));
}

#[test]
fn verify_header_crc() {
    let options = Options::default().with_checksum(Checksum::Verify);

    let bytes = FitBuilder::new().build();
    Decoder::with_options(&bytes[..], options).unwrap();

    // Headers written without a CRC are accepted.
    let bytes = FitBuilder::new().zero_header_crc().build();
    Decoder::with_options(&bytes[..], options).unwrap();

    let mut bytes = FitBuilder::new().build();
    bytes[12] ^= 0xFF;

    let err = Decoder::with_options(&bytes[..], options).unwrap_err();
    assert!(matches!(err, Error::ChecksumMismatch { .. }));

    // Without verification, the wrong CRC is only reported.
    let decoder = Decoder::new(&bytes[..]).unwrap();
    let header: &FileHeader = decoder.header();
    assert_ne!(header.crc, Some(header.calculated_crc()));
}

#[test]
fn header_error_messages() {
    let err = Error::from(HeaderError::BadHeaderLength(13));
    assert_eq!(
        err.to_string(),
        "Incorrect file header: Unknown header length (13)."
    );

    let err = HeaderError::BadMagic(*b"FIT.");
    assert!(err.to_string().starts_with("Incorrect file type marker"));
}
