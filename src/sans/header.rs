//! Document header and footer.

use alloc::vec::Vec;

use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
    byteorder::little_endian::{U16, U32},
};

use super::{
    Error,
    check::compute_crc,
    cursor::{Cursor, Source},
};

/// Filetype marker carried by every document.
pub const MAGIC: [u8; 4] = *b".FIT";

/// An error decoding a document header.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HeaderError {
    /// Incorrect filetype marker.
    #[error("Incorrect file type marker ({0:?}).")]
    BadMagic([u8; 4]),
    /// Unknown header length.
    #[error("Unknown header length ({0}).")]
    BadHeaderLength(u8),
}

/// The fixed twelve-byte prefix of every header.
#[repr(C)]
#[derive(FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
struct RawHeader {
    header_length: u8,
    protocol_version: u8,
    profile_version: U16,
    data_length: U32,
    magic: [u8; 4],
}

/// A decoded document header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Either 12, or 14 for headers carrying a CRC.
    pub header_length: u8,
    pub protocol_version: u8,
    pub profile_version: u16,
    /// Number of record bytes between the header and the footer.
    pub data_length: u32,
    /// Present if and only if the header is 14 bytes long.
    pub crc: Option<u16>,
}

impl FileHeader {
    /// Encode the header as found in a document.
    pub fn to_bytes(&self) -> Vec<u8> {
        let raw = RawHeader {
            header_length: self.header_length,
            protocol_version: self.protocol_version,
            profile_version: U16::new(self.profile_version),
            data_length: U32::new(self.data_length),
            magic: MAGIC,
        };

        let mut bytes = Vec::from(raw.as_bytes());
        if let Some(crc) = self.crc {
            bytes.extend_from_slice(&crc.to_le_bytes());
        }

        bytes
    }

    /// Cyclic redundancy check over the first twelve header bytes, for
    /// comparison with [`FileHeader::crc`].
    pub fn calculated_crc(&self) -> u16 {
        compute_crc(0, &self.to_bytes()[..12])
    }
}

/// Decode a document header.
///
/// The filetype marker is checked before anything else.
pub fn parse_header<S: Source>(cursor: &mut Cursor<S>) -> Result<FileHeader, Error> {
    let RawHeader {
        header_length,
        protocol_version,
        profile_version,
        data_length,
        magic,
    } = zerocopy::transmute!(cursor.read_array::<12>()?);

    if magic != MAGIC {
        Err(HeaderError::BadMagic(magic))?;
    }

    let crc = match header_length {
        12 => None,
        14 => Some(u16::from_le_bytes(cursor.read_array()?)),
        _ => Err(HeaderError::BadHeaderLength(header_length))?,
    };

    Ok(FileHeader {
        header_length,
        protocol_version,
        profile_version: profile_version.get(),
        data_length: data_length.get(),
        crc,
    })
}

/// A decoded document footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    pub crc: u16,
}

pub fn parse_footer<S: Source>(cursor: &mut Cursor<S>) -> Result<Footer, Error> {
    let crc = u16::from_le_bytes(cursor.read_array()?);
    Ok(Footer { crc })
}
