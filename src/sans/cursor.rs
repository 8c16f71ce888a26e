//! Sequential reads over a source of document bytes.

use alloc::{string::String, vec, vec::Vec};

use super::{Error, check::compute_crc};

/// Byte order of multi-byte values in a message.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl Endianness {
    /// Interpret the architecture byte of a definition message.
    pub fn from_architecture(architecture: u8) -> Self {
        if architecture == 0 {
            Self::Little
        } else {
            Self::Big
        }
    }
}

/// A source of document bytes, consumed in a single pass.
pub trait Source {
    /// Fill `buf` completely.
    ///
    /// Returns `false` if the source ran out of bytes first, in which case the
    /// contents of `buf` are unspecified.
    fn fill(&mut self, buf: &mut [u8]) -> Result<bool, Error>;
}

impl Source for &[u8] {
    fn fill(&mut self, buf: &mut [u8]) -> Result<bool, Error> {
        let Some((head, tail)) = self.split_at_checked(buf.len()) else {
            *self = &[];
            return Ok(false);
        };

        buf.copy_from_slice(head);
        *self = tail;

        Ok(true)
    }
}

impl<S: Source + ?Sized> Source for &mut S {
    fn fill(&mut self, buf: &mut [u8]) -> Result<bool, Error> {
        (**self).fill(buf)
    }
}

/// Adapter sourcing bytes from a reader.
///
/// _Requires Cargo feature `std`._
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct Reader<R>(pub R);

#[cfg(feature = "std")]
impl<R: std::io::Read> Source for Reader<R> {
    fn fill(&mut self, buf: &mut [u8]) -> Result<bool, Error> {
        use std::io::ErrorKind;

        match self.0.read_exact(buf) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => Ok(false),
            Err(err) => Err(Error::Io(alloc::boxed::Box::new(err))),
        }
    }
}

/// Reader over a [`Source`], counting consumed bytes and accumulating their
/// cyclic redundancy check.
#[derive(Debug)]
pub struct Cursor<S> {
    source: S,
    consumed: usize,
    crc: u16,
}

impl<S: Source> Cursor<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            consumed: 0,
            crc: 0,
        }
    }

    /// Total number of bytes of completed reads. A read cut short by the end
    /// of input counts none of its bytes.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Cyclic redundancy check over all bytes read so far.
    pub fn crc(&self) -> u16 {
        self.crc
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    /// Take an exact number of bytes.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut buf = [0; N];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, Error> {
        let mut buf = vec![0; n];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// Read an unsigned integer `width` bytes wide.
    ///
    /// # Panics
    ///
    /// Panics if `width` is greater than eight.
    pub fn read_uint(&mut self, width: usize, endianness: Endianness) -> Result<u64, Error> {
        let mut buf = [0; 8];
        let bytes = &mut buf[..width];
        self.fill(bytes)?;

        let shift = |acc: u64, b: &u8| (acc << 8) | u64::from(*b);

        Ok(match endianness {
            Endianness::Little => bytes.iter().rev().fold(0, shift),
            Endianness::Big => bytes.iter().fold(0, shift),
        })
    }

    /// Read a fixed-length, NUL-padded string.
    ///
    /// Trailing NUL bytes are trimmed. Invalid UTF-8 sequences are replaced
    /// rather than rejected.
    pub fn read_string(&mut self, n: usize) -> Result<String, Error> {
        let bytes = self.read_bytes(n)?;
        let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        if !self.source.fill(buf)? {
            Err(Error::TruncatedInput {
                requested: buf.len(),
                offset: self.consumed,
            })?;
        }

        self.consumed += buf.len();
        self.crc = compute_crc(self.crc, buf);

        Ok(())
    }
}
