//! Base types and field value decoding.

use alloc::{string::String, vec::Vec};
use core::fmt;

use zerocopy::TryFromBytes;

use super::{
    Error,
    cursor::{Cursor, Endianness, Source},
};

/// An error decoding a field.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FieldError {
    /// Unknown base type code.
    #[error("Unknown base type ({0:#04x}).")]
    UnknownBaseType(u8),
    /// Field size is not a multiple of its base type's width.
    #[error("Field size ({size}) is not a multiple of the width of {base_type}.")]
    InvalidFieldSize { size: u8, base_type: BaseType },
}

/// Primitive wire encoding of a field.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromBytes)]
pub enum BaseType {
    Enum = 0x00,
    Sint8 = 0x01,
    Uint8 = 0x02,
    Sint16 = 0x83,
    Uint16 = 0x84,
    Sint32 = 0x85,
    Uint32 = 0x86,
    String = 0x07,
    Float32 = 0x88,
    Float64 = 0x89,
    Uint8z = 0x0A,
    Uint16z = 0x8B,
    Uint32z = 0x8C,
    Byte = 0x0D,
    Sint64 = 0x8E,
    Uint64 = 0x8F,
    Uint64z = 0x90,
}

impl BaseType {
    /// Resolve a base type code from a field definition.
    pub fn from_code(code: u8) -> Result<Self, FieldError> {
        zerocopy::try_transmute!(code).map_err(|_| FieldError::UnknownBaseType(code))
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Width in bytes of a single value.
    pub fn width(self) -> u8 {
        match self {
            Self::Enum | Self::Sint8 | Self::Uint8 | Self::Uint8z => 1,
            Self::String | Self::Byte => 1,
            Self::Sint16 | Self::Uint16 | Self::Uint16z => 2,
            Self::Sint32 | Self::Uint32 | Self::Uint32z | Self::Float32 => 4,
            Self::Sint64 | Self::Uint64 | Self::Uint64z | Self::Float64 => 8,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Self::Sint8 | Self::Sint16 | Self::Sint32 | Self::Sint64
        )
    }

    /// Bit pattern marking a value of this type as invalid (absent).
    pub fn invalid(self) -> u64 {
        match self {
            Self::Enum | Self::Uint8 | Self::Byte => 0xFF,
            Self::Sint8 => 0x7F,
            Self::Sint16 => 0x7FFF,
            Self::Uint16 => 0xFFFF,
            Self::Sint32 => 0x7FFF_FFFF,
            Self::Uint32 | Self::Float32 => 0xFFFF_FFFF,
            Self::Sint64 => 0x7FFF_FFFF_FFFF_FFFF,
            Self::Uint64 | Self::Float64 => u64::MAX,
            Self::String | Self::Uint8z | Self::Uint16z | Self::Uint32z | Self::Uint64z => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Enum => "ENUM",
            Self::Sint8 => "SINT8",
            Self::Uint8 => "UINT8",
            Self::Sint16 => "SINT16",
            Self::Uint16 => "UINT16",
            Self::Sint32 => "SINT32",
            Self::Uint32 => "UINT32",
            Self::String => "STRING",
            Self::Float32 => "FLOAT32",
            Self::Float64 => "FLOAT64",
            Self::Uint8z => "UINT8Z",
            Self::Uint16z => "UINT16Z",
            Self::Uint32z => "UINT32Z",
            Self::Byte => "BYTE",
            Self::Sint64 => "SINT64",
            Self::Uint64 => "UINT64",
            Self::Uint64z => "UINT64Z",
        }
    }
}

impl TryFrom<u8> for BaseType {
    type Error = FieldError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Interpretation of `float32` and `float64` fields.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FloatDecoding {
    /// Decode the bits as a same-width unsigned integer ([`Scalar::U32`] or
    /// [`Scalar::U64`]), as established FIT tooling does.
    #[default]
    RawBits,
    /// Decode IEEE-754 values ([`Scalar::F32`] or [`Scalar::F64`]).
    Ieee754,
}

/// A single decoded value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Scalar {
    /// The value as an unsigned integer, if it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::U8(x) => Some(x.into()),
            Self::U16(x) => Some(x.into()),
            Self::U32(x) => Some(x.into()),
            Self::U64(x) => Some(x),
            Self::I8(x) => x.try_into().ok(),
            Self::I16(x) => x.try_into().ok(),
            Self::I32(x) => x.try_into().ok(),
            Self::I64(x) => x.try_into().ok(),
            Self::F32(_) | Self::F64(_) => None,
        }
    }

    /// The value's bit pattern, zero-extended.
    pub fn bits(&self) -> u64 {
        match *self {
            Self::U8(x) => x.into(),
            Self::I8(x) => (x as u8).into(),
            Self::U16(x) => x.into(),
            Self::I16(x) => (x as u16).into(),
            Self::U32(x) => x.into(),
            Self::I32(x) => (x as u32).into(),
            Self::U64(x) => x,
            Self::I64(x) => x as u64,
            Self::F32(x) => x.to_bits().into(),
            Self::F64(x) => x.to_bits(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8(x) => fmt::Display::fmt(x, f),
            Self::I8(x) => fmt::Display::fmt(x, f),
            Self::U16(x) => fmt::Display::fmt(x, f),
            Self::I16(x) => fmt::Display::fmt(x, f),
            Self::U32(x) => fmt::Display::fmt(x, f),
            Self::I32(x) => fmt::Display::fmt(x, f),
            Self::U64(x) => fmt::Display::fmt(x, f),
            Self::I64(x) => fmt::Display::fmt(x, f),
            Self::F32(x) => fmt::Display::fmt(x, f),
            Self::F64(x) => fmt::Display::fmt(x, f),
        }
    }
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    /// A field spanning several values of its base type.
    Array(Vec<Scalar>),
    String(String),
}

impl Value {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value holds the invalid marker of `base_type`.
    ///
    /// Arrays are invalid when every element is, strings when empty.
    pub fn is_invalid(&self, base_type: BaseType) -> bool {
        let invalid = base_type.invalid();

        match self {
            Self::Scalar(x) => x.bits() == invalid,
            Self::Array(xs) => xs.iter().all(|x| x.bits() == invalid),
            Self::String(s) => s.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(x) => fmt::Display::fmt(x, f),
            Self::String(s) => fmt::Display::fmt(s, f),
            Self::Array(xs) => {
                f.write_str("[")?;
                for (i, x) in xs.iter().enumerate() {
                    if i != 0 {
                        f.write_str(", ")?;
                    }
                    fmt::Display::fmt(x, f)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Decode a field of `size` bytes.
///
/// A field as wide as its base type holds a single value. Wider fields hold an
/// array, and their size must be an exact multiple of the base type's width.
/// String fields always decode to a single string.
pub fn decode_field<S: Source>(
    cursor: &mut Cursor<S>,
    base_type: BaseType,
    size: u8,
    endianness: Endianness,
    floats: FloatDecoding,
) -> Result<Value, Error> {
    if base_type == BaseType::String {
        return Ok(Value::String(cursor.read_string(size.into())?));
    }

    let width = base_type.width();

    if size % width != 0 {
        Err(FieldError::InvalidFieldSize { size, base_type })?;
    }

    if size == width {
        return Ok(Value::Scalar(decode_scalar(
            cursor, base_type, endianness, floats,
        )?));
    }

    let values = (0..size / width)
        .map(|_| decode_scalar(cursor, base_type, endianness, floats))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Value::Array(values))
}

macro_rules! read_scalar {
    ($cursor:expr, $endianness:expr, $variant:ident, $t:ty) => {{
        let r = $cursor.read_array::<{ size_of::<$t>() }>()?;

        Scalar::$variant(match $endianness {
            Endianness::Little => <$t>::from_le_bytes(r),
            Endianness::Big => <$t>::from_be_bytes(r),
        })
    }};
}

/// Decode a single value of a base type.
pub fn decode_scalar<S: Source>(
    cursor: &mut Cursor<S>,
    base_type: BaseType,
    endianness: Endianness,
    floats: FloatDecoding,
) -> Result<Scalar, Error> {
    use BaseType as B;

    Ok(match (base_type, floats) {
        (B::Enum | B::Uint8 | B::Uint8z | B::Byte | B::String, _) => {
            read_scalar!(cursor, endianness, U8, u8)
        }
        (B::Sint8, _) => read_scalar!(cursor, endianness, I8, i8),
        (B::Uint16 | B::Uint16z, _) => read_scalar!(cursor, endianness, U16, u16),
        (B::Sint16, _) => read_scalar!(cursor, endianness, I16, i16),
        (B::Uint32 | B::Uint32z, _) | (B::Float32, FloatDecoding::RawBits) => {
            read_scalar!(cursor, endianness, U32, u32)
        }
        (B::Sint32, _) => read_scalar!(cursor, endianness, I32, i32),
        (B::Uint64 | B::Uint64z, _) | (B::Float64, FloatDecoding::RawBits) => {
            read_scalar!(cursor, endianness, U64, u64)
        }
        (B::Sint64, _) => read_scalar!(cursor, endianness, I64, i64),
        (B::Float32, FloatDecoding::Ieee754) => read_scalar!(cursor, endianness, F32, f32),
        (B::Float64, FloatDecoding::Ieee754) => read_scalar!(cursor, endianness, F64, f64),
    })
}

/// The value standing in for a timestamp field of a compressed timestamp
/// message, typed as the field's base type.
pub fn time_offset_value(base_type: BaseType, offset: u8, floats: FloatDecoding) -> Value {
    use BaseType as B;

    // Offsets are at most 31, so every conversion below is lossless.
    let scalar = match (base_type, floats) {
        (B::Sint8, _) => Scalar::I8(offset as i8),
        (B::Uint16 | B::Uint16z, _) => Scalar::U16(offset.into()),
        (B::Sint16, _) => Scalar::I16(offset.into()),
        (B::Uint32 | B::Uint32z, _) | (B::Float32, FloatDecoding::RawBits) => {
            Scalar::U32(offset.into())
        }
        (B::Sint32, _) => Scalar::I32(offset.into()),
        (B::Uint64 | B::Uint64z, _) | (B::Float64, FloatDecoding::RawBits) => {
            Scalar::U64(offset.into())
        }
        (B::Sint64, _) => Scalar::I64(offset.into()),
        (B::Float32, FloatDecoding::Ieee754) => Scalar::F32(offset.into()),
        (B::Float64, FloatDecoding::Ieee754) => Scalar::F64(offset.into()),
        (B::Enum | B::Uint8 | B::Uint8z | B::Byte | B::String, _) => Scalar::U8(offset),
    };

    Value::Scalar(scalar)
}
