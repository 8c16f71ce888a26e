//! Convenience interfaces for common decoding patterns.
//!
//! The functions in this module decode whole documents from slices and
//! readers. Each data message is assembled into a [`Record`] and either
//! collected into a [`Document`] or published to the [`FromRecords`] and
//! [`FromRecord`] traits.
//!
//! In many cases (when records are of a known shape), these traits can be
//! derived. See the [`FromRecords`](macro@FromRecords) and
//! [`FromRecord`](macro@FromRecord) macros for details.

use alloc::{string::String, vec::Vec};
use core::iter;

use chrono::{DateTime, Utc};
use either::Either::{Left, Right};

use crate::sans::{
    Decoder, Error,
    cursor::Source,
    field::{Scalar, Value},
    header::{FileHeader, Footer},
    message::{DeveloperField, Message},
};

pub mod profile;
#[cfg(feature = "std")]
pub mod reader;
pub mod record;
pub mod slice;

pub use profile::{BasicProfile, Profile};
#[cfg(feature = "std")]
pub use reader::{decode as decode_reader, read as read_reader};
pub use record::{Assembler, FieldValue, Record, RecordField};
pub use slice::{decode as decode_slice, read as read_slice};

/// Derive [`FromRecords`] for a struct holding a collection of records.
///
/// _Requires Cargo feature `derive`._
///
/// # Example
///
/// To collect a single record, add the `record(N)` attribute to an `Option<T>`
/// struct field, where `N` is the global message number and `T` is a type
/// implementing [`FromRecord`] and [`Default`]. Additional records received for
/// the same message number will overwrite earlier ones. To collect multiple
/// occurrences of a record, apply the attribute to a `Vec<T>` instead.
///
/// ```
/// #[derive(Debug, Default, FromRecords)]
/// struct ActivityRecordSet {
///     #[record(0)]
///     file_id: Option<FileId>,
///     #[record(20)]
///     records: Vec<Record>,
/// }
/// ```
#[cfg(feature = "derive")]
pub use freewheel_derive::FromRecords;

/// Produce record receivers for a document.
///
/// See the [`FromRecords`](macro@FromRecords) derive macro for an automatic
/// implementation of this trait.
pub trait FromRecords {
    /// Retrieve a receiver for a record, if one exists.
    fn add_record(&mut self, id: u16) -> Option<&mut dyn FromRecord>;
}

/// Derive [`FromRecord`] for a struct representing a single record.
///
/// _Requires Cargo feature `derive`._
///
/// # Examples
///
/// To receive a field, add the `field(N)` attribute to an `Option<T>` struct
/// field, where `N` is the field number and `T` implements [`FromField`].
/// Fields holding their invalid marker, or of another type, are skipped.
/// Additional values received for the same field replace earlier ones.
///
/// To receive the time offset stored in compressed timestamp headers, supply
/// `time` in place of a field number.
///
/// ```
/// #[derive(Debug, Default, FromRecord)]
/// struct Record {
///     #[field(time)]
///     time_offset: Option<u8>,
///     #[field(253)]
///     timestamp: Option<DateTime<Utc>>,
///     #[field(0)]
///     position_lat: Option<i32>,
///     #[field(2)]
///     altitude: Option<u16>,
/// }
/// ```
///
/// To receive fields into arbitrary types, supply a handler closure taking the
/// struct field and the [`RecordField`].
///
/// ```
/// #[derive(Debug, Default, FromRecord)]
/// struct Course {
///     #[field(5, |name, f| *name = f.value.to_string())]
///     name: String,
/// }
/// ```
#[cfg(feature = "derive")]
pub use freewheel_derive::FromRecord;

/// Receive the contents of a record.
///
/// The default implementation of each method ignores received values.
///
/// See the [`FromRecord`](macro@FromRecord) derive macro for an automatic
/// implementation of this trait.
#[allow(unused_variables)]
pub trait FromRecord {
    /// Add the compressed time offset to the record.
    fn add_time_offset(&mut self, offset: u8) {}
    /// Add a field to the record, in definition order.
    fn add_field(&mut self, field: &RecordField) {}
    /// Add a developer field to the record, after all other fields.
    fn add_developer_field(&mut self, field: &DeveloperField) {}
}

/// Convert a record field into a Rust type.
///
/// Primitives are produced only from values of the matching [`Scalar`]
/// variant, so a `u16` is read from `uint16` and `uint16z` fields. Vectors are
/// produced from array fields, or from single values. Fields holding their
/// invalid marker produce nothing.
pub trait FromField: Sized {
    fn from_field(field: &RecordField) -> Option<Self>;
}

fn valid_value(field: &RecordField) -> Option<&Value> {
    if field.is_invalid() {
        None
    } else {
        field.value.as_value()
    }
}

macro_rules! from_field {
    ($($t:ty => $variant:ident,)*) => {$(
        impl FromField for $t {
            fn from_field(field: &RecordField) -> Option<Self> {
                match valid_value(field)? {
                    Value::Scalar(Scalar::$variant(x)) => Some(*x),
                    _ => None,
                }
            }
        }

        impl FromField for Vec<$t> {
            fn from_field(field: &RecordField) -> Option<Self> {
                let scalars = match valid_value(field)? {
                    Value::Scalar(x) => Left(iter::once(x)),
                    Value::Array(xs) => Right(xs.iter()),
                    Value::String(_) => return None,
                };

                scalars
                    .map(|x| match x {
                        Scalar::$variant(x) => Some(*x),
                        _ => None,
                    })
                    .collect()
            }
        }
    )*};
}

from_field! {
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
    f32 => F32,
    f64 => F64,
}

impl FromField for String {
    fn from_field(field: &RecordField) -> Option<Self> {
        valid_value(field)?.as_str().map(String::from)
    }
}

impl FromField for DateTime<Utc> {
    fn from_field(field: &RecordField) -> Option<Self> {
        match field.value {
            FieldValue::DateTime(t) => Some(t),
            _ => None,
        }
    }
}

impl FromField for FieldValue {
    fn from_field(field: &RecordField) -> Option<Self> {
        (!field.is_invalid()).then(|| field.value.clone())
    }
}

/// A fully decoded document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub header: FileHeader,
    pub records: Vec<Record>,
    pub footer: Footer,
}

/// Decode the remaining records of a session, publishing to a receiver.
pub fn publish<S: Source, P: Profile + ?Sized>(
    mut decoder: Decoder<S>,
    profile: &P,
    o: &mut impl FromRecords,
) -> Result<Footer, Error> {
    let assembler = Assembler::new(profile);

    while let Some(message) = decoder.next_message()? {
        let Message::Data(message) = message else {
            continue;
        };

        let record = assembler.assemble(message);

        // Shadow the document receiver with that of a single record.
        let Some(o) = o.add_record(record.message_type) else {
            continue;
        };

        if let Some(offset) = record.time_offset {
            o.add_time_offset(offset);
        }

        for field in &record.fields {
            o.add_field(field);
        }

        for field in &record.developer_fields {
            o.add_developer_field(field);
        }
    }

    decoder.finish()
}

/// Decode the remaining records of a session into a [`Document`].
pub fn collect<S: Source, P: Profile + ?Sized>(
    mut decoder: Decoder<S>,
    profile: &P,
) -> Result<Document, Error> {
    let assembler = Assembler::new(profile);
    let header = *decoder.header();

    let mut records = Vec::new();
    while let Some(message) = decoder.next_message()? {
        if let Message::Data(message) = message {
            records.push(assembler.assemble(message));
        }
    }

    let footer = decoder.finish()?;

    Ok(Document {
        header,
        records,
        footer,
    })
}
