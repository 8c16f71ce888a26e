//! Assembly of data messages into records.

use alloc::{string::String, vec::Vec};
use core::fmt;

use chrono::{DateTime, Utc};

use crate::sans::{
    field::{BaseType, Value},
    message::{DataField, DataMessage, DeveloperField},
};

use super::profile::Profile;

/// Seconds from the Unix epoch to the FIT epoch, 1989-12-31T00:00:00Z.
pub const FIT_EPOCH_SECONDS: i64 = 631_065_600;

/// Convert seconds since the FIT epoch to a point in time.
///
/// Values below `0x10000000` are meant as device-relative seconds rather
/// than instants. They are converted in the same way regardless.
pub fn fit_time(seconds: u64) -> Option<DateTime<Utc>> {
    let seconds = i64::try_from(seconds).ok()?;
    DateTime::from_timestamp(FIT_EPOCH_SECONDS.checked_add(seconds)?, 0)
}

/// The value of a record field, after cross-field rewrites.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Value(Value),
    /// A timestamp field, translated from seconds since the FIT epoch.
    DateTime(DateTime<Utc>),
    /// A product field, named for its manufacturer.
    Name(String),
}

impl FieldValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => fmt::Display::fmt(v, f),
            Self::DateTime(t) => fmt::Display::fmt(t, f),
            Self::Name(n) => fmt::Display::fmt(n, f),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub field_number: u8,
    pub base_type: BaseType,
    pub value: FieldValue,
}

impl RecordField {
    /// Whether the field holds its base type's invalid marker value.
    pub fn is_invalid(&self) -> bool {
        match &self.value {
            FieldValue::Value(v) => v.is_invalid(self.base_type),
            FieldValue::DateTime(_) | FieldValue::Name(_) => false,
        }
    }
}

/// An assembled data message.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Global message number.
    pub message_type: u16,
    pub time_offset: Option<u8>,
    pub fields: Vec<RecordField>,
    pub developer_fields: Vec<DeveloperField>,
}

impl Record {
    pub fn field(&self, field_number: u8) -> Option<&RecordField> {
        self.fields.iter().find(|f| f.field_number == field_number)
    }
}

/// Rewrites data messages into records, consulting a profile.
pub struct Assembler<'p, P: ?Sized> {
    profile: &'p P,
}

impl<'p, P: Profile + ?Sized> Assembler<'p, P> {
    pub fn new(profile: &'p P) -> Self {
        Self { profile }
    }

    /// Assemble a record from a data message.
    ///
    /// Timestamp fields are translated first. Product fields are then named
    /// from the message's manufacturer field, wherever it appears.
    pub fn assemble(&self, message: DataMessage) -> Record {
        let DataMessage {
            message_type,
            time_offset,
            fields,
            developer_fields,
            ..
        } = message;

        let manufacturer = fields
            .iter()
            .filter(|f| self.profile.is_manufacturer_field(message_type, f.field_number))
            .find(|f| !f.value.is_invalid(f.base_type))
            .and_then(|f| f.value.as_scalar()?.as_u64())
            .and_then(|m| u16::try_from(m).ok());

        let fields = fields
            .into_iter()
            .map(|f| self.rewrite(message_type, manufacturer, f))
            .collect();

        Record {
            message_type,
            time_offset,
            fields,
            developer_fields,
        }
    }

    fn rewrite(
        &self,
        message_type: u16,
        manufacturer: Option<u16>,
        field: DataField,
    ) -> RecordField {
        let DataField {
            field_number,
            base_type,
            value,
        } = field;

        let valid = !value.is_invalid(base_type);

        let rewritten = if valid && self.profile.is_timestamp_field(message_type, field_number) {
            value
                .as_scalar()
                .and_then(|s| s.as_u64())
                .and_then(fit_time)
                .map(FieldValue::DateTime)
        } else if valid && self.profile.is_product_field(message_type, field_number) {
            manufacturer
                .and_then(|m| self.profile.resolve_product(m, &value))
                .map(FieldValue::Name)
        } else {
            None
        };

        RecordField {
            field_number,
            base_type,
            value: rewritten.unwrap_or(FieldValue::Value(value)),
        }
    }
}
