//! The semantic profile consulted when assembling records.
//!
//! A [`Profile`] maps global message and field numbers to their meaning. Only
//! a few of its answers affect decoding: which fields hold timestamps, which
//! hold a manufacturer and product pair, and how products are named. The rest
//! are there for presentation.
//!
//! [`BasicProfile`] covers the common messages of activity files. Applications
//! needing the full FIT profile should implement the trait over their own
//! tables.

use alloc::string::{String, ToString};

use crate::sans::{field::Value, message::TIMESTAMP_FIELD};

pub const FILE_ID: u16 = 0;
pub const DEVICE_INFO: u16 = 23;

/// Manufacturers whose products are numbered in the Garmin product table.
const GARMIN_MANUFACTURERS: [u16; 3] = [1, 13, 15];

/// Semantic knowledge about messages and fields.
///
/// The default methods identify timestamps, manufacturers and products by
/// their global profile numbers, and know no names.
#[allow(unused_variables)]
pub trait Profile {
    /// Whether a field holds seconds since the FIT epoch.
    fn is_timestamp_field(&self, message_type: u16, field_number: u8) -> bool {
        field_number == TIMESTAMP_FIELD
    }

    fn is_manufacturer_field(&self, message_type: u16, field_number: u8) -> bool {
        matches!((message_type, field_number), (FILE_ID, 1) | (DEVICE_INFO, 2))
    }

    fn is_product_field(&self, message_type: u16, field_number: u8) -> bool {
        matches!((message_type, field_number), (FILE_ID, 2) | (DEVICE_INFO, 4))
    }

    /// Name a product code as numbered by a manufacturer.
    fn resolve_product(&self, manufacturer: u16, product: &Value) -> Option<String> {
        None
    }

    fn message_name(&self, message_type: u16) -> Option<&str> {
        None
    }

    fn field_name(&self, message_type: u16, field_number: u8) -> Option<&str> {
        None
    }

    fn message_is_known(&self, message_type: u16) -> bool {
        self.message_name(message_type).is_some()
    }

    fn field_is_known(&self, message_type: u16, field_number: u8) -> bool {
        self.field_name(message_type, field_number).is_some()
    }
}

/// A profile of the common messages of activity files.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicProfile;

const MESSAGES: &[(u16, &str)] = &[
    (FILE_ID, "FILE_ID"),
    (18, "SESSION"),
    (19, "LAP"),
    (20, "RECORD"),
    (21, "EVENT"),
    (DEVICE_INFO, "DEVICE_INFO"),
    (34, "ACTIVITY"),
    (49, "FILE_CREATOR"),
];

const FIELDS: &[(u16, u8, &str)] = &[
    (FILE_ID, 0, "TYPE"),
    (FILE_ID, 1, "MANUFACTURER"),
    (FILE_ID, 2, "PRODUCT"),
    (FILE_ID, 3, "SERIAL_NUMBER"),
    (FILE_ID, 4, "TIME_CREATED"),
    (FILE_ID, 5, "NUMBER"),
    (18, 0, "EVENT"),
    (18, 1, "EVENT_TYPE"),
    (18, 2, "START_TIME"),
    (18, 5, "SPORT"),
    (18, 6, "SUB_SPORT"),
    (18, 7, "TOTAL_ELAPSED_TIME"),
    (18, 8, "TOTAL_TIMER_TIME"),
    (18, 9, "TOTAL_DISTANCE"),
    (18, 10, "TOTAL_CYCLES"),
    (18, 11, "TOTAL_CALORIES"),
    (18, 14, "AVG_SPEED"),
    (18, 16, "AVG_HEART_RATE"),
    (18, 17, "MAX_HEART_RATE"),
    (18, 18, "AVG_CADENCE"),
    (18, 41, "AVG_FRACTIONAL_CADENCE"),
    (19, 2, "START_TIME"),
    (20, 0, "POSITION_LAT"),
    (20, 1, "POSITION_LONG"),
    (20, 2, "ALTITUDE"),
    (20, 3, "HEART_RATE"),
    (20, 4, "CADENCE"),
    (20, 5, "DISTANCE"),
    (20, 6, "SPEED"),
    (20, 13, "TEMPERATURE"),
    (21, 0, "EVENT"),
    (21, 1, "EVENT_TYPE"),
    (DEVICE_INFO, 0, "DEVICE_INDEX"),
    (DEVICE_INFO, 2, "MANUFACTURER"),
    (DEVICE_INFO, 3, "SERIAL_NUMBER"),
    (DEVICE_INFO, 4, "PRODUCT"),
    (DEVICE_INFO, 5, "SOFTWARE_VERSION"),
    (DEVICE_INFO, 27, "PRODUCT_NAME"),
    (34, 1, "NUM_SESSIONS"),
    (34, 5, "LOCAL_TIMESTAMP"),
    (49, 0, "SOFTWARE_VERSION"),
];

const GARMIN_PRODUCTS: &[(u16, &str)] = &[
    (1, "HRM1"),
    (2, "AXH01"),
    (3, "AXB01"),
    (4, "AXB02"),
    (5, "HRM2SS"),
    (1036, "EDGE500"),
    (1169, "EDGE800"),
    (65534, "CONNECT"),
];

impl Profile for BasicProfile {
    fn is_timestamp_field(&self, message_type: u16, field_number: u8) -> bool {
        field_number == TIMESTAMP_FIELD
            || matches!(
                (message_type, field_number),
                (FILE_ID, 4) | (18, 2) | (19, 2) | (34, 5)
            )
    }

    fn resolve_product(&self, manufacturer: u16, product: &Value) -> Option<String> {
        if !GARMIN_MANUFACTURERS.contains(&manufacturer) {
            return None;
        }

        let code = product.as_scalar()?.as_u64()?;

        GARMIN_PRODUCTS
            .iter()
            .find(|(c, _)| u64::from(*c) == code)
            .map(|(_, name)| name.to_string())
    }

    fn message_name(&self, message_type: u16) -> Option<&str> {
        MESSAGES
            .iter()
            .find(|(m, _)| *m == message_type)
            .map(|(_, name)| *name)
    }

    fn field_name(&self, message_type: u16, field_number: u8) -> Option<&str> {
        if field_number == TIMESTAMP_FIELD && self.message_is_known(message_type) {
            return Some("TIMESTAMP");
        }

        FIELDS
            .iter()
            .find(|(m, f, _)| *m == message_type && *f == field_number)
            .map(|(_, _, name)| *name)
    }
}
