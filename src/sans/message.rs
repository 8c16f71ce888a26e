//! Message headers, definitions and decoded messages.

use alloc::vec::Vec;

use tartan_bitfield::bitfield;
use zerocopy::FromBytes;

use super::{
    cursor::Endianness,
    field::{BaseType, FieldError, Value},
};

/// Field number reserved for timestamps in every message.
pub const TIMESTAMP_FIELD: u8 = 253;

/// A decoded message header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageHeader {
    Normal {
        local_message_type: u8,
        is_definition: bool,
        /// Definition messages only: developer field definitions follow the
        /// field definitions.
        has_developer_data: bool,
    },
    /// A data message carrying a time offset in place of its timestamp field.
    Compressed {
        local_message_type: u8,
        time_offset: u8,
    },
}

impl MessageHeader {
    pub fn from_byte(r: u8) -> Self {
        bitfield! {
            struct RecordHeader(u8) {
                [7] is_compressed,
            }
        }

        if RecordHeader(r).is_compressed() {
            bitfield! {
                struct CompressedHeader(u8) {
                    [0..5] time_offset: u8,
                    [5..7] local_message: u8,
                }
            }

            let header = CompressedHeader(r);

            Self::Compressed {
                local_message_type: header.local_message(),
                time_offset: header.time_offset(),
            }
        } else {
            bitfield! {
                struct NormalHeader(u8) {
                    [0..4] local_message: u8,
                    [5] is_developer,
                    [6] is_definition,
                }
            }

            let header = NormalHeader(r);

            Self::Normal {
                local_message_type: header.local_message(),
                is_definition: header.is_definition(),
                has_developer_data: header.is_developer(),
            }
        }
    }

    pub fn local_message_type(&self) -> u8 {
        match *self {
            Self::Normal {
                local_message_type, ..
            }
            | Self::Compressed {
                local_message_type, ..
            } => local_message_type,
        }
    }

    pub fn is_definition(&self) -> bool {
        matches!(
            self,
            Self::Normal {
                is_definition: true,
                ..
            }
        )
    }

    pub fn time_offset(&self) -> Option<u8> {
        match *self {
            Self::Compressed { time_offset, .. } => Some(time_offset),
            Self::Normal { .. } => None,
        }
    }
}

/// The fixed part of a definition message, following its header byte.
#[repr(C, packed)]
#[derive(Debug, FromBytes)]
pub(super) struct DefinitionMessage {
    pub(super) _reserved: u8,
    pub(super) architecture: u8,
    pub(super) global_message: [u8; 2],
    pub(super) field_count: u8,
}

#[repr(C, packed)]
#[derive(FromBytes)]
struct FieldHeader {
    field: u8,
    size: u8,
    base_type: u8,
}

/// Layout of one field in a data message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefinition {
    pub field_number: u8,
    /// Size in bytes, possibly spanning several values of the base type.
    pub size: u8,
    pub base_type: BaseType,
}

impl FieldDefinition {
    pub fn from_bytes(r: [u8; 3]) -> Result<Self, FieldError> {
        let FieldHeader {
            field,
            size,
            base_type,
        } = zerocopy::transmute!(r);

        Ok(Self {
            field_number: field,
            size,
            base_type: BaseType::from_code(base_type)?,
        })
    }
}

/// Layout of one developer field in a data message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeveloperFieldDefinition {
    pub field_number: u8,
    pub size: u8,
    pub developer_data_index: u8,
}

impl DeveloperFieldDefinition {
    pub fn from_bytes(r: [u8; 3]) -> Self {
        let FieldHeader {
            field,
            size,
            base_type: developer_data_index,
        } = zerocopy::transmute!(r);

        Self {
            field_number: field,
            size,
            developer_data_index,
        }
    }
}

/// Layout of the data messages of a local message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDefinition {
    /// Global message number.
    pub message_type: u16,
    pub endianness: Endianness,
    pub fields: Vec<FieldDefinition>,
    pub developer_fields: Vec<DeveloperFieldDefinition>,
}

impl MessageDefinition {
    pub fn field(&self, field_number: u8) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.field_number == field_number)
    }

    /// Number of bytes in a data message of this layout, excluding the header
    /// byte.
    pub fn data_size(&self) -> usize {
        let fields = self.fields.iter().map(|f| usize::from(f.size));
        let developer_fields = self.developer_fields.iter().map(|f| usize::from(f.size));
        fields.chain(developer_fields).sum()
    }
}

/// A decoded field of a data message.
#[derive(Debug, Clone, PartialEq)]
pub struct DataField {
    pub field_number: u8,
    pub base_type: BaseType,
    pub value: Value,
}

/// A developer field of a data message, left undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeveloperField {
    pub field_number: u8,
    pub developer_data_index: u8,
    pub bytes: Vec<u8>,
}

/// A decoded data message.
#[derive(Debug, Clone, PartialEq)]
pub struct DataMessage {
    pub local_message_type: u8,
    /// Global message number.
    pub message_type: u16,
    /// Present for messages with a compressed timestamp header.
    pub time_offset: Option<u8>,
    /// Fields in definition order.
    pub fields: Vec<DataField>,
    pub developer_fields: Vec<DeveloperField>,
}

impl DataMessage {
    pub fn field(&self, field_number: u8) -> Option<&DataField> {
        self.fields.iter().find(|f| f.field_number == field_number)
    }
}

/// A message yielded by the decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A definition, now stored for its local message type.
    Definition {
        local_message_type: u8,
        definition: MessageDefinition,
    },
    Data(DataMessage),
}
