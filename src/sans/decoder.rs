//! The message stream decoder.

use alloc::vec::Vec;

use tracing::{debug, trace};

use super::{
    Checksum, Error, Options,
    check::verify,
    cursor::{Cursor, Endianness, Source},
    field,
    header::{FileHeader, Footer, parse_footer, parse_header},
    message::{
        DataField, DataMessage, DefinitionMessage, DeveloperField, DeveloperFieldDefinition,
        FieldDefinition, Message, MessageDefinition, MessageHeader, TIMESTAMP_FIELD,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingMessage,
    Done,
    Failed,
}

/// A decoding session over a single document.
///
/// Yields messages until the record bytes declared by the header have been
/// consumed. Definitions are kept for the lifetime of the session.
#[derive(Debug)]
pub struct Decoder<S> {
    cursor: Cursor<S>,
    header: FileHeader,
    options: Options,
    definitions: [Option<MessageDefinition>; 16],
    /// Offset of the end of the record section.
    end: usize,
    state: State,
}

impl<S: Source> Decoder<S> {
    /// Begin a session with default options, decoding the document header.
    pub fn new(source: S) -> Result<Self, Error> {
        Self::with_options(source, Options::default())
    }

    pub fn with_options(source: S, options: Options) -> Result<Self, Error> {
        let mut cursor = Cursor::new(source);
        let header = parse_header(&mut cursor)?;

        debug!(
            protocol = header.protocol_version,
            profile = header.profile_version,
            data_length = header.data_length,
            "Decoded file header"
        );

        if let (Checksum::Verify, Some(found)) = (options.checksum, header.crc) {
            // A zero CRC marks a header written without one.
            if found != 0 {
                verify(found, header.calculated_crc())?;
            }
        }

        let end = cursor.consumed() + header.data_length as usize;

        let state = if header.data_length == 0 {
            State::Done
        } else {
            State::AwaitingMessage
        };

        Ok(Self {
            cursor,
            header,
            options,
            definitions: Default::default(),
            end,
            state,
        })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// The definition currently stored for a local message type.
    pub fn definition(&self, local_message_type: u8) -> Option<&MessageDefinition> {
        self.definitions.get(usize::from(local_message_type))?.as_ref()
    }

    /// Number of record bytes of completed reads so far.
    pub fn consumed(&self) -> usize {
        self.cursor.consumed() - usize::from(self.header.header_length)
    }

    /// Whether every record byte has been consumed.
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Decode the next message, or return `None` once every record byte has
    /// been consumed.
    pub fn next_message(&mut self) -> Result<Option<Message>, Error> {
        if self.state != State::AwaitingMessage {
            return Ok(None);
        }

        match self.decode_message() {
            Ok(message) => Ok(Some(message)),
            Err(err) => {
                self.state = State::Failed;

                Err(match err {
                    Error::TruncatedInput { .. } => Error::TruncatedStream {
                        expected: self.header.data_length,
                        consumed: self.consumed(),
                    },
                    err => err,
                })
            }
        }
    }

    /// End the session, decoding the document footer.
    ///
    /// Remaining messages are decoded and discarded.
    pub fn finish(mut self) -> Result<Footer, Error> {
        while self.next_message()?.is_some() {}

        if self.state == State::Failed {
            Err(Error::Aborted)?;
        }

        let calculated = self.cursor.crc();
        let footer = parse_footer(&mut self.cursor)?;

        debug!(crc = footer.crc, "Decoded file footer");

        if self.options.checksum == Checksum::Verify {
            verify(footer.crc, calculated)?;
        }

        Ok(footer)
    }

    fn decode_message(&mut self) -> Result<Message, Error> {
        let [byte] = self.cursor.read_array()?;
        let header = MessageHeader::from_byte(byte);

        let message = match header {
            MessageHeader::Normal {
                local_message_type,
                is_definition: true,
                has_developer_data,
            } => self.decode_definition(local_message_type, has_developer_data)?,
            MessageHeader::Normal {
                local_message_type,
                ..
            } => self.decode_data(local_message_type, None)?,
            MessageHeader::Compressed {
                local_message_type,
                time_offset,
            } => self.decode_data(local_message_type, Some(time_offset))?,
        };

        let position = self.cursor.consumed();

        if position > self.end {
            Err(Error::DataLengthExceeded {
                expected: self.header.data_length,
                consumed: self.consumed(),
            })?;
        }

        if position == self.end {
            debug!(consumed = self.consumed(), "Reached end of records");
            self.state = State::Done;
        }

        Ok(message)
    }

    fn decode_definition(
        &mut self,
        local_message_type: u8,
        has_developer_data: bool,
    ) -> Result<Message, Error> {
        let DefinitionMessage {
            architecture,
            global_message,
            field_count,
            ..
        } = zerocopy::transmute!(self.cursor.read_array::<5>()?);

        let endianness = Endianness::from_architecture(architecture);
        let message_type = match endianness {
            Endianness::Little => u16::from_le_bytes(global_message),
            Endianness::Big => u16::from_be_bytes(global_message),
        };

        let mut fields = Vec::with_capacity(field_count.into());
        for _ in 0..field_count {
            fields.push(FieldDefinition::from_bytes(self.cursor.read_array()?)?);
        }

        let mut developer_fields = Vec::new();
        if has_developer_data {
            let [count] = self.cursor.read_array()?;
            for _ in 0..count {
                let r = self.cursor.read_array()?;
                developer_fields.push(DeveloperFieldDefinition::from_bytes(r));
            }
        }

        let definition = MessageDefinition {
            message_type,
            endianness,
            fields,
            developer_fields,
        };

        let slot = &mut self.definitions[usize::from(local_message_type & 0xF)];
        let replaced = slot.replace(definition.clone()).is_some();

        trace!(
            local_message_type,
            message_type,
            fields = definition.fields.len(),
            replaced,
            "Stored definition"
        );

        Ok(Message::Definition {
            local_message_type,
            definition,
        })
    }

    fn decode_data(
        &mut self,
        local_message_type: u8,
        time_offset: Option<u8>,
    ) -> Result<Message, Error> {
        let floats = self.options.floats;

        let Some(definition) = &self.definitions[usize::from(local_message_type & 0xF)] else {
            return Err(Error::UndefinedLocalMessageType(local_message_type));
        };

        let mut fields = Vec::with_capacity(definition.fields.len());
        for f in &definition.fields {
            let value = match time_offset {
                // Compressed headers carry the timestamp, so its bytes are absent.
                Some(offset) if f.field_number == TIMESTAMP_FIELD => {
                    field::time_offset_value(f.base_type, offset, floats)
                }
                _ => field::decode_field(
                    &mut self.cursor,
                    f.base_type,
                    f.size,
                    definition.endianness,
                    floats,
                )?,
            };

            fields.push(DataField {
                field_number: f.field_number,
                base_type: f.base_type,
                value,
            });
        }

        let mut developer_fields = Vec::with_capacity(definition.developer_fields.len());
        for f in &definition.developer_fields {
            developer_fields.push(DeveloperField {
                field_number: f.field_number,
                developer_data_index: f.developer_data_index,
                bytes: self.cursor.read_bytes(f.size.into())?,
            });
        }

        trace!(
            local_message_type,
            message_type = definition.message_type,
            fields = fields.len(),
            "Decoded data message"
        );

        Ok(Message::Data(DataMessage {
            local_message_type,
            message_type: definition.message_type,
            time_offset,
            fields,
            developer_fields,
        }))
    }
}

impl<S: Source> Iterator for Decoder<S> {
    type Item = Result<Message, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_message().transpose()
    }
}
