#![allow(dead_code)]

use freewheel::sans::check::compute_crc;

/// Base type codes, as found in field definitions.
pub mod code {
    pub const ENUM: u8 = 0x00;
    pub const SINT8: u8 = 0x01;
    pub const UINT8: u8 = 0x02;
    pub const SINT16: u8 = 0x83;
    pub const UINT16: u8 = 0x84;
    pub const SINT32: u8 = 0x85;
    pub const UINT32: u8 = 0x86;
    pub const STRING: u8 = 0x07;
    pub const FLOAT32: u8 = 0x88;
    pub const FLOAT64: u8 = 0x89;
    pub const UINT8Z: u8 = 0x0A;
    pub const UINT16Z: u8 = 0x8B;
    pub const UINT32Z: u8 = 0x8C;
    pub const BYTE: u8 = 0x0D;
}

/// Writes FIT documents byte by byte.
pub struct FitBuilder {
    header_length: u8,
    header_crc: bool,
    records: Vec<u8>,
}

impl FitBuilder {
    /// A builder for documents with a 14-byte header and its CRC.
    pub fn new() -> Self {
        Self {
            header_length: 14,
            header_crc: true,
            records: vec![],
        }
    }

    pub fn short_header(mut self) -> Self {
        self.header_length = 12;
        self
    }

    pub fn zero_header_crc(mut self) -> Self {
        self.header_crc = false;
        self
    }

    pub fn definition(
        self,
        local: u8,
        message_type: u16,
        big_endian: bool,
        fields: &[(u8, u8, u8)],
    ) -> Self {
        self.developer_definition(local, message_type, big_endian, fields, None)
    }

    pub fn developer_definition(
        mut self,
        local: u8,
        message_type: u16,
        big_endian: bool,
        fields: &[(u8, u8, u8)],
        developer_fields: Option<&[(u8, u8, u8)]>,
    ) -> Self {
        let developer = if developer_fields.is_some() { 0x20 } else { 0 };
        self.records.push(0x40 | developer | local);
        self.records.push(0);
        self.records.push(big_endian as u8);

        if big_endian {
            self.records.extend_from_slice(&message_type.to_be_bytes());
        } else {
            self.records.extend_from_slice(&message_type.to_le_bytes());
        }

        self.records.push(fields.len() as u8);
        for (number, size, base_type) in fields {
            self.records.extend_from_slice(&[*number, *size, *base_type]);
        }

        if let Some(developer_fields) = developer_fields {
            self.records.push(developer_fields.len() as u8);
            for (number, size, index) in developer_fields {
                self.records.extend_from_slice(&[*number, *size, *index]);
            }
        }

        self
    }

    pub fn data(mut self, local: u8, bytes: &[u8]) -> Self {
        self.records.push(local);
        self.records.extend_from_slice(bytes);
        self
    }

    pub fn compressed(mut self, local: u8, time_offset: u8, bytes: &[u8]) -> Self {
        self.records.push(0x80 | (local << 5) | time_offset);
        self.records.extend_from_slice(bytes);
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.records.extend_from_slice(bytes);
        self
    }

    /// Number of record bytes written so far.
    pub fn data_length(&self) -> u32 {
        self.records.len() as u32
    }

    pub fn header(&self, data_length: u32) -> Vec<u8> {
        let mut header = vec![self.header_length, 0x10];
        header.extend_from_slice(&2132u16.to_le_bytes());
        header.extend_from_slice(&data_length.to_le_bytes());
        header.extend_from_slice(b".FIT");

        if self.header_length == 14 {
            let crc = if self.header_crc {
                compute_crc(0, &header)
            } else {
                0
            };
            header.extend_from_slice(&crc.to_le_bytes());
        }

        header
    }

    /// Write the document, with a header declaring every record byte and a
    /// correct footer CRC.
    pub fn build(&self) -> Vec<u8> {
        self.build_declaring(self.data_length())
    }

    /// Write the document with a header declaring `data_length` record bytes.
    pub fn build_declaring(&self, data_length: u32) -> Vec<u8> {
        let mut document = self.header(data_length);
        document.extend_from_slice(&self.records);

        let crc = compute_crc(0, &document);
        document.extend_from_slice(&crc.to_le_bytes());

        document
    }
}
