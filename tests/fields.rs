use freewheel::sans::{
    Error,
    cursor::{Cursor, Endianness},
    field::{BaseType, FieldError, FloatDecoding, Scalar, Value, decode_field},
};

fn decode(bytes: &[u8], base_type: BaseType, endianness: Endianness) -> Result<Value, Error> {
    let size = bytes.len() as u8;
    decode_field(
        &mut Cursor::new(bytes),
        base_type,
        size,
        endianness,
        FloatDecoding::RawBits,
    )
}

#[test]
fn read_uint_both_orders() {
    let bytes = [0x01, 0x02, 0x03, 0x04];

    let mut cursor = Cursor::new(&bytes[..]);
    assert_eq!(cursor.read_uint(4, Endianness::Little).unwrap(), 0x0403_0201);
    assert_eq!(cursor.consumed(), 4);

    let mut cursor = Cursor::new(&bytes[..]);
    assert_eq!(cursor.read_uint(2, Endianness::Big).unwrap(), 0x0102);
    assert_eq!(cursor.read_uint(1, Endianness::Big).unwrap(), 0x03);
    assert_eq!(cursor.consumed(), 3);

    let err = cursor.read_uint(2, Endianness::Little).unwrap_err();
    assert!(matches!(
        err,
        Error::TruncatedInput {
            requested: 2,
            offset: 3
        }
    ));
}

#[test]
fn read_string_trims_padding() {
    let bytes = b"Trail\0\0\0";
    let mut cursor = Cursor::new(&bytes[..]);
    assert_eq!(cursor.read_string(8).unwrap(), "Trail");
    assert_eq!(cursor.consumed(), 8);
}

#[test]
fn scalars_by_base_type() {
    use Endianness::{Big, Little};

    let cases: &[(&[u8], BaseType, Endianness, Scalar)] = &[
        (&[0x05], BaseType::Enum, Little, Scalar::U8(5)),
        (&[0xFE], BaseType::Sint8, Little, Scalar::I8(-2)),
        (&[0xC8], BaseType::Uint8, Big, Scalar::U8(200)),
        (&[0x00, 0x80], BaseType::Sint16, Little, Scalar::I16(i16::MIN)),
        (&[0x12, 0x34], BaseType::Uint16, Big, Scalar::U16(0x1234)),
        (&[0x12, 0x34], BaseType::Uint16z, Little, Scalar::U16(0x3412)),
        (&[0xFF, 0xFF, 0xFF, 0xFE], BaseType::Sint32, Big, Scalar::I32(-2)),
        (&[0x0A, 0, 0, 0], BaseType::Uint32, Little, Scalar::U32(10)),
        (&[0, 0, 0, 0x0A], BaseType::Uint32z, Big, Scalar::U32(10)),
        (&[0xAB], BaseType::Byte, Little, Scalar::U8(0xAB)),
        (&[0x01], BaseType::Uint8z, Little, Scalar::U8(1)),
        (&[1, 0, 0, 0, 0, 0, 0, 0x80], BaseType::Sint64, Little, Scalar::I64(i64::MIN + 1)),
        (&[0, 0, 0, 0, 0, 0, 1, 0], BaseType::Uint64, Big, Scalar::U64(256)),
    ];

    for &(bytes, base_type, endianness, expected) in cases {
        let value = decode(bytes, base_type, endianness).unwrap();
        assert_eq!(value, Value::Scalar(expected), "{base_type} {bytes:?}");
    }
}

#[test]
fn floats_as_raw_bits() {
    let bytes = 1.5f32.to_le_bytes();
    let value = decode(&bytes, BaseType::Float32, Endianness::Little).unwrap();
    assert_eq!(value, Value::Scalar(Scalar::U32(1.5f32.to_bits())));

    let bytes = (-0.25f64).to_be_bytes();
    let value = decode(&bytes, BaseType::Float64, Endianness::Big).unwrap();
    assert_eq!(value, Value::Scalar(Scalar::U64((-0.25f64).to_bits())));
}

#[test]
fn floats_as_ieee754() {
    let bytes = 1.5f32.to_be_bytes();
    let value = decode_field(
        &mut Cursor::new(&bytes[..]),
        BaseType::Float32,
        4,
        Endianness::Big,
        FloatDecoding::Ieee754,
    )
    .unwrap();
    assert_eq!(value, Value::Scalar(Scalar::F32(1.5)));

    let bytes = [2.0f64.to_le_bytes(), (-3.0f64).to_le_bytes()].concat();
    let value = decode_field(
        &mut Cursor::new(&bytes[..]),
        BaseType::Float64,
        16,
        Endianness::Little,
        FloatDecoding::Ieee754,
    )
    .unwrap();
    assert_eq!(value, Value::Array(vec![Scalar::F64(2.0), Scalar::F64(-3.0)]));
}

#[test]
fn arrays_hold_size_over_width_values() {
    let bytes = [0x01, 0x00, 0x02, 0x00, 0x03, 0x00];
    let value = decode(&bytes, BaseType::Uint16, Endianness::Little).unwrap();
    assert_eq!(
        value,
        Value::Array(vec![Scalar::U16(1), Scalar::U16(2), Scalar::U16(3)])
    );

    let bytes = [0x00, 0x01, 0xFF, 0xFF];
    let value = decode(&bytes, BaseType::Sint16, Endianness::Big).unwrap();
    assert_eq!(value, Value::Array(vec![Scalar::I16(1), Scalar::I16(-1)]));

    let bytes = [7, 8, 9];
    let value = decode(&bytes, BaseType::Byte, Endianness::Little).unwrap();
    let Value::Array(values) = value else {
        panic!("expected an array, found {value:?}");
    };
    assert_eq!(values.len(), 3);
}

#[test]
fn invalid_field_size_iff_not_a_multiple() {
    for size in 1..=16u8 {
        let bytes = vec![0; size.into()];
        let mut cursor = Cursor::new(&bytes[..]);
        let result = decode_field(
            &mut cursor,
            BaseType::Uint32,
            size,
            Endianness::Little,
            FloatDecoding::RawBits,
        );

        if size % 4 == 0 {
            assert!(result.is_ok(), "size {size}");
        } else {
            assert!(
                matches!(
                    result,
                    Err(Error::Field(FieldError::InvalidFieldSize {
                        size: s,
                        base_type: BaseType::Uint32,
                    })) if s == size
                ),
                "size {size}"
            );
            // No bytes are consumed for a rejected field.
            assert_eq!(cursor.consumed(), 0);
        }
    }
}

#[test]
fn strings_ignore_endianness() {
    let bytes = b"AB\0\0";
    let little = decode(bytes, BaseType::String, Endianness::Little).unwrap();
    let big = decode(bytes, BaseType::String, Endianness::Big).unwrap();

    assert_eq!(little, Value::String("AB".into()));
    assert_eq!(little, big);
}

#[test]
fn base_type_codes() {
    assert_eq!(BaseType::from_code(0x86), Ok(BaseType::Uint32));
    assert_eq!(BaseType::from_code(0x07), Ok(BaseType::String));
    assert_eq!(BaseType::try_from(0x8C), Ok(BaseType::Uint32z));
    assert_eq!(BaseType::Sint16.code(), 0x83);
    assert_eq!(BaseType::from_code(0x42), Err(FieldError::UnknownBaseType(0x42)));
    assert_eq!(BaseType::from_code(0x06), Err(FieldError::UnknownBaseType(0x06)));

    let widths = [
        (BaseType::Enum, 1),
        (BaseType::Sint8, 1),
        (BaseType::Uint8, 1),
        (BaseType::Sint16, 2),
        (BaseType::Uint16, 2),
        (BaseType::Sint32, 4),
        (BaseType::Uint32, 4),
        (BaseType::String, 1),
        (BaseType::Float32, 4),
        (BaseType::Float64, 8),
        (BaseType::Uint8z, 1),
        (BaseType::Uint16z, 2),
        (BaseType::Uint32z, 4),
        (BaseType::Byte, 1),
    ];

    for (base_type, width) in widths {
        assert_eq!(base_type.width(), width, "{base_type}");
    }
}

#[test]
fn invalid_markers() {
    assert!(Value::Scalar(Scalar::U8(0xFF)).is_invalid(BaseType::Enum));
    assert!(!Value::Scalar(Scalar::U8(0xFF)).is_invalid(BaseType::Uint8z));
    assert!(Value::Scalar(Scalar::U8(0)).is_invalid(BaseType::Uint8z));
    assert!(Value::Scalar(Scalar::I8(i8::MAX)).is_invalid(BaseType::Sint8));
    assert!(Value::Scalar(Scalar::U32(u32::MAX)).is_invalid(BaseType::Uint32));
    assert!(!Value::Scalar(Scalar::U32(10)).is_invalid(BaseType::Uint32));
    assert!(Value::String(String::new()).is_invalid(BaseType::String));
    assert!(
        Value::Array(vec![Scalar::U16(0xFFFF), Scalar::U16(0xFFFF)]).is_invalid(BaseType::Uint16)
    );
    assert!(!Value::Array(vec![Scalar::U16(0xFFFF), Scalar::U16(1)]).is_invalid(BaseType::Uint16));
}

#[test]
fn zero_size_field_is_an_empty_array() {
    let bytes = [7u8];
    let mut cursor = Cursor::new(&bytes[..]);

    let value = decode_field(
        &mut cursor,
        BaseType::Uint16,
        0,
        Endianness::Little,
        FloatDecoding::RawBits,
    )
    .unwrap();

    assert_eq!(value, Value::Array(vec![]));
    assert_eq!(cursor.consumed(), 0);

    // The following field still reads from the same position.
    let value = decode_field(
        &mut cursor,
        BaseType::Uint8,
        1,
        Endianness::Little,
        FloatDecoding::RawBits,
    )
    .unwrap();
    assert_eq!(value, Value::Scalar(Scalar::U8(7)));
}

#[test]
fn short_read_consumes_nothing() {
    let bytes = [1, 2, 3];
    let mut cursor = Cursor::new(&bytes[..]);
    cursor.read_array::<1>().unwrap();

    let err = cursor.read_array::<4>().unwrap_err();
    assert!(matches!(
        err,
        Error::TruncatedInput {
            requested: 4,
            offset: 1
        }
    ));
    assert_eq!(cursor.consumed(), 1);
}

#[test]
fn field_error_messages() {
    let err = Error::from(FieldError::InvalidFieldSize {
        size: 3,
        base_type: BaseType::Uint16,
    });
    assert_eq!(
        err.to_string(),
        "Undecodable field: Field size (3) is not a multiple of the width of UINT16."
    );

    assert_eq!(
        FieldError::UnknownBaseType(0x42).to_string(),
        "Unknown base type (0x42)."
    );
}
