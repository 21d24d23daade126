//! Unit tests for the read/write cursors

use super::*;

#[test]
fn test_integers_are_big_endian() {
    let mut bytes = [0u8; 14];
    let mut cursor = WriteCursor::new(&mut bytes);
    cursor.put_u32(0x0102_0304).unwrap();
    cursor.put_i16(-2).unwrap();
    cursor.put_u64(0x0a0b_0c0d_0e0f_1011).unwrap();
    assert_eq!(cursor.position(), 14);
    assert_eq!(bytes, [1, 2, 3, 4, 0xff, 0xfe, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10, 0x11]);

    let mut reader = ReadCursor::new(&bytes);
    assert_eq!(reader.read_u32().unwrap(), 0x0102_0304);
    assert_eq!(reader.read_i16().unwrap(), -2);
    assert_eq!(reader.read_u64().unwrap(), 0x0a0b_0c0d_0e0f_1011);
    reader.finish().unwrap();
}

#[test]
fn test_floats_round_trip_by_bit_pattern() {
    let mut bytes = [0u8; 12];
    let mut cursor = WriteCursor::new(&mut bytes);
    cursor.put_f32(1.5).unwrap();
    cursor.put_f64(-0.25).unwrap();

    let mut reader = ReadCursor::new(&bytes);
    assert_eq!(reader.read_f32().unwrap(), 1.5);
    assert_eq!(reader.read_f64().unwrap(), -0.25);
}

#[test]
fn test_read_past_end_is_truncated() {
    let bytes = [0u8, 1];
    let mut reader = ReadCursor::new(&bytes);
    assert_eq!(
        reader.read_u32(),
        Err(ProtocolError::Truncated {
            needed: 4,
            remaining: 2,
        })
    );
    // A failed read does not consume anything.
    assert_eq!(reader.remaining(), 2);
}

#[test]
fn test_finish_reports_trailing_bytes() {
    let bytes = [0u8, 0, 0, 7, 9, 9];
    let mut reader = ReadCursor::new(&bytes);
    assert_eq!(reader.read_i32().unwrap(), 7);
    assert_eq!(reader.finish(), Err(ProtocolError::TrailingBytes(2)));
}

#[test]
fn test_write_overflow() {
    let mut bytes = [0u8; 3];
    let mut cursor = WriteCursor::new(&mut bytes);
    assert_eq!(
        cursor.put_u32(1),
        Err(ProtocolError::Overflow {
            needed: 4,
            available: 3,
        })
    );
    assert_eq!(cursor.position(), 0);
}

#[test]
fn test_negative_length_prefix() {
    let bytes = (-5i32).to_be_bytes();
    let mut reader = ReadCursor::new(&bytes);
    assert_eq!(reader.read_len(), Err(ProtocolError::NegativeLength(-5)));
}

#[test]
fn test_take_rest() {
    let bytes = [1u8, 2, 3, 4];
    let mut reader = ReadCursor::new(&bytes);
    reader.read_u8().unwrap();
    assert_eq!(reader.take_rest(), &[2, 3, 4]);
    reader.finish().unwrap();
}
