//! Cross-module round-trip and boundary properties. Per-module unit tests
//! cover each encoder/decoder branch in isolation; this file exercises the
//! two halves together the way a caller actually would.

use msgpack_codec::{decode, encode, DecodeError, EncodeError, Value};

fn roundtrip(v: Value) {
    let bytes = encode(&v).expect("encode");
    let back = decode(&bytes).expect("decode");
    assert_eq!(back, v, "round-trip mismatch for {:?}", bytes);
}

#[test]
fn scalars_roundtrip() {
    roundtrip(Value::Nil);
    roundtrip(Value::Bool(true));
    roundtrip(Value::Bool(false));
    roundtrip(Value::UInt(0));
    roundtrip(Value::SInt(-1));
    roundtrip(Value::Float(0.0));
    roundtrip(Value::Float(-0.0));
    roundtrip(Value::str("hello, world"));
    roundtrip(Value::bin(vec![0xde, 0xad, 0xbe, 0xef]));
}

#[test]
fn nested_structures_roundtrip() {
    let v = Value::Map(vec![(
        Value::str("items"),
        Value::Array(vec![
            Value::UInt(1),
            Value::Map(vec![(Value::str("nested"), Value::Bool(true))]),
            Value::ext(5, vec![1, 2, 3, 4]),
        ]),
    )]);
    roundtrip(v);
}

#[test]
fn every_integer_tag_boundary_roundtrips() {
    let uints = [
        0u64,
        0x7f,
        0x80,
        u8::MAX as u64,
        u8::MAX as u64 + 1,
        u16::MAX as u64,
        u16::MAX as u64 + 1,
        u32::MAX as u64,
        u32::MAX as u64 + 1,
        u64::MAX,
    ];
    for n in uints {
        roundtrip(Value::UInt(n));
    }

    let sints = [
        -1i64,
        -32,
        -33,
        i8::MIN as i64,
        i8::MIN as i64 - 1,
        i16::MIN as i64,
        i16::MIN as i64 - 1,
        i32::MIN as i64,
        i32::MIN as i64 - 1,
        i64::MIN,
    ];
    for n in sints {
        roundtrip(Value::SInt(n));
    }
}

#[test]
fn a_non_negative_payload_on_a_signed_tag_decodes_as_uint() {
    // The encoder always picks the narrowest tag, so it never emits this
    // shape itself; a compliant peer encoder is free to, and the decoder
    // must still classify the result by sign rather than by which tag
    // carried it.
    assert_eq!(decode(&[0xd0, 0x05]).unwrap(), Value::UInt(5));
    assert_eq!(decode(&[0xd3, 0, 0, 0, 0, 0, 0, 0, 0x05]).unwrap(), Value::UInt(5));
}

#[test]
fn every_length_tag_boundary_roundtrips() {
    for len in [0usize, 15, 16, u8::MAX as usize, u8::MAX as usize + 1, u16::MAX as usize, u16::MAX as usize + 1] {
        roundtrip(Value::str("a".repeat(len)));
        roundtrip(Value::bin(vec![0u8; len]));
        roundtrip(Value::Array(vec![Value::Nil; len]));
    }
}

#[test]
fn every_fixed_ext_length_roundtrips() {
    for len in [1usize, 2, 4, 8, 16] {
        roundtrip(Value::ext(9, vec![0x42; len]));
    }
    roundtrip(Value::ext(-1, vec![0x42; 3]));
}

#[test]
fn uint_and_sint_never_cross_compare_after_a_roundtrip() {
    let encoded = encode(&Value::UInt(5)).unwrap();
    let decoded = decode(&encoded).unwrap();
    assert_ne!(decoded, Value::SInt(5));
}

#[test]
fn truncated_input_is_rejected_not_panicked() {
    let bytes = encode(&Value::str("a".repeat(100))).unwrap();
    let truncated = &bytes[..bytes.len() - 10];
    assert!(matches!(decode(truncated), Err(DecodeError::Truncated { .. })));
}

#[test]
fn trailing_bytes_after_a_complete_value_are_rejected() {
    let mut bytes = encode(&Value::UInt(1)).unwrap();
    bytes.push(0xc0);
    assert_eq!(decode(&bytes), Err(DecodeError::TrailingBytes { consumed: 1, total: 2 }));
}

#[test]
fn reserved_tag_byte_is_never_produced_by_the_encoder_and_is_rejected_on_decode() {
    assert_eq!(decode(&[0xc1]), Err(DecodeError::ReservedTag { offset: 0 }));
}

#[test]
fn pathologically_nested_input_is_rejected_rather_than_overflowing_the_stack() {
    let depth = msgpack_codec::MAX_DEPTH as usize + 10;
    let mut bytes = vec![0x91u8; depth]; // a chain of single-element fixarrays
    bytes.push(0xc0);
    assert!(matches!(decode(&bytes), Err(DecodeError::NestingTooDeep { .. })));
}

#[test]
fn oversized_length_is_rejected_at_encode_time() {
    // A real 4GiB allocation isn't practical in a test; the unit tests in
    // src/encode.rs exercise the length check directly. This test confirms
    // the public error surface for it is reachable and typed correctly.
    let err = EncodeError::ValueTooLarge { what: "string", len: u32::MAX as u64 + 1 };
    assert!(err.to_string().contains("exceeds"));
}
