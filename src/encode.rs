//! The encoder: dispatches on a [`Value`]'s kind and picks the smallest tag
//! that fits, following the teacher's `serialize_elem` dispatch
//! (`element.rs`) but writing big-endian payloads with `byteorder` rather
//! than the teacher's little-endian `to_le_bytes` calls, per the wire
//! format's BE convention.

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::EncodeError;
use crate::marker::{fixext_marker, Marker};
use crate::value::Value;

const MAX_LEN: u64 = u32::MAX as u64;

/// Encodes `v` as a MessagePack byte sequence.
///
/// Fails with [`EncodeError::ValueTooLarge`] if any string, binary, array,
/// map, or extension payload exceeds `2^32 - 1` bytes/elements. Never
/// partially emits: the buffer is only returned once encoding has fully
/// succeeded.
pub fn encode(v: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    write_value(&mut buf, v)?;
    Ok(buf)
}

fn write_value(buf: &mut Vec<u8>, v: &Value) -> Result<(), EncodeError> {
    match v {
        Value::Nil => buf.push(Marker::Nil.into()),
        Value::Bool(b) => buf.push(if *b { Marker::True } else { Marker::False }.into()),
        Value::UInt(n) => write_uint(buf, *n),
        Value::SInt(n) => write_sint(buf, *n),
        Value::Float(f) => {
            buf.push(Marker::F64.into());
            buf.write_f64::<BigEndian>(*f).expect("Vec<u8> write is infallible");
        }
        Value::Str(s) => write_str(buf, s)?,
        Value::Bin(data) => write_bin(buf, data)?,
        Value::Array(items) => {
            write_len(buf, "array", items.len() as u64, Marker::FixArray(0), Marker::Array16, Marker::Array32)?;
            for item in items {
                write_value(buf, item)?;
            }
        }
        Value::Map(pairs) => {
            write_len(buf, "map", pairs.len() as u64, Marker::FixMap(0), Marker::Map16, Marker::Map32)?;
            for (key, val) in pairs {
                write_value(buf, key)?;
                write_value(buf, val)?;
            }
        }
        Value::Ext(type_id, data) => write_ext(buf, *type_id, data)?,
    }
    Ok(())
}

fn write_uint(buf: &mut Vec<u8>, n: u64) {
    if n <= 0x7f {
        buf.push(Marker::PosFixInt(n as u8).into());
    } else if n <= u8::MAX as u64 {
        buf.push(Marker::UInt8.into());
        buf.push(n as u8);
    } else if n <= u16::MAX as u64 {
        buf.push(Marker::UInt16.into());
        buf.write_u16::<BigEndian>(n as u16).expect("Vec<u8> write is infallible");
    } else if n <= u32::MAX as u64 {
        buf.push(Marker::UInt32.into());
        buf.write_u32::<BigEndian>(n as u32).expect("Vec<u8> write is infallible");
    } else {
        buf.push(Marker::UInt64.into());
        buf.write_u64::<BigEndian>(n).expect("Vec<u8> write is infallible");
    }
}

fn write_sint(buf: &mut Vec<u8>, n: i64) {
    if n >= -32 {
        buf.push(Marker::NegFixInt(n as i8).into());
    } else if n >= i8::MIN as i64 {
        buf.push(Marker::Int8.into());
        buf.push(n as i8 as u8);
    } else if n >= i16::MIN as i64 {
        buf.push(Marker::Int16.into());
        buf.write_i16::<BigEndian>(n as i16).expect("Vec<u8> write is infallible");
    } else if n >= i32::MIN as i64 {
        buf.push(Marker::Int32.into());
        buf.write_i32::<BigEndian>(n as i32).expect("Vec<u8> write is infallible");
    } else {
        buf.push(Marker::Int64.into());
        buf.write_i64::<BigEndian>(n).expect("Vec<u8> write is infallible");
    }
}

fn write_str(buf: &mut Vec<u8>, s: &str) -> Result<(), EncodeError> {
    let len = s.len() as u64;
    if len > MAX_LEN {
        return Err(EncodeError::ValueTooLarge { what: "string", len });
    }
    if len <= 31 {
        buf.push(Marker::FixStr(len as u8).into());
    } else if len <= u8::MAX as u64 {
        buf.push(Marker::Str8.into());
        buf.push(len as u8);
    } else if len <= u16::MAX as u64 {
        buf.push(Marker::Str16.into());
        buf.write_u16::<BigEndian>(len as u16).expect("Vec<u8> write is infallible");
    } else {
        buf.push(Marker::Str32.into());
        buf.write_u32::<BigEndian>(len as u32).expect("Vec<u8> write is infallible");
    }
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

fn write_bin(buf: &mut Vec<u8>, data: &[u8]) -> Result<(), EncodeError> {
    let len = data.len() as u64;
    if len > MAX_LEN {
        return Err(EncodeError::ValueTooLarge { what: "binary", len });
    }
    if len <= u8::MAX as u64 {
        buf.push(Marker::Bin8.into());
        buf.push(len as u8);
    } else if len <= u16::MAX as u64 {
        buf.push(Marker::Bin16.into());
        buf.write_u16::<BigEndian>(len as u16).expect("Vec<u8> write is infallible");
    } else {
        buf.push(Marker::Bin32.into());
        buf.write_u32::<BigEndian>(len as u32).expect("Vec<u8> write is infallible");
    }
    buf.extend_from_slice(data);
    Ok(())
}

/// Shared length-tag selection for Array and Map, which differ only in
/// their fix-prefix and multi-byte markers.
fn write_len(
    buf: &mut Vec<u8>,
    what: &'static str,
    len: u64,
    fix: Marker,
    m16: Marker,
    m32: Marker,
) -> Result<(), EncodeError> {
    if len > MAX_LEN {
        return Err(EncodeError::ValueTooLarge { what, len });
    }
    if len <= 15 {
        let fix_byte = match fix {
            Marker::FixArray(_) => Marker::FixArray(len as u8),
            Marker::FixMap(_) => Marker::FixMap(len as u8),
            _ => unreachable!("write_len is only called with FixArray/FixMap"),
        };
        buf.push(fix_byte.into());
    } else if len <= u16::MAX as u64 {
        buf.push(m16.into());
        buf.write_u16::<BigEndian>(len as u16).expect("Vec<u8> write is infallible");
    } else {
        buf.push(m32.into());
        buf.write_u32::<BigEndian>(len as u32).expect("Vec<u8> write is infallible");
    }
    Ok(())
}

fn write_ext(buf: &mut Vec<u8>, type_id: i8, data: &[u8]) -> Result<(), EncodeError> {
    let len = data.len() as u64;
    if len > MAX_LEN {
        return Err(EncodeError::ValueTooLarge { what: "extension", len });
    }
    if let Some(marker) = fixext_marker(data.len()) {
        buf.push(marker.into());
    } else if len <= u8::MAX as u64 {
        buf.push(Marker::Ext8.into());
        buf.push(len as u8);
    } else if len <= u16::MAX as u64 {
        buf.push(Marker::Ext16.into());
        buf.write_u16::<BigEndian>(len as u16).expect("Vec<u8> write is infallible");
    } else {
        buf.push(Marker::Ext32.into());
        buf.write_u32::<BigEndian>(len as u32).expect("Vec<u8> write is infallible");
    }
    buf.push(type_id as u8);
    buf.extend_from_slice(data);
    Ok(())
}
