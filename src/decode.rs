//! The decoder: a recursive, bounds-checked reader that turns a byte slice
//! back into a [`Value`], rejecting anything the wire format doesn't license.

use byteorder::{BigEndian, ByteOrder};

use crate::depth_tracking::check_depth;
use crate::error::DecodeError;
use crate::marker::Marker;
use crate::value::Value;

/// Decodes exactly one value from `buf`.
///
/// Fails with [`DecodeError::TrailingBytes`] if bytes remain after the first
/// value is read — this crate has no framing of its own, so a caller that
/// wants to decode a stream of values must split the buffer itself.
pub fn decode(buf: &[u8]) -> Result<Value, DecodeError> {
    let (value, consumed) = read(buf, 0, 0)?;
    if consumed != buf.len() {
        return Err(DecodeError::TrailingBytes { consumed, total: buf.len() });
    }
    Ok(value)
}

/// The signed int-8/16/32/64 tags carry a two's-complement payload that may
/// still be non-negative (a compliant encoder is free to pick a wider-than-
/// necessary signed tag). Route those to `UInt` so the decoded `Value`
/// matches the sign partition the rest of this crate assumes.
fn sint_or_uint(v: i64) -> Value {
    if v < 0 {
        Value::SInt(v)
    } else {
        Value::UInt(v as u64)
    }
}

fn need(buf: &[u8], offset: usize, step: &'static str, n: usize) -> Result<(), DecodeError> {
    let available = buf.len().saturating_sub(offset);
    if available < n {
        Err(DecodeError::Truncated { step, offset, needed: n, available })
    } else {
        Ok(())
    }
}

fn read(buf: &[u8], offset: usize, depth: u32) -> Result<(Value, usize), DecodeError> {
    need(buf, offset, "tag", 1)?;
    let tag = buf[offset];
    let marker = Marker::from_u8(tag);
    let mut pos = offset + 1;

    let value = match marker {
        Marker::PosFixInt(n) => Value::UInt(n as u64),
        Marker::NegFixInt(n) => Value::SInt(n as i64),
        Marker::Nil => Value::Nil,
        Marker::False => Value::Bool(false),
        Marker::True => Value::Bool(true),
        Marker::Reserved => return Err(DecodeError::ReservedTag { offset }),

        Marker::UInt8 => {
            need(buf, pos, "uint8", 1)?;
            let v = buf[pos];
            pos += 1;
            Value::UInt(v as u64)
        }
        Marker::UInt16 => {
            need(buf, pos, "uint16", 2)?;
            let v = BigEndian::read_u16(&buf[pos..]);
            pos += 2;
            Value::UInt(v as u64)
        }
        Marker::UInt32 => {
            need(buf, pos, "uint32", 4)?;
            let v = BigEndian::read_u32(&buf[pos..]);
            pos += 4;
            Value::UInt(v as u64)
        }
        Marker::UInt64 => {
            need(buf, pos, "uint64", 8)?;
            let v = BigEndian::read_u64(&buf[pos..]);
            pos += 8;
            Value::UInt(v)
        }
        Marker::Int8 => {
            need(buf, pos, "int8", 1)?;
            let v = buf[pos] as i8;
            pos += 1;
            sint_or_uint(v as i64)
        }
        Marker::Int16 => {
            need(buf, pos, "int16", 2)?;
            let v = BigEndian::read_i16(&buf[pos..]);
            pos += 2;
            sint_or_uint(v as i64)
        }
        Marker::Int32 => {
            need(buf, pos, "int32", 4)?;
            let v = BigEndian::read_i32(&buf[pos..]);
            pos += 4;
            sint_or_uint(v as i64)
        }
        Marker::Int64 => {
            need(buf, pos, "int64", 8)?;
            let v = BigEndian::read_i64(&buf[pos..]);
            pos += 8;
            sint_or_uint(v)
        }

        Marker::F32 => {
            need(buf, pos, "float32", 4)?;
            let v = BigEndian::read_f32(&buf[pos..]);
            pos += 4;
            Value::Float(v as f64)
        }
        Marker::F64 => {
            need(buf, pos, "float64", 8)?;
            let v = BigEndian::read_f64(&buf[pos..]);
            pos += 8;
            Value::Float(v)
        }

        Marker::FixStr(len) => read_str(buf, &mut pos, offset, len as usize)?,
        Marker::Str8 => {
            need(buf, pos, "str8 length", 1)?;
            let len = buf[pos] as usize;
            pos += 1;
            read_str(buf, &mut pos, offset, len)?
        }
        Marker::Str16 => {
            need(buf, pos, "str16 length", 2)?;
            let len = BigEndian::read_u16(&buf[pos..]) as usize;
            pos += 2;
            read_str(buf, &mut pos, offset, len)?
        }
        Marker::Str32 => {
            need(buf, pos, "str32 length", 4)?;
            let len = BigEndian::read_u32(&buf[pos..]) as usize;
            pos += 4;
            read_str(buf, &mut pos, offset, len)?
        }

        Marker::Bin8 => {
            need(buf, pos, "bin8 length", 1)?;
            let len = buf[pos] as usize;
            pos += 1;
            read_bin(buf, &mut pos, len)?
        }
        Marker::Bin16 => {
            need(buf, pos, "bin16 length", 2)?;
            let len = BigEndian::read_u16(&buf[pos..]) as usize;
            pos += 2;
            read_bin(buf, &mut pos, len)?
        }
        Marker::Bin32 => {
            need(buf, pos, "bin32 length", 4)?;
            let len = BigEndian::read_u32(&buf[pos..]) as usize;
            pos += 4;
            read_bin(buf, &mut pos, len)?
        }

        Marker::FixArray(len) => {
            check_depth(depth + 1)?;
            read_array(buf, &mut pos, len as usize, depth)?
        }
        Marker::Array16 => {
            need(buf, pos, "array16 length", 2)?;
            let len = BigEndian::read_u16(&buf[pos..]) as usize;
            pos += 2;
            check_depth(depth + 1)?;
            read_array(buf, &mut pos, len, depth)?
        }
        Marker::Array32 => {
            need(buf, pos, "array32 length", 4)?;
            let len = BigEndian::read_u32(&buf[pos..]) as usize;
            pos += 4;
            check_depth(depth + 1)?;
            read_array(buf, &mut pos, len, depth)?
        }

        Marker::FixMap(len) => {
            check_depth(depth + 1)?;
            read_map(buf, &mut pos, len as usize, depth)?
        }
        Marker::Map16 => {
            need(buf, pos, "map16 length", 2)?;
            let len = BigEndian::read_u16(&buf[pos..]) as usize;
            pos += 2;
            check_depth(depth + 1)?;
            read_map(buf, &mut pos, len, depth)?
        }
        Marker::Map32 => {
            need(buf, pos, "map32 length", 4)?;
            let len = BigEndian::read_u32(&buf[pos..]) as usize;
            pos += 4;
            check_depth(depth + 1)?;
            read_map(buf, &mut pos, len, depth)?
        }

        Marker::FixExt1 => read_ext(buf, &mut pos, 1)?,
        Marker::FixExt2 => read_ext(buf, &mut pos, 2)?,
        Marker::FixExt4 => read_ext(buf, &mut pos, 4)?,
        Marker::FixExt8 => read_ext(buf, &mut pos, 8)?,
        Marker::FixExt16 => read_ext(buf, &mut pos, 16)?,
        Marker::Ext8 => {
            need(buf, pos, "ext8 length", 1)?;
            let len = buf[pos] as usize;
            pos += 1;
            read_ext(buf, &mut pos, len)?
        }
        Marker::Ext16 => {
            need(buf, pos, "ext16 length", 2)?;
            let len = BigEndian::read_u16(&buf[pos..]) as usize;
            pos += 2;
            read_ext(buf, &mut pos, len)?
        }
        Marker::Ext32 => {
            need(buf, pos, "ext32 length", 4)?;
            let len = BigEndian::read_u32(&buf[pos..]) as usize;
            pos += 4;
            read_ext(buf, &mut pos, len)?
        }
    };

    Ok((value, pos))
}

fn read_str(buf: &[u8], pos: &mut usize, tag_offset: usize, len: usize) -> Result<Value, DecodeError> {
    need(buf, *pos, "str payload", len)?;
    let bytes = &buf[*pos..*pos + len];
    let s = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { offset: tag_offset })?;
    let v = Value::Str(s.to_string());
    *pos += len;
    Ok(v)
}

fn read_bin(buf: &[u8], pos: &mut usize, len: usize) -> Result<Value, DecodeError> {
    need(buf, *pos, "bin payload", len)?;
    let v = Value::Bin(buf[*pos..*pos + len].to_vec());
    *pos += len;
    Ok(v)
}

fn read_ext(buf: &[u8], pos: &mut usize, len: usize) -> Result<Value, DecodeError> {
    need(buf, *pos, "ext type id", 1)?;
    let type_id = buf[*pos] as i8;
    *pos += 1;
    need(buf, *pos, "ext payload", len)?;
    let data = buf[*pos..*pos + len].to_vec();
    *pos += len;
    Ok(Value::Ext(type_id, data))
}

fn read_array(buf: &[u8], pos: &mut usize, len: usize, depth: u32) -> Result<Value, DecodeError> {
    let mut items = Vec::with_capacity(len.min(1024));
    for _ in 0..len {
        let (item, next) = read(buf, *pos, depth + 1)?;
        items.push(item);
        *pos = next;
    }
    Ok(Value::Array(items))
}

fn read_map(buf: &[u8], pos: &mut usize, len: usize, depth: u32) -> Result<Value, DecodeError> {
    let mut pairs = Vec::with_capacity(len.min(1024));
    for _ in 0..len {
        let (key, next) = read(buf, *pos, depth + 1)?;
        *pos = next;
        let (val, next) = read(buf, *pos, depth + 1)?;
        *pos = next;
        pairs.push((key, val));
    }
    Ok(Value::Map(pairs))
}
