// Copyright (c) 2022-2023 The FIO Protocol

//! Binary codec for the FIO device wire formats
//!
//! Fixed-width integers encode little-endian; call sites that need the
//! device's big-endian display order reverse the buffer explicitly (this is
//! a deliberate per-field choice in the transaction templates, not a global
//! rule).

use byteorder::{ByteOrder, LittleEndian};
use chrono::NaiveDateTime;

use crate::ProtocolError;

pub fn uint8_to_buf(value: u8) -> [u8; 1] {
    [value]
}

pub fn uint16_to_buf(value: u16) -> [u8; 2] {
    let mut buf = [0u8; 2];
    LittleEndian::write_u16(&mut buf, value);
    buf
}

pub fn uint32_to_buf(value: u32) -> [u8; 4] {
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, value);
    buf
}

pub fn uint64_to_buf(value: u64) -> [u8; 8] {
    let mut buf = [0u8; 8];
    LittleEndian::write_u64(&mut buf, value);
    buf
}

pub fn buf_to_uint16(buf: &[u8; 2]) -> u16 {
    LittleEndian::read_u16(buf)
}

pub fn buf_to_uint32(buf: &[u8; 4]) -> u32 {
    LittleEndian::read_u32(buf)
}

pub fn buf_to_uint64(buf: &[u8; 8]) -> u64 {
    LittleEndian::read_u64(buf)
}

/// Encode an ISO-8601 expiration timestamp as the on-chain `time_point_sec`,
/// a u32 of unix seconds, little-endian. Fractional seconds are truncated.
pub fn date_to_buf(date: &str) -> Result<[u8; 4], ProtocolError> {
    let date = date.split('.').next().unwrap_or(date);
    let parsed = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S")
        .map_err(|_| ProtocolError::InvalidDate)?;
    let secs = parsed.and_utc().timestamp();
    let secs = u32::try_from(secs).map_err(|_| ProtocolError::InvalidDate)?;
    Ok(uint32_to_buf(secs))
}

/// LEB128 varint encoding, 7 bits per byte, continuation bit on all but the
/// last byte. Used for counted section length prefixes.
pub fn varuint32_to_buf(mut value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(5);
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            buf.push(byte | 0x80);
        } else {
            buf.push(byte);
            break;
        }
    }
    buf
}

/// Byte length of `varuint32_to_buf(value)` without allocating
///
/// Length prefixes count toward enclosing counted sections, so the stream
/// compiler needs this when accounting nested section lengths.
pub fn lenlen(value: u64) -> usize {
    let mut len = 1;
    let mut value = value >> 7;
    while value != 0 {
        len += 1;
        value >>= 7;
    }
    len
}

/// Split `data` into consecutive slices of the given lengths, plus the
/// trailing remainder. Callers assert the remainder is empty when strict
/// lengths are expected.
pub fn chunk_by<'a>(
    data: &'a [u8],
    lengths: &[usize],
) -> Result<(Vec<&'a [u8]>, &'a [u8]), ProtocolError> {
    let total: usize = lengths.iter().sum();
    if data.len() < total {
        return Err(ProtocolError::ChunkUnderflow);
    }

    let mut chunks = Vec::with_capacity(lengths.len());
    let mut rest = data;
    for &len in lengths {
        let (chunk, tail) = rest.split_at(len);
        chunks.push(chunk);
        rest = tail;
    }
    Ok((chunks, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_roundtrip() {
        for v in [0u16, 1, 0x1234, u16::MAX] {
            assert_eq!(buf_to_uint16(&uint16_to_buf(v)), v);
        }
        for v in [0u32, 1, 0xdeadbeef, u32::MAX] {
            assert_eq!(buf_to_uint32(&uint32_to_buf(v)), v);
        }
        for v in [0u64, 1, 0x0123456789abcdef, u64::MAX] {
            assert_eq!(buf_to_uint64(&uint64_to_buf(v)), v);
        }
    }

    #[test]
    fn reversed_fields_roundtrip() {
        // Templates reverse some fields to big-endian for device display
        let mut buf = uint64_to_buf(1000000000);
        buf.reverse();
        assert_eq!(buf, 1000000000u64.to_be_bytes());
        buf.reverse();
        assert_eq!(buf_to_uint64(&buf), 1000000000);
    }

    #[test]
    fn date_known_vectors() {
        assert_eq!(date_to_buf("2021-08-26T17:08:59").unwrap(), hex("abca2761"));
        assert_eq!(date_to_buf("2020-01-01T00:00:00").unwrap(), hex("00e10b5e"));
        // Fractional seconds are truncated
        assert_eq!(
            date_to_buf("2021-08-28T12:50:36.686").unwrap(),
            hex("1c312a61")
        );
        assert!(date_to_buf("not-a-date").is_err());
    }

    #[test]
    fn varint_encoding_and_lenlen() {
        let cases: [(u64, usize); 7] = [
            (0, 1),
            (127, 1),
            (128, 2),
            (16383, 2),
            (16384, 3),
            (2097151, 3),
            (2097152, 4),
        ];
        for (value, expected) in cases {
            let encoded = varuint32_to_buf(value);
            assert_eq!(encoded.len(), expected, "varint({value})");
            assert_eq!(lenlen(value), expected, "lenlen({value})");
        }
        assert_eq!(varuint32_to_buf(300), vec![0xac, 0x02]);
    }

    #[test]
    fn chunking() {
        let data = [1u8, 2, 3, 4, 5];
        let (chunks, rest) = chunk_by(&data, &[2, 2]).unwrap();
        assert_eq!(chunks, vec![&[1u8, 2][..], &[3, 4]]);
        assert_eq!(rest, &[5]);

        assert_eq!(
            chunk_by(&data, &[4, 4]),
            Err(ProtocolError::ChunkUnderflow)
        );
    }

    fn hex(s: &str) -> [u8; 4] {
        let v = ::hex::decode(s).unwrap();
        v.try_into().unwrap()
    }
}
