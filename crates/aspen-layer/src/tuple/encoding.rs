use super::BYTES_CODE;
use super::ESCAPE_BYTE;
use super::INT_ZERO_CODE;
use super::NULL_CODE;
use super::STRING_CODE;
use super::TERMINATOR;

pub(super) fn encode_null(buf: &mut Vec<u8>) {
    buf.push(NULL_CODE);
}

pub(super) fn encode_bytes(bytes: &[u8], buf: &mut Vec<u8>) {
    buf.push(BYTES_CODE);
    write_escaped(bytes, buf);
}

pub(super) fn encode_string(s: &str, buf: &mut Vec<u8>) {
    buf.push(STRING_CODE);
    write_escaped(s.as_bytes(), buf);
}

/// Copy `bytes` with every `0x00` doubled as `0x00 0xFF`, then terminate.
fn write_escaped(bytes: &[u8], buf: &mut Vec<u8>) {
    buf.reserve(bytes.len() + 1);
    for &b in bytes {
        buf.push(b);
        if b == 0x00 {
            buf.push(ESCAPE_BYTE);
        }
    }
    buf.push(TERMINATOR);
}

pub(super) fn encode_int(n: i64, buf: &mut Vec<u8>) {
    if n == 0 {
        buf.push(INT_ZERO_CODE);
        return;
    }

    let magnitude = n.unsigned_abs();
    let len = magnitude_len(magnitude);

    if n > 0 {
        buf.push(INT_ZERO_CODE + len);
        write_be(magnitude, len, buf);
    } else {
        // One's complement within `len` bytes: larger magnitudes produce
        // smaller byte strings, and the shorter code already sorts them first.
        buf.push(INT_ZERO_CODE - len);
        write_be(len_mask(len) - magnitude, len, buf);
    }
}

/// Minimal number of bytes needed to hold `magnitude` (which is non-zero).
pub(super) fn magnitude_len(magnitude: u64) -> u8 {
    debug_assert!(magnitude != 0, "TUPLE: zero has no magnitude length");
    (8 - magnitude.leading_zeros() / 8) as u8
}

/// All-ones mask covering `len` bytes.
pub(super) fn len_mask(len: u8) -> u64 {
    if len >= 8 { u64::MAX } else { (1u64 << (u32::from(len) * 8)) - 1 }
}

fn write_be(value: u64, len: u8, buf: &mut Vec<u8>) {
    let bytes = value.to_be_bytes();
    buf.extend_from_slice(&bytes[8 - len as usize..]);
}
