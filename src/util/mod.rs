use bytes::Buf;

use crate::error::{Error, Result};

/// Fails with [`Error::TruncatedStream`] unless `needed` bytes are left in `input`.
#[inline]
pub fn ensure_remaining<B: Buf>(input: &B, needed: usize) -> Result<()> {
    let remaining = input.remaining();
    if remaining < needed {
        return Err(Error::truncated(needed, remaining));
    }
    Ok(())
}

/// Splits `len` bytes off the front of `input`.
#[inline]
pub fn take_bytes<'a>(input: &mut &'a [u8], len: usize) -> Result<&'a [u8]> {
    ensure_remaining(&*input, len)?;
    let (head, rest) = input.split_at(len);
    *input = rest;
    Ok(head)
}

/// Reads a single byte.
#[inline]
pub fn read_u8(input: &mut &[u8]) -> Result<u8> {
    ensure_remaining(&*input, 1)?;
    Ok(input.get_u8())
}

/// Reads a big-endian `u16`.
#[inline]
pub fn read_u16_be(input: &mut &[u8]) -> Result<u16> {
    ensure_remaining(&*input, 2)?;
    Ok(input.get_u16())
}

/// Reads a big-endian `i64`.
#[inline]
pub fn read_i64_be(input: &mut &[u8]) -> Result<i64> {
    ensure_remaining(&*input, 8)?;
    Ok(input.get_i64())
}

/// Appends `field` to `out`, quoting it when it carries CSV metacharacters.
pub fn push_csv_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        for ch in field.chars() {
            if ch == '"' {
                out.push('"');
            }
            out.push(ch);
        }
        out.push('"');
    } else {
        out.push_str(field);
    }
}
