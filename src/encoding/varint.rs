use crate::error::{Error, Result};

/// Maximum number of bytes that a u64 varint can occupy.
pub const VARINT_MAX_LEN: usize = 10;

/// Encodes the given value as an unsigned LEB128 varint and appends it to `out`.
pub fn encode_varint(mut value: u64, out: &mut Vec<u8>) -> usize {
    let start_len = out.len();
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
    out.len() - start_len
}

/// Decodes a u64 varint from the provided byte slice, advancing the slice on success.
///
/// Running out of input mid-varint is reported as [`Error::TruncatedStream`].
pub fn decode_varint(input: &mut &[u8]) -> Result<u64> {
    let mut value = 0u64;
    for i in 0..VARINT_MAX_LEN {
        let Some((&byte, rest)) = input.split_first() else {
            return Err(Error::truncated(1, 0));
        };
        *input = rest;
        let bits = (byte & 0x7f) as u64;
        if i == VARINT_MAX_LEN - 1 && bits > 1 {
            return Err(Error::invalid("varint overflows 64 bits"));
        }
        value |= bits << (i * 7);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(Error::invalid("varint exceeds maximum length"))
}
