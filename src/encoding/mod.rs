//! Variable-length integer helpers shared by the time-line encoder.

mod varint;

pub use varint::{VARINT_MAX_LEN, decode_varint, encode_varint};
