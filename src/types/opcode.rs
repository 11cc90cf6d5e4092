#![allow(missing_docs)]

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::Error;

/// Tag byte leading every frame of an encoded sample stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum SampleOpcode {
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    String = 7,
    Null = 8,
    Boolean = 9,
    /// A double whose value survives the round-trip through `f32`.
    FloatForDouble = 10,
    /// An integral double that fits in an `i8`.
    ByteForDouble = 12,
    /// An integral double that fits in an `i16`.
    ShortForDouble = 13,
    DoubleZero = 15,
    IntZero = 16,
    /// Run of up to 65535 identical samples; u16 count.
    RepeatShort = 0xFE,
    /// Run of up to 255 identical samples; u8 count.
    RepeatByte = 0xFF,
}

impl SampleOpcode {
    /// Fixed payload size following the tag, `None` for variable-length frames.
    pub fn payload_len(self) -> Option<usize> {
        match self {
            Self::Null | Self::DoubleZero | Self::IntZero => Some(0),
            Self::Byte | Self::Boolean | Self::ByteForDouble => Some(1),
            Self::Short | Self::ShortForDouble => Some(2),
            Self::Int | Self::Float | Self::FloatForDouble => Some(4),
            Self::Long | Self::Double => Some(8),
            Self::String | Self::RepeatByte | Self::RepeatShort => None,
        }
    }

    /// Returns `true` for the run-length opcodes.
    pub fn is_repeat(self) -> bool {
        matches!(self, Self::RepeatByte | Self::RepeatShort)
    }

    /// Resolves a raw tag byte read from a sample stream.
    pub fn from_tag(tag: u8) -> Result<Self, Error> {
        Self::try_from(tag).map_err(|_| Error::UnknownOpcode {
            stream: "sample",
            tag,
        })
    }
}

/// Tag byte leading every entry of a compressed time line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum TimelineOpcode {
    /// Single delta from the previous timestamp (varint milliseconds).
    DeltaTime = 0xFC,
    /// u16 count followed by a varint delta repeated that many times.
    RepeatedDeltaTimeShort = 0xFD,
    /// u8 count followed by a varint delta repeated that many times.
    RepeatedDeltaTimeByte = 0xFE,
    /// Absolute timestamp: big-endian i64 epoch milliseconds.
    FullTime = 0xFF,
}

impl TimelineOpcode {
    /// Resolves a raw tag byte read from a time line.
    pub fn from_tag(tag: u8) -> Result<Self, Error> {
        Self::try_from(tag).map_err(|_| Error::UnknownOpcode {
            stream: "timeline",
            tag,
        })
    }
}
