use std::fmt;

use super::SampleOpcode;
use crate::error::{Error, Result};

/// A single measurement. The variant fixes the opcode used to encode it.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarSample {
    /// Missing value.
    Null,
    /// Boolean flag.
    Boolean(bool),
    /// 8-bit integer.
    Byte(i8),
    /// 16-bit integer.
    Short(i16),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// Single precision float.
    Float(f32),
    /// Double precision float.
    Double(f64),
    /// UTF-8 text, at most 65535 encoded bytes.
    Text(String),
    /// Double stored with single precision.
    FloatForDouble(f32),
    /// Integral double stored in one byte.
    ByteForDouble(i8),
    /// Integral double stored in two bytes.
    ShortForDouble(i16),
    /// The double `0.0`.
    DoubleZero,
    /// The integer `0`.
    IntZero,
}

impl ScalarSample {
    /// Opcode written in front of this sample.
    pub fn opcode(&self) -> SampleOpcode {
        match self {
            Self::Null => SampleOpcode::Null,
            Self::Boolean(_) => SampleOpcode::Boolean,
            Self::Byte(_) => SampleOpcode::Byte,
            Self::Short(_) => SampleOpcode::Short,
            Self::Int(_) => SampleOpcode::Int,
            Self::Long(_) => SampleOpcode::Long,
            Self::Float(_) => SampleOpcode::Float,
            Self::Double(_) => SampleOpcode::Double,
            Self::Text(_) => SampleOpcode::String,
            Self::FloatForDouble(_) => SampleOpcode::FloatForDouble,
            Self::ByteForDouble(_) => SampleOpcode::ByteForDouble,
            Self::ShortForDouble(_) => SampleOpcode::ShortForDouble,
            Self::DoubleZero => SampleOpcode::DoubleZero,
            Self::IntZero => SampleOpcode::IntZero,
        }
    }

    /// Numeric value as a double, `None` for null and text samples.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Null | Self::Text(_) => None,
            Self::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Byte(v) | Self::ByteForDouble(v) => Some(f64::from(*v)),
            Self::Short(v) | Self::ShortForDouble(v) => Some(f64::from(*v)),
            Self::Int(v) => Some(f64::from(*v)),
            Self::Long(v) => Some(*v as f64),
            Self::Float(v) | Self::FloatForDouble(v) => Some(f64::from(*v)),
            Self::Double(v) => Some(*v),
            Self::DoubleZero | Self::IntZero => Some(0.0),
        }
    }

    /// Returns `true` when both samples encode to identical bytes.
    ///
    /// Unlike `==`, floats compare bit for bit: `0.0` and `-0.0` differ and
    /// a NaN matches the same NaN.
    pub fn same_encoding(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) | (Self::FloatForDouble(a), Self::FloatForDouble(b)) => {
                a.to_bits() == b.to_bits()
            }
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}

/// Human-readable rendering; narrowed doubles print as the double they encode.
impl fmt::Display for ScalarSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Text(text) => f.write_str(text),
            Self::FloatForDouble(v) => write!(f, "{}", f64::from(*v)),
            Self::ByteForDouble(v) => write!(f, "{}", f64::from(*v)),
            Self::ShortForDouble(v) => write!(f, "{}", f64::from(*v)),
            Self::DoubleZero => write!(f, "{}", 0.0f64),
            Self::IntZero => f.write_str("0"),
        }
    }
}

impl From<bool> for ScalarSample {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i8> for ScalarSample {
    fn from(value: i8) -> Self {
        Self::Byte(value)
    }
}

impl From<i16> for ScalarSample {
    fn from(value: i16) -> Self {
        Self::Short(value)
    }
}

impl From<i32> for ScalarSample {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for ScalarSample {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f32> for ScalarSample {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<f64> for ScalarSample {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<String> for ScalarSample {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for ScalarSample {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl<T: Into<ScalarSample>> From<Option<T>> for ScalarSample {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A run of identical samples collapsed into a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatSample {
    count: u16,
    sample: ScalarSample,
}

impl RepeatSample {
    /// Creates a run of `count` copies of `sample`; a zero count is rejected.
    pub fn new(count: u16, sample: ScalarSample) -> Result<Self> {
        if count == 0 {
            return Err(Error::invalid("repeat count must be at least 1"));
        }
        Ok(Self { count, sample })
    }

    /// Number of samples the run stands for.
    pub fn count(&self) -> u16 {
        self.count
    }

    /// The repeated sample.
    pub fn sample(&self) -> &ScalarSample {
        &self.sample
    }

    /// Splits the run into its count and sample.
    pub fn into_parts(self) -> (u16, ScalarSample) {
        (self.count, self.sample)
    }

    /// `RepeatByte` when the count fits in a byte, `RepeatShort` otherwise.
    pub fn opcode(&self) -> SampleOpcode {
        if self.count <= u16::from(u8::MAX) {
            SampleOpcode::RepeatByte
        } else {
            SampleOpcode::RepeatShort
        }
    }
}

/// One encode/decode unit of a sample stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleFrame {
    /// A single sample.
    Scalar(ScalarSample),
    /// A run of identical samples.
    Repeat(RepeatSample),
}

impl SampleFrame {
    /// Tag byte this frame is written with.
    pub fn opcode(&self) -> SampleOpcode {
        match self {
            Self::Scalar(sample) => sample.opcode(),
            Self::Repeat(repeat) => repeat.opcode(),
        }
    }

    /// Number of samples represented by this frame.
    pub fn sample_count(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Repeat(repeat) => usize::from(repeat.count()),
        }
    }

    /// The underlying scalar, regardless of repetition.
    pub fn sample(&self) -> &ScalarSample {
        match self {
            Self::Scalar(sample) => sample,
            Self::Repeat(repeat) => repeat.sample(),
        }
    }
}

impl From<ScalarSample> for SampleFrame {
    fn from(sample: ScalarSample) -> Self {
        Self::Scalar(sample)
    }
}

impl From<RepeatSample> for SampleFrame {
    fn from(repeat: RepeatSample) -> Self {
        Self::Repeat(repeat)
    }
}
