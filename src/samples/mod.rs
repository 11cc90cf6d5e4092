//! Encoding of scalar samples into tagged byte frames.
//!
//! Every frame starts with a [`SampleOpcode`] tag followed by a payload whose
//! length is fixed by the tag (big-endian integers and IEEE-754 floats, a
//! u16-prefixed UTF-8 string for text). Repeat frames carry a count and one
//! nested scalar frame.

mod cursor;
mod narrow;

pub use cursor::SampleCursor;
pub use narrow::narrow_sample;

use bytes::{Buf, BufMut};
use tracing::trace;

use crate::error::{Error, Result};
use crate::types::{RepeatSample, SampleFrame, SampleOpcode, ScalarSample};
use crate::util::{ensure_remaining, push_csv_field, read_u8, read_u16_be, take_bytes};

/// Encodes and decodes sample frames.
///
/// Implementors provide the framing; the remaining operations are built on
/// top of [`SampleCoder::encode_sample`] and [`SampleCoder::decode_sample`].
pub trait SampleCoder {
    /// Appends the tag and payload of `frame` to `out`. Nothing is written on error.
    fn encode_sample(&self, out: &mut Vec<u8>, frame: &SampleFrame) -> Result<()>;

    /// Reads exactly one frame from the front of `input`.
    fn decode_sample(&self, input: &mut &[u8]) -> Result<SampleFrame>;

    /// Re-encodes `sample` with the smallest opcode that preserves its value.
    fn compress_sample(&self, sample: ScalarSample) -> ScalarSample {
        narrow_sample(sample)
    }

    /// Frames every sample as a scalar, without narrowing or run collapsing.
    fn encode_samples(&self, samples: &[ScalarSample]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(samples.len() * 2);
        for sample in samples {
            self.encode_sample(&mut out, &SampleFrame::Scalar(sample.clone()))?;
        }
        Ok(out)
    }

    /// Narrows every sample and collapses runs of equal samples into repeat frames.
    fn compress_samples(&self, samples: &[ScalarSample]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut runs = RunEncoder::default();
        for sample in samples {
            runs.push(self, &mut out, self.compress_sample(sample.clone()))?;
        }
        runs.flush(self, &mut out)?;
        Ok(out)
    }

    /// Decodes a whole buffer, expanding repeat frames.
    fn decompress_samples(&self, bytes: &[u8]) -> Result<Vec<ScalarSample>> {
        SampleCursor::new(self, bytes).collect()
    }

    /// Number of samples held by `bytes`, counting each repeat as its run length.
    fn count_samples(&self, bytes: &[u8]) -> Result<usize> {
        let mut input = bytes;
        let mut count = 0usize;
        while input.has_remaining() {
            count += self.decode_sample(&mut input)?.sample_count();
        }
        Ok(count)
    }

    /// Renders the decoded samples as one comma-separated line.
    fn samples_as_csv(&self, bytes: &[u8]) -> Result<String> {
        let mut csv = String::with_capacity(bytes.len() * 2);
        for (idx, sample) in SampleCursor::new(self, bytes).enumerate() {
            if idx > 0 {
                csv.push(',');
            }
            push_csv_field(&mut csv, &sample?.to_string());
        }
        Ok(csv)
    }
}

/// Big-endian frame layout used by stored timeline chunks.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSampleCoder;

impl SampleCoder for DefaultSampleCoder {
    fn encode_sample(&self, out: &mut Vec<u8>, frame: &SampleFrame) -> Result<()> {
        check_encodable(frame.sample())?;
        match frame {
            SampleFrame::Scalar(sample) => encode_scalar(out, sample),
            SampleFrame::Repeat(repeat) => {
                let opcode = repeat.opcode();
                out.put_u8(opcode.into());
                match opcode {
                    SampleOpcode::RepeatByte => out.put_u8(repeat.count() as u8),
                    _ => out.put_u16(repeat.count()),
                }
                encode_scalar(out, repeat.sample());
            }
        }
        Ok(())
    }

    fn decode_sample(&self, input: &mut &[u8]) -> Result<SampleFrame> {
        let opcode = SampleOpcode::from_tag(read_u8(input)?)?;
        let count = match opcode {
            SampleOpcode::RepeatByte => u16::from(read_u8(input)?),
            SampleOpcode::RepeatShort => read_u16_be(input)?,
            _ => return decode_payload(opcode, input).map(SampleFrame::Scalar),
        };
        let inner = SampleOpcode::from_tag(read_u8(input)?)?;
        if inner.is_repeat() {
            return Err(Error::invalid("repeat frame nests another repeat"));
        }
        let sample = decode_payload(inner, input)?;
        RepeatSample::new(count, sample).map(SampleFrame::Repeat)
    }
}

pub(crate) fn check_encodable(sample: &ScalarSample) -> Result<()> {
    if let ScalarSample::Text(text) = sample {
        if text.len() > usize::from(u16::MAX) {
            return Err(Error::invalid(format!(
                "text sample of {} bytes exceeds the 65535 byte limit",
                text.len()
            )));
        }
    }
    Ok(())
}

fn encode_scalar(out: &mut Vec<u8>, sample: &ScalarSample) {
    out.put_u8(sample.opcode().into());
    match sample {
        ScalarSample::Null | ScalarSample::DoubleZero | ScalarSample::IntZero => {}
        ScalarSample::Boolean(flag) => out.put_u8(u8::from(*flag)),
        ScalarSample::Byte(v) | ScalarSample::ByteForDouble(v) => out.put_i8(*v),
        ScalarSample::Short(v) | ScalarSample::ShortForDouble(v) => out.put_i16(*v),
        ScalarSample::Int(v) => out.put_i32(*v),
        ScalarSample::Long(v) => out.put_i64(*v),
        ScalarSample::Float(v) | ScalarSample::FloatForDouble(v) => out.put_f32(*v),
        ScalarSample::Double(v) => out.put_f64(*v),
        ScalarSample::Text(text) => {
            // length checked by check_encodable
            out.put_u16(text.len() as u16);
            out.put_slice(text.as_bytes());
        }
    }
}

fn decode_payload(opcode: SampleOpcode, input: &mut &[u8]) -> Result<ScalarSample> {
    if let Some(len) = opcode.payload_len() {
        ensure_remaining(&*input, len)?;
    }
    let sample = match opcode {
        SampleOpcode::Null => ScalarSample::Null,
        SampleOpcode::DoubleZero => ScalarSample::DoubleZero,
        SampleOpcode::IntZero => ScalarSample::IntZero,
        SampleOpcode::Boolean => match input.get_u8() {
            0 => ScalarSample::Boolean(false),
            1 => ScalarSample::Boolean(true),
            other => return Err(Error::invalid(format!("boolean sample byte {other}"))),
        },
        SampleOpcode::Byte => ScalarSample::Byte(input.get_i8()),
        SampleOpcode::ByteForDouble => ScalarSample::ByteForDouble(input.get_i8()),
        SampleOpcode::Short => ScalarSample::Short(input.get_i16()),
        SampleOpcode::ShortForDouble => ScalarSample::ShortForDouble(input.get_i16()),
        SampleOpcode::Int => ScalarSample::Int(input.get_i32()),
        SampleOpcode::Long => ScalarSample::Long(input.get_i64()),
        SampleOpcode::Float => ScalarSample::Float(input.get_f32()),
        SampleOpcode::FloatForDouble => ScalarSample::FloatForDouble(input.get_f32()),
        SampleOpcode::Double => ScalarSample::Double(input.get_f64()),
        SampleOpcode::String => {
            let len = usize::from(read_u16_be(input)?);
            let bytes = take_bytes(input, len)?;
            let text = std::str::from_utf8(bytes)
                .map_err(|err| Error::invalid(format!("text sample is not utf-8: {err}")))?;
            ScalarSample::Text(text.to_owned())
        }
        SampleOpcode::RepeatByte | SampleOpcode::RepeatShort => {
            return Err(Error::invalid("repeat opcode where a scalar was expected"));
        }
    };
    Ok(sample)
}

/// Collapses consecutive equal samples into repeat frames as they arrive.
#[derive(Debug, Default, Clone)]
pub(crate) struct RunEncoder {
    pending: Option<(ScalarSample, u16)>,
}

impl RunEncoder {
    /// Adds one sample, writing out the previous run if `sample` breaks it.
    pub(crate) fn push<C: SampleCoder + ?Sized>(
        &mut self,
        coder: &C,
        out: &mut Vec<u8>,
        sample: ScalarSample,
    ) -> Result<()> {
        if let Some((current, count)) = &mut self.pending {
            if current.same_encoding(&sample) && *count < u16::MAX {
                *count += 1;
                return Ok(());
            }
        }
        self.flush(coder, out)?;
        self.pending = Some((sample, 1));
        Ok(())
    }

    /// Writes the pending run, if any.
    pub(crate) fn flush<C: SampleCoder + ?Sized>(
        &mut self,
        coder: &C,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        let Some((sample, count)) = self.pending.take() else {
            return Ok(());
        };
        let frame = if count == 1 {
            SampleFrame::Scalar(sample)
        } else {
            trace!(count, "collapsing sample run");
            SampleFrame::Repeat(RepeatSample::new(count, sample)?)
        };
        coder.encode_sample(out, &frame)
    }

    /// Encoded bytes plus the pending run, leaving `self` untouched.
    pub(crate) fn peek_flushed<C: SampleCoder + ?Sized>(
        &self,
        coder: &C,
        encoded: &[u8],
    ) -> Result<Vec<u8>> {
        let mut out = encoded.to_vec();
        self.clone().flush(coder, &mut out)?;
        Ok(out)
    }
}
