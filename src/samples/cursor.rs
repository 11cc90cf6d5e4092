use super::{DefaultSampleCoder, SampleCoder};
use crate::error::Result;
use crate::types::{SampleFrame, ScalarSample};

/// Iterator over the samples of an encoded buffer with repeat frames expanded.
///
/// Yields `Err` once and then stops if the buffer is malformed.
pub struct SampleCursor<'a, C: SampleCoder + ?Sized = DefaultSampleCoder> {
    coder: &'a C,
    input: &'a [u8],
    pending: Option<(ScalarSample, u16)>,
    failed: bool,
}

impl<'a, C: SampleCoder + ?Sized> SampleCursor<'a, C> {
    /// Creates a cursor decoding `input` with `coder`.
    pub fn new(coder: &'a C, input: &'a [u8]) -> Self {
        Self {
            coder,
            input,
            pending: None,
            failed: false,
        }
    }

    /// Bytes not yet decoded.
    pub fn remaining(&self) -> &'a [u8] {
        self.input
    }
}

impl<C: SampleCoder + ?Sized> Iterator for SampleCursor<'_, C> {
    type Item = Result<ScalarSample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if let Some((sample, left)) = self.pending.take() {
            if left > 1 {
                self.pending = Some((sample.clone(), left - 1));
            }
            return Some(Ok(sample));
        }
        if self.input.is_empty() {
            return None;
        }
        match self.coder.decode_sample(&mut self.input) {
            Ok(SampleFrame::Scalar(sample)) => Some(Ok(sample)),
            Ok(SampleFrame::Repeat(repeat)) => {
                let (count, sample) = repeat.into_parts();
                if count > 1 {
                    self.pending = Some((sample.clone(), count - 1));
                }
                Some(Ok(sample))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
