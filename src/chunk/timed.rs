use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::samples::{DefaultSampleCoder, SampleCursor};
use crate::times::{DefaultTimelineCoder, TimeCursor};
use crate::types::ScalarSample;

/// Iterator pairing each decoded timestamp of a chunk with its sample.
pub struct TimedSamples<'a> {
    times: TimeCursor<'a, DefaultTimelineCoder>,
    samples: SampleCursor<'a, DefaultSampleCoder>,
}

impl<'a> TimedSamples<'a> {
    pub(crate) fn new(times: &'a [u8], samples: &'a [u8]) -> Self {
        Self {
            times: TimeCursor::new(&DefaultTimelineCoder, times),
            samples: SampleCursor::new(&DefaultSampleCoder, samples),
        }
    }
}

impl Iterator for TimedSamples<'_> {
    type Item = Result<(DateTime<Utc>, ScalarSample)>;

    fn next(&mut self) -> Option<Self::Item> {
        let time = self.times.next()?;
        let sample = self.samples.next()?;
        Some(time.and_then(|time| sample.map(|sample| (time, sample))))
    }
}
