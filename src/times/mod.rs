//! Delta compression of sample timestamps.
//!
//! A time line opens with an absolute [`TimelineOpcode::FullTime`] entry; every
//! following timestamp is stored as the millisecond delta from its
//! predecessor, and runs of equal deltas collapse into a single repeated-delta
//! entry. Deltas that are negative or larger than [`MAX_DELTA_TIME_MS`] fall
//! back to another absolute entry, so any sequence can be represented.

mod cursor;

pub use cursor::TimeCursor;

use bytes::BufMut;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::encoding::{decode_varint, encode_varint};
use crate::error::{Error, Result};
use crate::types::TimelineOpcode;
use crate::util::{read_i64_be, read_u8, read_u16_be};

/// Largest delta, in milliseconds, stored relative to the previous timestamp.
pub const MAX_DELTA_TIME_MS: i64 = u32::MAX as i64;

/// One decoded entry of a time line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeEntry {
    /// Absolute epoch milliseconds.
    Full(i64),
    /// `count` timestamps, each `delta` milliseconds after the previous one.
    Delta {
        /// Milliseconds between consecutive timestamps.
        delta: u64,
        /// Number of timestamps in the run.
        count: u16,
    },
}

impl TimeEntry {
    /// Number of timestamps this entry expands to.
    pub fn time_count(&self) -> usize {
        match self {
            Self::Full(_) => 1,
            Self::Delta { count, .. } => usize::from(*count),
        }
    }
}

/// Compresses and decompresses sequences of timestamps.
pub trait TimelineCoder {
    /// Appends one entry to `out`. Nothing is written on error.
    fn encode_entry(&self, out: &mut Vec<u8>, entry: &TimeEntry) -> Result<()>;

    /// Reads exactly one entry from the front of `input`.
    fn decode_entry(&self, input: &mut &[u8]) -> Result<TimeEntry>;

    /// Encodes `times` in order. An empty slice yields an empty buffer.
    fn compress_date_times(&self, times: &[DateTime<Utc>]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(16);
        let mut previous: Option<i64> = None;
        let mut run: Option<(u64, u16)> = None;

        for time in times {
            let millis = time.timestamp_millis();
            let prev = previous.replace(millis);
            let delta = prev
                .and_then(|prev| millis.checked_sub(prev))
                .filter(|delta| (0..=MAX_DELTA_TIME_MS).contains(delta));

            let Some(delta) = delta else {
                if let Some((delta, count)) = run.take() {
                    self.encode_entry(&mut out, &TimeEntry::Delta { delta, count })?;
                }
                if let Some(prev) = prev {
                    debug!(prev, millis, "irregular time delta, storing full time");
                }
                self.encode_entry(&mut out, &TimeEntry::Full(millis))?;
                continue;
            };

            let delta = delta as u64;
            if let Some((current, count)) = &mut run {
                if *current == delta && *count < u16::MAX {
                    *count += 1;
                    continue;
                }
            }
            if let Some((delta, count)) = run.take() {
                self.encode_entry(&mut out, &TimeEntry::Delta { delta, count })?;
            }
            run = Some((delta, 1));
        }
        if let Some((delta, count)) = run {
            self.encode_entry(&mut out, &TimeEntry::Delta { delta, count })?;
        }
        Ok(out)
    }

    /// Decodes every timestamp of an encoded time line.
    fn decompress_date_times(&self, bytes: &[u8]) -> Result<Vec<DateTime<Utc>>> {
        TimeCursor::new(self, bytes).collect()
    }

    /// Number of timestamps in `bytes`, without collecting them.
    ///
    /// Every timestamp is still resolved, so a time line that fails to
    /// decode fails to count.
    fn count_time_samples(&self, bytes: &[u8]) -> Result<usize> {
        TimeCursor::new(self, bytes).try_fold(0usize, |count, time| time.map(|_| count + 1))
    }

    /// Concatenates several encoded time lines and re-encodes them as one.
    fn combine_timelines(&self, timelines: &[&[u8]]) -> Result<Vec<u8>> {
        let mut times = Vec::new();
        for timeline in timelines {
            times.extend(self.decompress_date_times(timeline)?);
        }
        self.compress_date_times(&times)
    }
}

/// Big-endian layout with LEB128 deltas used by stored timeline chunks.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTimelineCoder;

impl TimelineCoder for DefaultTimelineCoder {
    fn encode_entry(&self, out: &mut Vec<u8>, entry: &TimeEntry) -> Result<()> {
        match *entry {
            TimeEntry::Full(millis) => {
                out.put_u8(TimelineOpcode::FullTime.into());
                out.put_i64(millis);
            }
            TimeEntry::Delta { count: 0, .. } => {
                return Err(Error::invalid("time delta run must cover at least one time"));
            }
            TimeEntry::Delta { delta, count: 1 } => {
                out.put_u8(TimelineOpcode::DeltaTime.into());
                encode_varint(delta, out);
            }
            TimeEntry::Delta { delta, count } => {
                if let Ok(short_count) = u8::try_from(count) {
                    out.put_u8(TimelineOpcode::RepeatedDeltaTimeByte.into());
                    out.put_u8(short_count);
                } else {
                    out.put_u8(TimelineOpcode::RepeatedDeltaTimeShort.into());
                    out.put_u16(count);
                }
                encode_varint(delta, out);
            }
        }
        Ok(())
    }

    fn decode_entry(&self, input: &mut &[u8]) -> Result<TimeEntry> {
        let opcode = TimelineOpcode::from_tag(read_u8(input)?)?;
        let count = match opcode {
            TimelineOpcode::FullTime => return read_i64_be(input).map(TimeEntry::Full),
            TimelineOpcode::DeltaTime => 1,
            TimelineOpcode::RepeatedDeltaTimeByte => u16::from(read_u8(input)?),
            TimelineOpcode::RepeatedDeltaTimeShort => read_u16_be(input)?,
        };
        if count == 0 {
            return Err(Error::invalid("repeated time delta with zero count"));
        }
        let delta = decode_varint(input)?;
        Ok(TimeEntry::Delta { delta, count })
    }
}

pub(crate) fn millis_to_date_time(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| Error::invalid(format!("timestamp {millis}ms is out of range")))
}
