//! Timeline chunks: the stored unit of encoded samples for one host and sample kind.

mod accumulator;
mod timed;

pub use accumulator::{AccumulatorBuilder, AccumulatorOptions, TimelineChunkAccumulator};
pub use timed::TimedSamples;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::samples::{DefaultSampleCoder, SampleCoder};
use crate::times::{DefaultTimelineCoder, TimelineCoder, millis_to_date_time};
use crate::types::ScalarSample;

/// Encoded samples and timestamps of one (host, sample kind) pair over an interval.
///
/// A chunk is validated once when built and never changes afterwards; both
/// byte buffers are guaranteed to decode to exactly [`sample_count`] entries.
/// Times are kept at millisecond precision.
///
/// [`sample_count`]: TimelineChunk::sample_count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineChunk {
    chunk_id: i64,
    host_id: i32,
    sample_kind_id: i32,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    times: Vec<u8>,
    samples: Vec<u8>,
    sample_count: u32,
    aggregation_level: u32,
    not_valid: bool,
    dont_aggregate: bool,
}

impl TimelineChunk {
    /// Builds an unaggregated, valid chunk from already encoded buffers.
    ///
    /// Fails with [`Error::InconsistentChunk`] when `start_time > end_time` or
    /// when either buffer does not decode to `sample_count` entries.
    #[allow(clippy::too_many_arguments)]
    pub fn new<Tz: TimeZone>(
        chunk_id: i64,
        host_id: i32,
        sample_kind_id: i32,
        start_time: DateTime<Tz>,
        end_time: DateTime<Tz>,
        times: Vec<u8>,
        samples: Vec<u8>,
        sample_count: u32,
    ) -> Result<Self> {
        Self::builder(chunk_id, host_id, sample_kind_id)
            .interval(start_time, end_time)
            .times(times)
            .samples(samples, sample_count)
            .build()
    }

    /// Starts a builder for a chunk with the given identity.
    pub fn builder(chunk_id: i64, host_id: i32, sample_kind_id: i32) -> TimelineChunkBuilder {
        TimelineChunkBuilder {
            chunk_id,
            host_id,
            sample_kind_id,
            interval: None,
            times: Vec::new(),
            samples: Vec::new(),
            sample_count: 0,
            aggregation_level: 0,
            not_valid: false,
            dont_aggregate: false,
        }
    }

    /// Unique identifier assigned at creation.
    pub fn chunk_id(&self) -> i64 {
        self.chunk_id
    }

    /// Source host of the samples.
    pub fn host_id(&self) -> i32 {
        self.host_id
    }

    /// Metric the samples measure.
    pub fn sample_kind_id(&self) -> i32 {
        self.sample_kind_id
    }

    /// Beginning of the covered interval.
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// End of the covered interval.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    /// Compressed timestamps, one per sample.
    pub fn time_bytes(&self) -> &[u8] {
        &self.times
    }

    /// Encoded sample frames.
    pub fn sample_bytes(&self) -> &[u8] {
        &self.samples
    }

    /// Number of samples and timestamps stored.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// 0 for raw samples, higher for rolled-up chunks.
    pub fn aggregation_level(&self) -> u32 {
        self.aggregation_level
    }

    /// Set when the chunk has been superseded.
    pub fn not_valid(&self) -> bool {
        self.not_valid
    }

    /// Set when aggregation jobs must skip the chunk.
    pub fn dont_aggregate(&self) -> bool {
        self.dont_aggregate
    }

    /// Decodes the timestamps of every sample.
    pub fn decoded_times(&self) -> Result<Vec<DateTime<Utc>>> {
        DefaultTimelineCoder.decompress_date_times(&self.times)
    }

    /// Decodes every sample, expanding repeats.
    pub fn decoded_samples(&self) -> Result<Vec<ScalarSample>> {
        DefaultSampleCoder.decompress_samples(&self.samples)
    }

    /// Iterates `(timestamp, sample)` pairs in storage order.
    pub fn timed_samples(&self) -> TimedSamples<'_> {
        TimedSamples::new(&self.times, &self.samples)
    }

    /// Samples whose timestamp lies in `[start, end]`.
    pub fn samples_between<Tz: TimeZone>(
        &self,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> Result<Vec<(DateTime<Utc>, ScalarSample)>> {
        let start = start.with_timezone(&Utc);
        let end = end.with_timezone(&Utc);
        let mut selected = Vec::new();
        for entry in self.timed_samples() {
            let (time, sample) = entry?;
            if time >= start && time <= end {
                selected.push((time, sample));
            }
        }
        Ok(selected)
    }

    /// Decoded sample values as one comma-separated line.
    pub fn samples_as_csv(&self) -> Result<String> {
        DefaultSampleCoder.samples_as_csv(&self.samples)
    }

    /// Copy of this chunk marked as superseded.
    pub fn invalidated(&self) -> Self {
        Self {
            not_valid: true,
            ..self.clone()
        }
    }
}

/// Builder for [`TimelineChunk`]; validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct TimelineChunkBuilder {
    chunk_id: i64,
    host_id: i32,
    sample_kind_id: i32,
    interval: Option<(DateTime<Utc>, DateTime<Utc>)>,
    times: Vec<u8>,
    samples: Vec<u8>,
    sample_count: u32,
    aggregation_level: u32,
    not_valid: bool,
    dont_aggregate: bool,
}

impl TimelineChunkBuilder {
    /// Sets the covered interval. Without it, the first and last decoded times are used.
    pub fn interval<Tz: TimeZone>(mut self, start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        self.interval = Some((start.with_timezone(&Utc), end.with_timezone(&Utc)));
        self
    }

    /// Compressed time bytes as produced by a [`TimelineCoder`].
    pub fn times(mut self, times: Vec<u8>) -> Self {
        self.times = times;
        self
    }

    /// Encoded sample bytes and the number of samples they hold.
    pub fn samples(mut self, samples: Vec<u8>, sample_count: u32) -> Self {
        self.samples = samples;
        self.sample_count = sample_count;
        self
    }

    /// Marks the chunk as rolled up `level` times.
    pub fn aggregation_level(mut self, level: u32) -> Self {
        self.aggregation_level = level;
        self
    }

    /// Marks the chunk as superseded.
    pub fn not_valid(mut self, value: bool) -> Self {
        self.not_valid = value;
        self
    }

    /// Excludes the chunk from aggregation jobs.
    pub fn dont_aggregate(mut self, value: bool) -> Self {
        self.dont_aggregate = value;
        self
    }

    /// Validates the buffers against the metadata and produces the chunk.
    #[instrument(
        level = "debug",
        skip(self),
        fields(chunk_id = self.chunk_id, host_id = self.host_id, sample_count = self.sample_count)
    )]
    pub fn build(self) -> Result<TimelineChunk> {
        let expected = self.sample_count as usize;

        let time_count = DefaultTimelineCoder
            .count_time_samples(&self.times)
            .map_err(|err| Error::inconsistent(format!("time bytes do not decode: {err}")))?;
        if time_count != expected {
            debug!(time_count, "time count mismatch");
            return Err(Error::inconsistent(format!(
                "time bytes hold {time_count} times but sample count is {expected}"
            )));
        }

        let sample_total = DefaultSampleCoder
            .count_samples(&self.samples)
            .map_err(|err| Error::inconsistent(format!("sample bytes do not decode: {err}")))?;
        if sample_total != expected {
            debug!(sample_total, "sample count mismatch");
            return Err(Error::inconsistent(format!(
                "sample bytes hold {sample_total} samples but sample count is {expected}"
            )));
        }

        let (start, end) = match self.interval {
            Some(interval) => interval,
            None => {
                let times = DefaultTimelineCoder.decompress_date_times(&self.times)?;
                match (times.iter().min(), times.iter().max()) {
                    (Some(first), Some(last)) => (*first, *last),
                    _ => return Err(Error::inconsistent("an empty chunk needs an explicit interval")),
                }
            }
        };
        if start > end {
            return Err(Error::inconsistent(format!(
                "start time {start} is after end time {end}"
            )));
        }

        Ok(TimelineChunk {
            chunk_id: self.chunk_id,
            host_id: self.host_id,
            sample_kind_id: self.sample_kind_id,
            start_time: millis_to_date_time(start.timestamp_millis())?,
            end_time: millis_to_date_time(end.timestamp_millis())?,
            times: self.times,
            samples: self.samples,
            sample_count: self.sample_count,
            aggregation_level: self.aggregation_level,
            not_valid: self.not_valid,
            dont_aggregate: self.dont_aggregate,
        })
    }
}
