use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, instrument};

use super::TimelineChunk;
use crate::error::{Error, Result};
use crate::samples::{DefaultSampleCoder, RunEncoder, SampleCoder, check_encodable};
use crate::times::{DefaultTimelineCoder, TimelineCoder};
use crate::types::{SampleFrame, ScalarSample};

/// Options controlling how a [`TimelineChunkAccumulator`] encodes samples.
#[derive(Debug, Clone)]
pub struct AccumulatorOptions {
    /// Store each sample with the narrowest opcode that keeps its value.
    pub narrow_samples: bool,
    /// Collapse consecutive equal samples into repeat frames.
    pub collapse_repeats: bool,
}

impl Default for AccumulatorOptions {
    fn default() -> Self {
        Self {
            narrow_samples: true,
            collapse_repeats: true,
        }
    }
}

/// Builder for [`TimelineChunkAccumulator`].
#[derive(Debug, Clone)]
pub struct AccumulatorBuilder {
    host_id: i32,
    sample_kind_id: i32,
    options: AccumulatorOptions,
}

impl AccumulatorBuilder {
    /// Overrides accumulator options wholesale.
    pub fn options(mut self, options: AccumulatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Enables or disables opcode narrowing.
    pub fn narrow_samples(mut self, value: bool) -> Self {
        self.options.narrow_samples = value;
        self
    }

    /// Enables or disables repeat collapsing.
    pub fn collapse_repeats(mut self, value: bool) -> Self {
        self.options.collapse_repeats = value;
        self
    }

    /// Consumes the builder, constructing an empty accumulator.
    pub fn build(self) -> TimelineChunkAccumulator {
        TimelineChunkAccumulator {
            host_id: self.host_id,
            sample_kind_id: self.sample_kind_id,
            options: self.options,
            times: Vec::new(),
            encoded: Vec::new(),
            runs: RunEncoder::default(),
            sample_count: 0,
        }
    }
}

/// In-memory collector of samples for one (host, sample kind) pair.
///
/// Samples are encoded as they arrive; [`extract_chunk_and_reset`] turns the
/// collected data into a [`TimelineChunk`] and starts over.
///
/// [`extract_chunk_and_reset`]: TimelineChunkAccumulator::extract_chunk_and_reset
#[derive(Debug, Clone)]
pub struct TimelineChunkAccumulator {
    host_id: i32,
    sample_kind_id: i32,
    options: AccumulatorOptions,
    times: Vec<DateTime<Utc>>,
    encoded: Vec<u8>,
    runs: RunEncoder,
    sample_count: u32,
}

impl TimelineChunkAccumulator {
    /// Accumulator with default options.
    pub fn new(host_id: i32, sample_kind_id: i32) -> Self {
        Self::builder(host_id, sample_kind_id).build()
    }

    /// Starts configuring an accumulator.
    pub fn builder(host_id: i32, sample_kind_id: i32) -> AccumulatorBuilder {
        AccumulatorBuilder {
            host_id,
            sample_kind_id,
            options: AccumulatorOptions::default(),
        }
    }

    /// Source host of the collected samples.
    pub fn host_id(&self) -> i32 {
        self.host_id
    }

    /// Metric of the collected samples.
    pub fn sample_kind_id(&self) -> i32 {
        self.sample_kind_id
    }

    /// Samples collected since the last extraction.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Returns `true` when nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }

    /// Records `sample` taken at `time`. A rejected sample leaves the accumulator unchanged.
    pub fn add_sample<Tz: TimeZone>(&mut self, time: DateTime<Tz>, sample: ScalarSample) -> Result<()> {
        if self.sample_count == u32::MAX {
            return Err(Error::invalid("accumulator is full"));
        }
        check_encodable(&sample)?;

        let coder = DefaultSampleCoder;
        let sample = if self.options.narrow_samples {
            coder.compress_sample(sample)
        } else {
            sample
        };
        if self.options.collapse_repeats {
            self.runs.push(&coder, &mut self.encoded, sample)?;
        } else {
            coder.encode_sample(&mut self.encoded, &SampleFrame::Scalar(sample))?;
        }

        self.times.push(time.with_timezone(&Utc));
        self.sample_count += 1;
        Ok(())
    }

    /// Builds a chunk from everything collected and clears the accumulator.
    ///
    /// Returns `Ok(None)` when empty. On error the collected samples are kept.
    #[instrument(level = "debug", skip(self), fields(host_id = self.host_id, sample_kind_id = self.sample_kind_id))]
    pub fn extract_chunk_and_reset(&mut self, chunk_id: i64) -> Result<Option<TimelineChunk>> {
        let (Some(start), Some(end)) = (self.times.iter().min(), self.times.iter().max()) else {
            return Ok(None);
        };

        let samples = self.runs.peek_flushed(&DefaultSampleCoder, &self.encoded)?;
        let times = DefaultTimelineCoder.compress_date_times(&self.times)?;
        let chunk = TimelineChunk::new(
            chunk_id,
            self.host_id,
            self.sample_kind_id,
            *start,
            *end,
            times,
            samples,
            self.sample_count,
        )?;

        debug!(
            sample_count = self.sample_count,
            time_bytes = chunk.time_bytes().len(),
            sample_bytes = chunk.sample_bytes().len(),
            "extracted timeline chunk"
        );
        self.reset();
        Ok(Some(chunk))
    }

    fn reset(&mut self) {
        self.times.clear();
        self.encoded.clear();
        self.runs = RunEncoder::default();
        self.sample_count = 0;
    }
}
