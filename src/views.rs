//! JSON projections of a [`TimelineChunk`].
//!
//! The compact view is the storage and replication format: every field of the
//! chunk, with both byte buffers as standard Base64 and times as epoch
//! milliseconds. The loose view is a diagnostic rendering with the samples
//! decoded to CSV; it cannot be turned back into a chunk.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::chunk::TimelineChunk;
use crate::error::{Error, Result};
use crate::times::millis_to_date_time;

/// Number of keys in a serialized [`CompactView`].
pub const COMPACT_VIEW_KEYS: usize = 11;

/// Number of keys in a serialized [`LooseView`].
pub const LOOSE_VIEW_KEYS: usize = 4;

/// Storage representation of a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompactView {
    /// Chunk identifier.
    pub chunk_id: i64,
    /// Source host.
    pub host_id: i32,
    /// Metric identifier.
    pub sample_kind_id: i32,
    /// Start of the interval, epoch milliseconds.
    pub start_time: i64,
    /// End of the interval, epoch milliseconds.
    pub end_time: i64,
    /// Base64 of the compressed time bytes.
    pub times: String,
    /// Base64 of the encoded sample bytes.
    pub samples: String,
    /// Number of samples in the chunk.
    pub sample_count: u32,
    /// Aggregation level, 0 for raw data.
    pub aggregation_level: u32,
    /// Superseded marker.
    pub not_valid: bool,
    /// Aggregation exclusion marker.
    pub dont_aggregate: bool,
}

impl CompactView {
    /// Decodes the `samples` field back into the raw sample bytes.
    pub fn sample_bytes(&self) -> Result<Vec<u8>> {
        Ok(BASE64.decode(&self.samples)?)
    }

    /// Decodes the `times` field back into the compressed time bytes.
    pub fn time_bytes(&self) -> Result<Vec<u8>> {
        Ok(BASE64.decode(&self.times)?)
    }
}

/// Human-readable rendering of a chunk for inspection tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LooseView {
    /// Chunk identifier.
    pub chunk_id: i64,
    /// Source host.
    pub host_id: i32,
    /// Metric identifier.
    pub sample_kind_id: i32,
    /// Decoded sample values, comma separated.
    #[serde(rename = "samplesAsCSV")]
    pub samples_as_csv: String,
}

impl TimelineChunk {
    /// Projects the chunk onto its storage representation.
    pub fn compact_view(&self) -> CompactView {
        CompactView {
            chunk_id: self.chunk_id(),
            host_id: self.host_id(),
            sample_kind_id: self.sample_kind_id(),
            start_time: self.start_time().timestamp_millis(),
            end_time: self.end_time().timestamp_millis(),
            times: BASE64.encode(self.time_bytes()),
            samples: BASE64.encode(self.sample_bytes()),
            sample_count: self.sample_count(),
            aggregation_level: self.aggregation_level(),
            not_valid: self.not_valid(),
            dont_aggregate: self.dont_aggregate(),
        }
    }

    /// Projects the chunk onto its diagnostic representation, decoding the samples.
    pub fn loose_view(&self) -> Result<LooseView> {
        Ok(LooseView {
            chunk_id: self.chunk_id(),
            host_id: self.host_id(),
            sample_kind_id: self.sample_kind_id(),
            samples_as_csv: self.samples_as_csv()?,
        })
    }

    /// Serializes the compact view as a JSON object.
    pub fn to_compact_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.compact_view())?)
    }

    /// Serializes the loose view as a JSON object.
    pub fn to_loose_json(&self) -> Result<String> {
        let view = self.loose_view()?;
        Ok(serde_json::to_string(&view)?)
    }

    /// Loads a chunk from its compact JSON form, re-validating its buffers.
    #[instrument(level = "debug", skip(json), fields(len = json.len()))]
    pub fn from_compact_json(json: &str) -> Result<Self> {
        let view: CompactView = serde_json::from_str(json)?;
        Self::try_from(view)
    }
}

impl TryFrom<CompactView> for TimelineChunk {
    type Error = Error;

    fn try_from(view: CompactView) -> Result<Self> {
        let times = view.time_bytes()?;
        let samples = view.sample_bytes()?;
        TimelineChunk::builder(view.chunk_id, view.host_id, view.sample_kind_id)
            .interval(
                millis_to_date_time(view.start_time)?,
                millis_to_date_time(view.end_time)?,
            )
            .times(times)
            .samples(samples, view.sample_count)
            .aggregation_level(view.aggregation_level)
            .not_valid(view.not_valid)
            .dont_aggregate(view.dont_aggregate)
            .build()
    }
}
