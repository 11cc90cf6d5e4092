#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Timeline chunks, their builder and the in-memory accumulator.
pub mod chunk;
/// Variable-length integer codecs.
pub mod encoding;
/// Shared error and result types.
pub mod error;
/// Sample frame encoding and decoding.
pub mod samples;
/// Timestamp compression.
pub mod times;
/// Opcodes and sample values used across the crate.
pub mod types;
/// Byte-level helpers consumed by the coders.
pub mod util;
/// Compact and loose JSON views of a chunk.
pub mod views;

pub use chunk::{
    AccumulatorBuilder, AccumulatorOptions, TimedSamples, TimelineChunk, TimelineChunkAccumulator,
    TimelineChunkBuilder,
};
pub use error::{Error, Result};
pub use samples::{DefaultSampleCoder, SampleCoder, SampleCursor, narrow_sample};
pub use times::{DefaultTimelineCoder, MAX_DELTA_TIME_MS, TimeCursor, TimeEntry, TimelineCoder};
pub use types::*;
pub use views::{COMPACT_VIEW_KEYS, CompactView, LOOSE_VIEW_KEYS, LooseView};
