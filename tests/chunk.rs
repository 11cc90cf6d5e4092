use anyhow::Result;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Duration, Utc};
use timeline_codec::{
    DefaultSampleCoder, DefaultTimelineCoder, Error, SampleCoder, ScalarSample, TimelineChunk,
    TimelineCoder,
};

fn at(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).expect("valid timestamp")
}

fn minutes(count: i64) -> Vec<DateTime<Utc>> {
    (0..count)
        .map(|i| at(1_600_000_000_000) + Duration::minutes(i))
        .collect()
}

fn buffers(values: &[i64]) -> Result<(Vec<DateTime<Utc>>, Vec<u8>, Vec<u8>)> {
    let times = minutes(values.len() as i64);
    let samples: Vec<ScalarSample> = values.iter().copied().map(ScalarSample::Long).collect();
    let sample_bytes = DefaultSampleCoder.compress_samples(&samples)?;
    let time_bytes = DefaultTimelineCoder.compress_date_times(&times)?;
    Ok((times, time_bytes, sample_bytes))
}

#[test]
fn sample_count_must_match_both_buffers() -> Result<()> {
    let (times, time_bytes, sample_bytes) = buffers(&[1, 2, 3])?;

    let err = TimelineChunk::new(1, 2, 3, times[0], times[2], time_bytes.clone(), sample_bytes.clone(), 4)
        .unwrap_err();
    assert!(matches!(err, Error::InconsistentChunk(_)), "{err}");

    let (_, _, short_samples) = buffers(&[1, 2])?;
    let err = TimelineChunk::new(1, 2, 3, times[0], times[2], time_bytes.clone(), short_samples, 3)
        .unwrap_err();
    assert!(matches!(err, Error::InconsistentChunk(_)), "{err}");

    let err = TimelineChunk::new(1, 2, 3, times[0], times[2], time_bytes, vec![0x42], 3).unwrap_err();
    assert!(matches!(err, Error::InconsistentChunk(_)), "{err}");
    Ok(())
}

#[test]
fn start_must_not_follow_end() -> Result<()> {
    let (times, time_bytes, sample_bytes) = buffers(&[1, 2, 3])?;
    let err = TimelineChunk::new(1, 2, 3, times[2], times[0], time_bytes, sample_bytes, 3).unwrap_err();
    assert!(matches!(err, Error::InconsistentChunk(_)), "{err}");
    Ok(())
}

#[test]
fn builder_infers_interval_from_times() -> Result<()> {
    let (times, time_bytes, sample_bytes) = buffers(&[5, 6, 7, 8])?;
    let chunk = TimelineChunk::builder(9, 10, 11)
        .times(time_bytes)
        .samples(sample_bytes, 4)
        .build()?;
    assert_eq!(chunk.start_time(), times[0]);
    assert_eq!(chunk.end_time(), times[3]);
    assert_eq!(chunk.decoded_times()?, times);

    let err = TimelineChunk::builder(9, 10, 11).build().unwrap_err();
    assert!(matches!(err, Error::InconsistentChunk(_)), "{err}");
    Ok(())
}

#[test]
fn timed_samples_pair_times_with_values() -> Result<()> {
    let (times, time_bytes, sample_bytes) = buffers(&[4, 4, 4, 9])?;
    let chunk = TimelineChunk::new(1, 2, 3, times[0], times[3], time_bytes, sample_bytes, 4)?;

    let pairs = chunk.timed_samples().collect::<timeline_codec::Result<Vec<_>>>()?;
    let values: Vec<_> = pairs.iter().map(|(_, sample)| sample.to_string()).collect();
    assert_eq!(values, ["4", "4", "4", "9"]);
    assert_eq!(pairs[3].0, times[3]);

    let middle = chunk.samples_between(times[1], times[2])?;
    assert_eq!(middle.len(), 2);
    assert_eq!(middle[0].0, times[1]);

    assert!(chunk.samples_between(times[3] + Duration::seconds(1), times[3] + Duration::hours(1))?.is_empty());
    assert_eq!(chunk.decoded_samples()?.len(), 4);
    Ok(())
}

#[test]
fn invalidated_copy_leaves_original_untouched() -> Result<()> {
    let (times, time_bytes, sample_bytes) = buffers(&[1])?;
    let chunk = TimelineChunk::new(1, 2, 3, times[0], times[0], time_bytes, sample_bytes, 1)?;
    let superseded = chunk.invalidated();

    assert!(superseded.not_valid());
    assert!(!chunk.not_valid());
    assert_eq!(superseded.sample_bytes(), chunk.sample_bytes());
    assert_eq!(superseded.chunk_id(), chunk.chunk_id());
    Ok(())
}

#[test]
fn sub_millisecond_precision_is_dropped() -> Result<()> {
    let start = at(5_000) + Duration::microseconds(750);
    let chunk = TimelineChunk::new(1, 2, 3, start, start, Vec::new(), Vec::new(), 0)?;
    assert_eq!(chunk.start_time(), at(5_000));
    Ok(())
}

#[test]
fn chunks_are_shareable_across_threads() -> Result<()> {
    let (times, time_bytes, sample_bytes) = buffers(&[3, 1, 4, 1, 5])?;
    let chunk = TimelineChunk::new(1, 2, 3, times[0], times[4], time_bytes, sample_bytes, 5)?;

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| chunk.samples_as_csv()))
            .collect();
        for handle in handles {
            let csv = handle.join().expect("thread panicked").expect("decodes");
            assert_eq!(csv, "3,1,4,1,5");
        }
    });
    Ok(())
}

#[test]
fn undecodable_time_bytes_are_rejected() -> Result<()> {
    let samples = DefaultSampleCoder.encode_samples(&[ScalarSample::Int(1)])?;
    let mut times = vec![0xFF];
    times.extend_from_slice(&i64::MAX.to_be_bytes());

    let err = TimelineChunk::new(1, 2, 3, at(0), at(0), times.clone(), samples.clone(), 1)
        .unwrap_err();
    assert!(matches!(err, Error::InconsistentChunk(_)), "{err}");

    let json = serde_json::json!({
        "chunkId": 1,
        "hostId": 2,
        "sampleKindId": 3,
        "startTime": 0,
        "endTime": 0,
        "times": STANDARD.encode(&times),
        "samples": STANDARD.encode(&samples),
        "sampleCount": 1,
        "aggregationLevel": 0,
        "notValid": false,
        "dontAggregate": false,
    })
    .to_string();
    let err = TimelineChunk::from_compact_json(&json).unwrap_err();
    assert!(matches!(err, Error::InconsistentChunk(_)), "{err}");
    Ok(())
}

#[test]
fn overflowing_time_delta_is_rejected() -> Result<()> {
    let samples = DefaultSampleCoder.encode_samples(&[ScalarSample::Int(1), ScalarSample::Int(2)])?;
    let mut times = vec![0xFF];
    times.extend_from_slice(&0i64.to_be_bytes());
    // DeltaTime carrying u64::MAX as a varint
    times.push(0xFC);
    times.extend_from_slice(&[0xFF; 9]);
    times.push(0x01);

    let err = TimelineChunk::new(1, 2, 3, at(0), at(0), times, samples, 2).unwrap_err();
    assert!(matches!(err, Error::InconsistentChunk(_)), "{err}");
    Ok(())
}
