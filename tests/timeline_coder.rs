use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use timeline_codec::{
    DefaultTimelineCoder, Error, MAX_DELTA_TIME_MS, TimeCursor, TimeEntry, TimelineCoder,
};

fn at(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).expect("valid timestamp")
}

const BASE: i64 = 1_700_000_000_123;

#[test]
fn empty_sequence_encodes_to_nothing() -> Result<()> {
    let coder = DefaultTimelineCoder;
    assert!(coder.compress_date_times(&[])?.is_empty());
    assert!(coder.decompress_date_times(&[])?.is_empty());
    assert_eq!(coder.count_time_samples(&[])?, 0);
    Ok(())
}

#[test]
fn first_time_is_stored_in_full() -> Result<()> {
    let bytes = DefaultTimelineCoder.compress_date_times(&[at(BASE)])?;
    let mut expected = vec![0xFF];
    expected.extend_from_slice(&BASE.to_be_bytes());
    assert_eq!(bytes, expected);
    Ok(())
}

#[test]
fn regular_spacing_collapses_into_one_entry() -> Result<()> {
    let coder = DefaultTimelineCoder;
    let times: Vec<_> = (0..2142).map(|i| at(BASE) + Duration::minutes(i)).collect();
    let bytes = coder.compress_date_times(&times)?;

    // FullTime (9) + RepeatedDeltaTimeShort: tag, u16 count, 3-byte varint of 60000
    assert_eq!(bytes.len(), 15);
    assert_eq!(&bytes[9..12], &[0xFD, 0x08, 0x5D]);
    assert_eq!(coder.decompress_date_times(&bytes)?, times);
    assert_eq!(coder.count_time_samples(&bytes)?, times.len());
    Ok(())
}

#[test]
fn delta_entries_use_the_expected_layout() -> Result<()> {
    let times = [
        at(BASE),
        at(BASE + 1000),
        at(BASE + 2000),
        at(BASE + 2000),
        at(BASE + 2500),
    ];
    let bytes = DefaultTimelineCoder.compress_date_times(&times)?;
    assert_eq!(
        &bytes[9..],
        &[0xFE, 2, 0xE8, 0x07, 0xFC, 0x00, 0xFC, 0xF4, 0x03]
    );
    assert_eq!(DefaultTimelineCoder.decompress_date_times(&bytes)?, times);
    Ok(())
}

#[test]
fn irregular_and_backwards_times_round_trip() -> Result<()> {
    let coder = DefaultTimelineCoder;
    let times = vec![
        at(BASE),
        at(BASE + 1),
        at(BASE + 5_000),
        at(BASE - 3_000),
        at(BASE - 3_000),
        at(BASE + 100 * 86_400_000),
        at(BASE + 100 * 86_400_000 + MAX_DELTA_TIME_MS),
        at(0),
        at(-86_400_000),
    ];
    let bytes = coder.compress_date_times(&times)?;
    assert_eq!(coder.decompress_date_times(&bytes)?, times);
    assert_eq!(coder.count_time_samples(&bytes)?, times.len());

    let full_times = bytes.iter().filter(|byte| **byte == 0xFF).count();
    assert!(full_times >= 4, "expected absolute entries for every jump");
    Ok(())
}

#[test]
fn long_runs_are_split_across_entries() -> Result<()> {
    let coder = DefaultTimelineCoder;
    let times: Vec<_> = (0..70_001).map(|i| at(BASE + i * 10)).collect();
    let bytes = coder.compress_date_times(&times)?;
    assert_eq!(coder.decompress_date_times(&bytes)?, times);

    let mut input = bytes.as_slice();
    assert_eq!(coder.decode_entry(&mut input)?, TimeEntry::Full(BASE));
    assert_eq!(
        coder.decode_entry(&mut input)?,
        TimeEntry::Delta { delta: 10, count: u16::MAX }
    );
    assert_eq!(
        coder.decode_entry(&mut input)?,
        TimeEntry::Delta { delta: 10, count: (70_000 - 65_535) as u16 }
    );
    assert!(input.is_empty());
    Ok(())
}

#[test]
fn unknown_opcode_is_reported() {
    let err = DefaultTimelineCoder
        .decompress_date_times(&[0x10, 0, 0])
        .unwrap_err();
    assert!(
        matches!(err, Error::UnknownOpcode { stream: "timeline", tag: 0x10 }),
        "{err}"
    );
}

#[test]
fn truncated_time_lines_are_reported() {
    let coder = DefaultTimelineCoder;

    let err = coder.decompress_date_times(&[0xFF, 0, 0]).unwrap_err();
    assert!(matches!(err, Error::TruncatedStream { needed: 8, remaining: 2 }), "{err}");

    let mut bytes = coder
        .compress_date_times(&[at(BASE), at(BASE + 60_000)])
        .expect("compress");
    bytes.pop();
    let err = coder.decompress_date_times(&bytes).unwrap_err();
    assert!(matches!(err, Error::TruncatedStream { .. }), "{err}");
}

#[test]
fn delta_without_base_time_is_rejected() {
    let coder = DefaultTimelineCoder;
    let err = coder.decompress_date_times(&[0xFC, 0x01]).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "{err}");
    let err = coder.count_time_samples(&[0xFC, 0x01]).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "{err}");
}

#[test]
fn zero_count_runs_are_rejected() {
    let coder = DefaultTimelineCoder;
    let mut bytes = vec![0xFF];
    bytes.extend_from_slice(&BASE.to_be_bytes());
    bytes.extend_from_slice(&[0xFE, 0, 0x01]);
    let err = coder.decompress_date_times(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "{err}");

    let mut out = Vec::new();
    let err = coder
        .encode_entry(&mut out, &TimeEntry::Delta { delta: 1, count: 0 })
        .unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "{err}");
    assert!(out.is_empty());
}

#[test]
fn timelines_combine_in_order() -> Result<()> {
    let coder = DefaultTimelineCoder;
    let first: Vec<_> = (0..10).map(|i| at(BASE + i * 60_000)).collect();
    let second: Vec<_> = (10..25).map(|i| at(BASE + i * 60_000)).collect();
    let first_bytes = coder.compress_date_times(&first)?;
    let second_bytes = coder.compress_date_times(&second)?;

    let combined = coder.combine_timelines(&[first_bytes.as_slice(), second_bytes.as_slice()])?;
    let all: Vec<_> = first.iter().chain(&second).copied().collect();
    assert_eq!(coder.decompress_date_times(&combined)?, all);
    assert_eq!(combined, coder.compress_date_times(&all)?);
    Ok(())
}

#[test]
fn cursor_yields_times_lazily() -> Result<()> {
    let coder = DefaultTimelineCoder;
    let times = [at(BASE), at(BASE + 5), at(BASE + 10)];
    let bytes = coder.compress_date_times(&times)?;

    let mut cursor = TimeCursor::new(&coder, &bytes);
    assert_eq!(cursor.next().transpose()?, Some(times[0]));
    assert_eq!(cursor.next().transpose()?, Some(times[1]));
    assert_eq!(cursor.next().transpose()?, Some(times[2]));
    assert!(cursor.next().is_none());
    Ok(())
}

#[test]
fn edge_time_sequences_round_trip() -> Result<()> {
    const DAY: i64 = 86_400_000;
    let far = 8_000_000_000_000;
    let sequences: Vec<Vec<i64>> = vec![
        vec![],
        vec![-far],
        vec![far, -far, far, far],
        vec![0, MAX_DELTA_TIME_MS, MAX_DELTA_TIME_MS * 2 + 1, MAX_DELTA_TIME_MS * 2],
        vec![BASE, BASE, BASE, BASE - 1, BASE - 1, BASE],
        vec![-DAY, -DAY + 1, -1, 0, 1, DAY],
        (0..300).map(|i| BASE + i * 1000).chain([BASE]).collect(),
        (0..600).map(|i| BASE + (i % 7) * i).collect(),
        (0..1000).rev().map(|i| BASE + i * 60_000).collect(),
    ];

    let coder = DefaultTimelineCoder;
    for millis in &sequences {
        let times: Vec<_> = millis.iter().copied().map(at).collect();
        let bytes = coder.compress_date_times(&times)?;
        assert_eq!(coder.decompress_date_times(&bytes)?, times, "{millis:?}");
        assert_eq!(coder.count_time_samples(&bytes)?, times.len());
    }
    Ok(())
}

#[test]
fn out_of_range_full_time_fails_to_count() {
    let mut bytes = vec![0xFF];
    bytes.extend_from_slice(&i64::MIN.to_be_bytes());
    let err = DefaultTimelineCoder.count_time_samples(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "{err}");
}
