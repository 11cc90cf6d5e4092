use chrono::{DateTime, Utc};

use super::{DefaultTimelineCoder, TimeEntry, TimelineCoder, millis_to_date_time};
use crate::error::{Error, Result};

/// Iterator over the timestamps of an encoded time line.
///
/// Yields `Err` once and then stops if the time line is malformed.
pub struct TimeCursor<'a, C: TimelineCoder + ?Sized = DefaultTimelineCoder> {
    coder: &'a C,
    input: &'a [u8],
    last: Option<i64>,
    pending: Option<(i64, u16)>,
    failed: bool,
}

impl<'a, C: TimelineCoder + ?Sized> TimeCursor<'a, C> {
    /// Creates a cursor decoding `input` with `coder`.
    pub fn new(coder: &'a C, input: &'a [u8]) -> Self {
        Self {
            coder,
            input,
            last: None,
            pending: None,
            failed: false,
        }
    }

    fn step(&mut self) -> Option<Result<i64>> {
        if let Some((delta, left)) = self.pending.take() {
            if left > 1 {
                self.pending = Some((delta, left - 1));
            }
            let last = self.last?;
            return Some(
                last.checked_add(delta)
                    .ok_or_else(|| Error::invalid("time delta overflows i64 milliseconds")),
            );
        }
        if self.input.is_empty() {
            return None;
        }
        match self.coder.decode_entry(&mut self.input) {
            Ok(TimeEntry::Full(millis)) => Some(Ok(millis)),
            Ok(TimeEntry::Delta { delta, count }) => {
                if self.last.is_none() {
                    return Some(Err(Error::invalid("time line starts with a delta")));
                }
                let Ok(delta) = i64::try_from(delta) else {
                    return Some(Err(Error::invalid(format!("time delta {delta} out of range"))));
                };
                self.pending = Some((delta, count));
                self.step()
            }
            Err(err) => Some(Err(err)),
        }
    }
}

impl<C: TimelineCoder + ?Sized> Iterator for TimeCursor<'_, C> {
    type Item = Result<DateTime<Utc>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.step()?.and_then(|millis| {
            self.last = Some(millis);
            millis_to_date_time(millis)
        });
        if item.is_err() {
            self.failed = true;
        }
        Some(item)
    }
}
