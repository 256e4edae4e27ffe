//! Time bucketing: hourly search windows and ≤N-day output segments.
use anyhow::{Result, anyhow};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use coinchatter_common::DateRange;
use time::OffsetDateTime;

/// Half-open `[since, until)` search window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourWindow {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl HourWindow {
    pub fn since_offset(&self) -> Result<OffsetDateTime> {
        chrono_to_offset(self.since)
    }

    pub fn until_offset(&self) -> Result<OffsetDateTime> {
        chrono_to_offset(self.until)
    }
}

impl std::fmt::Display for HourWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.since.to_rfc3339(), self.until.to_rfc3339())
    }
}

fn chrono_to_offset(dt: DateTime<Utc>) -> Result<OffsetDateTime> {
    let nanos = dt
        .timestamp_nanos_opt()
        .ok_or_else(|| anyhow!("timestamp out of range for conversion: {}", dt))?;
    OffsetDateTime::from_unix_timestamp_nanos(nanos.into())
        .map_err(|e| anyhow!("failed to convert timestamp {} to OffsetDateTime: {e}", dt))
}

/// Every UTC hour of `range`, newest window first.
pub fn hourly_windows(range: DateRange) -> Vec<HourWindow> {
    let start = range.start.and_time(NaiveTime::MIN).and_utc();
    let hours = range.days() * 24;
    (0..hours)
        .rev()
        .map(|h| {
            let since = start + Duration::hours(h);
            HourWindow {
                since,
                until: since + Duration::hours(1),
            }
        })
        .collect()
}

/// Split `range` into contiguous chunks of `days` days; the last chunk may be
/// shorter. A `days` of zero is treated as one; a step past the calendar's end
/// yields a single chunk.
pub fn segments(range: DateRange, days: u32) -> Vec<DateRange> {
    let step = Duration::days(i64::from(days.max(1)));
    let mut out = Vec::new();
    let mut cur = range.start;
    while cur < range.end {
        let next = cur
            .checked_add_signed(step)
            .map_or(range.end, |d| d.min(range.end));
        out.push(DateRange {
            start: cur,
            end: next,
        });
        cur = next;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::parse(start, end).unwrap()
    }

    #[test]
    fn twenty_five_days_make_two_full_segments_and_a_short_one() {
        let segs = segments(range("2022-01-01", "2022-01-26"), 10);
        let lens: Vec<_> = segs.iter().map(DateRange::days).collect();
        assert_eq!(lens, [10, 10, 5]);
        assert_eq!(segs[0].start, range("2022-01-01", "2022-01-02").start);
        assert_eq!(segs[2].end, range("2022-01-25", "2022-01-26").end);
    }

    #[test]
    fn segments_are_contiguous() {
        let segs = segments(range("2021-12-20", "2022-03-03"), 10);
        assert_eq!(segs.first().unwrap().start.to_string(), "2021-12-20");
        assert_eq!(segs.last().unwrap().end.to_string(), "2022-03-03");
        for pair in segs.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn short_ranges_are_one_segment_and_exact_multiples_leave_no_stub() {
        assert_eq!(segments(range("2022-01-01", "2022-01-08"), 10).len(), 1);
        let exact = segments(range("2022-01-01", "2022-01-21"), 10);
        assert_eq!(exact.len(), 2);
        assert!(exact.iter().all(|s| s.days() == 10));
    }

    #[test]
    fn huge_segment_lengths_yield_one_segment() {
        let segs = segments(range("2022-01-01", "2022-01-26"), u32::MAX);
        assert_eq!(segs, [range("2022-01-01", "2022-01-26")]);
    }

    #[test]
    fn zero_day_segments_fall_back_to_daily() {
        assert_eq!(segments(range("2022-01-01", "2022-01-04"), 0).len(), 3);
    }

    #[test]
    fn hourly_windows_are_newest_first_and_contiguous() {
        let windows = hourly_windows(range("2022-01-01", "2022-01-03"));
        assert_eq!(windows.len(), 48);
        assert_eq!(
            windows[0].until,
            Utc.with_ymd_and_hms(2022, 1, 3, 0, 0, 0).unwrap()
        );
        assert_eq!(
            windows[47].since,
            Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()
        );
        for pair in windows.windows(2) {
            assert_eq!(pair[1].until, pair[0].since);
            assert_eq!(pair[0].until - pair[0].since, Duration::hours(1));
        }
    }

    #[test]
    fn windows_convert_to_offset_datetimes() {
        let w = hourly_windows(range("2022-01-01", "2022-01-02"))[23];
        assert_eq!(w.since_offset().unwrap().unix_timestamp(), 1_640_995_200);
        assert_eq!(w.until_offset().unwrap().unix_timestamp(), 1_640_998_800);
    }
}
