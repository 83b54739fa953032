use std::fmt::Display;

use chrono::{Datelike, Months, NaiveDate};
use chrono_tz::Tz;

use crate::store::entities::DailyEntryEntity;
use crate::utils::clock::Clock;

use super::calendar::{month_bounds, today_in_zone};
use super::metrics::{reduce, FieldSource, MetricKey, Totals};

/// Identifies one calendar month. Displays as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// First and last civil day of the month.
    pub fn bounds(&self) -> (NaiveDate, NaiveDate) {
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("key was built from a valid date");
        month_bounds(first)
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One calendar month's aggregate and how many entries produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthBucket {
    pub month: MonthKey,
    pub totals: Totals,
    pub entry_count: u32,
}

impl MonthBucket {
    /// Per-entry-day average for display, rounded to the nearest integer. A
    /// month with no entries averages to zero; the divisor is floored at one.
    pub fn average(&self, metric: MetricKey) -> u32 {
        let days = self.entry_count.max(1);
        (f64::from(metric.of(&self.totals)) / f64::from(days)).round() as u32
    }
}

/// The `count` most recent month keys, newest first, walking back one
/// calendar month at a time. Day 15 anchors the walk so month lengths can't
/// skew the year/month pair.
pub fn month_keys(count: u32, today: NaiveDate) -> Vec<MonthKey> {
    let anchor = NaiveDate::from_ymd_opt(today.year(), today.month(), 15)
        .expect("day 15 exists in every month");
    (0..count)
        .map(|months_back| MonthKey::of(anchor - Months::new(months_back)))
        .collect()
}

/// Partitions `entries` into the trailing `count` calendar months and reduces
/// each bucket's actuals. Buckets come back newest month first, present even
/// when empty.
pub fn summarize_trailing_months(
    count: u32,
    entries: &[DailyEntryEntity],
    clock: &impl Clock,
    zone: Tz,
) -> Vec<MonthBucket> {
    let today = today_in_zone(clock.now(), zone);
    month_keys(count, today)
        .into_iter()
        .map(|month| {
            let monthly: Vec<&DailyEntryEntity> = entries
                .iter()
                .filter(|entry| month.contains(entry.date))
                .collect();
            MonthBucket {
                month,
                totals: reduce(monthly.iter().copied(), FieldSource::Actuals),
                entry_count: monthly.len() as u32,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use chrono_tz::Tz;
    use uuid::Uuid;

    use crate::store::entities::DailyEntryEntity;
    use crate::utils::clock::MockClock;

    use super::{month_keys, summarize_trailing_months, MetricKey};

    const ZONE: Tz = chrono_tz::America::New_York;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn clock_at(year: i32, month: u32, day: u32) -> MockClock {
        let instant = Utc.with_ymd_and_hms(year, month, day, 16, 0, 0).unwrap();
        let mut clock = MockClock::new();
        clock.expect_now().return_const(instant);
        clock
    }

    #[test]
    fn keys_walk_back_across_the_year_boundary() {
        let keys = month_keys(3, date(2026, 1, 20));
        let rendered: Vec<_> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(rendered, vec!["2026-01", "2025-12", "2025-11"]);
    }

    #[test]
    fn keys_are_stable_on_the_31st() {
        // Walking back from a 31-day month must not skip short months.
        let keys = month_keys(2, date(2026, 3, 31));
        let rendered: Vec<_> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(rendered, vec!["2026-03", "2026-02"]);
    }

    #[test]
    fn key_bounds_cover_the_whole_month() {
        let keys = month_keys(1, date(2024, 2, 10));
        assert_eq!(keys[0].bounds(), (date(2024, 2, 1), date(2024, 2, 29)));
    }

    #[test]
    fn empty_months_summarize_to_zero() {
        let buckets = summarize_trailing_months(3, &[], &clock_at(2026, 8, 5), ZONE);

        assert_eq!(buckets.len(), 3);
        for bucket in &buckets {
            assert_eq!(bucket.entry_count, 0);
            assert_eq!(bucket.totals.dials, 0);
            assert_eq!(bucket.totals.sets_total, 0);
            assert_eq!(bucket.average(MetricKey::Dials), 0);
        }
    }

    #[test]
    fn entries_land_in_their_calendar_month() {
        let rep = Uuid::new_v4();
        let mut july_a = DailyEntryEntity::new(rep, date(2026, 7, 6));
        july_a.actual_dials = Some(40);
        let mut july_b = DailyEntryEntity::new(rep, date(2026, 7, 7));
        july_b.actual_dials = Some(50);
        let mut june = DailyEntryEntity::new(rep, date(2026, 6, 30));
        june.actual_dials = Some(10);

        let entries = vec![july_a, july_b, june];
        let buckets = summarize_trailing_months(3, &entries, &clock_at(2026, 8, 5), ZONE);

        assert_eq!(buckets[0].month.to_string(), "2026-08");
        assert_eq!(buckets[0].entry_count, 0);

        assert_eq!(buckets[1].month.to_string(), "2026-07");
        assert_eq!(buckets[1].entry_count, 2);
        assert_eq!(buckets[1].totals.dials, 90);
        assert_eq!(buckets[1].average(MetricKey::Dials), 45);

        assert_eq!(buckets[2].month.to_string(), "2026-06");
        assert_eq!(buckets[2].totals.dials, 10);
    }

    #[test]
    fn averages_round_to_nearest() {
        let rep = Uuid::new_v4();
        let mut a = DailyEntryEntity::new(rep, date(2026, 7, 6));
        a.actual_dials = Some(10);
        let mut b = DailyEntryEntity::new(rep, date(2026, 7, 7));
        b.actual_dials = Some(5);

        let buckets = summarize_trailing_months(2, &[a, b], &clock_at(2026, 7, 20), ZONE);
        // 15 dials over 2 entry days rounds 7.5 up to 8.
        assert_eq!(buckets[0].average(MetricKey::Dials), 8);
    }
}
