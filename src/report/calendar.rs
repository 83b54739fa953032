use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Civil date of the instant `now` in `zone`. Conversions always go through a
/// real zoned computation so the result stays correct across DST transitions.
pub fn today_in_zone(now: DateTime<Utc>, zone: Tz) -> NaiveDate {
    now.with_timezone(&zone).date_naive()
}

/// Shifts a civil date by `delta` days (negative or zero included).
///
/// The shift anchors on a noon instant in `zone`, moves by whole days of
/// absolute time and re-derives the civil date, so no single-offset
/// arithmetic can land on the wrong side of a day boundary.
pub fn add_days(date: NaiveDate, delta: i64, zone: Tz) -> NaiveDate {
    let noon = noon_in_zone(date, zone);
    (noon + Duration::days(delta)).date_naive()
}

fn noon_in_zone(date: NaiveDate, zone: Tz) -> DateTime<Tz> {
    let noon = NaiveDateTime::new(date, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    // DST jumps happen around midnight, noon is never inside a gap.
    zone.from_local_datetime(&noon)
        .earliest()
        .expect("noon should exist in every zone")
}

/// Sunday is 0, Monday 1 through Saturday 6.
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

pub fn is_weekday(date: NaiveDate) -> bool {
    (1..=5).contains(&weekday_index(date))
}

/// Returns every date from `start` to `end` inclusive, ascending. Empty if
/// `start > end`.
pub fn enumerate_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(start), |current| current.succ_opt())
        .take_while(move |current| *current <= end)
}

/// First and last civil day of the calendar month containing `anchor`.
pub fn month_bounds(anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(anchor.year(), anchor.month(), 1)
        .expect("every month has a first day");
    let last = (first + Months::new(1))
        .pred_opt()
        .expect("day before a month start always exists");
    (first, last)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use chrono_tz::Tz;

    use super::{add_days, enumerate_range, is_weekday, month_bounds, today_in_zone, weekday_index};

    const ZONE: Tz = chrono_tz::America::New_York;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn today_follows_the_zone_not_utc() {
        // 02:30 UTC is still the previous evening in New York.
        let instant = Utc.with_ymd_and_hms(2024, 4, 6, 2, 30, 0).unwrap();
        assert_eq!(today_in_zone(instant, ZONE), date(2024, 4, 5));

        let afternoon = Utc.with_ymd_and_hms(2024, 4, 5, 16, 0, 0).unwrap();
        assert_eq!(today_in_zone(afternoon, ZONE), date(2024, 4, 5));
    }

    #[test]
    fn add_days_crosses_dst_transitions() {
        // Spring forward on 2024-03-10 and fall back on 2024-11-03.
        assert_eq!(add_days(date(2024, 3, 9), 2, ZONE), date(2024, 3, 11));
        assert_eq!(add_days(date(2024, 11, 2), 2, ZONE), date(2024, 11, 4));
        assert_eq!(add_days(date(2024, 3, 11), -2, ZONE), date(2024, 3, 9));
    }

    #[test]
    fn add_days_round_trips() {
        let samples = [
            date(2024, 1, 1),
            date(2024, 2, 29),
            date(2024, 3, 10),
            date(2024, 11, 3),
            date(2026, 12, 31),
        ];
        for day in samples {
            for delta in [-400, -31, -1, 0, 1, 45, 365] {
                assert_eq!(
                    add_days(add_days(day, delta, ZONE), -delta, ZONE),
                    day,
                    "{day} {delta}"
                );
            }
        }
    }

    #[test]
    fn weekday_indexes() {
        assert_eq!(weekday_index(date(2024, 4, 7)), 0); // Sunday
        assert_eq!(weekday_index(date(2024, 4, 1)), 1); // Monday
        assert_eq!(weekday_index(date(2024, 4, 5)), 5); // Friday
        assert_eq!(weekday_index(date(2024, 4, 6)), 6); // Saturday

        assert!(is_weekday(date(2024, 4, 1)));
        assert!(is_weekday(date(2024, 4, 5)));
        assert!(!is_weekday(date(2024, 4, 6)));
        assert!(!is_weekday(date(2024, 4, 7)));
    }

    #[test]
    fn enumerate_range_is_inclusive() {
        let days: Vec<_> = enumerate_range(date(2024, 4, 28), date(2024, 5, 2)).collect();
        assert_eq!(
            days,
            vec![
                date(2024, 4, 28),
                date(2024, 4, 29),
                date(2024, 4, 30),
                date(2024, 5, 1),
                date(2024, 5, 2),
            ]
        );

        let single: Vec<_> = enumerate_range(date(2024, 4, 28), date(2024, 4, 28)).collect();
        assert_eq!(single, vec![date(2024, 4, 28)]);
    }

    #[test]
    fn enumerate_range_is_empty_when_inverted() {
        assert_eq!(enumerate_range(date(2024, 5, 2), date(2024, 4, 28)).count(), 0);
    }

    #[test]
    fn month_bounds_handle_length_differences() {
        assert_eq!(
            month_bounds(date(2024, 2, 15)),
            (date(2024, 2, 1), date(2024, 2, 29))
        );
        assert_eq!(
            month_bounds(date(2023, 12, 31)),
            (date(2023, 12, 1), date(2023, 12, 31))
        );
    }
}
