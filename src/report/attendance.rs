use std::collections::HashSet;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::store::entities::DailyEntryEntity;

use super::calendar::{add_days, enumerate_range, is_weekday};

/// Reports the weekday (Mon-Fri) dates in the `lookback_days` window ending
/// at `end` for which the rep has no entry, ascending.
pub fn find_missing_weekdays(
    entries: &[DailyEntryEntity],
    end: NaiveDate,
    lookback_days: u32,
    zone: Tz,
) -> Vec<NaiveDate> {
    if lookback_days == 0 {
        return vec![];
    }
    let logged: HashSet<NaiveDate> = entries.iter().map(|entry| entry.date).collect();
    let start = add_days(end, -(i64::from(lookback_days) - 1), zone);
    enumerate_range(start, end)
        .filter(|date| is_weekday(*date))
        .filter(|date| !logged.contains(date))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use chrono_tz::Tz;
    use uuid::Uuid;

    use crate::store::entities::DailyEntryEntity;

    use super::find_missing_weekdays;

    const ZONE: Tz = chrono_tz::America::New_York;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn reports_skipped_weekdays_in_order() {
        let rep = Uuid::new_v4();
        // Week of 2026-08-03: entries on Monday and Wednesday only.
        let entries = vec![
            DailyEntryEntity::new(rep, date(2026, 8, 3)),
            DailyEntryEntity::new(rep, date(2026, 8, 5)),
        ];

        let missing = find_missing_weekdays(&entries, date(2026, 8, 7), 5, ZONE);
        assert_eq!(
            missing,
            vec![date(2026, 8, 4), date(2026, 8, 6), date(2026, 8, 7)]
        );
    }

    #[test]
    fn weekends_never_count_as_missing() {
        // 14 days ending Sunday 2026-08-09 with no entries at all.
        let missing = find_missing_weekdays(&[], date(2026, 8, 9), 14, ZONE);

        assert_eq!(missing.len(), 10);
        assert!(missing.iter().all(|d| super::is_weekday(*d)));
        assert_eq!(missing.first(), Some(&date(2026, 7, 27)));
        assert_eq!(missing.last(), Some(&date(2026, 8, 7)));
    }

    #[test]
    fn fully_logged_window_has_no_gaps() {
        let rep = Uuid::new_v4();
        let entries: Vec<_> = (3..=7)
            .map(|day| DailyEntryEntity::new(rep, date(2026, 8, day)))
            .collect();
        let missing = find_missing_weekdays(&entries, date(2026, 8, 7), 5, ZONE);
        assert!(missing.is_empty());
    }

    #[test]
    fn zero_lookback_is_empty() {
        assert!(find_missing_weekdays(&[], date(2026, 8, 7), 0, ZONE).is_empty());
    }
}
