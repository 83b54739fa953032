use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::store::entities::DailyEntryEntity;

/// Summed metric values over a set of daily entries. `sets_total` is always
/// derived from the two split fields after the fold; the stored combined goal
/// field never contributes, which keeps the two representations from drifting
/// apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub dials: u32,
    pub prospects: u32,
    pub sets_new_biz: u32,
    pub sets_expansion: u32,
    pub sets_total: u32,
    pub sqos: u32,
}

/// Which side of an entry a reduction reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    Goals,
    Actuals,
}

impl Totals {
    /// Adds one entry's fields to the running totals. Absent fields count as
    /// zero, which also means a logged zero and a missing value are
    /// indistinguishable here.
    fn add_entry(&mut self, entry: &DailyEntryEntity, source: FieldSource) {
        match source {
            FieldSource::Actuals => {
                self.dials += entry.actual_dials.unwrap_or(0);
                self.prospects += entry.actual_prospects.unwrap_or(0);
                self.sets_new_biz += entry.actual_sets_new_biz.unwrap_or(0);
                self.sets_expansion += entry.actual_sets_expansion.unwrap_or(0);
                self.sqos += entry.actual_sqos.unwrap_or(0);
            }
            FieldSource::Goals => {
                self.dials += entry.goal_dials.unwrap_or(0);
                self.prospects += entry.goal_prospects.unwrap_or(0);
                self.sets_new_biz += entry.goal_sets_new_biz.unwrap_or(0);
                self.sets_expansion += entry.goal_sets_expansion.unwrap_or(0);
                self.sqos += entry.goal_sqos.unwrap_or(0);
            }
        }
    }

    fn finish(mut self) -> Self {
        self.sets_total = self.sets_new_biz + self.sets_expansion;
        self
    }
}

/// Folds entries into totals, reading the side `source` selects.
pub fn reduce<'a>(
    entries: impl IntoIterator<Item = &'a DailyEntryEntity>,
    source: FieldSource,
) -> Totals {
    let mut totals = Totals::default();
    for entry in entries {
        totals.add_entry(entry, source);
    }
    totals.finish()
}

pub fn reduce_actuals<'a>(entries: impl IntoIterator<Item = &'a DailyEntryEntity>) -> Totals {
    reduce(entries, FieldSource::Actuals)
}

pub fn reduce_goals<'a>(entries: impl IntoIterator<Item = &'a DailyEntryEntity>) -> Totals {
    reduce(entries, FieldSource::Goals)
}

/// Actual totals per distinct date, ascending. Grouping compares the civil
/// date exactly. Used for trend tables.
pub fn reduce_by_date<'a>(
    entries: impl IntoIterator<Item = &'a DailyEntryEntity>,
) -> Vec<(NaiveDate, Totals)> {
    let mut by_date = BTreeMap::<NaiveDate, Totals>::new();
    for entry in entries {
        by_date
            .entry(entry.date)
            .or_default()
            .add_entry(entry, FieldSource::Actuals);
    }
    by_date
        .into_iter()
        .map(|(date, totals)| (date, totals.finish()))
        .collect()
}

/// Names one column of [Totals]. Unknown names degrade to dials, the default
/// ranking metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKey {
    Dials,
    Prospects,
    SetsNewBiz,
    SetsExpansion,
    SetsTotal,
    Sqos,
}

impl MetricKey {
    pub fn parse(value: &str) -> Self {
        match value {
            "dials" => MetricKey::Dials,
            "prospects" => MetricKey::Prospects,
            "sets-new-biz" | "setsNewBiz" => MetricKey::SetsNewBiz,
            "sets-expansion" | "setsExpansion" => MetricKey::SetsExpansion,
            "sets-total" | "setsTotal" => MetricKey::SetsTotal,
            "sqos" => MetricKey::Sqos,
            _ => MetricKey::Dials,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::Dials => "dials",
            MetricKey::Prospects => "prospects",
            MetricKey::SetsNewBiz => "sets-new-biz",
            MetricKey::SetsExpansion => "sets-expansion",
            MetricKey::SetsTotal => "sets-total",
            MetricKey::Sqos => "sqos",
        }
    }

    pub fn of(&self, totals: &Totals) -> u32 {
        match self {
            MetricKey::Dials => totals.dials,
            MetricKey::Prospects => totals.prospects,
            MetricKey::SetsNewBiz => totals.sets_new_biz,
            MetricKey::SetsExpansion => totals.sets_expansion,
            MetricKey::SetsTotal => totals.sets_total,
            MetricKey::Sqos => totals.sqos,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use crate::store::entities::DailyEntryEntity;

    use super::{reduce_actuals, reduce_by_date, reduce_goals, MetricKey, Totals};

    fn entry(day: u32) -> DailyEntryEntity {
        DailyEntryEntity::new(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
        )
    }

    #[test]
    fn absent_fields_count_as_zero() {
        let mut first = entry(2);
        first.actual_dials = Some(50);
        first.actual_sets_new_biz = Some(3);
        let second = entry(3);

        let totals = reduce_actuals([&first, &second]);
        assert_eq!(
            totals,
            Totals {
                dials: 50,
                prospects: 0,
                sets_new_biz: 3,
                sets_expansion: 0,
                sets_total: 3,
                sqos: 0,
            }
        );
    }

    #[test]
    fn sets_total_comes_from_the_split_fields() {
        let mut first = entry(2);
        first.goal_sets_new_biz = Some(4);
        first.goal_sets_expansion = Some(2);
        // A legacy combined value that disagrees with the split fields.
        first.goal_sets_total = Some(99);

        let totals = reduce_goals([&first]);
        assert_eq!(totals.sets_total, 6);
        assert_eq!(totals.sets_total, totals.sets_new_biz + totals.sets_expansion);
    }

    #[test]
    fn goals_and_actuals_read_different_sides() {
        let mut first = entry(2);
        first.goal_dials = Some(80);
        first.actual_dials = Some(62);

        assert_eq!(reduce_goals([&first]).dials, 80);
        assert_eq!(reduce_actuals([&first]).dials, 62);
    }

    #[test]
    fn empty_input_reduces_to_zeroes() {
        let none: [&DailyEntryEntity; 0] = [];
        assert_eq!(reduce_actuals(none), Totals::default());
    }

    #[test]
    fn by_date_groups_and_sorts_ascending() {
        let mut late = entry(9);
        late.actual_dials = Some(10);
        let mut early_a = entry(2);
        early_a.actual_dials = Some(20);
        let mut early_b = entry(2);
        early_b.actual_dials = Some(5);
        early_b.actual_sets_new_biz = Some(1);

        let series = reduce_by_date([&late, &early_a, &early_b]);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].0, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(series[0].1.dials, 25);
        assert_eq!(series[0].1.sets_total, 1);
        assert_eq!(series[1].0, NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        assert_eq!(series[1].1.dials, 10);
    }

    #[test]
    fn metric_keys_parse_leniently() {
        assert_eq!(MetricKey::parse("sqos"), MetricKey::Sqos);
        assert_eq!(MetricKey::parse("setsTotal"), MetricKey::SetsTotal);
        assert_eq!(MetricKey::parse("sets-total"), MetricKey::SetsTotal);
        assert_eq!(MetricKey::parse("unheard-of"), MetricKey::Dials);
    }
}
