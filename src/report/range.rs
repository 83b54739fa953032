use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use now::DateTimeNow;

use crate::utils::clock::Clock;

use super::calendar::{add_days, today_in_zone, weekday_index};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSelector {
    Yesterday,
    Today,
    Week,
    Month,
    Custom,
}

impl RangeSelector {
    /// Unrecognized selectors degrade to [RangeSelector::Today] instead of
    /// failing; a stale query string should never take a report down.
    pub fn parse(value: &str) -> Self {
        match value {
            "yesterday" => RangeSelector::Yesterday,
            "today" => RangeSelector::Today,
            "week" => RangeSelector::Week,
            "month" => RangeSelector::Month,
            "custom" => RangeSelector::Custom,
            _ => RangeSelector::Today,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeSelector::Yesterday => "yesterday",
            RangeSelector::Today => "today",
            RangeSelector::Week => "week",
            RangeSelector::Month => "month",
            RangeSelector::Custom => "custom",
        }
    }
}

/// A resolved reporting window. `start` and `end` are inclusive civil dates;
/// an inverted pair is legal and means an empty window downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRange {
    pub selector: RangeSelector,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Resolves a selector into concrete calendar-date bounds.
///
/// Explicit dates only win for the `custom` selector or when the caller sets
/// `explicit_override`; a preset selector otherwise keeps its own computed
/// bounds, so stale query parameters can't shadow it. Custom bounds are used
/// verbatim, inverted or not.
pub fn resolve_range(
    selector: &str,
    explicit: Option<(NaiveDate, NaiveDate)>,
    explicit_override: bool,
    clock: &impl Clock,
    zone: Tz,
) -> ResolvedRange {
    let selector = RangeSelector::parse(selector);
    match (selector, explicit) {
        (RangeSelector::Custom, Some((start, end))) => ResolvedRange {
            selector: RangeSelector::Custom,
            start,
            end,
        },
        (_, Some((start, end))) if explicit_override => ResolvedRange {
            selector: RangeSelector::Custom,
            start,
            end,
        },
        (selector, _) => preset_range(selector, clock.now(), zone),
    }
}

fn preset_range(selector: RangeSelector, now: DateTime<Utc>, zone: Tz) -> ResolvedRange {
    let today = today_in_zone(now, zone);
    match selector {
        RangeSelector::Yesterday => {
            let yesterday = add_days(today, -1, zone);
            ResolvedRange {
                selector: RangeSelector::Yesterday,
                start: yesterday,
                end: yesterday,
            }
        }
        // Custom without explicit bounds has nothing to resolve and lands on
        // the single-day default.
        RangeSelector::Today | RangeSelector::Custom => ResolvedRange {
            selector: RangeSelector::Today,
            start: today,
            end: today,
        },
        RangeSelector::Week => {
            let weekday = weekday_index(today);
            let delta = if weekday == 0 { -6 } else { 1 - weekday as i64 };
            ResolvedRange {
                selector: RangeSelector::Week,
                start: add_days(today, delta, zone),
                end: today,
            }
        }
        RangeSelector::Month => ResolvedRange {
            selector: RangeSelector::Month,
            start: now.with_timezone(&zone).beginning_of_month().date_naive(),
            end: today,
        },
    }
}
