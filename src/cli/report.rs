use anyhow::{bail, Result};
use chrono_tz::Tz;
use clap::Parser;
use futures::{Stream, StreamExt};

use crate::{
    report::{
        attendance::find_missing_weekdays,
        calendar::today_in_zone,
        leaderboard::{rank_leaderboard, Direction, LeaderboardRow, SortKey},
        metrics::{reduce_actuals, reduce_by_date, MetricKey},
        months::{month_keys, summarize_trailing_months},
        range::{resolve_range, ResolvedRange},
    },
    store::{
        entities::{DailyEntryEntity, RepEntity, RepRole},
        entries_between,
        entry_store::EntryStore,
        roster::FsRosterStore,
    },
    utils::clock::{Clock, DefaultClock},
};

use super::{parse_cli_date, DateStyle};

#[derive(Debug, Clone, clap::Args)]
pub struct RangeArgs {
    #[arg(
        long,
        default_value = "yesterday",
        help = "One of yesterday, today, week, month, custom"
    )]
    range: String,
    #[arg(long, help = "Explicit range start, used with --range custom")]
    start: Option<String>,
    #[arg(long, help = "Explicit range end, used with --range custom")]
    end: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

impl RangeArgs {
    /// Resolves the window. Passing both bounds is the explicit-override
    /// signal; the resolver never infers intent from value comparisons.
    pub fn resolve(&self, clock: &impl Clock, zone: Tz) -> Result<ResolvedRange> {
        let explicit = match (&self.start, &self.end) {
            (Some(start), Some(end)) => Some((
                parse_cli_date(start, self.date_style, clock, zone)?,
                parse_cli_date(end, self.date_style, clock, zone)?,
            )),
            _ => None,
        };
        let explicit_override = explicit.is_some();
        Ok(resolve_range(
            &self.range,
            explicit,
            explicit_override,
            clock,
            zone,
        ))
    }
}

#[derive(Debug, Parser)]
pub struct DashboardCommand {
    #[command(flatten)]
    range: RangeArgs,
    #[arg(
        long,
        default_value = "dials",
        help = "Metric the leaderboard section ranks by"
    )]
    metric: String,
}

pub async fn process_dashboard_command(
    DashboardCommand { range, metric }: DashboardCommand,
    roster: &FsRosterStore,
    store: &(impl EntryStore + Send + Sync),
    zone: Tz,
) -> Result<()> {
    let clock = DefaultClock;
    let range = range.resolve(&clock, zone)?;
    let contributors = contributors(roster).await?;
    let entries = collect_entries(entries_between(
        store,
        contributors.iter().map(|rep| rep.id).collect(),
        range.start,
        range.end,
    ))
    .await?;

    println!("{} through {}", range.start, range.end);
    println!();

    let totals = reduce_actuals(&entries);
    println!("Total dials\t{}", totals.dials);
    println!("New prospects\t{}", totals.prospects);
    println!("Total sets\t{}", totals.sets_total);
    println!("New biz sets\t{}", totals.sets_new_biz);
    println!("Expansion sets\t{}", totals.sets_expansion);
    println!("SQOs\t{}", totals.sqos);

    let daily = reduce_by_date(&entries);
    if !daily.is_empty() {
        println!();
        println!("Date\tDials\tProspects\tNew biz\tExpansion\tSQOs");
        for (date, day) in daily {
            println!(
                "{date}\t{}\t{}\t{}\t{}\t{}",
                day.dials, day.prospects, day.sets_new_biz, day.sets_expansion, day.sqos
            );
        }
    }

    let metric = MetricKey::parse(&metric);
    let ranked = rank_leaderboard(
        leaderboard_rows(&contributors, &entries),
        SortKey::Metric(metric),
        Direction::Desc,
    );
    print_leaderboard(&ranked, metric);
    Ok(())
}

#[derive(Debug, Parser)]
pub struct LeaderboardCommand {
    #[command(flatten)]
    range: RangeArgs,
    #[arg(long, default_value = "dials", help = "Metric to rank by")]
    metric: String,
    #[arg(
        long,
        default_value = "metric",
        help = "Sort by \"name\" or by the selected metric"
    )]
    sort: String,
    #[arg(long, default_value = "desc", help = "asc or desc")]
    direction: String,
}

pub async fn process_leaderboard_command(
    LeaderboardCommand {
        range,
        metric,
        sort,
        direction,
    }: LeaderboardCommand,
    roster: &FsRosterStore,
    store: &(impl EntryStore + Send + Sync),
    zone: Tz,
) -> Result<()> {
    let clock = DefaultClock;
    let range = range.resolve(&clock, zone)?;
    let contributors = contributors(roster).await?;
    let entries = collect_entries(entries_between(
        store,
        contributors.iter().map(|rep| rep.id).collect(),
        range.start,
        range.end,
    ))
    .await?;

    let metric = MetricKey::parse(&metric);
    let sort = match sort.as_str() {
        "name" => SortKey::Name,
        _ => SortKey::Metric(metric),
    };
    let ranked = rank_leaderboard(
        leaderboard_rows(&contributors, &entries),
        sort,
        Direction::parse(&direction),
    );

    println!("{} through {}", range.start, range.end);
    print_leaderboard(&ranked, metric);
    Ok(())
}

#[derive(Debug, Parser)]
pub struct MonthsCommand {
    #[arg(long, default_value_t = 6, help = "How many trailing months to include")]
    count: u32,
}

pub async fn process_months_command(
    MonthsCommand { count }: MonthsCommand,
    roster: &FsRosterStore,
    store: &(impl EntryStore + Send + Sync),
    zone: Tz,
) -> Result<()> {
    let clock = DefaultClock;
    let today = today_in_zone(clock.now(), zone);
    let keys = month_keys(count, today);
    let (Some(newest), Some(oldest)) = (keys.first(), keys.last()) else {
        return Ok(());
    };

    let contributors = contributors(roster).await?;
    let entries = collect_entries(entries_between(
        store,
        contributors.iter().map(|rep| rep.id).collect(),
        oldest.bounds().0,
        newest.bounds().1,
    ))
    .await?;

    let buckets = summarize_trailing_months(count, &entries, &clock, zone);

    println!("Month\tDials (avg)\tProspects (avg)\tTotal sets (avg)\tSQOs (avg)\tEntry days");
    for bucket in buckets {
        println!(
            "{}\t{} ({})\t{} ({})\t{} ({})\t{} ({})\t{}",
            bucket.month,
            bucket.totals.dials,
            bucket.average(MetricKey::Dials),
            bucket.totals.prospects,
            bucket.average(MetricKey::Prospects),
            bucket.totals.sets_total,
            bucket.average(MetricKey::SetsTotal),
            bucket.totals.sqos,
            bucket.average(MetricKey::Sqos),
            bucket.entry_count,
        );
    }
    Ok(())
}

#[derive(Debug, Parser)]
pub struct CheckCommand {
    #[arg(long, help = "Rep to check")]
    rep: String,
    #[arg(long, default_value_t = 14, help = "Days to look back")]
    lookback: u32,
}

pub async fn process_check_command(
    CheckCommand { rep, lookback }: CheckCommand,
    roster: &FsRosterStore,
    store: &impl EntryStore,
    zone: Tz,
) -> Result<()> {
    let Some(rep) = roster.find(&rep).await? else {
        bail!("no rep named {rep} in the roster");
    };

    let entries = store.entries_for_rep(rep.id).await?;
    let end = today_in_zone(DefaultClock.now(), zone);
    let missing = find_missing_weekdays(&entries, end, lookback, zone);

    if missing.is_empty() {
        println!("No missing entries in the last {lookback} days.");
    } else {
        println!("Weekdays without an entry for {}:", rep.name);
        for date in missing {
            println!("{date}");
        }
    }
    Ok(())
}

async fn contributors(roster: &FsRosterStore) -> Result<Vec<RepEntity>> {
    Ok(roster
        .list()
        .await?
        .into_iter()
        .filter(|rep| rep.role == RepRole::Contributor)
        .collect())
}

async fn collect_entries(
    stream: impl Stream<Item = Result<DailyEntryEntity>>,
) -> Result<Vec<DailyEntryEntity>> {
    let mut stream = std::pin::pin!(stream);
    let mut entries = vec![];
    while let Some(entry) = stream.next().await {
        entries.push(entry?);
    }
    Ok(entries)
}

fn leaderboard_rows(reps: &[RepEntity], entries: &[DailyEntryEntity]) -> Vec<LeaderboardRow> {
    // Roster order is name order, which doubles as the tie-break under the
    // stable sort.
    reps.iter()
        .map(|rep| LeaderboardRow {
            id: rep.id,
            name: rep.name.clone(),
            totals: reduce_actuals(entries.iter().filter(|entry| entry.rep_id == rep.id)),
        })
        .collect()
}

fn print_leaderboard(rows: &[LeaderboardRow], metric: MetricKey) {
    println!();
    if rows.is_empty() {
        println!("No reps on the roster yet.");
        return;
    }
    println!("Rank\tRep\t{}\tDials\tProspects\tNew biz\tExpansion\tTotal sets\tSQOs", metric.as_str());
    for (index, row) in rows.iter().enumerate() {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            index + 1,
            row.name,
            metric.of(&row.totals),
            row.totals.dials,
            row.totals.prospects,
            row.totals.sets_new_biz,
            row.totals.sets_expansion,
            row.totals.sets_total,
            row.totals.sqos,
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use chrono_tz::Tz;

    use crate::report::range::RangeSelector;
    use crate::utils::clock::MockClock;

    use super::{DateStyle, RangeArgs};

    const ZONE: Tz = chrono_tz::America::New_York;

    fn clock() -> MockClock {
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .return_const(Utc.with_ymd_and_hms(2026, 8, 5, 16, 0, 0).unwrap());
        clock
    }

    fn args(range: &str, start: Option<&str>, end: Option<&str>) -> RangeArgs {
        RangeArgs {
            range: range.into(),
            start: start.map(Into::into),
            end: end.map(Into::into),
            date_style: DateStyle::Uk,
        }
    }

    #[test]
    fn both_bounds_act_as_an_explicit_override() {
        let resolved = args("week", Some("01/03/2026"), Some("10/03/2026"))
            .resolve(&clock(), ZONE)
            .unwrap();
        assert_eq!(resolved.selector, RangeSelector::Custom);
        assert_eq!(resolved.start, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(resolved.end, NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
    }

    #[test]
    fn a_single_bound_keeps_the_preset() {
        let resolved = args("week", Some("01/03/2026"), None)
            .resolve(&clock(), ZONE)
            .unwrap();
        // 2026-08-05 is a Wednesday, so the week began on the 3rd.
        assert_eq!(resolved.selector, RangeSelector::Week);
        assert_eq!(resolved.start, NaiveDate::from_ymd_opt(2026, 8, 3).unwrap());
        assert_eq!(resolved.end, NaiveDate::from_ymd_opt(2026, 8, 5).unwrap());
    }
}
